//! Script loading and evaluation error types.

use std::path::PathBuf;

use thiserror::Error;

/// A source file failed to load while building an environment.
///
/// The whole build fails on the first of these; no partial environment is
/// ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read script `{file}`")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script `{file}`: {cause}")]
    Parse {
        file: PathBuf,
        cause: rhai::ParseError,
    },

    #[error("failed to evaluate script `{file}`: {cause}")]
    Eval {
        file: PathBuf,
        cause: Box<rhai::EvalAltResult>,
    },
}

impl LoadError {
    /// The file that broke the build.
    pub fn file(&self) -> &PathBuf {
        match self {
            Self::Io { file, .. } | Self::Parse { file, .. } | Self::Eval { file, .. } => file,
        }
    }
}

/// A render expression failed against an otherwise healthy environment.
///
/// Recovered inside the render workers: the caller sees an empty string and
/// a `failed` timing event, never this error.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to compile render expression for `{component}`: {cause}")]
    Compile {
        component: String,
        cause: rhai::ParseError,
    },

    #[error("failed to render `{component}`: {cause}")]
    Eval {
        component: String,
        cause: Box<rhai::EvalAltResult>,
    },
}
