//! Atomic construction of execution environments.

use std::fs;

use rhai::{AST, Dynamic, Engine, Scope};

use super::{ExecutionEnvironment, LoadError};
use crate::debug;
use crate::freshness::SourceFileSet;

/// Hook run on every fresh engine before any source file loads, so hosts can
/// register native functions and types the scripts rely on.
pub type EngineSetup = Box<dyn Fn(&mut Engine) + Send + Sync>;

/// Loads all source files into a fresh [`ExecutionEnvironment`].
///
/// Each build is independent: fresh engine, fresh globals. Files load in
/// set order into one shared scope, so later files see earlier files'
/// globals and functions. Any failure aborts the whole build; no partial
/// environment escapes.
pub struct EnvironmentBuilder {
    files: SourceFileSet,
    setup: Option<EngineSetup>,
}

impl EnvironmentBuilder {
    pub fn new(files: SourceFileSet) -> Self {
        Self { files, setup: None }
    }

    /// Register a host setup hook, applied to every rebuilt engine.
    pub fn with_setup(mut self, setup: impl Fn(&mut Engine) + Send + Sync + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn files(&self) -> &SourceFileSet {
        &self.files
    }

    /// Build a new environment from the current on-disk sources.
    pub fn build(&self) -> Result<ExecutionEnvironment, LoadError> {
        let mut engine = Engine::new();
        if let Some(setup) = &self.setup {
            setup(&mut engine);
        }

        let mut scope = Scope::new();
        let mut functions = AST::empty();

        for path in self.files.iter() {
            let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
                file: path.to_owned(),
                source,
            })?;

            let ast = engine.compile(&source).map_err(|cause| LoadError::Parse {
                file: path.to_owned(),
                cause,
            })?;

            // Run this file with every previously loaded function in view,
            // then fold its own functions into the namespace.
            let run = functions.merge(&ast);
            engine
                .eval_ast_with_scope::<Dynamic>(&mut scope, &run)
                .map_err(|cause| LoadError::Eval {
                    file: path.to_owned(),
                    cause,
                })?;
            functions = run.clone_functions_only();

            debug!("build"; "loaded {}", path.display());
        }

        Ok(ExecutionEnvironment::new(engine, functions, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Component, ComponentState};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_sources(sources: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for (name, body) in sources {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            paths.push(path);
        }
        (dir, paths)
    }

    #[test]
    fn test_later_file_sees_earlier_definitions() {
        let (_dir, paths) = write_sources(&[
            ("base.rhai", r#"fn wrap(x) { "<b>" + x + "</b>" } let site = "todo";"#),
            ("page.rhai", r#"let banner = wrap(site);"#),
        ]);
        let env = EnvironmentBuilder::new(SourceFileSet::new(paths))
            .build()
            .unwrap();

        let mut scope = env.new_context();
        let html = env
            .render(
                &mut scope,
                &Component::new("banner", "banner"),
                &ComponentState::new("{}", "/"),
            )
            .unwrap();
        assert_eq!(html, "<b>todo</b>");
    }

    #[test]
    fn test_parse_failure_aborts_and_names_file() {
        let (_dir, paths) = write_sources(&[
            ("good.rhai", "let fine = 1;"),
            ("bad.rhai", "fn ( broken"),
        ]);
        let bad = paths[1].clone();
        let err = EnvironmentBuilder::new(SourceFileSet::new(paths))
            .build()
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert_eq!(err.file(), &bad);
    }

    #[test]
    fn test_eval_failure_aborts_and_names_file() {
        let (_dir, paths) = write_sources(&[("boom.rhai", r#"throw "boom";"#)]);
        let boom = paths[0].clone();
        let err = EnvironmentBuilder::new(SourceFileSet::new(paths))
            .build()
            .unwrap_err();
        assert!(matches!(err, LoadError::Eval { .. }));
        assert_eq!(err.file(), &boom);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone.rhai");
        let err = EnvironmentBuilder::new(SourceFileSet::new(vec![gone.clone()]))
            .build()
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.file(), &gone);
    }

    #[test]
    fn test_builds_are_independent() {
        let (dir, paths) = write_sources(&[("v.rhai", r#"let v = "one";"#)]);
        let builder = EnvironmentBuilder::new(SourceFileSet::new(paths.clone()));

        let first = builder.build().unwrap();
        fs::write(&paths[0], r#"let v = "two";"#).unwrap();
        let second = builder.build().unwrap();
        drop(dir);

        let component = Component::new("v", "v");
        let state = ComponentState::new("{}", "/");
        let mut s1 = first.new_context();
        let mut s2 = second.new_context();
        assert_eq!(first.render(&mut s1, &component, &state).unwrap(), "one");
        assert_eq!(second.render(&mut s2, &component, &state).unwrap(), "two");
    }

    #[test]
    fn test_setup_hook_registers_native_functions() {
        let (_dir, paths) = write_sources(&[("n.rhai", "let n = answer();")]);
        let env = EnvironmentBuilder::new(SourceFileSet::new(paths))
            .with_setup(|engine| {
                engine.register_fn("answer", || 42_i64);
            })
            .build()
            .unwrap();

        let mut scope = env.new_context();
        let html = env
            .render(
                &mut scope,
                &Component::new("n", "n.to_string()"),
                &ComponentState::new("{}", "/"),
            )
            .unwrap();
        assert_eq!(html, "42");
    }
}
