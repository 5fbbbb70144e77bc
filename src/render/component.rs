//! Render targets and their per-request state.

/// A named render target: a stable id (used for logging and timing events)
/// plus the script expression that produces its markup.
#[derive(Debug, Clone)]
pub struct Component {
    id: String,
    expr: String,
}

impl Component {
    pub fn new(id: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expr: expr.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }
}

/// Immutable per-request state handed to a render invocation.
///
/// `data` is a pre-serialized payload (the host does its own JSON shaping);
/// `location` is the request location string. Scripts read both through the
/// `props` / `location` globals.
#[derive(Debug, Clone)]
pub struct ComponentState {
    data: String,
    location: String,
}

impl ComponentState {
    pub fn new(data: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            location: location.into(),
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}
