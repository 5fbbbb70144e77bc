//! Per-worker execution contexts.

use rhai::Scope;

use crate::debug;
use crate::engine::ExecutionEnvironment;

/// One worker's cached execution context.
///
/// Script evaluation mutates its scope, so concurrent renders must not share
/// one. Each worker thread owns a `WorkerContext` holding a clone of the
/// environment's baseline scope, created lazily on first use and rebuilt
/// whenever the published environment's generation changes.
pub(crate) struct WorkerContext {
    worker: usize,
    cached: Option<(u64, Scope<'static>)>,
}

impl WorkerContext {
    pub(crate) fn new(worker: usize) -> Self {
        Self {
            worker,
            cached: None,
        }
    }

    /// Scope bound to `env`, rebuilding the cached one if it belongs to an
    /// older environment.
    pub(crate) fn scope_for(&mut self, env: &ExecutionEnvironment) -> &mut Scope<'static> {
        let fresh = matches!(&self.cached, Some((generation, _)) if *generation == env.generation());
        if !fresh {
            debug!("render"; "worker {} building context for environment #{}", self.worker, env.generation());
            self.cached = Some((env.generation(), env.new_context()));
        }
        &mut self.cached.as_mut().unwrap().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EnvironmentBuilder;
    use crate::freshness::SourceFileSet;
    use crate::render::{Component, ComponentState};
    use std::fs;
    use tempfile::TempDir;

    fn env_with(body: &str) -> (TempDir, ExecutionEnvironment) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.rhai");
        fs::write(&path, body).unwrap();
        let env = EnvironmentBuilder::new(SourceFileSet::new(vec![path]))
            .build()
            .unwrap();
        (dir, env)
    }

    #[test]
    fn test_scope_rebuilt_on_generation_change() {
        let (_d1, first) = env_with(r#"let version = "one";"#);
        let (_d2, second) = env_with(r#"let version = "two";"#);
        let component = Component::new("v", "version");
        let state = ComponentState::new("{}", "/");

        let mut ctx = WorkerContext::new(0);
        let html = first
            .render(ctx.scope_for(&first), &component, &state)
            .unwrap();
        assert_eq!(html, "one");

        // Same worker, newer environment: the old globals must not leak in.
        let html = second
            .render(ctx.scope_for(&second), &component, &state)
            .unwrap();
        assert_eq!(html, "two");
    }

    #[test]
    fn test_scope_reused_within_one_generation() {
        let (_dir, env) = env_with("let hits = 0;");
        let component = Component::new("hits", "hits += 1; hits.to_string()");
        let state = ComponentState::new("{}", "/");

        let mut ctx = WorkerContext::new(0);
        assert_eq!(env.render(ctx.scope_for(&env), &component, &state).unwrap(), "1");
        // Cached scope persists between jobs against the same environment.
        assert_eq!(env.render(ctx.scope_for(&env), &component, &state).unwrap(), "2");
    }
}
