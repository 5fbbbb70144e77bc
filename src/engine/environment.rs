//! One isolated, immutable script runtime.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rhai::{AST, Dynamic, Engine, Scope};

use super::RenderError;
use crate::render::{Component, ComponentState};

/// Scope variable holding the pre-serialized component data payload.
pub const PROPS_VAR: &str = "props";

/// Scope variable holding the request location string.
pub const LOCATION_VAR: &str = "location";

/// Monotonic id for environments, used to invalidate per-worker contexts.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(0);

/// A fully-loaded scripting runtime: engine, the function namespace merged
/// from all source files, and the baseline globals those files established.
///
/// Immutable once built. Any number of renders may read it concurrently;
/// each execution path works on its own cloned scope (see
/// `crate::render::WorkerContext`), never on shared mutable script state.
pub struct ExecutionEnvironment {
    engine: Engine,
    functions: AST,
    baseline: Scope<'static>,
    generation: u64,
    /// Compiled render expressions, keyed by component id. Per-environment:
    /// a reload starts with a cold cache against the new function namespace.
    exprs: DashMap<String, AST>,
}

impl std::fmt::Debug for ExecutionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEnvironment")
            .field("generation", &self.generation)
            .field("exprs", &self.exprs.len())
            .finish_non_exhaustive()
    }
}

impl ExecutionEnvironment {
    pub(super) fn new(engine: Engine, functions: AST, baseline: Scope<'static>) -> Self {
        Self {
            engine,
            functions,
            baseline,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed) + 1,
            exprs: DashMap::new(),
        }
    }

    /// Identity of this environment. Strictly increasing across builds.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fresh execution context: a copy of the globals the source files
    /// defined at load time. One per concurrent execution path.
    pub fn new_context(&self) -> Scope<'static> {
        self.baseline.clone()
    }

    /// Evaluate `component`'s render expression in `scope`, with the state's
    /// data and location bound to [`PROPS_VAR`] / [`LOCATION_VAR`].
    pub fn render(
        &self,
        scope: &mut Scope<'static>,
        component: &Component,
        state: &ComponentState,
    ) -> Result<String, RenderError> {
        scope.set_or_push(PROPS_VAR, state.data().to_owned());
        scope.set_or_push(LOCATION_VAR, state.location().to_owned());

        let ast = self.expr_ast(component)?;
        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(scope, &ast)
            .map_err(|cause| RenderError::Eval {
                component: component.id().to_owned(),
                cause,
            })?;
        Ok(value.to_string())
    }

    /// Compile a component's render expression without executing it.
    pub fn compile_component(&self, component: &Component) -> Result<(), RenderError> {
        self.expr_ast(component).map(|_| ())
    }

    /// Compiled render expression for a component, merged with the
    /// environment's function namespace. Cached after the first use.
    fn expr_ast(&self, component: &Component) -> Result<AST, RenderError> {
        if let Some(ast) = self.exprs.get(component.id()) {
            return Ok(ast.clone());
        }

        let compiled =
            self.engine
                .compile(component.expr())
                .map_err(|cause| RenderError::Compile {
                    component: component.id().to_owned(),
                    cause,
                })?;
        let ast = self.functions.merge(&compiled);
        self.exprs.insert(component.id().to_owned(), ast.clone());
        Ok(ast)
    }
}
