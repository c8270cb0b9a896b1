//! Builtin demo tools and the default registration table.
//!
//! These are deliberately trivial capabilities used for smoke-testing a
//! deployment and for tests; real business tools live outside the core and
//! register through the same table mechanism.

mod calculator;
mod echo;

use std::sync::Arc;

pub use calculator::CalculatorTool;
pub use echo::EchoTool;

use crate::errors::ExecError;
use crate::tools::{Tool, ToolRegistry};

/// Static registration table for the builtin tools, keyed by namespaced
/// name. Replaces the original deployment's filesystem scanning.
pub fn default_tools() -> Vec<(&'static str, fn() -> Result<Arc<dyn Tool>, ExecError>)> {
    fn echo() -> Result<Arc<dyn Tool>, ExecError> {
        Ok(Arc::new(EchoTool))
    }
    fn calculator() -> Result<Arc<dyn Tool>, ExecError> {
        Ok(Arc::new(CalculatorTool))
    }
    vec![("core/echo", echo), ("core/calculator", calculator)]
}

/// Register the builtin tool set into a registry.
pub fn register_defaults(registry: &ToolRegistry) {
    registry.register_all(default_tools());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults_installs_builtins() {
        let registry = ToolRegistry::new();
        register_defaults(&registry);
        assert!(registry.get("core/echo").is_some());
        assert!(registry.get("core/calculator").is_some());
    }
}
