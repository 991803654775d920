use std::collections::BTreeMap;
use std::sync::Arc;

use invochat_core::{Tool, ToolSpec};

/// Lookup table of the tools the agent may call, plus declared-only specs.
///
/// A declared spec is advertised to the model but has no runnable
/// implementation; the orchestrator intercepts it before dispatch. The
/// consent signal tool works this way.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    declared: Vec<ToolSpec>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field(
                "declared",
                &self.declared.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Advertise a tool spec without an implementation behind it.
    pub fn declare(mut self, spec: ToolSpec) -> Self {
        self.declared.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// All specs sent to the model: registered tools first, then declared.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.schema(),
            })
            .collect();
        specs.extend(self.declared.iter().cloned());
        specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use invochat_core::{ToolError, Value};
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its arguments"
        }
        fn schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn invoke(&self, arguments: &str) -> Result<Value, ToolError> {
            Ok(Value::String(arguments.to_string()))
        }
    }

    #[test]
    fn declared_specs_have_no_implementation() {
        let registry = ToolRegistry::new()
            .register(Arc::new(EchoTool))
            .declare(ToolSpec {
                name: "signal_only".to_string(),
                description: "intercepted before dispatch".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            });

        let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["echo", "signal_only"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("signal_only").is_none());
    }
}
