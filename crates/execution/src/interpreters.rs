// Path: crates/execution/src/interpreters.rs

use deip_api::interpreter::CustomOperationInterpreter;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Custom operation interpreters, keyed by the id they declare.
#[derive(Default, Clone)]
pub struct InterpreterRegistry {
    by_id: BTreeMap<String, Arc<dyn CustomOperationInterpreter>>,
}

impl fmt::Debug for InterpreterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterRegistry")
            .field("ids", &self.by_id.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl InterpreterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `interpreter` under its id and returns the one it replaced.
    pub fn register(
        &mut self,
        interpreter: Arc<dyn CustomOperationInterpreter>,
    ) -> Option<Arc<dyn CustomOperationInterpreter>> {
        let id = interpreter.id().to_string();
        let previous = self.by_id.insert(id.clone(), interpreter);
        if previous.is_some() {
            log::warn!("Replaced custom operation interpreter '{}'", id);
        } else {
            log::info!("Registered custom operation interpreter '{}'", id);
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn CustomOperationInterpreter>> {
        self.by_id.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// The payload schema of every registered interpreter, keyed by id.
    pub fn schemas(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.by_id
                .iter()
                .map(|(id, interpreter)| (id.clone(), interpreter.operation_schema()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deip_api::test_utils::RecordingInterpreter;

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = InterpreterRegistry::new();
        assert!(registry
            .register(Arc::new(RecordingInterpreter::new("follow")))
            .is_none());
        assert!(registry
            .register(Arc::new(RecordingInterpreter::new("follow")))
            .is_some());
        registry.register(Arc::new(RecordingInterpreter::new("tags")));

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["follow", "tags"]);
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.schemas()["tags"]["id"], "tags");
    }
}
