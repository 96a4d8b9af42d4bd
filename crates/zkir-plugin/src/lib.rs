use rustc_hash::FxHashMap;
use zkir_interpreter::{Operation, Plugin, PluginLookup};

/// Routes `(plugin_name, operation_name)` lookups to whichever
/// registered [`Plugin`] owns that name.
///
/// A `PluginFunction` declaration names its plugin and operation once,
/// at parse time; every subsequent `@call`/`@invoke` of that function
/// re-resolves through this manager rather than caching the `&dyn
/// Operation` reference, so plugins can be registered (or re-registered,
/// in tests) at any point before the first call that needs them.
#[derive(Default)]
pub struct PluginsManager {
    plugins: FxHashMap<String, Box<dyn Plugin>>,
}

impl PluginsManager {
    pub fn new() -> Self {
        PluginsManager::default()
    }

    /// Register a plugin under its own `Plugin::name()`. Replaces any
    /// plugin previously registered under the same name.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    pub fn get(&self, plugin_name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(plugin_name).map(|p| p.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }
}

impl PluginLookup for PluginsManager {
    fn find(&self, plugin_name: &str, operation_name: &str) -> Option<&dyn Operation> {
        self.plugins.get(plugin_name)?.operation(operation_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkir_core::{TypeIdx, WireId};
    use zkir_interpreter::{InterpreterError, PluginBinding, PluginHost, Signature};

    struct Noop;
    impl Operation for Noop {
        fn evaluate(
            &self,
            _host: &mut dyn PluginHost,
            _outputs: &[(TypeIdx, WireId, WireId)],
            _inputs: &[(TypeIdx, WireId, WireId)],
            _signature: &Signature,
            _binding: &PluginBinding,
        ) -> Result<(), InterpreterError> {
            Ok(())
        }
    }

    struct Stub;
    impl Plugin for Stub {
        fn name(&self) -> &str {
            "stub"
        }
        fn operation(&self, operation_name: &str) -> Option<&dyn Operation> {
            if operation_name == "noop" { Some(&Noop) } else { None }
        }
    }

    #[test]
    fn finds_registered_operation() {
        let mut mgr = PluginsManager::new();
        mgr.register(Box::new(Stub));
        assert!(mgr.find("stub", "noop").is_some());
        assert!(mgr.find("stub", "missing").is_none());
        assert!(mgr.find("missing_plugin", "noop").is_none());
    }
}
