//! `zkir`: a circuit interpreter for a multi-type zero-knowledge-proof
//! intermediate representation. This crate is a thin facade over the
//! workspace's component crates — it owns no logic of its own, only
//! re-exports, so that a downstream parser or proving backend depends
//! on one crate instead of five.
//!
//! - [`zkir_core`] — `SkipList`, `Range`/`Scope`, `Number`, `TypeSpec`.
//! - [`zkir_interpreter`] — `TypeInterpreter`, `Interpreter`, the
//!   `Function`/`Operation`/`Plugin` seam, and the error hierarchy.
//! - [`zkir_plugin`] — `PluginsManager`, the name-based plugin registry.
//! - [`zkir_iter`] (feature `iter`, default on) — the `map` /
//!   `map_enumerated` iteration plugin.
//! - [`zkir_fallback`] (feature `fallback`, default on) — the
//!   multiplexer, RAM, vectors, and extended-arithmetic reference
//!   plugins that lower to plain gates over any backend.

pub use zkir_core::{Param, Range, Scope, ScopeError, SkipList, TypeIdx, TypeSpec, WireId, Number};

pub use zkir_interpreter::{
    ArityError, ConversionSpec, Converter, Diagnostic, ErasedWiresMut, ErasedWiresRef, Function,
    FunctionFactory, Gate, GatesFunctionFactory, InputStream, Interpreter, InterpreterError,
    NoPlugins, NumericBackend, NumericTypeInterpreter, Operation, Plugin, PluginBinding,
    PluginError, PluginFunction, PluginHost, PluginLookup, RamBuffer, RamTypeInterpreter,
    ReferenceError, RegularFunction, Signature, StreamError, TypeError, TypeInterpreterDyn,
    VecInputStream,
};

pub use zkir_plugin::PluginsManager;

#[cfg(feature = "iter")]
pub use zkir_iter::IterPlugin;

#[cfg(feature = "fallback")]
pub use zkir_fallback::{ArithRamPlugin, BoolRamPlugin, ExtendedArithmeticPlugin, MuxPlugin, VectorsPlugin};

/// Register every fallback plugin this workspace ships (`mux_v0`,
/// `ram_arith_v0`, `ram_bool_v0`, `vectors_v0`,
/// `extended_arithmetic_v0`) plus, when the `iter` feature is on,
/// `iter` itself — the common case for a host that wants the full
/// reference plugin set with no hand-picking.
#[cfg(feature = "fallback")]
pub fn register_fallback_plugins(plugins: &mut PluginsManager) {
    plugins.register(Box::new(MuxPlugin));
    plugins.register(Box::new(ArithRamPlugin));
    plugins.register(Box::new(BoolRamPlugin));
    plugins.register(Box::new(VectorsPlugin));
    plugins.register(Box::new(ExtendedArithmeticPlugin));
}

#[cfg(feature = "iter")]
pub fn register_iter_plugin(plugins: &mut PluginsManager) {
    plugins.register(Box::new(IterPlugin));
}

#[cfg(all(test, feature = "iter", feature = "fallback"))]
mod tests {
    use super::*;

    #[test]
    fn registers_every_shipped_plugin_under_its_own_name() {
        let mut plugins = PluginsManager::new();
        register_fallback_plugins(&mut plugins);
        register_iter_plugin(&mut plugins);
        for name in [
            "mux_v0",
            "ram_arith_v0",
            "ram_bool_v0",
            "vectors_v0",
            "extended_arithmetic_v0",
            "iter",
        ] {
            assert!(plugins.get(name).is_some(), "missing plugin {name}");
        }
    }
}
