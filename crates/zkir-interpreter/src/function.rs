use crate::error::InterpreterError;
use crate::gate::{Gate, Signature};
use crate::type_interpreter::TypeInterpreterDyn;
use zkir_core::{Param, TypeIdx, WireId};

/// Which plugin and which named operation of it a [`PluginFunction`]
/// dispatches to, plus the static parameters its `@type`/`@function`
/// declaration carried (e.g. a RAM buffer's declared size).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginBinding {
    pub plugin_name: String,
    pub operation_name: String,
    pub params: Vec<Param>,
}

/// The interpreter-coordinator surface an [`Operation`] is given while
/// it runs: its callee scopes are already pushed and its output/input
/// ranges already remapped in by the same `map_output`/`map_input`
/// sequence an ordinary function call goes through. This is the
/// object-safe seam that lets a fallback plugin drive the same
/// per-type gate callbacks a `RegularFunction`'s recorded gates would,
/// and lets the iteration plugin recursively invoke another named
/// function.
pub trait PluginHost {
    fn type_mut(&mut self, idx: TypeIdx) -> Result<&mut dyn TypeInterpreterDyn, InterpreterError>;

    /// Run the same push-scope / map-ranges / evaluate / check-output /
    /// pop-scope sequence an ordinary `@call` uses, against whichever
    /// named function is currently in scope. Used by
    /// the iteration plugin to invoke its body function once per
    /// iteration, and available to any other plugin that needs to
    /// delegate to a named sub-function.
    fn invoke(
        &mut self,
        name: &str,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
    ) -> Result<(), InterpreterError>;
}

/// A single named plugin operation: the concrete implementation behind
/// one `PluginFunction`. Operations address their wires by
/// `(type_idx, first, last)` range, exactly as the directive stream
/// does, and drive them through the [`PluginHost`] rather than through
/// any backend-specific API of their own.
pub trait Operation {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        signature: &Signature,
        binding: &PluginBinding,
    ) -> Result<(), InterpreterError>;
}

/// A named collection of [`Operation`]s, registered with a
/// [`crate::interpreter::Interpreter`] by name.
pub trait Plugin {
    fn name(&self) -> &str;

    fn operation(&self, operation_name: &str) -> Option<&dyn Operation>;
}

/// A function recorded as a flat list of [`Gate`] directives, replayed
/// against the callee scope each time it is invoked.
#[derive(Debug, Clone)]
pub struct RegularFunction {
    pub signature: Signature,
    pub body: Vec<Gate>,
}

/// A function that dispatches to a plugin [`Operation`] instead of
/// replaying recorded gates.
#[derive(Debug, Clone)]
pub struct PluginFunction {
    pub signature: Signature,
    pub binding: PluginBinding,
}

/// A declared, callable function: either a recorded gate sequence or a
/// plugin dispatch.
#[derive(Debug, Clone)]
pub enum Function {
    Regular(RegularFunction),
    Plugin(PluginFunction),
}

impl Function {
    pub fn signature(&self) -> &Signature {
        match self {
            Function::Regular(f) => &f.signature,
            Function::Plugin(f) => &f.signature,
        }
    }
}

/// Builds [`Function`] values. The default, zero-sized
/// [`GatesFunctionFactory`] builds ordinary recorded-gate functions;
/// a directive producer (out of scope for this workspace) would use
/// this seam to build `Function::Plugin` values directly from a
/// `@plugin` declaration instead.
pub trait FunctionFactory {
    fn make_regular(&self, signature: Signature, body: Vec<Gate>) -> Function;

    fn make_plugin(&self, signature: Signature, binding: PluginBinding) -> Function {
        Function::Plugin(PluginFunction { signature, binding })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GatesFunctionFactory;

impl FunctionFactory for GatesFunctionFactory {
    fn make_regular(&self, signature: Signature, body: Vec<Gate>) -> Function {
        Function::Regular(RegularFunction { signature, body })
    }
}
