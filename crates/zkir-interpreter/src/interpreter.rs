use rustc_hash::FxHashMap;

use crate::converter::Converter;
use crate::error::{ArityError, Diagnostic, InterpreterError, ReferenceError};
use crate::function::{Function, Operation, PluginHost};
use crate::gate::{Gate, Signature};
use crate::type_interpreter::TypeInterpreterDyn;
use zkir_core::{Number, TypeIdx, WireId};

/// Resolves `(plugin_name, operation_name)` pairs to an [`Operation`].
/// Defined here (rather than depending on `zkir-plugin`'s registry
/// directly) so `zkir-interpreter` and `zkir-plugin` don't form a
/// dependency cycle — `zkir_plugin::PluginsManager` implements this
/// trait.
pub trait PluginLookup {
    fn find(&self, plugin_name: &str, operation_name: &str) -> Option<&dyn Operation>;
}

/// A [`PluginLookup`] with no registered plugins, for interpreters that
/// only ever call `Function::Regular` functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlugins;

impl PluginLookup for NoPlugins {
    fn find(&self, _plugin_name: &str, _operation_name: &str) -> Option<&dyn Operation> {
        None
    }
}

/// The multi-type coordinator: dispatches directives by
/// `type_idx` to the matching [`TypeInterpreterDyn`], drives `@convert`
/// through the converter table, and drives function calls (`@invoke` /
/// `@call`) through the function table, handling the push-scope /
/// map-ranges / evaluate / check-output / pop-scope sequence identically
/// for both `Function::Regular` and `Function::Plugin`.
pub struct Interpreter<P: PluginLookup> {
    types: Vec<Box<dyn TypeInterpreterDyn>>,
    functions: FxHashMap<String, Function>,
    converters: FxHashMap<(TypeIdx, TypeIdx), Box<dyn Converter>>,
    plugins: P,
    diagnostics: Vec<Diagnostic>,
    success: bool,
    aborted: bool,
    current_file: Option<String>,
    current_line: usize,
}

impl<P: PluginLookup> Interpreter<P> {
    pub fn new(types: Vec<Box<dyn TypeInterpreterDyn>>, plugins: P) -> Self {
        Interpreter {
            types,
            functions: FxHashMap::default(),
            converters: FxHashMap::default(),
            plugins,
            diagnostics: Vec::new(),
            success: true,
            aborted: false,
            current_file: None,
            current_line: 0,
        }
    }

    pub fn register_function(&mut self, name: impl Into<String>, function: Function) {
        self.functions.insert(name.into(), function);
    }

    pub fn register_converter(
        &mut self,
        from: TypeIdx,
        to: TypeIdx,
        converter: Box<dyn Converter>,
    ) {
        self.converters.insert((from, to), converter);
    }

    pub fn set_line_num(&mut self, line: usize) {
        self.current_line = line;
    }

    pub fn set_file(&mut self, file: impl Into<String>) {
        self.current_file = Some(file.into());
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    fn ctx(&mut self) -> Ctx<'_, P> {
        Ctx {
            types: &mut self.types,
            functions: &self.functions,
            converters: &mut self.converters,
            plugins: &self.plugins,
        }
    }

    /// Record the outcome of one directive: fatal errors abort the run;
    /// everything else is recorded as a diagnostic and
    /// ANDed into the running success flag, allowing later directives
    /// to still execute.
    fn record(&mut self, result: Result<(), InterpreterError>) -> bool {
        if self.aborted {
            return false;
        }
        match result {
            Ok(()) => true,
            Err(e) => {
                let fatal = e.is_fatal();
                let diag = Diagnostic {
                    file: self.current_file.clone(),
                    line: self.current_line,
                    message: e.to_string(),
                };
                self.diagnostics.push(diag);
                self.success = false;
                if fatal {
                    self.aborted = true;
                }
                false
            }
        }
    }

    pub fn new_range(&mut self, type_idx: TypeIdx, first: WireId, last: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.new_range(first, last));
        self.record(result)
    }

    pub fn delete_range(&mut self, type_idx: TypeIdx, first: WireId, last: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self
            .ctx()
            .type_mut(type_idx)
            .and_then(|t| t.delete_range(first, last));
        self.record(result)
    }

    pub fn assign_const(&mut self, type_idx: TypeIdx, out: WireId, value: &Number) -> bool {
        if self.aborted {
            return false;
        }
        let result = self
            .ctx()
            .type_mut(type_idx)
            .and_then(|t| t.assign_const(out, value));
        self.record(result)
    }

    pub fn add_gate(&mut self, type_idx: TypeIdx, out: WireId, l: WireId, r: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.add_gate(out, l, r));
        self.record(result)
    }

    pub fn mul_gate(&mut self, type_idx: TypeIdx, out: WireId, l: WireId, r: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.mul_gate(out, l, r));
        self.record(result)
    }

    pub fn addc_gate(&mut self, type_idx: TypeIdx, out: WireId, l: WireId, c: &Number) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.addc_gate(out, l, c));
        self.record(result)
    }

    pub fn mulc_gate(&mut self, type_idx: TypeIdx, out: WireId, l: WireId, c: &Number) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.mulc_gate(out, l, c));
        self.record(result)
    }

    pub fn copy(&mut self, type_idx: TypeIdx, out: WireId, l: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.copy(out, l));
        self.record(result)
    }

    pub fn copy_multi(
        &mut self,
        type_idx: TypeIdx,
        out_first: WireId,
        out_last: WireId,
        inputs: &[(WireId, WireId)],
    ) -> bool {
        if self.aborted {
            return false;
        }
        let result = self
            .ctx()
            .type_mut(type_idx)
            .and_then(|t| t.copy_multi(out_first, out_last, inputs));
        self.record(result)
    }

    pub fn assert_zero(&mut self, type_idx: TypeIdx, wire: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.assert_zero(wire));
        self.record(result)
    }

    pub fn public_in(&mut self, type_idx: TypeIdx, out: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.public_in(out));
        self.record(result)
    }

    pub fn private_in(&mut self, type_idx: TypeIdx, out: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().type_mut(type_idx).and_then(|t| t.private_in(out));
        self.record(result)
    }

    pub fn public_in_multi(&mut self, type_idx: TypeIdx, first: WireId, last: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self
            .ctx()
            .type_mut(type_idx)
            .and_then(|t| t.public_in_multi(first, last));
        self.record(result)
    }

    pub fn private_in_multi(&mut self, type_idx: TypeIdx, first: WireId, last: WireId) -> bool {
        if self.aborted {
            return false;
        }
        let result = self
            .ctx()
            .type_mut(type_idx)
            .and_then(|t| t.private_in_multi(first, last));
        self.record(result)
    }

    pub fn convert(
        &mut self,
        from_type: TypeIdx,
        to_type: TypeIdx,
        out_first: WireId,
        out_last: WireId,
        in_first: WireId,
        in_last: WireId,
        modulus: bool,
    ) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().do_convert(
            from_type, to_type, out_first, out_last, in_first, in_last, modulus,
        );
        self.record(result)
    }

    /// `@call`/`@invoke name outputs inputs` — the shared sequence for
    /// both `Function::Regular` and `Function::Plugin`:
    /// push a fresh scope on every type, map each declared output/input
    /// span from the caller into the callee, evaluate the function body
    /// (replaying gates, or dispatching to a plugin `Operation`), commit
    /// each output back via `check_output`, then pop every scope.
    pub fn invoke(
        &mut self,
        name: &str,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
    ) -> bool {
        if self.aborted {
            return false;
        }
        let result = self.ctx().do_invoke(name, outputs, inputs);
        self.record(result)
    }

    /// Run every type's `check()` and AND the results, then call
    /// `finish()` on each. Intended to be called once after the last
    /// directive has been dispatched.
    pub fn finish(&mut self) -> bool {
        let mut ok = self.success;
        for t in &self.types {
            if t.leftover_inputs() {
                self.diagnostics.push(Diagnostic {
                    file: self.current_file.clone(),
                    line: self.current_line,
                    message: format!(
                        "leftover input-stream values for type {} after the last directive",
                        t.type_idx()
                    ),
                });
                ok = false;
            }
        }
        for t in &mut self.types {
            ok &= t.check();
        }
        for c in self.converters.values_mut() {
            ok &= c.check();
        }
        for t in &mut self.types {
            t.finish();
        }
        ok
    }
}

/// A short-lived, disjoint borrow of every `Interpreter` field a
/// directive-dispatch or function-evaluation step needs, *excluding*
/// the diagnostics/success bookkeeping the outer `Interpreter` methods
/// own. Splitting the borrow this way is what lets [`Operation::evaluate`]
/// receive `&mut dyn PluginHost` (itself, reborrowed) while the plugin
/// lookup in [`Ctx::evaluate_plugin`] still holds a reference into
/// `plugins` — the two are disjoint fields, so there is no aliasing and
/// no need for unsafe code to express it.
struct Ctx<'a, P: PluginLookup> {
    types: &'a mut Vec<Box<dyn TypeInterpreterDyn>>,
    functions: &'a FxHashMap<String, Function>,
    converters: &'a mut FxHashMap<(TypeIdx, TypeIdx), Box<dyn Converter>>,
    plugins: &'a P,
}

impl<'a, P: PluginLookup> Ctx<'a, P> {
    fn type_mut(&mut self, idx: TypeIdx) -> Result<&mut dyn TypeInterpreterDyn, InterpreterError> {
        self.types
            .get_mut(idx.get() as usize)
            .map(|b| b.as_mut())
            .ok_or_else(|| crate::error::TypeError::UnknownType(idx).into())
    }

    fn type_ref(&self, idx: TypeIdx) -> Result<&dyn TypeInterpreterDyn, InterpreterError> {
        self.types
            .get(idx.get() as usize)
            .map(|b| b.as_ref())
            .ok_or_else(|| crate::error::TypeError::UnknownType(idx).into())
    }

    fn do_convert(
        &mut self,
        from_type: TypeIdx,
        to_type: TypeIdx,
        out_first: WireId,
        out_last: WireId,
        in_first: WireId,
        in_last: WireId,
        modulus: bool,
    ) -> Result<(), InterpreterError> {
        let mut inputs = Vec::new();
        for w in in_first.get()..=in_last.get() {
            inputs.push(self.type_ref(from_type)?.extended_witness(WireId(w))?);
        }
        let converter = self
            .converters
            .get_mut(&(from_type, to_type))
            .ok_or(ReferenceError::UnknownConverter {
                from: from_type,
                to: to_type,
            })?;
        let outputs = converter.convert(&inputs, modulus);
        let span = (out_last.get() - out_first.get() + 1) as usize;
        if outputs.len() != span {
            return Err(ArityError::OutputCount {
                name: "convert".to_string(),
                expected: span,
                got: outputs.len(),
            }
            .into());
        }
        let to = self.type_mut(to_type)?;
        for (i, v) in outputs.into_iter().enumerate() {
            to.assign_const(WireId(out_first.get() + i as u64), &v)?;
        }
        Ok(())
    }

    fn do_invoke(
        &mut self,
        name: &str,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
    ) -> Result<(), InterpreterError> {
        let function = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| ReferenceError::UnknownFunction(name.to_string()))?;
        let sig = function.signature().clone();
        check_arity(name, &sig, outputs, inputs)?;

        for t in self.types.iter_mut() {
            t.push_scope();
        }

        // A plugin-bound output is allocated via `plugin_output`, which
        // marks it active immediately, since the operation fills it
        // directly rather than through ordinary gate directives
        // (`spec.md` §4.F).
        let is_plugin = matches!(function, Function::Plugin(_));
        let mut callee_outputs = Vec::with_capacity(outputs.len());
        for &(ty, first, last) in outputs {
            let (cf, cl) = if is_plugin {
                self.type_mut(ty)?.plugin_output(first, last)?
            } else {
                self.type_mut(ty)?.map_output(first, last)?
            };
            callee_outputs.push((ty, cf, cl));
        }
        let mut callee_inputs = Vec::with_capacity(inputs.len());
        for &(ty, first, last) in inputs {
            let (cf, cl) = self.type_mut(ty)?.map_input(first, last)?;
            callee_inputs.push((ty, cf, cl));
        }

        let eval_result = match &function {
            Function::Regular(regular) => self.evaluate_regular(&regular.body),
            Function::Plugin(plugin) => {
                self.evaluate_plugin(&plugin.binding, &sig, &callee_outputs, &callee_inputs)
            }
        };

        // Commit whatever outputs the callee did produce, even if
        // `eval_result` failed partway through (Open Question #3).
        let mut commit_result = Ok(());
        for (&(caller_ty, caller_first, caller_last), &(callee_ty, callee_first, callee_last)) in
            outputs.iter().zip(callee_outputs.iter())
        {
            debug_assert_eq!(caller_ty, callee_ty);
            let r = self
                .type_mut(caller_ty)?
                .check_output(caller_first, caller_last, callee_first, callee_last);
            if r.is_err() && commit_result.is_ok() {
                commit_result = r;
            }
        }

        for t in self.types.iter_mut() {
            t.pop_scope()?;
        }

        eval_result?;
        commit_result
    }

    fn evaluate_regular(&mut self, body: &[Gate]) -> Result<(), InterpreterError> {
        for gate in body {
            self.evaluate_gate(gate)?;
        }
        Ok(())
    }

    fn evaluate_gate(&mut self, gate: &Gate) -> Result<(), InterpreterError> {
        match gate {
            Gate::NewRange { type_idx, first, last } => {
                self.type_mut(*type_idx)?.new_range(*first, *last)
            }
            Gate::DeleteRange { type_idx, first, last } => {
                self.type_mut(*type_idx)?.delete_range(*first, *last)
            }
            Gate::AssignConst { type_idx, out, value } => {
                self.type_mut(*type_idx)?.assign_const(*out, value)
            }
            Gate::Add { type_idx, out, left, right } => {
                self.type_mut(*type_idx)?.add_gate(*out, *left, *right)
            }
            Gate::Mul { type_idx, out, left, right } => {
                self.type_mut(*type_idx)?.mul_gate(*out, *left, *right)
            }
            Gate::AddC { type_idx, out, left, constant } => {
                self.type_mut(*type_idx)?.addc_gate(*out, *left, constant)
            }
            Gate::MulC { type_idx, out, left, constant } => {
                self.type_mut(*type_idx)?.mulc_gate(*out, *left, constant)
            }
            Gate::Copy { type_idx, out, left } => self.type_mut(*type_idx)?.copy(*out, *left),
            Gate::CopyMulti { type_idx, out_first, out_last, inputs } => self
                .type_mut(*type_idx)?
                .copy_multi(*out_first, *out_last, inputs),
            Gate::AssertZero { type_idx, wire } => self.type_mut(*type_idx)?.assert_zero(*wire),
            Gate::PublicIn { type_idx, out } => self.type_mut(*type_idx)?.public_in(*out),
            Gate::PrivateIn { type_idx, out } => self.type_mut(*type_idx)?.private_in(*out),
            Gate::PublicInMulti { type_idx, first, last } => {
                self.type_mut(*type_idx)?.public_in_multi(*first, *last)
            }
            Gate::PrivateInMulti { type_idx, first, last } => {
                self.type_mut(*type_idx)?.private_in_multi(*first, *last)
            }
            Gate::Convert {
                from_type,
                to_type,
                out_first,
                out_last,
                in_first,
                in_last,
                modulus,
            } => self.do_convert(
                *from_type, *to_type, *out_first, *out_last, *in_first, *in_last, *modulus,
            ),
            Gate::Invoke { name, outputs, inputs } => self.do_invoke(name, outputs, inputs),
        }
    }

    fn evaluate_plugin(
        &mut self,
        binding: &crate::function::PluginBinding,
        sig: &Signature,
        callee_outputs: &[(TypeIdx, WireId, WireId)],
        callee_inputs: &[(TypeIdx, WireId, WireId)],
    ) -> Result<(), InterpreterError> {
        // `self.plugins` is itself a `&'a P` (already a reference, hence
        // `Copy`): the operation reference this yields outlives any
        // borrow of `self` taken below, so there is no conflict with
        // also handing `self` to `operation.evaluate` as `&mut dyn
        // PluginHost` — the two borrows are of disjoint data.
        let plugins: &'a P = self.plugins;
        let operation = plugins
            .find(&binding.plugin_name, &binding.operation_name)
            .ok_or_else(|| ReferenceError::UnknownOperation {
                plugin: binding.plugin_name.clone(),
                operation: binding.operation_name.clone(),
            })?;
        operation.evaluate(self, callee_outputs, callee_inputs, sig, binding)
    }
}

fn check_arity(
    name: &str,
    sig: &Signature,
    outputs: &[(TypeIdx, WireId, WireId)],
    inputs: &[(TypeIdx, WireId, WireId)],
) -> Result<(), InterpreterError> {
    if sig.outputs.len() != outputs.len() {
        return Err(ArityError::OutputCount {
            name: name.to_string(),
            expected: sig.outputs.len(),
            got: outputs.len(),
        }
        .into());
    }
    if sig.inputs.len() != inputs.len() {
        return Err(ArityError::InputCount {
            name: name.to_string(),
            expected: sig.inputs.len(),
            got: inputs.len(),
        }
        .into());
    }
    for (index, (&(expected_type, expected_len), &(got_type, first, last))) in
        sig.outputs.iter().zip(outputs.iter()).enumerate()
    {
        let got_len = range_len(first, last);
        if expected_type != got_type || Some(expected_len) != got_len {
            return Err(ArityError::OutputShape {
                name: name.to_string(),
                index,
                expected_type,
                expected_len,
                got_type,
                got_len: got_len.unwrap_or(0),
            }
            .into());
        }
    }
    for (index, (&(expected_type, expected_len), &(got_type, first, last))) in
        sig.inputs.iter().zip(inputs.iter()).enumerate()
    {
        let got_len = range_len(first, last);
        if expected_type != got_type || Some(expected_len) != got_len {
            return Err(ArityError::InputShape {
                name: name.to_string(),
                index,
                expected_type,
                expected_len,
                got_type,
                got_len: got_len.unwrap_or(0),
            }
            .into());
        }
    }
    Ok(())
}

/// `last - first + 1`, or `None` if `first > last` (an invalid range
/// rather than an underflowing length).
fn range_len(first: WireId, last: WireId) -> Option<u64> {
    last.get().checked_sub(first.get()).map(|d| d + 1)
}

impl<'a, P: PluginLookup> PluginHost for Ctx<'a, P> {
    fn type_mut(&mut self, idx: TypeIdx) -> Result<&mut dyn TypeInterpreterDyn, InterpreterError> {
        Ctx::type_mut(self, idx)
    }

    fn invoke(
        &mut self,
        name: &str,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
    ) -> Result<(), InterpreterError> {
        self.do_invoke(name, outputs, inputs)
    }
}
