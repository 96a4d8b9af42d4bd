use crate::backend::NumericBackend;
use crate::erased_wires::{ErasedWiresMut, ErasedWiresRef, RamBuffer};
use crate::error::{InterpreterError, StreamError, TypeError};
use crate::input_stream::InputStream;
use zkir_core::{Number, Scope, TypeIdx, TypeSpec, WireId};

/// The object-safe interface the top-level [`crate::interpreter::Interpreter`]
/// drives every declared type through, regardless of whether it is a
/// numeric (field/ring) type or a plugin-bound type like a RAM buffer.
///
/// Every method is index-based: nothing here exposes a concrete wire
/// *value* to the coordinator, only the effect of an operation on scope
/// bookkeeping. This is what makes the trait object-safe without needing
/// an associated `Wire` type — the coordinator itself never needs to
/// read a wire's value, only a plugin `Operation` does (through
/// [`TypeInterpreterDyn::plugin_output`]/[`TypeInterpreterDyn::plugin_input`]).
pub trait TypeInterpreterDyn {
    fn type_idx(&self) -> TypeIdx;

    fn max_value(&self) -> Option<Number>;

    fn push_scope(&mut self);

    fn pop_scope(&mut self) -> Result<(), InterpreterError>;

    fn new_range(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError>;

    fn delete_range(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError>;

    fn assign_const(&mut self, out: WireId, value: &Number) -> Result<(), InterpreterError>;

    fn add_gate(&mut self, out: WireId, left: WireId, right: WireId)
        -> Result<(), InterpreterError>;

    fn mul_gate(&mut self, out: WireId, left: WireId, right: WireId)
        -> Result<(), InterpreterError>;

    fn addc_gate(
        &mut self,
        out: WireId,
        left: WireId,
        constant: &Number,
    ) -> Result<(), InterpreterError>;

    fn mulc_gate(
        &mut self,
        out: WireId,
        left: WireId,
        constant: &Number,
    ) -> Result<(), InterpreterError>;

    fn copy(&mut self, out: WireId, left: WireId) -> Result<(), InterpreterError>;

    fn copy_multi(
        &mut self,
        out_first: WireId,
        out_last: WireId,
        inputs: &[(WireId, WireId)],
    ) -> Result<(), InterpreterError>;

    fn assert_zero(&mut self, wire: WireId) -> Result<(), InterpreterError>;

    fn public_in(&mut self, out: WireId) -> Result<(), InterpreterError>;

    fn private_in(&mut self, out: WireId) -> Result<(), InterpreterError>;

    /// `@public_in_multi first last` — pull `last-first+1` values off the
    /// public witness stream in order, one per wire. On partial failure,
    /// whatever slots already succeeded stay assigned; the default implementation
    /// calls [`TypeInterpreterDyn::public_in`] once per wire, which is
    /// exactly this behavior since each call independently commits via
    /// `Scope::assign`.
    fn public_in_multi(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError> {
        for w in first.get()..=last.get() {
            self.public_in(WireId::new(w))?;
        }
        Ok(())
    }

    /// As [`TypeInterpreterDyn::public_in_multi`], for the private
    /// witness stream.
    fn private_in_multi(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError> {
        for w in first.get()..=last.get() {
            self.private_in(WireId::new(w))?;
        }
        Ok(())
    }

    /// A direct read of a wire's concrete value, the "extended witness"
    /// view fallback plugin operations (multiplexer, RAM, extended
    /// arithmetic) use to compute indicator/helper values. Always
    /// available in this workspace since every
    /// numeric wire's value is concretely a [`Number`]; plugin-bound
    /// (e.g. RAM) types return [`TypeError::NotGateCapable`].
    fn extended_witness(&self, wire: WireId) -> Result<Number, InterpreterError>;

    /// Allocate `[caller_first, caller_last]` on the (soon-to-be)
    /// caller scope — the one just below the top of the stack — and
    /// append it, empty, to the freshly pushed callee scope at the top.
    /// Returns the callee-local `[first,last]` it was placed at.
    fn map_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError>;

    /// Clone `[caller_first, caller_last]` from the caller scope and
    /// append it, already active, to the callee scope at the top.
    /// Returns the callee-local `[first,last]` it was placed at.
    fn map_input(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError>;

    /// Commit the callee's filled `[callee_first, callee_last]` output
    /// range back into the caller's `[caller_first, caller_last]`.
    /// Called before `pop_scope`, while both scopes are still live.
    fn check_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<(), InterpreterError>;

    /// As `map_output`, but leaves the appended range addressable via
    /// [`TypeInterpreterDyn::plugin_output_wires`] rather than expecting
    /// ordinary gate directives to fill it in — used by `PluginFunction`
    /// dispatch. Implemented in terms of `map_output`, marking the
    /// range active immediately (the plugin operation is trusted to
    /// fill every slot).
    fn plugin_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError>;

    /// A mutable view over an already-appended (by `plugin_output`)
    /// callee-local range, for a plugin `Operation` to fill in.
    fn plugin_output_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresMut<'_>, InterpreterError>;

    /// A read-only view over an already-appended (by `map_input`)
    /// callee-local range, for a plugin `Operation` to read.
    fn plugin_input_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresRef<'_>, InterpreterError>;

    /// Allocate a private range at the current scope's `first_local`
    /// watermark, for a plugin operation that needs scratch storage with
    /// no caller range to map from (e.g. the iteration plugin's
    /// synthesized loop-index wires). Each call
    /// advances the watermark, so repeated calls (one per iteration)
    /// never collide.
    fn alloc_scratch(&mut self, len: u64) -> Result<(WireId, WireId), InterpreterError>;

    fn check(&mut self) -> bool;

    fn finish(&mut self);

    /// True if either witness stream still has values queued after the
    /// top-level directive list has finished.
    fn leftover_inputs(&self) -> bool {
        false
    }
}

/// The ordinary field/ring [`TypeInterpreterDyn`] implementation,
/// parameterized over the backend that supplies arithmetic semantics.
pub struct NumericTypeInterpreter<B> {
    type_idx: TypeIdx,
    spec: TypeSpec,
    backend: B,
    stack: Vec<Scope<Number>>,
    public_stream: Box<dyn InputStream>,
    private_stream: Box<dyn InputStream>,
}

impl<B: NumericBackend> NumericTypeInterpreter<B> {
    pub fn new(type_idx: TypeIdx, spec: TypeSpec, backend: B) -> Self {
        Self::with_streams(
            type_idx,
            spec,
            backend,
            crate::input_stream::VecInputStream::default(),
            crate::input_stream::VecInputStream::default(),
        )
    }

    /// Construct with explicit public/private witness sources, each
    /// pulled from in order as `public_in`/`private_in` are called.
    pub fn with_streams(
        type_idx: TypeIdx,
        spec: TypeSpec,
        backend: B,
        public_stream: impl InputStream + 'static,
        private_stream: impl InputStream + 'static,
    ) -> Self {
        NumericTypeInterpreter {
            type_idx,
            spec,
            backend,
            stack: vec![Scope::new()],
            public_stream: Box::new(public_stream),
            private_stream: Box::new(private_stream),
        }
    }

    fn top(&self) -> &Scope<Number> {
        self.stack.last().expect("type interpreter scope stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Scope<Number> {
        self.stack.last_mut().expect("type interpreter scope stack is never empty")
    }

    fn validate_const(&self, value: &Number) -> Result<(), InterpreterError> {
        if let Some(max) = self.spec.max_value() {
            if value.as_biguint() >= max.as_biguint() {
                return Err(TypeError::ConstantOutOfRange.into());
            }
        }
        Ok(())
    }
}

impl<B: NumericBackend> TypeInterpreterDyn for NumericTypeInterpreter<B> {
    fn type_idx(&self) -> TypeIdx {
        self.type_idx
    }

    fn max_value(&self) -> Option<Number> {
        self.spec.max_value()
    }

    fn push_scope(&mut self) {
        self.stack.push(Scope::new());
    }

    fn pop_scope(&mut self) -> Result<(), InterpreterError> {
        self.stack.pop();
        Ok(())
    }

    fn new_range(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError> {
        Ok(self.top_mut().new_range(first, last)?)
    }

    fn delete_range(&mut self, first: WireId, last: WireId) -> Result<(), InterpreterError> {
        Ok(self.top_mut().delete_range(first, last)?)
    }

    fn assign_const(&mut self, out: WireId, value: &Number) -> Result<(), InterpreterError> {
        self.validate_const(value)?;
        let v = self.backend.assign(value);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn add_gate(
        &mut self,
        out: WireId,
        left: WireId,
        right: WireId,
    ) -> Result<(), InterpreterError> {
        let l = self.top().retrieve(left)?.clone();
        let r = self.top().retrieve(right)?.clone();
        let v = self.backend.add_gate(&l, &r);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn mul_gate(
        &mut self,
        out: WireId,
        left: WireId,
        right: WireId,
    ) -> Result<(), InterpreterError> {
        let l = self.top().retrieve(left)?.clone();
        let r = self.top().retrieve(right)?.clone();
        let v = self.backend.mul_gate(&l, &r);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn addc_gate(
        &mut self,
        out: WireId,
        left: WireId,
        constant: &Number,
    ) -> Result<(), InterpreterError> {
        self.validate_const(constant)?;
        let l = self.top().retrieve(left)?.clone();
        let v = self.backend.addc_gate(&l, constant);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn mulc_gate(
        &mut self,
        out: WireId,
        left: WireId,
        constant: &Number,
    ) -> Result<(), InterpreterError> {
        self.validate_const(constant)?;
        let l = self.top().retrieve(left)?.clone();
        let v = self.backend.mulc_gate(&l, constant);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn copy(&mut self, out: WireId, left: WireId) -> Result<(), InterpreterError> {
        let l = self.top().retrieve(left)?.clone();
        let v = self.backend.copy(&l);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn copy_multi(
        &mut self,
        out_first: WireId,
        out_last: WireId,
        inputs: &[(WireId, WireId)],
    ) -> Result<(), InterpreterError> {
        let mut values = Vec::new();
        for &(first, last) in inputs {
            for w in first.get()..=last.get() {
                values.push(self.top().retrieve(WireId(w))?.clone());
            }
        }
        let span = (out_last.get() - out_first.get() + 1) as usize;
        if values.len() != span {
            return Err(crate::error::ArityError::InputCount {
                name: "copy_multi".to_string(),
                expected: span,
                got: values.len(),
            }
            .into());
        }
        for (i, v) in values.into_iter().enumerate() {
            let copied = self.backend.copy(&v);
            self.top_mut().assign(WireId(out_first.get() + i as u64), copied)?;
        }
        Ok(())
    }

    fn assert_zero(&mut self, wire: WireId) -> Result<(), InterpreterError> {
        let v = self.top().retrieve(wire)?.clone();
        self.backend.assert_zero(&v);
        Ok(())
    }

    fn public_in(&mut self, out: WireId) -> Result<(), InterpreterError> {
        let raw = self
            .public_stream
            .next()
            .map_err(|_| StreamError::Exhausted(self.type_idx))?;
        self.validate_const(&raw).map_err(|_| {
            InterpreterError::Stream(StreamError::OutOfRange(self.type_idx))
        })?;
        let v = self.backend.public_in(&raw);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn private_in(&mut self, out: WireId) -> Result<(), InterpreterError> {
        let raw = self
            .private_stream
            .next()
            .map_err(|_| StreamError::Exhausted(self.type_idx))?;
        self.validate_const(&raw).map_err(|_| {
            InterpreterError::Stream(StreamError::OutOfRange(self.type_idx))
        })?;
        let v = self.backend.private_in(&raw);
        Ok(self.top_mut().assign(out, v)?)
    }

    fn extended_witness(&self, wire: WireId) -> Result<Number, InterpreterError> {
        Ok(self.top().retrieve(wire)?.clone())
    }

    fn map_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_output(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, false))
    }

    fn map_input(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_input(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, true))
    }

    fn check_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<(), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let filled = self.stack[n - 1].take_range(callee_first, callee_last)?;
        Ok(self.stack[n - 2].check_output(caller_first, caller_last, filled)?)
    }

    fn plugin_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_output(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, true))
    }

    fn plugin_output_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresMut<'_>, InterpreterError> {
        let top = self.stack.last_mut().expect("non-empty stack");
        let slice = plugin_wires_mut_slice(top, callee_first, callee_last)?;
        Ok(ErasedWiresMut::Numeric(slice))
    }

    fn plugin_input_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresRef<'_>, InterpreterError> {
        let top = self.stack.last_mut().expect("non-empty stack");
        let slice = plugin_wires_ref_slice(top, callee_first, callee_last)?;
        Ok(ErasedWiresRef::Numeric(slice))
    }

    fn alloc_scratch(&mut self, len: u64) -> Result<(WireId, WireId), InterpreterError> {
        let range = zkir_core::Range::with_capacity(len, true, false);
        Ok(self.top_mut().append_mapped(range, false))
    }

    fn check(&mut self) -> bool {
        self.backend.check()
    }

    fn finish(&mut self) {
        self.backend.finish();
    }

    fn leftover_inputs(&self) -> bool {
        self.public_stream.has_remaining() || self.private_stream.has_remaining()
    }
}

/// Get a mutable view of a contiguous, single-range span for plugin use.
/// Shared helper between the numeric and RAM implementations via the
/// `retrieve_mut`-adjacent direct-slice accessor `Scope` does not expose
/// publicly (it only exposes per-wire access); this walks the wires one
/// at a time instead; since plugin ranges are always exactly one
/// `append_mapped`-placed `Range`, this is equivalent to a slice view in
/// practice but implemented without leaking `Scope`'s internals.
fn plugin_wires_mut_slice<W>(
    scope: &mut Scope<W>,
    first: WireId,
    last: WireId,
) -> Result<&mut [Option<W>], InterpreterError> {
    scope
        .range_slice_mut(first, last)
        .ok_or_else(|| TypeError::UnmatchedPluginRange.into())
}

fn plugin_wires_ref_slice<W>(
    scope: &Scope<W>,
    first: WireId,
    last: WireId,
) -> Result<&[Option<W>], InterpreterError> {
    scope
        .range_slice(first, last)
        .ok_or_else(|| TypeError::UnmatchedPluginRange.into())
}

/// The RAM plugin's dedicated wire type: every wire holds a whole
/// [`RamBuffer`] rather than a `Number`. Regular gates are rejected;
/// only scope lifecycle and the plugin wire accessors are supported.
pub struct RamTypeInterpreter {
    type_idx: TypeIdx,
    stack: Vec<Scope<RamBuffer>>,
}

impl RamTypeInterpreter {
    pub fn new(type_idx: TypeIdx) -> Self {
        RamTypeInterpreter {
            type_idx,
            stack: vec![Scope::new()],
        }
    }

    fn unsupported(&self) -> InterpreterError {
        TypeError::NotGateCapable(self.type_idx).into()
    }
}

impl TypeInterpreterDyn for RamTypeInterpreter {
    fn type_idx(&self) -> TypeIdx {
        self.type_idx
    }

    fn max_value(&self) -> Option<Number> {
        None
    }

    fn push_scope(&mut self) {
        self.stack.push(Scope::new());
    }

    fn pop_scope(&mut self) -> Result<(), InterpreterError> {
        self.stack.pop();
        Ok(())
    }

    fn new_range(&mut self, _first: WireId, _last: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn delete_range(&mut self, _first: WireId, _last: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn assign_const(&mut self, _out: WireId, _value: &Number) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn add_gate(&mut self, _o: WireId, _l: WireId, _r: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn mul_gate(&mut self, _o: WireId, _l: WireId, _r: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn addc_gate(&mut self, _o: WireId, _l: WireId, _c: &Number) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn mulc_gate(&mut self, _o: WireId, _l: WireId, _c: &Number) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn copy(&mut self, _out: WireId, _left: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn copy_multi(
        &mut self,
        _out_first: WireId,
        _out_last: WireId,
        _inputs: &[(WireId, WireId)],
    ) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn assert_zero(&mut self, _wire: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn public_in(&mut self, _out: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn private_in(&mut self, _out: WireId) -> Result<(), InterpreterError> {
        Err(self.unsupported())
    }

    fn extended_witness(&self, _wire: WireId) -> Result<Number, InterpreterError> {
        Err(self.unsupported())
    }

    fn map_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_output(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, false))
    }

    fn map_input(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_input(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, true))
    }

    fn check_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<(), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let filled = self.stack[n - 1].take_range(callee_first, callee_last)?;
        Ok(self.stack[n - 2].check_output(caller_first, caller_last, filled)?)
    }

    fn plugin_output(
        &mut self,
        caller_first: WireId,
        caller_last: WireId,
    ) -> Result<(WireId, WireId), InterpreterError> {
        let n = self.stack.len();
        if n < 2 {
            return Err(InterpreterError::Oom);
        }
        let range = self.stack[n - 2].map_output(caller_first, caller_last)?;
        Ok(self.stack[n - 1].append_mapped(range, true))
    }

    fn plugin_output_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresMut<'_>, InterpreterError> {
        let top = self.stack.last_mut().expect("non-empty stack");
        let slice = plugin_wires_mut_slice(top, callee_first, callee_last)?;
        Ok(ErasedWiresMut::Ram(slice))
    }

    fn plugin_input_wires(
        &mut self,
        callee_first: WireId,
        callee_last: WireId,
    ) -> Result<ErasedWiresRef<'_>, InterpreterError> {
        let top = self.stack.last_mut().expect("non-empty stack");
        let slice = plugin_wires_ref_slice(top, callee_first, callee_last)?;
        Ok(ErasedWiresRef::Ram(slice))
    }

    fn alloc_scratch(&mut self, _len: u64) -> Result<(WireId, WireId), InterpreterError> {
        Err(self.unsupported())
    }

    fn check(&mut self) -> bool {
        true
    }

    fn finish(&mut self) {}
}
