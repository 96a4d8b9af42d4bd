//! The vectors fallback plugin: `add`/`mul` compute
//! elementwise over two equal-length ranges; `sum`/`product` left-fold
//! one range down to a single wire; `dotproduct` interleaves
//! multiply-accumulate. All five are plain gate compositions — no
//! Fermat's-little-theorem trick needed, unlike the multiplexer and RAM
//! fallbacks.

use zkir_core::{TypeIdx, WireId};
use zkir_interpreter::{
    InterpreterError, Operation, Plugin, PluginBinding, PluginHost, Signature, TypeInterpreterDyn,
};

use crate::gatekit::alloc1;
use crate::params::malformed;

const NAME: &str = "vectors_v0";

/// The `"vectors_v0"` plugin: owns `add`, `mul`, `sum`, `product`, and
/// `dotproduct`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VectorsPlugin;

impl Plugin for VectorsPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn operation(&self, operation_name: &str) -> Option<&dyn Operation> {
        match operation_name {
            "add" => Some(&PAIRWISE_ADD),
            "mul" => Some(&PAIRWISE_MUL),
            "sum" => Some(&FOLD_SUM),
            "product" => Some(&FOLD_PRODUCT),
            "dotproduct" => Some(&DOT_PRODUCT),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GateKind {
    Add,
    Mul,
}

#[derive(Debug, Clone, Copy)]
struct Pairwise(GateKind);
const PAIRWISE_ADD: Pairwise = Pairwise(GateKind::Add);
const PAIRWISE_MUL: Pairwise = Pairwise(GateKind::Mul);

fn apply_gate(
    t: &mut dyn TypeInterpreterDyn,
    kind: GateKind,
    out: WireId,
    l: WireId,
    r: WireId,
) -> Result<(), InterpreterError> {
    match kind {
        GateKind::Add => t.add_gate(out, l, r),
        GateKind::Mul => t.mul_gate(out, l, r),
    }
}

/// One output range of length `n`, two input ranges of length `n`:
/// `out[i] = left[i] OP right[i]`.
impl Operation for Pairwise {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        _binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        let op_name = match self.0 {
            GateKind::Add => "add",
            GateKind::Mul => "mul",
        };
        if outputs.len() != 1 || inputs.len() != 2 {
            return Err(malformed(NAME, op_name, "expected exactly one output and two input ranges"));
        }
        let (ty, out_first, out_last) = outputs[0];
        let (lty, l_first, l_last) = inputs[0];
        let (rty, r_first, r_last) = inputs[1];
        let len = out_last.get() - out_first.get() + 1;
        if lty != ty || rty != ty || l_last.get() - l_first.get() + 1 != len
            || r_last.get() - r_first.get() + 1 != len
        {
            return Err(malformed(NAME, op_name, "input/output ranges must share type and length"));
        }
        let t = host.type_mut(ty)?;
        for i in 0..len {
            let out_wire = WireId::new(out_first.get() + i);
            let l = WireId::new(l_first.get() + i);
            let r = WireId::new(r_first.get() + i);
            apply_gate(t, self.0, out_wire, l, r)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Fold(GateKind);
const FOLD_SUM: Fold = Fold(GateKind::Add);
const FOLD_PRODUCT: Fold = Fold(GateKind::Mul);

/// A single output wire, one input range of length `n > 1`:
/// `out = input[0] OP input[1] OP ... OP input[n-1]`, folded
/// left-to-right through a double-buffered accumulator.
impl Operation for Fold {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        _binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        let op_name = match self.0 {
            GateKind::Add => "sum",
            GateKind::Mul => "product",
        };
        if outputs.len() != 1 || inputs.len() != 1 {
            return Err(malformed(NAME, op_name, "expected exactly one output and one input range"));
        }
        let (ty, out_first, out_last) = outputs[0];
        if out_first != out_last {
            return Err(malformed(NAME, op_name, "output must be a single wire"));
        }
        let (ity, in_first, in_last) = inputs[0];
        if ity != ty {
            return Err(malformed(NAME, op_name, "input/output type mismatch"));
        }
        let len = in_last.get() - in_first.get() + 1;
        if len <= 1 {
            return Err(malformed(NAME, op_name, "input range must have length greater than 1"));
        }
        let t = host.type_mut(ty)?;
        let mut acc = in_first;
        for i in 1..len {
            let next = if i + 1 == len { out_first } else { alloc1(t)? };
            apply_gate(t, self.0, next, acc, WireId::new(in_first.get() + i))?;
            acc = next;
        }
        Ok(())
    }
}

/// A single output wire, two equal-length input ranges:
/// `out = Σ_i left[i] · right[i]`, interleaving a multiply per position
/// with a running-sum accumulate.
#[derive(Debug, Default, Clone, Copy)]
struct DotProduct;
const DOT_PRODUCT: DotProduct = DotProduct;

impl Operation for DotProduct {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        _binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        if outputs.len() != 1 || inputs.len() != 2 {
            return Err(malformed(NAME, "dotproduct", "expected exactly one output and two input ranges"));
        }
        let (ty, out_first, out_last) = outputs[0];
        if out_first != out_last {
            return Err(malformed(NAME, "dotproduct", "output must be a single wire"));
        }
        let (lty, l_first, l_last) = inputs[0];
        let (rty, r_first, r_last) = inputs[1];
        let len = l_last.get() - l_first.get() + 1;
        if lty != ty || rty != ty || r_last.get() - r_first.get() + 1 != len || len == 0 {
            return Err(malformed(NAME, "dotproduct", "input ranges must share the output's type and a common nonzero length"));
        }
        let t = host.type_mut(ty)?;
        let mut acc: Option<WireId> = None;
        for i in 0..len {
            let l = WireId::new(l_first.get() + i);
            let r = WireId::new(r_first.get() + i);
            let term = alloc1(t)?;
            t.mul_gate(term, l, r)?;
            acc = Some(match acc {
                None => term,
                Some(prev) => {
                    let is_last = i + 1 == len;
                    let next = if is_last { out_first } else { alloc1(t)? };
                    t.add_gate(next, prev, term)?;
                    next
                }
            });
        }
        if len == 1 {
            let only = acc.expect("len == 1");
            t.copy(out_first, only)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_exposes_all_five_operations() {
        let plugin = VectorsPlugin;
        for name in ["add", "mul", "sum", "product", "dotproduct"] {
            assert!(plugin.operation(name).is_some(), "missing {name}");
        }
        assert!(plugin.operation("nope").is_none());
    }
}
