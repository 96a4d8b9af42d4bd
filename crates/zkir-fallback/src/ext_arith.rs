//! The extended-arithmetic fallback plugin:
//! `less_than`/`less_than_equal` bit-decompose both operands and run
//! the shared ripple comparator; `division` has the prover supply a
//! quotient and remainder as private witness and asserts the division
//! identity plus a remainder bound; `bit_decompose` exposes the
//! witness-backed decomposition gadget directly. All four depend on
//! the backend's "extended witness" view of a wire's plaintext value.

use zkir_core::{Number, TypeIdx, WireId};
use zkir_interpreter::{InterpreterError, Operation, Plugin, PluginBinding, PluginHost, Signature};

use crate::gatekit::{alloc1, bit_decompose, bits_lt};
use crate::params::{malformed, modulus_and_neg1, param_number};

const NAME: &str = "extended_arithmetic_v0";

/// The `"extended_arithmetic_v0"` plugin: owns `less_than`,
/// `less_than_equal`, `division`, and `bit_decompose`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtendedArithmeticPlugin;

impl Plugin for ExtendedArithmeticPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn operation(&self, operation_name: &str) -> Option<&dyn Operation> {
        match operation_name {
            "less_than" => Some(&Comparison { or_equal: false }),
            "less_than_equal" => Some(&Comparison { or_equal: true }),
            "division" => Some(&Division),
            "bit_decompose" => Some(&BitDecomposeOp),
            _ => None,
        }
    }
}

/// A comparator operand's bit width sized from the type's modulus:
/// enough bits to hold any value strictly less than the modulus, which
/// also bounds the comparator's two zero-padded operands below the
/// prime so the ripple comparator can never see values that wrap.
fn operand_bits(modulus: &Number) -> u32 {
    modulus.as_biguint().bits().max(1) as u32
}

#[derive(Debug, Clone, Copy)]
struct Comparison {
    or_equal: bool,
}

/// `less_than`/`less_than_equal`: bit-decompose both single-wire
/// operands (witness bits constrained boolean, recomposition
/// asserted), bound each decomposition's value against the type's
/// modulus by construction (an `operand_bits`-wide decomposition
/// cannot represent a value at or above `2^operand_bits`, and
/// `operand_bits` is sized from the modulus, ruling out overflow in
/// the ripple comparator), then compare with the shared ripple
/// comparator.
impl Operation for Comparison {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        let op_name = if self.or_equal { "less_than_equal" } else { "less_than" };
        if !binding.params.is_empty() {
            return Err(malformed(NAME, op_name, "expected no plugin parameters"));
        }
        if outputs.len() != 1 || outputs[0].1 != outputs[0].2 {
            return Err(malformed(NAME, op_name, "expected one output wire"));
        }
        if inputs.len() != 2 || inputs[0].1 != inputs[0].2 || inputs[1].1 != inputs[1].2 {
            return Err(malformed(NAME, op_name, "expected two single-wire inputs"));
        }
        let (ty, out_wire, _) = outputs[0];
        let (lty, l_wire, _) = inputs[0];
        let (rty, r_wire, _) = inputs[1];
        if lty != ty || rty != ty {
            return Err(malformed(NAME, op_name, "operands must share the output's type"));
        }
        let t = host.type_mut(ty)?;
        let (modulus, neg1) = modulus_and_neg1(t, NAME, op_name)?;
        let bits = operand_bits(&modulus);

        let l_bits = bit_decompose(t, l_wire, bits, &neg1)?;
        let r_bits = bit_decompose(t, r_wire, bits, &neg1)?;
        let lt = bits_lt(t, &l_bits, &r_bits, &neg1)?;
        let result = if self.or_equal {
            // `l <= r` iff NOT `r < l`.
            let swapped = bits_lt(t, &r_bits, &l_bits, &neg1)?;
            let tmp = alloc1(t)?;
            t.mulc_gate(tmp, swapped, &neg1)?;
            let out = alloc1(t)?;
            t.addc_gate(out, tmp, &Number::one())?;
            out
        } else {
            lt
        };
        t.copy(out_wire, result)
    }
}

/// `division`: the prover supplies quotient `q` and remainder `m` as
/// private witness values derived from the dividend `l` and divisor
/// `r`'s own extended-witness values, then the circuit asserts `l = q
/// * r + m` and `m < r` via the shared comparator.
struct Division;

impl Operation for Division {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        if !binding.params.is_empty() {
            return Err(malformed(NAME, "division", "expected no plugin parameters"));
        }
        if outputs.len() != 2 || outputs[0].1 != outputs[0].2 || outputs[1].1 != outputs[1].2 {
            return Err(malformed(NAME, "division", "expected two single-wire outputs (quotient, remainder)"));
        }
        if inputs.len() != 2 || inputs[0].1 != inputs[0].2 || inputs[1].1 != inputs[1].2 {
            return Err(malformed(NAME, "division", "expected two single-wire inputs (dividend, divisor)"));
        }
        let (qty, q_wire, _) = outputs[0];
        let (rem_ty, rem_wire, _) = outputs[1];
        let (lty, l_wire, _) = inputs[0];
        let (rty, r_wire, _) = inputs[1];
        if qty != rem_ty || lty != qty || rty != qty {
            return Err(malformed(NAME, "division", "all operands must share one type"));
        }
        let t = host.type_mut(qty)?;
        let (modulus, neg1) = modulus_and_neg1(t, NAME, "division")?;
        let bits = operand_bits(&modulus);

        let l_value = t.extended_witness(l_wire)?;
        let r_value = t.extended_witness(r_wire)?;
        if r_value.is_zero() {
            return Err(malformed(NAME, "division", "division by zero"));
        }
        let l_big = l_value.as_biguint();
        let r_big = r_value.as_biguint();
        let q_value = Number::from_biguint(l_big / r_big);
        let rem_value = Number::from_biguint(l_big % r_big);

        t.assign_const(q_wire, &q_value)?;
        t.assign_const(rem_wire, &rem_value)?;

        let qr = alloc1(t)?;
        t.mul_gate(qr, q_wire, r_wire)?;
        let sum = alloc1(t)?;
        t.add_gate(sum, qr, rem_wire)?;
        let neg_sum = alloc1(t)?;
        t.mulc_gate(neg_sum, sum, &neg1)?;
        let zero = alloc1(t)?;
        t.add_gate(zero, neg_sum, l_wire)?;
        t.assert_zero(zero)?;

        let rem_bits = bit_decompose(t, rem_wire, bits, &neg1)?;
        let r_bits = bit_decompose(t, r_wire, bits, &neg1)?;
        let lt = bits_lt(t, &rem_bits, &r_bits, &neg1)?;
        let one_check = alloc1(t)?;
        t.addc_gate(one_check, lt, &neg1)?;
        t.assert_zero(one_check)
    }
}

/// `bit_decompose`: the witness-backed decomposition gadget, exposed
/// directly as a plugin operation. The bit count comes from the
/// output range's length, which the interpreter has already validated
/// against the function's declared signature.
struct BitDecomposeOp;

impl Operation for BitDecomposeOp {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        if !binding.params.is_empty() {
            if binding.params.len() != 1 || param_number(binding, 0, NAME, "bit_decompose", "bits").is_err() {
                return Err(malformed(NAME, "bit_decompose", "expected at most one plugin parameter (bit count)"));
            }
        }
        if outputs.len() != 1 {
            return Err(malformed(NAME, "bit_decompose", "expected one output range"));
        }
        if inputs.len() != 1 || inputs[0].1 != inputs[0].2 {
            return Err(malformed(NAME, "bit_decompose", "expected one single-wire input"));
        }
        let (ty, out_first, out_last) = outputs[0];
        let (ity, in_wire, _) = inputs[0];
        if ity != ty {
            return Err(malformed(NAME, "bit_decompose", "input and output must share one type"));
        }
        let bits = (out_last.get() - out_first.get() + 1) as u32;
        let t = host.type_mut(ty)?;
        let (_, neg1) = modulus_and_neg1(t, NAME, "bit_decompose")?;
        let wires = bit_decompose(t, in_wire, bits, &neg1)?;
        for (i, w) in wires.into_iter().enumerate() {
            t.copy(WireId::new(out_first.get() + i as u64), w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_exposes_all_four_operations() {
        let plugin = ExtendedArithmeticPlugin;
        for name in ["less_than", "less_than_equal", "division", "bit_decompose"] {
            assert!(plugin.operation(name).is_some(), "missing {name}");
        }
        assert!(plugin.operation("nope").is_none());
    }
}
