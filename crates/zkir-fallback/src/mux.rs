//! The multiplexer fallback plugin: selects one of `K`
//! equal-length cases by a selector, built entirely from the backend's
//! primitive gate callbacks.
//!
//! Binding is parameter-free; the operation's shape comes entirely from
//! its signature: one selector input (`inputs[0]`), followed by
//! `outputs.len() * K` case inputs grouped round-robin across the
//! outputs (case `k`'s slice for output `i` is `inputs[1 + k *
//! outputs.len() + i]`), matching the reference implementation's
//! `MuxOperation::evaluate` input layout.
//!
//! Two operations, `"strict"` and `"permissive"`, share one
//! implementation: strict additionally asserts the selector names a
//! valid case. Over a non-Boolean field/ring the selector is a single
//! wire and cases are picked with the Fermat's-little-theorem equality
//! indicator; over the Boolean field (`modulus == 2`) the selector is a
//! bit vector and cases are picked with a balanced binary tree of
//! bit-muxes.

use zkir_core::{Number, TypeIdx, WireId};
use zkir_interpreter::{
    InterpreterError, Operation, Plugin, PluginBinding, PluginHost, Signature,
};

use crate::gatekit::{alloc1, assert_one, bit_and, bits_lt, const_bits, is_zero_indicator};
use crate::params::{is_boolean_field, malformed, modulus_and_neg1};

const NAME: &str = "mux_v0";

/// The `"mux_v0"` plugin: owns the `strict` and `permissive` operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct MuxPlugin;

impl Plugin for MuxPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn operation(&self, operation_name: &str) -> Option<&dyn Operation> {
        match operation_name {
            "strict" => Some(&MuxOperation::STRICT),
            "permissive" => Some(&MuxOperation::PERMISSIVE),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MuxOperation {
    strict: bool,
}

impl MuxOperation {
    const STRICT: MuxOperation = MuxOperation { strict: true };
    const PERMISSIVE: MuxOperation = MuxOperation { strict: false };
}

struct Shape {
    ty: TypeIdx,
    sel: (WireId, WireId),
    outputs: Vec<(WireId, WireId)>,
    /// `cases[k][i]` is case `k`'s input range for output `i`.
    cases: Vec<Vec<(WireId, WireId)>>,
}

fn parse_shape(
    op_name: &str,
    outputs: &[(TypeIdx, WireId, WireId)],
    inputs: &[(TypeIdx, WireId, WireId)],
) -> Result<Shape, InterpreterError> {
    if outputs.is_empty() {
        return Err(malformed(NAME, op_name, "expected at least one output range"));
    }
    let ty = outputs[0].0;
    if outputs.iter().any(|&(t, _, _)| t != ty) {
        return Err(malformed(NAME, op_name, "all output ranges must share one type"));
    }
    if inputs.is_empty() || inputs[0].0 != ty {
        return Err(malformed(NAME, op_name, "expected a selector input of the mux type"));
    }
    let sel = (inputs[0].1, inputs[0].2);
    let rest = &inputs[1..];
    if rest.is_empty() || rest.len() % outputs.len() != 0 {
        return Err(malformed(
            NAME,
            op_name,
            "case input count must be a positive multiple of the output count",
        ));
    }
    let num_cases = rest.len() / outputs.len();
    let out_ranges: Vec<(WireId, WireId)> = outputs.iter().map(|&(_, f, l)| (f, l)).collect();
    let mut cases = Vec::with_capacity(num_cases);
    for k in 0..num_cases {
        let mut group = Vec::with_capacity(outputs.len());
        for i in 0..outputs.len() {
            let (ty_i, f, l) = rest[k * outputs.len() + i];
            if ty_i != ty {
                return Err(malformed(NAME, op_name, "case input type mismatch"));
            }
            let (of, ol) = out_ranges[i];
            if l.get() - f.get() != ol.get() - of.get() {
                return Err(malformed(NAME, op_name, "case input length does not match its output"));
            }
            group.push((f, l));
        }
        cases.push(group);
    }
    Ok(Shape { ty, sel, outputs: out_ranges, cases })
}

impl Operation for MuxOperation {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        _binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        let op_name = if self.strict { "strict" } else { "permissive" };
        let shape = parse_shape(op_name, outputs, inputs)?;
        let t = host.type_mut(shape.ty)?;
        let (modulus, neg1) = modulus_and_neg1(t, NAME, op_name)?;
        if is_boolean_field(&modulus) {
            eval_boolean(t, op_name, self.strict, &shape, &neg1)
        } else {
            eval_arithmetic(t, op_name, self.strict, &shape, &modulus, &neg1)
        }
    }
}

/// Arithmetic case: `selector` is one wire; `b_k = 1 - (selector -
/// k)^(modulus-1)` is 1 iff `selector == k` and 0 otherwise (by Fermat's
/// little theorem); each output wire is `Σ_k b_k · case_k[wire]`.
fn eval_arithmetic(
    t: &mut dyn zkir_interpreter::TypeInterpreterDyn,
    op_name: &str,
    strict: bool,
    shape: &Shape,
    modulus: &Number,
    neg1: &Number,
) -> Result<(), InterpreterError> {
    let (sel_first, sel_last) = shape.sel;
    if sel_first != sel_last {
        return Err(malformed(NAME, op_name, "selector must be a single wire over a non-Boolean type"));
    }
    let num_cases = shape.cases.len();
    if Number::from(num_cases as u64).as_biguint() > modulus.as_biguint() {
        return Err(malformed(NAME, op_name, "case count exceeds the type's modulus"));
    }
    let modulus_minus_one = modulus.minus_one();

    let mut indicators = Vec::with_capacity(num_cases);
    for k in 0..num_cases {
        let neg_k = Number::from_biguint(modulus.as_biguint() - num_bigint::BigUint::from(k as u64))
            .rem_euclid(modulus);
        let diff = alloc1(t)?;
        t.addc_gate(diff, sel_first, &neg_k)?;
        let b_k = is_zero_indicator(t, diff, neg1, &modulus_minus_one)?;
        indicators.push(b_k);
    }

    if strict {
        let mut sum = indicators[0];
        for &b in &indicators[1..] {
            let next = alloc1(t)?;
            t.add_gate(next, sum, b)?;
            sum = next;
        }
        assert_one(t, sum, neg1)?;
    }

    for (i, &(out_first, out_last)) in shape.outputs.iter().enumerate() {
        let len = out_last.get() - out_first.get() + 1;
        for w in 0..len {
            let out_wire = WireId::new(out_first.get() + w);
            let mut acc: Option<WireId> = None;
            for (k, &b_k) in indicators.iter().enumerate() {
                let (case_first, _) = shape.cases[k][i];
                let term = alloc1(t)?;
                t.mul_gate(term, b_k, WireId::new(case_first.get() + w))?;
                acc = Some(match acc {
                    None => term,
                    Some(prev) => {
                        let next = alloc1(t)?;
                        t.add_gate(next, prev, term)?;
                        next
                    }
                });
            }
            t.copy(out_wire, acc.expect("at least one case"))?;
        }
    }
    Ok(())
}

/// Boolean-field case: the selector is a little-endian bit vector
/// addressing `2^m` slots; cases beyond `K` are padded by repeating the
/// last case. Each slot pair at tree level `j` is combined with
/// `a XOR (bit_j AND (a XOR b))`, a balanced binary tree of bit-muxes
/// over the selector bits.
fn eval_boolean(
    t: &mut dyn zkir_interpreter::TypeInterpreterDyn,
    op_name: &str,
    strict: bool,
    shape: &Shape,
    neg1: &Number,
) -> Result<(), InterpreterError> {
    let (sel_first, sel_last) = shape.sel;
    let m = sel_last.get() - sel_first.get() + 1;
    if m > 63 {
        return Err(malformed(NAME, op_name, "selector bit width too large"));
    }
    let padded_len = 1u64 << m;
    let num_cases = shape.cases.len() as u64;
    if num_cases > padded_len {
        return Err(malformed(NAME, op_name, "case count exceeds 2^(selector bit width)"));
    }

    if strict && num_cases < padded_len {
        let sel_bits: Vec<WireId> = (0..m).rev().map(|b| WireId::new(sel_first.get() + b)).collect();
        let bound_bits = const_bits(t, &Number::from(num_cases), m as u32)?;
        let lt = bits_lt(t, &sel_bits, &bound_bits, neg1)?;
        assert_one(t, lt, neg1)?;
    }

    let sel_bits_lsb: Vec<WireId> = (0..m).map(|b| WireId::new(sel_first.get() + b)).collect();

    for (i, &(out_first, out_last)) in shape.outputs.iter().enumerate() {
        let len = out_last.get() - out_first.get() + 1;
        for w in 0..len {
            let mut layer: Vec<WireId> = (0..padded_len)
                .map(|slot| {
                    let k = slot.min(num_cases - 1) as usize;
                    WireId::new(shape.cases[k][i].0.get() + w)
                })
                .collect();
            for &bit in &sel_bits_lsb {
                let mut next = Vec::with_capacity(layer.len() / 2);
                for pair in layer.chunks(2) {
                    let a = pair[0];
                    let b = pair[1];
                    let combined = bit_mux(t, bit, a, b, neg1)?;
                    next.push(combined);
                }
                layer = next;
            }
            let out_wire = WireId::new(out_first.get() + w);
            t.copy(out_wire, layer[0])?;
        }
    }
    Ok(())
}

/// `bit ? b : a`, i.e. `a XOR (bit AND (a XOR b))`, over 0/1 wires.
fn bit_mux(
    t: &mut dyn zkir_interpreter::TypeInterpreterDyn,
    bit: WireId,
    a: WireId,
    b: WireId,
    neg1: &Number,
) -> Result<WireId, InterpreterError> {
    let diff = crate::gatekit::bit_xor(t, a, b, neg1)?;
    let picked = bit_and(t, bit, diff)?;
    crate::gatekit::bit_xor(t, a, picked, neg1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_exposes_both_operations() {
        let plugin = MuxPlugin;
        assert!(plugin.operation("strict").is_some());
        assert!(plugin.operation("permissive").is_some());
        assert!(plugin.operation("nope").is_none());
    }
}
