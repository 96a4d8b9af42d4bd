//! Small gate-composition primitives shared by every fallback plugin:
//! Boolean algebra over 0/1-valued wires, expressed with the four
//! arithmetic gate callbacks every `NumericBackend` supplies, plus a
//! witness-backed bit decomposition and the ripple comparator built on
//! top of it.

use zkir_core::{Number, WireId};
use zkir_interpreter::{InterpreterError, TypeInterpreterDyn};

pub(crate) fn alloc1(t: &mut dyn TypeInterpreterDyn) -> Result<WireId, InterpreterError> {
    let (first, _) = t.alloc_scratch(1)?;
    Ok(first)
}

/// `out = 1 - wire`, for a wire already known to hold 0 or 1.
pub(crate) fn bit_not(
    t: &mut dyn TypeInterpreterDyn,
    wire: WireId,
    neg1: &Number,
) -> Result<WireId, InterpreterError> {
    let tmp = alloc1(t)?;
    t.mulc_gate(tmp, wire, neg1)?;
    let out = alloc1(t)?;
    t.addc_gate(out, tmp, &Number::one())?;
    Ok(out)
}

/// Boolean AND of two 0/1 wires: plain multiplication.
pub(crate) fn bit_and(
    t: &mut dyn TypeInterpreterDyn,
    left: WireId,
    right: WireId,
) -> Result<WireId, InterpreterError> {
    let out = alloc1(t)?;
    t.mul_gate(out, left, right)?;
    Ok(out)
}

/// Boolean XOR of two 0/1 wires: `l + r - 2lr`.
pub(crate) fn bit_xor(
    t: &mut dyn TypeInterpreterDyn,
    left: WireId,
    right: WireId,
    neg1: &Number,
) -> Result<WireId, InterpreterError> {
    let sum = alloc1(t)?;
    t.add_gate(sum, left, right)?;
    let prod = alloc1(t)?;
    t.mul_gate(prod, left, right)?;
    let neg_twice = alloc1(t)?;
    t.mulc_gate(neg_twice, prod, &neg1.minus_one())?;
    let out = alloc1(t)?;
    t.add_gate(out, sum, neg_twice)?;
    Ok(out)
}

/// Constrain `wire` to 0 or 1: `wire * (wire - 1) == 0`.
pub(crate) fn assert_boolean(
    t: &mut dyn TypeInterpreterDyn,
    wire: WireId,
    neg1: &Number,
) -> Result<(), InterpreterError> {
    let minus_one = alloc1(t)?;
    t.addc_gate(minus_one, wire, neg1)?;
    let zero = alloc1(t)?;
    t.mul_gate(zero, wire, minus_one)?;
    t.assert_zero(zero)
}

/// Assert a 0/1 wire is exactly 1: `wire - 1 == 0`.
pub(crate) fn assert_one(
    t: &mut dyn TypeInterpreterDyn,
    wire: WireId,
    neg1: &Number,
) -> Result<(), InterpreterError> {
    let tmp = alloc1(t)?;
    t.addc_gate(tmp, wire, neg1)?;
    t.assert_zero(tmp)
}

/// Materialize a constant's big-endian bit pattern as `bits` freshly
/// constructed wires (no booleanity check needed — the values are fixed
/// public constants, not untrusted witness input).
pub(crate) fn const_bits(
    t: &mut dyn TypeInterpreterDyn,
    value: &Number,
    bits: u32,
) -> Result<Vec<WireId>, InterpreterError> {
    let (first, _) = t.alloc_scratch(bits as u64)?;
    let mut wires = Vec::with_capacity(bits as usize);
    for i in 0..bits {
        let w = WireId::new(first.get() + i as u64);
        let shift = bits - 1 - i;
        let bit = if value.as_biguint().bit(shift as u64) {
            Number::one()
        } else {
            Number::zero()
        };
        t.assign_const(w, &bit)?;
        wires.push(w);
    }
    Ok(wires)
}

/// Decompose `input`'s extended-witness value into `bits` big-endian
/// witness wires: each bit is constrained boolean, and the
/// recomposition `Σ bit_i · 2^(bits-1-i)` is asserted equal to `input`.
pub(crate) fn bit_decompose(
    t: &mut dyn TypeInterpreterDyn,
    input: WireId,
    bits: u32,
    neg1: &Number,
) -> Result<Vec<WireId>, InterpreterError> {
    let value = t.extended_witness(input)?;
    let (first, _) = t.alloc_scratch(bits as u64)?;
    let mut wires = Vec::with_capacity(bits as usize);
    for i in 0..bits {
        let w = WireId::new(first.get() + i as u64);
        let shift = bits - 1 - i;
        let bit = if value.as_biguint().bit(shift as u64) {
            Number::one()
        } else {
            Number::zero()
        };
        t.assign_const(w, &bit)?;
        assert_boolean(t, w, neg1)?;
        wires.push(w);
    }

    let mut recomp = wires[0];
    for &w in &wires[1..] {
        let doubled = alloc1(t)?;
        t.mulc_gate(doubled, recomp, &Number::from(2u64))?;
        let next = alloc1(t)?;
        t.add_gate(next, doubled, w)?;
        recomp = next;
    }
    let neg_recomp = alloc1(t)?;
    t.mulc_gate(neg_recomp, recomp, neg1)?;
    let zero = alloc1(t)?;
    t.add_gate(zero, neg_recomp, input)?;
    t.assert_zero(zero)?;

    Ok(wires)
}

/// `base ^ exponent`, computed in-circuit by square-and-multiply: one
/// `mul_gate` per set bit of `exponent` plus one squaring per bit
/// position. Used by the multiplexer and RAM fallbacks' Fermat's-little-
/// theorem equality indicator `x^(p-1)`, which is `1` for `x != 0` and
/// `0` for `x == 0` in a prime field.
pub(crate) fn pow_gate(
    t: &mut dyn TypeInterpreterDyn,
    base: WireId,
    exponent: &Number,
) -> Result<WireId, InterpreterError> {
    let exp = exponent.as_biguint();
    if exp == &num_bigint::BigUint::from(0u8) {
        let one = alloc1(t)?;
        t.assign_const(one, &Number::one())?;
        return Ok(one);
    }
    let bits = exp.bits();
    let mut acc: Option<WireId> = None;
    let mut cur = base;
    for i in 0..bits {
        if exp.bit(i) {
            acc = Some(match acc {
                None => cur,
                Some(r) => {
                    let out = alloc1(t)?;
                    t.mul_gate(out, r, cur)?;
                    out
                }
            });
        }
        if i + 1 < bits {
            let sq = alloc1(t)?;
            t.mul_gate(sq, cur, cur)?;
            cur = sq;
        }
    }
    Ok(acc.expect("exponent != 0 implies at least one set bit"))
}

/// The Fermat's-little-theorem equality indicator: `1` if the
/// extended-witness value of `wire` is `0` modulo the type's prime (or
/// more precisely, if `wire`'s value as a field element is the additive
/// identity), `0` otherwise. Computed as `1 - wire^(modulus-1)`.
pub(crate) fn is_zero_indicator(
    t: &mut dyn TypeInterpreterDyn,
    wire: WireId,
    neg1: &Number,
    modulus_minus_one: &Number,
) -> Result<WireId, InterpreterError> {
    let pow = pow_gate(t, wire, modulus_minus_one)?;
    let neg_pow = alloc1(t)?;
    t.mulc_gate(neg_pow, pow, neg1)?;
    let out = alloc1(t)?;
    t.addc_gate(out, neg_pow, &Number::one())?;
    Ok(out)
}

/// A big-endian ripple comparator: returns a wire holding 1 if `left <
/// right`, 0 otherwise, given both operands' big-endian bit
/// decompositions. At each bit
/// position (most significant first) the "strictly less, here" term
/// `(1-l_i)·r_i` only contributes once `eq` (all higher bits equal so
/// far) is still 1; `eq` itself collapses to 0 the first time the bits
/// diverge, so at most one term in the running sum is ever nonzero.
pub(crate) fn bits_lt(
    t: &mut dyn TypeInterpreterDyn,
    left: &[WireId],
    right: &[WireId],
    neg1: &Number,
) -> Result<WireId, InterpreterError> {
    assert_eq!(left.len(), right.len(), "comparator operands must have equal bit width");
    let mut lt = alloc1(t)?;
    t.assign_const(lt, &Number::zero())?;
    let mut eq = alloc1(t)?;
    t.assign_const(eq, &Number::one())?;

    for (&l, &r) in left.iter().zip(right.iter()) {
        let not_l = bit_not(t, l, neg1)?;
        let diverges_here = bit_and(t, not_l, r)?;
        let term = bit_and(t, diverges_here, eq)?;
        let lt_next = alloc1(t)?;
        t.add_gate(lt_next, lt, term)?;

        let xor = bit_xor(t, l, r, neg1)?;
        let still_eq = bit_not(t, xor, neg1)?;
        let eq_next = bit_and(t, eq, still_eq)?;

        lt = lt_next;
        eq = eq_next;
    }
    Ok(lt)
}
