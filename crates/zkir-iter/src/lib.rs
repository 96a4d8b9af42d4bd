//! The iteration plugin: `map` invokes a named body
//! function `N` times, slicing the plugin call's own output/input
//! ranges across iterations; `map_enumerated` additionally synthesizes
//! a loop-index input for the body.
//!
//! Binding parameters, in order (`PluginBinding.params`):
//! 0. `Text` — the body function's name.
//! 1. `Number` — `N`, the iteration count.
//! 2. `Number` — `E`, the number of leading "environment" inputs passed
//!    verbatim to every iteration.
//! 3. `Number` — (enumerated only) the `type_idx` the synthesized index
//!    wire(s) belong to.
//! 4. `Number` — (enumerated only) `L`, the index's bit width; `L <= 1`
//!    passes the raw counter as a single wire instead of a decomposition.

use zkir_core::{Number, TypeIdx, WireId};
use zkir_interpreter::{
    InterpreterError, Operation, Plugin, PluginBinding, PluginError, PluginHost, Signature,
};

const NAME: &str = "iter";

/// The `"iter"` plugin: owns the `map` and `map_enumerated` operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct IterPlugin;

impl Plugin for IterPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn operation(&self, operation_name: &str) -> Option<&dyn Operation> {
        match operation_name {
            "map" => Some(&MapOperation::MAP),
            "map_enumerated" => Some(&MapOperation::MAP_ENUMERATED),
            _ => None,
        }
    }
}

/// `map`/`map_enumerated`: both share this implementation, distinguished
/// by whether a loop-index input is synthesized for the body.
#[derive(Debug, Clone, Copy)]
struct MapOperation {
    enumerated: bool,
}

impl MapOperation {
    const MAP: MapOperation = MapOperation { enumerated: false };
    const MAP_ENUMERATED: MapOperation = MapOperation { enumerated: true };
}

fn malformed(operation: &str, message: impl Into<String>) -> InterpreterError {
    PluginError::Malformed {
        plugin: NAME.to_string(),
        operation: operation.to_string(),
        message: message.into(),
    }
    .into()
}

fn param_number(
    binding: &PluginBinding,
    idx: usize,
    operation: &str,
    what: &str,
) -> Result<u64, InterpreterError> {
    binding
        .params
        .get(idx)
        .and_then(|p| p.as_number())
        .and_then(Number::to_u64)
        .ok_or_else(|| malformed(operation, format!("missing or non-numeric {what}")))
}

fn param_text<'a>(
    binding: &'a PluginBinding,
    idx: usize,
    operation: &str,
    what: &str,
) -> Result<&'a str, InterpreterError> {
    binding
        .params
        .get(idx)
        .and_then(|p| p.as_text())
        .ok_or_else(|| malformed(operation, format!("missing or non-text {what}")))
}

impl Operation for MapOperation {
    fn evaluate(
        &self,
        host: &mut dyn PluginHost,
        outputs: &[(TypeIdx, WireId, WireId)],
        inputs: &[(TypeIdx, WireId, WireId)],
        _signature: &Signature,
        binding: &PluginBinding,
    ) -> Result<(), InterpreterError> {
        let op_name = if self.enumerated { "map_enumerated" } else { "map" };
        let body_name = param_text(binding, 0, op_name, "body function name")?.to_string();
        let n = param_number(binding, 1, op_name, "iteration count")?;
        let env_count = param_number(binding, 2, op_name, "environment input count")? as usize;
        if n == 0 {
            return Err(malformed(op_name, "iteration count must be at least 1"));
        }
        if env_count > inputs.len() {
            return Err(malformed(op_name, "environment count exceeds input count"));
        }

        let (idx_type, idx_bits) = if self.enumerated {
            let idx_type = TypeIdx::new(param_number(binding, 3, op_name, "index type_idx")? as u32);
            let idx_bits = param_number(binding, 4, op_name, "index bit width")?;
            (Some(idx_type), idx_bits)
        } else {
            (None, 0)
        };

        // Per-output body length, derived from the outer (plugin-call)
        // output length: output i has length N * body.output[i].length.
        let out_body_len = divide_spans(outputs.iter().map(|&(_, f, l)| (f, l)), n, op_name, "output")?;
        // Per-sliced-input body length; environment inputs keep `None`
        // since they are passed through whole, not sliced by iteration.
        let in_body_len: Vec<Option<u64>> = inputs
            .iter()
            .enumerate()
            .map(|(i, &(_, first, last))| {
                if i < env_count {
                    Ok(None)
                } else {
                    span_len(first, last, n, op_name, "input").map(Some)
                }
            })
            .collect::<Result<_, InterpreterError>>()?;

        for j in 0..n {
            let callee_outputs: Vec<_> = outputs
                .iter()
                .zip(out_body_len.iter())
                .map(|(&(ty, first, _), &len)| {
                    let lo = first.get() + j * len;
                    (ty, WireId::new(lo), WireId::new(lo + len - 1))
                })
                .collect();

            let mut callee_inputs = Vec::with_capacity(inputs.len() + 1);
            for (i, &(ty, first, last)) in inputs.iter().enumerate() {
                match in_body_len[i] {
                    None => callee_inputs.push((ty, first, last)),
                    Some(len) => {
                        let lo = first.get() + j * len;
                        callee_inputs.push((ty, WireId::new(lo), WireId::new(lo + len - 1)));
                    }
                }
            }

            if let Some(ty) = idx_type {
                let idx_range = synthesize_index(host, ty, idx_bits, j)?;
                callee_inputs.insert(env_count, (ty, idx_range.0, idx_range.1));
            }

            host.invoke(&body_name, &callee_outputs, &callee_inputs)?;
        }

        Ok(())
    }
}

fn span_len(
    first: WireId,
    last: WireId,
    n: u64,
    op_name: &str,
    what: &str,
) -> Result<u64, InterpreterError> {
    let total = last.get() - first.get() + 1;
    if total % n != 0 {
        return Err(malformed(op_name, format!("{what} length is not a multiple of the iteration count")));
    }
    Ok(total / n)
}

fn divide_spans(
    spans: impl Iterator<Item = (WireId, WireId)>,
    n: u64,
    op_name: &str,
    what: &str,
) -> Result<Vec<u64>, InterpreterError> {
    spans.map(|(f, l)| span_len(f, l, n, op_name, what)).collect()
}

/// Allocate and populate the loop-index wire(s) for iteration `j`: a
/// single wire holding `j` (reduced modulo the type's modulus) if
/// `bits <= 1`, otherwise an `bits`-wide little-endian bit decomposition
/// of `j`.
fn synthesize_index(
    host: &mut dyn PluginHost,
    ty: TypeIdx,
    bits: u64,
    j: u64,
) -> Result<(WireId, WireId), InterpreterError> {
    let (lo, hi) = host.type_mut(ty)?.alloc_scratch(bits.max(1))?;
    if bits <= 1 {
        let value = match host.type_mut(ty)?.max_value() {
            Some(modulus) => Number::from(j).rem_euclid(&modulus),
            None => Number::from(j),
        };
        host.type_mut(ty)?.assign_const(lo, &value)?;
    } else {
        for bit in 0..bits {
            let wire = WireId::new(lo.get() + bit);
            let bit_value = Number::from((j >> bit) & 1);
            host.type_mut(ty)?.assign_const(wire, &bit_value)?;
        }
    }
    Ok((lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_exposes_both_operations() {
        let plugin = IterPlugin;
        assert!(plugin.operation("map").is_some());
        assert!(plugin.operation("map_enumerated").is_some());
        assert!(plugin.operation("nope").is_none());
    }
}
