use zkir_core::Number;
use zkir_interpreter::{InterpreterError, PluginBinding, PluginError, TypeInterpreterDyn};

pub(crate) fn malformed(
    plugin: &str,
    operation: &str,
    message: impl Into<String>,
) -> InterpreterError {
    PluginError::Malformed {
        plugin: plugin.to_string(),
        operation: operation.to_string(),
        message: message.into(),
    }
    .into()
}

pub(crate) fn param_number(
    binding: &PluginBinding,
    idx: usize,
    plugin: &str,
    operation: &str,
    what: &str,
) -> Result<u64, InterpreterError> {
    binding
        .params
        .get(idx)
        .and_then(|p| p.as_number())
        .and_then(Number::to_u64)
        .ok_or_else(|| malformed(plugin, operation, format!("missing or non-numeric {what}")))
}

/// The type's modulus and `modulus - 1` ("-1 mod p"), the constant the
/// fallback plugins' Fermat's-little-theorem and bit-arithmetic gadgets
/// are built from. Plugin-bound (non-numeric) types have no modulus and
/// are rejected.
pub(crate) fn modulus_and_neg1(
    t: &mut dyn TypeInterpreterDyn,
    plugin: &str,
    operation: &str,
) -> Result<(Number, Number), InterpreterError> {
    let modulus = t
        .max_value()
        .ok_or_else(|| malformed(plugin, operation, "operand type has no numeric modulus"))?;
    let neg1 = modulus.minus_one();
    Ok((modulus, neg1))
}

/// True for the two-element (Boolean) field, the split point every
/// fallback plugin uses to choose between its Fermat's-little-theorem
/// arithmetic construction and its binary-tree-over-bits Boolean one.
pub(crate) fn is_boolean_field(modulus: &Number) -> bool {
    modulus == &Number::from(2u64)
}
