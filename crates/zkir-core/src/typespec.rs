use crate::number::Number;

/// A parameter to a plugin-bound type or plugin operation: either a
/// numeric constant (e.g. a RAM buffer's size) or a free-form string
/// (e.g. a named sub-operation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Number(Number),
    Text(String),
}

impl Param {
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Param::Number(n) => Some(n),
            Param::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Param::Text(t) => Some(t),
            Param::Number(_) => None,
        }
    }
}

/// The declared shape of a `@type` entry in the circuit's type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// A prime field of the given modulus.
    Field { modulus: Number },
    /// A ring of integers modulo `2^bit_width`.
    Ring { bit_width: u32 },
    /// A type whose wires are owned entirely by a plugin (e.g. a RAM
    /// buffer handle); regular gates are rejected against it.
    PluginBinding {
        plugin_name: String,
        operation: String,
        params: Vec<Param>,
    },
}

impl TypeSpec {
    /// The first value *not* representable by this type, i.e. the
    /// modulus. Plugin-bound types have no numeric domain and return
    /// `None`.
    pub fn max_value(&self) -> Option<Number> {
        match self {
            TypeSpec::Field { modulus } => Some(modulus.clone()),
            TypeSpec::Ring { bit_width } => {
                Some(Number::from_biguint(num_bigint::BigUint::from(1u8) << *bit_width))
            }
            TypeSpec::PluginBinding { .. } => None,
        }
    }

    pub fn is_plugin_binding(&self) -> bool {
        matches!(self, TypeSpec::PluginBinding { .. })
    }
}
