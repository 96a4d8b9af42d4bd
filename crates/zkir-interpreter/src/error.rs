use std::fmt;
use thiserror::Error;
use zkir_core::{ScopeError, TypeIdx, WireId};

/// A type-table lookup or gate-dispatch failure: an unknown `type_idx`,
/// or a gate whose operands belong to mismatched types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown type index {0}")]
    UnknownType(TypeIdx),
    #[error("type {0} does not support regular gates (plugin-bound type)")]
    NotGateCapable(TypeIdx),
    #[error("constant value is not less than the type's modulus")]
    ConstantOutOfRange,
    #[error("wire range is not a single already-mapped plugin range")]
    UnmatchedPluginRange,
}

/// A function/converter/plugin lookup failure, or a malformed reference
/// to one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    #[error("unknown converter from type {from} to type {to}")]
    UnknownConverter { from: TypeIdx, to: TypeIdx },
    #[error("unknown plugin {0:?}")]
    UnknownPlugin(String),
    #[error("plugin {plugin:?} has no operation named {operation:?}")]
    UnknownOperation { plugin: String, operation: String },
}

/// A function call whose declared input/output arity does not match the
/// directive invoking it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArityError {
    #[error("function {name:?} expects {expected} outputs, got {got}")]
    OutputCount {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("function {name:?} expects {expected} inputs, got {got}")]
    InputCount {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error(
        "function {name:?} output {index}: expected type {expected_type} length {expected_len}, got type {got_type} length {got_len}"
    )]
    OutputShape {
        name: String,
        index: usize,
        expected_type: TypeIdx,
        expected_len: u64,
        got_type: TypeIdx,
        got_len: u64,
    },
    #[error(
        "function {name:?} input {index}: expected type {expected_type} length {expected_len}, got type {got_type} length {got_len}"
    )]
    InputShape {
        name: String,
        index: usize,
        expected_type: TypeIdx,
        expected_len: u64,
        got_type: TypeIdx,
        got_len: u64,
    },
}

/// A witness/input-stream exhaustion or malformed-value error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("input stream for type {0} is exhausted")]
    Exhausted(TypeIdx),
    #[error("input stream for type {0} produced a value out of range")]
    OutOfRange(TypeIdx),
}

/// An error raised by a plugin operation: malformed binding parameters,
/// an arithmetic precondition the operation itself enforces (e.g.
/// division by zero), or an unsupported wire-value kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PluginError {
    #[error("plugin {plugin:?} operation {operation:?}: {message}")]
    Malformed {
        plugin: String,
        operation: String,
        message: String,
    },
    #[error("wire {0} is not the kind of value this plugin operation expects")]
    WrongWireKind(WireId),
}

/// A diagnostic message accumulated during interpretation: the nearest
/// equivalent of a log line, carrying the source location the directive
/// producer attached via `set_line_num` (see `spec.md` §6/§7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            file: None,
            line,
            message: message.into(),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}: {}", file, self.line, self.message),
            None => write!(f, "{}: {}", self.line, self.message),
        }
    }
}

/// The unified error type for every fallible operation this workspace
/// exposes. Recoverable variants (everything except [`InterpreterError::Oom`]
/// and [`InterpreterError::Custom`] backend-fatal errors) are meant to be
/// ANDed into `Interpreter`'s running success flag rather than propagated
/// with `?` out of directive dispatch; see `spec.md` §7.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Arity(#[from] ArityError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("out of memory allocating wire storage")]
    Oom,
    #[error(transparent)]
    Custom(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl InterpreterError {
    pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        InterpreterError::Custom(Box::new(err))
    }

    /// Fatal structural errors abort interpretation immediately rather
    /// than being accumulated as a diagnostic and continued past.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InterpreterError::Oom | InterpreterError::Type(TypeError::UnknownType(_))
        )
    }
}

impl Clone for InterpreterError {
    fn clone(&self) -> Self {
        match self {
            InterpreterError::Scope(e) => InterpreterError::Scope(e.clone()),
            InterpreterError::Type(e) => InterpreterError::Type(e.clone()),
            InterpreterError::Reference(e) => InterpreterError::Reference(e.clone()),
            InterpreterError::Arity(e) => InterpreterError::Arity(e.clone()),
            InterpreterError::Stream(e) => InterpreterError::Stream(e.clone()),
            InterpreterError::Plugin(e) => InterpreterError::Plugin(e.clone()),
            InterpreterError::Oom => InterpreterError::Oom,
            InterpreterError::Custom(e) => InterpreterError::Custom(format!("{e}").into()),
        }
    }
}
