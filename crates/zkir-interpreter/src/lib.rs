pub mod backend;
pub mod converter;
pub mod erased_wires;
pub mod error;
pub mod function;
pub mod gate;
pub mod input_stream;
pub mod interpreter;
pub mod type_interpreter;

pub use backend::NumericBackend;
pub use converter::{ConversionSpec, Converter};
pub use erased_wires::{ErasedWiresMut, ErasedWiresRef, RamBuffer};
pub use error::{
    ArityError, Diagnostic, InterpreterError, PluginError, ReferenceError, StreamError, TypeError,
};
pub use function::{
    Function, FunctionFactory, GatesFunctionFactory, Operation, Plugin, PluginBinding,
    PluginFunction, PluginHost, RegularFunction,
};
pub use gate::{Gate, Signature};
pub use input_stream::{InputStream, VecInputStream};
pub use interpreter::{Interpreter, NoPlugins, PluginLookup};
pub use type_interpreter::{NumericTypeInterpreter, RamTypeInterpreter, TypeInterpreterDyn};
