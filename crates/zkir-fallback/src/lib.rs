//! Fallback plugin operations: multiplexer, RAM, vectors, and extended
//! arithmetic, all built entirely out of a `NumericTypeInterpreter`'s
//! primitive gate callbacks rather than any backend-specific support —
//! plugins that work over any backend because they lower to plain
//! gates, as opposed to the iteration plugin, which dispatches back
//! into the interpreter instead of emitting gates itself.

mod ext_arith;
mod gatekit;
mod mux;
mod params;
mod ram;
mod vectors;

pub use ext_arith::ExtendedArithmeticPlugin;
pub use mux::MuxPlugin;
pub use ram::{ArithRamPlugin, BoolRamPlugin};
pub use vectors::VectorsPlugin;
