pub mod ids;
pub mod number;
pub mod range;
pub mod scope;
pub mod skiplist;
pub mod typespec;

pub use ids::{TypeIdx, WireId};
pub use number::Number;
pub use range::Range;
pub use scope::{Scope, ScopeError};
pub use skiplist::SkipList;
pub use typespec::{Param, TypeSpec};
