use zkir_core::Number;

/// A RAM plugin buffer's value: a fixed-size array of cells, each
/// holding a `Number` from the RAM's associated element type.
pub type RamBuffer = Vec<Number>;

/// A mutable, contiguous view over one type's wire slots, handed to a
/// plugin `Operation` for its output wires.
///
/// This workspace has exactly two wire-value kinds (`Number` for
/// ordinary field/ring types, [`RamBuffer`] for the RAM plugin's
/// handle type), so a small closed enum — matched on with an ordinary
/// `match` — stands in for the open-ended type erasure the reference
/// implementation gets from passing around a `void*`-like `Wire_T`.
pub enum ErasedWiresMut<'a> {
    Numeric(&'a mut [Option<Number>]),
    Ram(&'a mut [Option<RamBuffer>]),
}

/// The read-only counterpart of [`ErasedWiresMut`], handed to a plugin
/// `Operation` for its input wires.
pub enum ErasedWiresRef<'a> {
    Numeric(&'a [Option<Number>]),
    Ram(&'a [Option<RamBuffer>]),
}

impl<'a> ErasedWiresMut<'a> {
    pub fn as_numeric_mut(&mut self) -> Option<&mut [Option<Number>]> {
        match self {
            ErasedWiresMut::Numeric(s) => Some(s),
            ErasedWiresMut::Ram(_) => None,
        }
    }

    pub fn as_ram_mut(&mut self) -> Option<&mut [Option<RamBuffer>]> {
        match self {
            ErasedWiresMut::Ram(s) => Some(s),
            ErasedWiresMut::Numeric(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ErasedWiresMut::Numeric(s) => s.len(),
            ErasedWiresMut::Ram(s) => s.len(),
        }
    }
}

impl<'a> ErasedWiresRef<'a> {
    pub fn as_numeric(&self) -> Option<&[Option<Number>]> {
        match self {
            ErasedWiresRef::Numeric(s) => Some(s),
            ErasedWiresRef::Ram(_) => None,
        }
    }

    pub fn as_ram(&self) -> Option<&[Option<RamBuffer>]> {
        match self {
            ErasedWiresRef::Ram(s) => Some(s),
            ErasedWiresRef::Numeric(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ErasedWiresRef::Numeric(s) => s.len(),
            ErasedWiresRef::Ram(s) => s.len(),
        }
    }
}
