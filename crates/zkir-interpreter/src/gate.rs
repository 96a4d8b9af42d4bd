use zkir_core::{Number, TypeIdx, WireId};

/// A single recorded directive inside a [`crate::function::RegularFunction`]
/// body, or (for `Invoke`) dispatched directly by the top-level
/// `Interpreter`. Each directive names the `type_idx` its wires belong
/// to; a function body may freely mix directives across types.
#[derive(Debug, Clone)]
pub enum Gate {
    NewRange {
        type_idx: TypeIdx,
        first: WireId,
        last: WireId,
    },
    DeleteRange {
        type_idx: TypeIdx,
        first: WireId,
        last: WireId,
    },
    AssignConst {
        type_idx: TypeIdx,
        out: WireId,
        value: Number,
    },
    Add {
        type_idx: TypeIdx,
        out: WireId,
        left: WireId,
        right: WireId,
    },
    Mul {
        type_idx: TypeIdx,
        out: WireId,
        left: WireId,
        right: WireId,
    },
    AddC {
        type_idx: TypeIdx,
        out: WireId,
        left: WireId,
        constant: Number,
    },
    MulC {
        type_idx: TypeIdx,
        out: WireId,
        left: WireId,
        constant: Number,
    },
    Copy {
        type_idx: TypeIdx,
        out: WireId,
        left: WireId,
    },
    CopyMulti {
        type_idx: TypeIdx,
        out_first: WireId,
        out_last: WireId,
        inputs: Vec<(WireId, WireId)>,
    },
    AssertZero {
        type_idx: TypeIdx,
        wire: WireId,
    },
    PublicIn {
        type_idx: TypeIdx,
        out: WireId,
    },
    PrivateIn {
        type_idx: TypeIdx,
        out: WireId,
    },
    PublicInMulti {
        type_idx: TypeIdx,
        first: WireId,
        last: WireId,
    },
    PrivateInMulti {
        type_idx: TypeIdx,
        first: WireId,
        last: WireId,
    },
    Convert {
        from_type: TypeIdx,
        to_type: TypeIdx,
        out_first: WireId,
        out_last: WireId,
        in_first: WireId,
        in_last: WireId,
        modulus: bool,
    },
    Invoke {
        name: String,
        outputs: Vec<(TypeIdx, WireId, WireId)>,
        inputs: Vec<(TypeIdx, WireId, WireId)>,
    },
}

/// The declared shape of a function: how many wires of which type each
/// output and input spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub outputs: Vec<(TypeIdx, u64)>,
    pub inputs: Vec<(TypeIdx, u64)>,
}

impl Signature {
    pub fn new(outputs: Vec<(TypeIdx, u64)>, inputs: Vec<(TypeIdx, u64)>) -> Self {
        Signature { outputs, inputs }
    }
}
