//! Shared test-only infrastructure: a real modular-arithmetic
//! `NumericBackend` that doubles as an event log, used as this
//! workspace's own concrete interpreter/test oracle rather than a mock.
//! Mirrors the teacher's `tests/common/mod.rs` convention — one shared
//! module `mod`-included by every integration test file in this crate.

use std::cell::RefCell;
use std::rc::Rc;

use zkir::{
    Interpreter, Number, NumericBackend, NumericTypeInterpreter, PluginLookup, TypeIdx,
    TypeInterpreterDyn, TypeSpec, VecInputStream, WireId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Event {
    Add(Number, Number),
    Mul(Number, Number),
    AddC(Number, Number),
    MulC(Number, Number),
    Copy(Number),
    Assign(Number),
    AssertZero(Number),
    PublicIn(Number),
    PrivateIn(Number),
}

#[derive(Clone)]
pub struct CapturingHandle {
    log: Rc<RefCell<Vec<Event>>>,
    satisfied: Rc<RefCell<bool>>,
}

#[allow(dead_code)]
impl CapturingHandle {
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn satisfied(&self) -> bool {
        *self.satisfied.borrow()
    }
}

/// A genuinely-reducing `NumericBackend`: every arithmetic callback
/// returns its result modulo the field/ring's modulus, exactly like a
/// real prover's wire assignment would, plus an ordered log of every
/// callback so a test can assert on dispatch order alongside the final
/// satisfiability verdict. The fallback plugins' Fermat's-little-theorem
/// indicators only come out 0/1 against a backend that actually reduces,
/// so this stands in for the proving backend `NumericBackend`'s own doc
/// comment gestures at.
pub struct CapturingBackend {
    modulus: Number,
    log: Rc<RefCell<Vec<Event>>>,
    satisfied: Rc<RefCell<bool>>,
}

impl CapturingBackend {
    pub fn new(modulus: Number) -> Self {
        CapturingBackend {
            modulus,
            log: Rc::new(RefCell::new(Vec::new())),
            satisfied: Rc::new(RefCell::new(true)),
        }
    }

    pub fn handle(&self) -> CapturingHandle {
        CapturingHandle {
            log: self.log.clone(),
            satisfied: self.satisfied.clone(),
        }
    }

    fn reduce(&self, v: Number) -> Number {
        v.rem_euclid(&self.modulus)
    }
}

impl NumericBackend for CapturingBackend {
    fn add_gate(&mut self, left: &Number, right: &Number) -> Number {
        self.log.borrow_mut().push(Event::Add(left.clone(), right.clone()));
        self.reduce(left.add(right))
    }

    fn mul_gate(&mut self, left: &Number, right: &Number) -> Number {
        self.log.borrow_mut().push(Event::Mul(left.clone(), right.clone()));
        self.reduce(left.mul(right))
    }

    fn addc_gate(&mut self, left: &Number, constant: &Number) -> Number {
        self.log.borrow_mut().push(Event::AddC(left.clone(), constant.clone()));
        self.reduce(left.add(constant))
    }

    fn mulc_gate(&mut self, left: &Number, constant: &Number) -> Number {
        self.log.borrow_mut().push(Event::MulC(left.clone(), constant.clone()));
        self.reduce(left.mul(constant))
    }

    fn copy(&mut self, left: &Number) -> Number {
        self.log.borrow_mut().push(Event::Copy(left.clone()));
        left.clone()
    }

    fn assign(&mut self, constant: &Number) -> Number {
        self.log.borrow_mut().push(Event::Assign(constant.clone()));
        self.reduce(constant.clone())
    }

    fn assert_zero(&mut self, value: &Number) {
        self.log.borrow_mut().push(Event::AssertZero(value.clone()));
        if !self.reduce(value.clone()).is_zero() {
            *self.satisfied.borrow_mut() = false;
        }
    }

    fn public_in(&mut self, value: &Number) -> Number {
        self.log.borrow_mut().push(Event::PublicIn(value.clone()));
        self.reduce(value.clone())
    }

    fn private_in(&mut self, value: &Number) -> Number {
        self.log.borrow_mut().push(Event::PrivateIn(value.clone()));
        self.reduce(value.clone())
    }

    fn check(&mut self) -> bool {
        *self.satisfied.borrow()
    }
}

/// Build a field-typed [`TypeInterpreterDyn`] of the given modulus, with
/// the given public/private witness values queued in order, plus a
/// handle onto its backend's event log and satisfiability flag.
#[allow(dead_code)]
pub fn field_type(
    type_idx: u32,
    modulus: u64,
    public: Vec<u64>,
    private: Vec<u64>,
) -> (Box<dyn TypeInterpreterDyn>, CapturingHandle) {
    let backend = CapturingBackend::new(Number::from(modulus));
    let handle = backend.handle();
    let ti = NumericTypeInterpreter::with_streams(
        TypeIdx::new(type_idx),
        TypeSpec::Field { modulus: Number::from(modulus) },
        backend,
        VecInputStream::new(public.into_iter().map(Number::from)),
        VecInputStream::new(private.into_iter().map(Number::from)),
    );
    (Box::new(ti), handle)
}

/// Assert, via the circuit itself (`addc_gate` with a negated constant
/// then `assert_zero`), that `wire` holds `value` modulo `modulus`. Used
/// in place of a direct wire-value read, which this workspace's
/// `Interpreter` deliberately does not expose (`spec.md` §6: the core
/// only ever formats diagnostic messages, never wire values). `scratch`
/// must name a wire unused elsewhere in the same scope.
#[allow(dead_code)]
pub fn assert_wire_equals(
    interp: &mut Interpreter<impl PluginLookup>,
    ty: TypeIdx,
    wire: WireId,
    value: u64,
    modulus: u64,
    scratch: WireId,
) -> bool {
    let neg = Number::from((modulus - (value % modulus)) % modulus);
    let a = interp.addc_gate(ty, scratch, wire, &neg);
    let b = interp.assert_zero(ty, scratch);
    a && b
}
