//! Circuit-level coverage of the core dispatcher: directive-by-directive
//! evaluation, function calls, scope delete/reassign, and witness-stream
//! underflow.

mod common;

use common::{assert_wire_equals, field_type, Event};

use zkir::{
    FunctionFactory, Gate, GatesFunctionFactory, Interpreter, NoPlugins, Number, Signature,
    TypeIdx, WireId,
};

#[test]
fn single_add_over_field_seven_is_satisfied() {
    let (ty_iface, handle) = field_type(0, 7, vec![3, 4], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(interp.public_in(ty, WireId::new(0)));
    assert!(interp.public_in(ty, WireId::new(1)));
    assert!(interp.add_gate(ty, WireId::new(2), WireId::new(0), WireId::new(1)));
    assert!(interp.assert_zero(ty, WireId::new(2)));

    assert!(interp.finish());
    assert!(handle.satisfied());
    assert_eq!(handle.events()[0], Event::PublicIn(Number::from(3u64)));
    assert_eq!(handle.events()[1], Event::PublicIn(Number::from(4u64)));
}

#[test]
fn unsatisfied_assert_zero_is_reported_by_check() {
    let (ty_iface, handle) = field_type(0, 7, vec![3, 5], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(interp.public_in(ty, WireId::new(0)));
    assert!(interp.public_in(ty, WireId::new(1)));
    assert!(interp.add_gate(ty, WireId::new(2), WireId::new(0), WireId::new(1)));
    // 3 + 5 = 8 = 1 mod 7, not zero.
    assert!(interp.assert_zero(ty, WireId::new(2)));

    assert!(!interp.finish());
    assert!(!handle.satisfied());
}

#[test]
fn function_call_commits_both_outputs() {
    let (ty_iface, _handle) = field_type(0, 7, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    // f(@out a: ty:1, b: ty:1; @in x: ty:1): a <- x + x; b <- 3 * x;
    let sig = Signature::new(vec![(ty, 1), (ty, 1)], vec![(ty, 1)]);
    let body = vec![
        Gate::Add { type_idx: ty, out: WireId::new(0), left: WireId::new(2), right: WireId::new(2) },
        Gate::MulC {
            type_idx: ty,
            out: WireId::new(1),
            left: WireId::new(2),
            constant: Number::from(3u64),
        },
    ];
    interp.register_function("f", GatesFunctionFactory.make_regular(sig, body));

    assert!(interp.assign_const(ty, WireId::new(5), &Number::from(2u64)));
    assert!(interp.invoke(
        "f",
        &[(ty, WireId::new(10), WireId::new(10)), (ty, WireId::new(11), WireId::new(11))],
        &[(ty, WireId::new(5), WireId::new(5))],
    ));

    assert!(assert_wire_equals(&mut interp, ty, WireId::new(10), 4, 7, WireId::new(90)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(11), 6, 7, WireId::new(91)));
    assert!(interp.finish());
}

#[test]
fn unknown_function_is_a_recoverable_reference_error() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(!interp.invoke("missing", &[], &[(ty, WireId::new(0), WireId::new(0))]));
    // Directive dispatch keeps going after a non-fatal error.
    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(1u64)));
    assert!(!interp.aborted());
    assert!(!interp.finish());
}

#[test]
fn unknown_type_index_is_fatal_and_aborts() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    let bogus = TypeIdx::new(5);
    assert!(!interp.assign_const(bogus, WireId::new(0), &Number::from(1u64)));
    assert!(interp.aborted());
    // Subsequent directives are short-circuited once aborted.
    assert!(!interp.assign_const(TypeIdx::new(0), WireId::new(0), &Number::from(1u64)));
}

#[test]
fn delete_range_allows_reassigning_a_new_range() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(interp.new_range(ty, WireId::new(0), WireId::new(3)));
    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(1u64)));
    assert!(interp.assign_const(ty, WireId::new(1), &Number::from(2u64)));
    assert!(interp.delete_range(ty, WireId::new(0), WireId::new(3)));
    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(5u64)));

    assert!(assert_wire_equals(&mut interp, ty, WireId::new(0), 5, 13, WireId::new(50)));
    assert!(interp.finish());
}

#[test]
fn new_range_rejects_first_greater_than_last() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(!interp.new_range(ty, WireId::new(5), WireId::new(2)));
    assert!(!interp.aborted());
    assert!(interp.diagnostics().iter().any(|d| d.message.contains("invalid range")));
}

#[test]
fn invoke_rejects_output_range_of_the_wrong_length() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    // f(@out: ty:1; @in: ty:1): $0 <- @copy($1);
    let sig = Signature::new(vec![(ty, 1)], vec![(ty, 1)]);
    let body = vec![Gate::Copy { type_idx: ty, out: WireId::new(0), left: WireId::new(1) }];
    interp.register_function("f", GatesFunctionFactory.make_regular(sig, body));

    assert!(interp.assign_const(ty, WireId::new(5), &Number::from(2u64)));
    // Caller supplies a 2-wide output range where the signature declares 1.
    assert!(!interp.invoke(
        "f",
        &[(ty, WireId::new(10), WireId::new(11))],
        &[(ty, WireId::new(5), WireId::new(5))],
    ));
    assert!(!interp.aborted());
    assert!(interp
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("output 0")));
}

#[test]
fn invoke_rejects_input_range_of_the_wrong_type() {
    let (ty0, _h0) = field_type(0, 13, vec![], vec![]);
    let (ty1, _h1) = field_type(1, 7, vec![], vec![]);
    let t0 = TypeIdx::new(0);
    let t1 = TypeIdx::new(1);
    let mut interp = Interpreter::new(vec![ty0, ty1], NoPlugins);

    // f(@out: t0:1; @in: t0:1): $0 <- @copy($1);
    let sig = Signature::new(vec![(t0, 1)], vec![(t0, 1)]);
    let body = vec![Gate::Copy { type_idx: t0, out: WireId::new(0), left: WireId::new(1) }];
    interp.register_function("f", GatesFunctionFactory.make_regular(sig, body));

    assert!(interp.assign_const(t1, WireId::new(5), &Number::from(2u64)));
    // Caller supplies a type-1 input where the signature declares type 0.
    assert!(!interp.invoke(
        "f",
        &[(t0, WireId::new(10), WireId::new(10))],
        &[(t1, WireId::new(5), WireId::new(5))],
    ));
    assert!(!interp.aborted());
    assert!(interp
        .diagnostics()
        .iter()
        .any(|d| d.message.contains("input 0")));
}

#[test]
fn partial_delete_of_a_new_range_is_rejected() {
    let (ty_iface, _handle) = field_type(0, 13, vec![], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(interp.new_range(ty, WireId::new(0), WireId::new(3)));
    assert!(!interp.delete_range(ty, WireId::new(0), WireId::new(1)));
    assert!(interp.delete_range(ty, WireId::new(0), WireId::new(3)));
}

#[test]
fn public_stream_underflow_is_recoverable_but_fails_overall_check() {
    let (ty_iface, handle) = field_type(0, 13, vec![3], vec![]);
    let ty = TypeIdx::new(0);
    let mut interp = Interpreter::new(vec![ty_iface], NoPlugins);

    assert!(interp.public_in(ty, WireId::new(0)));
    assert!(!interp.public_in(ty, WireId::new(1)));

    // Directive dispatch continues past the non-fatal stream error.
    assert!(interp.assign_const(ty, WireId::new(2), &Number::from(9u64)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(2), 9, 13, WireId::new(80)));

    assert!(!interp.aborted());
    assert!(!interp.finish());
    assert!(handle.satisfied());
    assert!(interp.diagnostics().iter().any(|d| d.message.contains("exhausted")));
}
