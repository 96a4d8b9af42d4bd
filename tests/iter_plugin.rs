//! End-to-end coverage of the `iter` plugin's `map`/`map_enumerated`
//! operations dispatched through the real `Interpreter`/`PluginsManager`
//! stack, not just the plugin's own unit test that it exposes both
//! operation names.

mod common;

use common::{assert_wire_equals, field_type};

use zkir::{
    Function, FunctionFactory, Gate, GatesFunctionFactory, Interpreter, Number, Param,
    PluginBinding, PluginFunction, PluginsManager, Signature, TypeIdx, WireId,
};

#[test]
fn map_increments_each_of_three_iterations() {
    let (ty_iface, _handle) = field_type(0, 101, vec![], vec![]);
    let ty = TypeIdx::new(0);

    let mut plugins = PluginsManager::new();
    zkir::register_iter_plugin(&mut plugins);
    let mut interp = Interpreter::new(vec![ty_iface], plugins);

    // inc(@out o: ty:1; @in x: ty:1): o <- x + 1;
    let inc_sig = Signature::new(vec![(ty, 1)], vec![(ty, 1)]);
    let inc_body = vec![Gate::AddC {
        type_idx: ty,
        out: WireId::new(0),
        left: WireId::new(1),
        constant: Number::one(),
    }];
    interp.register_function("inc", GatesFunctionFactory.make_regular(inc_sig, inc_body));

    let map_sig = Signature::new(vec![(ty, 3)], vec![(ty, 3)]);
    let binding = PluginBinding {
        plugin_name: "iter".to_string(),
        operation_name: "map".to_string(),
        params: vec![
            Param::Text("inc".to_string()),
            Param::Number(Number::from(3u64)),
            Param::Number(Number::zero()),
        ],
    };
    interp.register_function(
        "mapped",
        Function::Plugin(PluginFunction { signature: map_sig, binding }),
    );

    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(4u64)));
    assert!(interp.assign_const(ty, WireId::new(1), &Number::from(5u64)));
    assert!(interp.assign_const(ty, WireId::new(2), &Number::from(6u64)));

    assert!(interp.invoke(
        "mapped",
        &[(ty, WireId::new(10), WireId::new(12))],
        &[(ty, WireId::new(0), WireId::new(2))],
    ));

    assert!(assert_wire_equals(&mut interp, ty, WireId::new(10), 5, 101, WireId::new(90)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(11), 6, 101, WireId::new(91)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(12), 7, 101, WireId::new(92)));

    assert!(interp.finish());
}

#[test]
fn map_enumerated_adds_the_loop_index() {
    let (ty_iface, _handle) = field_type(0, 101, vec![], vec![]);
    let ty = TypeIdx::new(0);

    let mut plugins = PluginsManager::new();
    zkir::register_iter_plugin(&mut plugins);
    let mut interp = Interpreter::new(vec![ty_iface], plugins);

    // add_idx(@out o: ty:1; @in idx: ty:1, x: ty:1): o <- idx + x;
    let sig = Signature::new(vec![(ty, 1)], vec![(ty, 1), (ty, 1)]);
    let body = vec![Gate::Add {
        type_idx: ty,
        out: WireId::new(0),
        left: WireId::new(1),
        right: WireId::new(2),
    }];
    interp.register_function("add_idx", GatesFunctionFactory.make_regular(sig, body));

    let map_sig = Signature::new(vec![(ty, 3)], vec![(ty, 3)]);
    let binding = PluginBinding {
        plugin_name: "iter".to_string(),
        operation_name: "map_enumerated".to_string(),
        params: vec![
            Param::Text("add_idx".to_string()),
            Param::Number(Number::from(3u64)),
            Param::Number(Number::zero()),
            Param::Number(Number::from(0u64)),
            Param::Number(Number::from(1u64)),
        ],
    };
    interp.register_function(
        "mapped",
        Function::Plugin(PluginFunction { signature: map_sig, binding }),
    );

    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(10u64)));
    assert!(interp.assign_const(ty, WireId::new(1), &Number::from(10u64)));
    assert!(interp.assign_const(ty, WireId::new(2), &Number::from(10u64)));

    assert!(interp.invoke(
        "mapped",
        &[(ty, WireId::new(20), WireId::new(22))],
        &[(ty, WireId::new(0), WireId::new(2))],
    ));

    // iteration j adds index j (bits <= 1, so the raw counter is passed).
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(20), 10, 101, WireId::new(90)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(21), 11, 101, WireId::new(91)));
    assert!(assert_wire_equals(&mut interp, ty, WireId::new(22), 12, 101, WireId::new(92)));

    assert!(interp.finish());
}
