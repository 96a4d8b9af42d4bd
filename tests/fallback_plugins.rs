//! End-to-end coverage of the reference fallback plugins — RAM
//! init/write/read through a dedicated RAM-typed
//! `TypeInterpreterDyn`, and the arithmetic multiplexer — dispatched
//! through the real `Interpreter`, not just each plugin's own
//! "exposes its operation names" unit test.

mod common;

use common::{assert_wire_equals, field_type};

use zkir::{
    Function, Interpreter, Number, Param, PluginBinding, PluginFunction, PluginsManager,
    RamTypeInterpreter, Signature, TypeIdx, WireId,
};

#[test]
fn ram_init_write_read_round_trip() {
    let (val_iface, _handle) = field_type(0, 11, vec![], vec![]);
    let val_ty = TypeIdx::new(0);
    let ram_ty = TypeIdx::new(1);

    let mut plugins = PluginsManager::new();
    zkir::register_fallback_plugins(&mut plugins);

    let mut interp =
        Interpreter::new(vec![val_iface, Box::new(RamTypeInterpreter::new(ram_ty))], plugins);

    interp.register_function(
        "ram_init",
        Function::Plugin(PluginFunction {
            signature: Signature::new(vec![(ram_ty, 1)], vec![(val_ty, 1)]),
            binding: PluginBinding {
                plugin_name: "ram_arith_v0".to_string(),
                operation_name: "init".to_string(),
                params: vec![Param::Number(Number::from(4u64))],
            },
        }),
    );
    interp.register_function(
        "ram_write",
        Function::Plugin(PluginFunction {
            signature: Signature::new(vec![(ram_ty, 1)], vec![(ram_ty, 1), (val_ty, 1), (val_ty, 1)]),
            binding: PluginBinding {
                plugin_name: "ram_arith_v0".to_string(),
                operation_name: "write".to_string(),
                params: vec![],
            },
        }),
    );
    interp.register_function(
        "ram_read",
        Function::Plugin(PluginFunction {
            signature: Signature::new(vec![(val_ty, 1)], vec![(ram_ty, 1), (val_ty, 1)]),
            binding: PluginBinding {
                plugin_name: "ram_arith_v0".to_string(),
                operation_name: "read".to_string(),
                params: vec![],
            },
        }),
    );

    // fill = 0
    assert!(interp.assign_const(val_ty, WireId::new(0), &Number::zero()));
    assert!(interp.invoke(
        "ram_init",
        &[(ram_ty, WireId::new(100), WireId::new(100))],
        &[(val_ty, WireId::new(0), WireId::new(0))],
    ));

    // idx = 2, in = 9
    assert!(interp.assign_const(val_ty, WireId::new(1), &Number::from(2u64)));
    assert!(interp.assign_const(val_ty, WireId::new(2), &Number::from(9u64)));
    assert!(interp.invoke(
        "ram_write",
        &[(ram_ty, WireId::new(101), WireId::new(101))],
        &[
            (ram_ty, WireId::new(100), WireId::new(100)),
            (val_ty, WireId::new(1), WireId::new(1)),
            (val_ty, WireId::new(2), WireId::new(2)),
        ],
    ));

    assert!(interp.invoke(
        "ram_read",
        &[(val_ty, WireId::new(3), WireId::new(3))],
        &[
            (ram_ty, WireId::new(101), WireId::new(101)),
            (val_ty, WireId::new(1), WireId::new(1)),
        ],
    ));

    assert!(assert_wire_equals(&mut interp, val_ty, WireId::new(3), 9, 11, WireId::new(90)));
    assert!(interp.finish());
}

#[test]
fn ram_read_of_untouched_cell_returns_the_fill_value() {
    let (val_iface, _handle) = field_type(0, 11, vec![], vec![]);
    let val_ty = TypeIdx::new(0);
    let ram_ty = TypeIdx::new(1);

    let mut plugins = PluginsManager::new();
    zkir::register_fallback_plugins(&mut plugins);
    let mut interp =
        Interpreter::new(vec![val_iface, Box::new(RamTypeInterpreter::new(ram_ty))], plugins);

    interp.register_function(
        "ram_init",
        Function::Plugin(PluginFunction {
            signature: Signature::new(vec![(ram_ty, 1)], vec![(val_ty, 1)]),
            binding: PluginBinding {
                plugin_name: "ram_arith_v0".to_string(),
                operation_name: "init".to_string(),
                params: vec![Param::Number(Number::from(4u64))],
            },
        }),
    );
    interp.register_function(
        "ram_read",
        Function::Plugin(PluginFunction {
            signature: Signature::new(vec![(val_ty, 1)], vec![(ram_ty, 1), (val_ty, 1)]),
            binding: PluginBinding {
                plugin_name: "ram_arith_v0".to_string(),
                operation_name: "read".to_string(),
                params: vec![],
            },
        }),
    );

    assert!(interp.assign_const(val_ty, WireId::new(0), &Number::from(7u64)));
    assert!(interp.invoke(
        "ram_init",
        &[(ram_ty, WireId::new(100), WireId::new(100))],
        &[(val_ty, WireId::new(0), WireId::new(0))],
    ));

    assert!(interp.assign_const(val_ty, WireId::new(1), &Number::from(3u64)));
    assert!(interp.invoke(
        "ram_read",
        &[(val_ty, WireId::new(2), WireId::new(2))],
        &[
            (ram_ty, WireId::new(100), WireId::new(100)),
            (val_ty, WireId::new(1), WireId::new(1)),
        ],
    ));

    assert!(assert_wire_equals(&mut interp, val_ty, WireId::new(2), 7, 11, WireId::new(90)));
    assert!(interp.finish());
}

#[test]
fn mux_strict_selects_the_indicated_case() {
    let (ty_iface, _handle) = field_type(0, 101, vec![], vec![]);
    let ty = TypeIdx::new(0);

    let mut plugins = PluginsManager::new();
    zkir::register_fallback_plugins(&mut plugins);
    let mut interp = Interpreter::new(vec![ty_iface], plugins);

    // One output, three cases: selector + 3 single-wire cases.
    let sig = Signature::new(vec![(ty, 1)], vec![(ty, 1), (ty, 1), (ty, 1), (ty, 1)]);
    interp.register_function(
        "mux3",
        Function::Plugin(PluginFunction {
            signature: sig,
            binding: PluginBinding {
                plugin_name: "mux_v0".to_string(),
                operation_name: "strict".to_string(),
                params: vec![],
            },
        }),
    );

    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(1u64))); // selector
    assert!(interp.assign_const(ty, WireId::new(1), &Number::from(10u64)));
    assert!(interp.assign_const(ty, WireId::new(2), &Number::from(20u64)));
    assert!(interp.assign_const(ty, WireId::new(3), &Number::from(30u64)));

    assert!(interp.invoke(
        "mux3",
        &[(ty, WireId::new(10), WireId::new(10))],
        &[
            (ty, WireId::new(0), WireId::new(0)),
            (ty, WireId::new(1), WireId::new(1)),
            (ty, WireId::new(2), WireId::new(2)),
            (ty, WireId::new(3), WireId::new(3)),
        ],
    ));

    assert!(assert_wire_equals(&mut interp, ty, WireId::new(10), 20, 101, WireId::new(90)));
    assert!(interp.finish());
}

#[test]
fn mux_strict_rejects_an_out_of_range_selector() {
    let (ty_iface, _handle) = field_type(0, 101, vec![], vec![]);
    let ty = TypeIdx::new(0);

    let mut plugins = PluginsManager::new();
    zkir::register_fallback_plugins(&mut plugins);
    let mut interp = Interpreter::new(vec![ty_iface], plugins);

    let sig = Signature::new(vec![(ty, 1)], vec![(ty, 1), (ty, 1), (ty, 1)]);
    interp.register_function(
        "mux2",
        Function::Plugin(PluginFunction {
            signature: sig,
            binding: PluginBinding {
                plugin_name: "mux_v0".to_string(),
                operation_name: "strict".to_string(),
                params: vec![],
            },
        }),
    );

    assert!(interp.assign_const(ty, WireId::new(0), &Number::from(5u64))); // out of range: only 2 cases
    assert!(interp.assign_const(ty, WireId::new(1), &Number::from(10u64)));
    assert!(interp.assign_const(ty, WireId::new(2), &Number::from(20u64)));

    // The directive itself dispatches fine — the out-of-range selector is
    // caught by the in-circuit `assert_one` over the indicator sum, which
    // only shows up in the backend's aggregate `check()`.
    assert!(interp.invoke(
        "mux2",
        &[(ty, WireId::new(10), WireId::new(10))],
        &[
            (ty, WireId::new(0), WireId::new(0)),
            (ty, WireId::new(1), WireId::new(1)),
            (ty, WireId::new(2), WireId::new(2)),
        ],
    ));
    assert!(!interp.finish());
}
