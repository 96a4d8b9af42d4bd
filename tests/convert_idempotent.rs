//! `@convert` through a trivial identity `Converter`: with matching
//! unit-length input/output, conversion between two same-shaped field
//! types behaves as a plain copy.

mod common;

use common::{assert_wire_equals, field_type};

use zkir::{ConversionSpec, Converter, Interpreter, Number, NoPlugins, TypeIdx, WireId};

struct IdentityConverter;

impl Converter for IdentityConverter {
    fn spec(&self) -> ConversionSpec {
        ConversionSpec { out_count: 1, in_count: 1 }
    }

    fn convert(&mut self, inputs: &[Number], _modulus: bool) -> Vec<Number> {
        inputs.to_vec()
    }
}

#[test]
fn unit_length_identity_convert_acts_as_copy() {
    let (ty0_iface, _h0) = field_type(0, 13, vec![], vec![]);
    let (ty1_iface, _h1) = field_type(1, 13, vec![], vec![]);
    let ty0 = TypeIdx::new(0);
    let ty1 = TypeIdx::new(1);
    let mut interp = Interpreter::new(vec![ty0_iface, ty1_iface], NoPlugins);

    interp.register_converter(ty0, ty1, Box::new(IdentityConverter));

    assert!(interp.assign_const(ty0, WireId::new(0), &Number::from(5u64)));
    assert!(interp.convert(ty0, ty1, WireId::new(0), WireId::new(0), WireId::new(0), WireId::new(0), false));

    assert!(assert_wire_equals(&mut interp, ty1, WireId::new(0), 5, 13, WireId::new(90)));
    assert!(interp.finish());
}

#[test]
fn convert_through_an_unregistered_edge_is_a_recoverable_reference_error() {
    let (ty0_iface, _h0) = field_type(0, 13, vec![], vec![]);
    let (ty1_iface, _h1) = field_type(1, 13, vec![], vec![]);
    let ty0 = TypeIdx::new(0);
    let ty1 = TypeIdx::new(1);
    let mut interp = Interpreter::new(vec![ty0_iface, ty1_iface], NoPlugins);

    assert!(interp.assign_const(ty0, WireId::new(0), &Number::from(5u64)));
    assert!(!interp.convert(ty0, ty1, WireId::new(0), WireId::new(0), WireId::new(0), WireId::new(0), false));
    assert!(!interp.aborted());
    assert!(!interp.finish());
}
