use zkir_core::Number;

/// The per-type arithmetic/Boolean semantics a `TypeInterpreter` drives.
///
/// Every method takes its operands by reference and *returns* the
/// resulting value: the backend, not the core, decides what a gate
/// produces. A reference/test backend simply performs the modular
/// arithmetic and hands the value straight back (see
/// `zkir::testing::CapturingBackend`); a real proving backend could
/// return the same value while additionally accumulating constraints,
/// or return a placeholder while doing the "real" work as a side effect.
///
/// This crate does not enforce that the values a backend returns satisfy
/// any particular arithmetic relation (`spec.md` §1 Non-goals) — it only
/// guarantees the callbacks are invoked in program order with the
/// correct operands.
pub trait NumericBackend {
    fn add_gate(&mut self, left: &Number, right: &Number) -> Number;
    fn mul_gate(&mut self, left: &Number, right: &Number) -> Number;
    fn addc_gate(&mut self, left: &Number, constant: &Number) -> Number;
    fn mulc_gate(&mut self, left: &Number, constant: &Number) -> Number;
    fn copy(&mut self, left: &Number) -> Number;
    fn assign(&mut self, constant: &Number) -> Number;
    fn assert_zero(&mut self, value: &Number);
    fn public_in(&mut self, value: &Number) -> Number;
    fn private_in(&mut self, value: &Number) -> Number;

    /// Aggregate check over every `assert_zero` (and any other
    /// constraint-bearing call) observed so far. Returns `true` if the
    /// backend considers the circuit satisfied.
    fn check(&mut self) -> bool {
        true
    }

    /// Called once at the end of interpretation, after the last
    /// directive, mirroring the reference implementation's end-of-stream
    /// hook.
    fn finish(&mut self) {}
}
