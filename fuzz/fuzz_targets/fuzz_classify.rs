//! Fuzz target for the BF-type decision table.
//!
//! Every finite triple must resolve to exactly one rule.

#![no_main]

use arbitrary::Arbitrary;
use bf_core::pipeline::{explain_triple, PhaseTriple, RULES};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    origin: f64,
    current: f64,
    aspiration: f64,
}

fuzz_target!(|input: Input| {
    let triple = PhaseTriple::new(input.origin, input.current, input.aspiration);
    let m = explain_triple(&triple);
    assert!(RULES.iter().any(|r| r.number == m.rule && r.label == m.label));
});
