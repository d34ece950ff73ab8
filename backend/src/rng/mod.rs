//! Deterministic random number generation
//!
//! All randomness in a simulation run goes through `RngManager`.

mod xorshift;

pub use xorshift::RngManager;
