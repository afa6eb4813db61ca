//! Test harness for the joint pipeline: scenario builders plus assertion
//! helpers with diagnostic output.

pub mod assertions;
pub mod helpers;

pub use assertions::*;
pub use helpers::*;
