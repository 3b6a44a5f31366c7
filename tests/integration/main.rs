//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  No serial hardware is required.

mod acquisition_tests;
mod mock_probe;
