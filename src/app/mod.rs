//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the soil probe engine:
//! the endpoint probe loop, insertion plausibility and the dosage entry
//! point.  All interaction with serial hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without a probe attached.

pub mod events;
pub mod outcome;
pub mod ports;
pub mod service;
