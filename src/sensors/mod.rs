//! Sensor data model — decoded probe readings.
//!
//! The acquisition path reads a raw register block over Modbus and turns
//! it into a [`SoilMeasurement`] here; plausibility is judged separately
//! in [`crate::validity`].

pub mod soil;

pub use soil::{REQUIRED_REGISTERS, SoilMeasurement};
