//! Soil probe engine library.
//!
//! Acquires readings from a 7-in-1 soil probe over Modbus RTU, judges
//! whether the probe is actually in soil, and computes fertilizer
//! dosage recommendations.  Serial-port access is behind the `serial`
//! feature; everything else is pure logic usable from tests and fuzzers.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod dosage;
pub mod error;
pub mod modbus;
pub mod sensors;
pub mod validity;

pub use app::outcome::{AcquisitionOutcome, EndpointFailure, SoilCheck};
pub use app::ports::SerialEndpointDescriptor;
pub use app::service::AppService;
pub use dosage::{DosageCalculator, DosageRecommendation, NutrientLevels, ReferenceTables};
pub use error::{DeviceError, Error};
pub use sensors::SoilMeasurement;
pub use validity::{InvalidReason, ValidityVerdict, classify_validity};
