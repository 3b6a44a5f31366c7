//! 7-in-1 soil probe register map.
//!
//! The probe answers a 14-register holding block starting at address 0.
//! Most quantities are transmitted as tenths:
//!
//! | Register | Quantity      | Scale | Unit  |
//! |----------|---------------|-------|-------|
//! | 0        | temperature   | ÷10   | °C    |
//! | 1        | nitrogen      | ÷10   | mg/kg |
//! | 2        | moisture      | ÷10   | %     |
//! | 3        | conductivity  | ×1    | µS/cm |
//! | 4        | pH            | ÷10   |       |
//! | 5        | phosphorus    | ÷10   | mg/kg |
//! | 6        | potassium     | ÷10   | mg/kg |
//!
//! Registers 7–13 are not used.

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

const REG_TEMPERATURE: usize = 0;
const REG_NITROGEN: usize = 1;
const REG_MOISTURE: usize = 2;
const REG_CONDUCTIVITY: usize = 3;
const REG_PH: usize = 4;
const REG_PHOSPHORUS: usize = 5;
const REG_POTASSIUM: usize = 6;

/// Registers that must be present to decode a measurement.
pub const REQUIRED_REGISTERS: usize = REG_POTASSIUM + 1;

const TENTHS: f64 = 10.0;

/// One decoded probe reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilMeasurement {
    pub temperature_c: f64,
    pub moisture_percent: f64,
    pub ph: f64,
    pub nitrogen_mg_kg: f64,
    pub phosphorus_mg_kg: f64,
    pub potassium_mg_kg: f64,
    pub conductivity_us_cm: f64,
}

impl SoilMeasurement {
    /// Decode a raw register block.
    ///
    /// Every field comes from a `u16`, so the result is always finite.
    pub fn from_registers(registers: &[u16]) -> Result<Self, DeviceError> {
        if registers.len() < REQUIRED_REGISTERS {
            return Err(DeviceError::ShortRead {
                expected: REQUIRED_REGISTERS,
                actual: registers.len(),
            });
        }
        let tenths = |idx: usize| f64::from(registers[idx]) / TENTHS;

        Ok(Self {
            temperature_c: tenths(REG_TEMPERATURE),
            moisture_percent: tenths(REG_MOISTURE),
            ph: tenths(REG_PH),
            nitrogen_mg_kg: tenths(REG_NITROGEN),
            phosphorus_mg_kg: tenths(REG_PHOSPHORUS),
            potassium_mg_kg: tenths(REG_POTASSIUM),
            conductivity_us_cm: f64::from(registers[REG_CONDUCTIVITY]),
        })
    }

    /// N/P/K levels in the form the dosage calculator consumes.
    pub fn nutrient_levels(&self) -> crate::dosage::NutrientLevels {
        crate::dosage::NutrientLevels {
            n: self.nitrogen_mg_kg,
            p: self.phosphorus_mg_kg,
            k: self.potassium_mg_kg,
        }
    }
}
