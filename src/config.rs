//! System configuration parameters
//!
//! All tunable parameters for the soil probe engine.
//! Defaults match the probe's fixed Modbus settings and the field-tested
//! plausibility thresholds; a JSON file may override them.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Serial link ---
    /// Line speed in baud
    pub baud_rate: u32,
    /// Modbus slave address of the probe
    pub slave_address: u8,
    /// Per-attempt response timeout (milliseconds)
    pub timeout_ms: u64,
    /// First holding register to read
    pub register_start: u16,
    /// Number of consecutive registers to read
    pub register_count: u16,

    // --- Plausibility ---
    /// pH below this (and non-zero) means the probe is not in soil
    pub min_plausible_ph: f64,
    /// Moisture (%) below this (and non-zero) means the probe is not inserted
    pub min_inserted_moisture_percent: f64,
    /// N, P, K and moisture all below this means the probe is in air
    pub airborne_threshold: f64,

    // --- Dosage ---
    /// Rate returned when the calculation cannot be carried out (kg/ha)
    pub fallback_dosage_kg_per_ha: f64,
    /// Minimum viable application rate (kg/ha)
    pub min_dosage_kg_per_ha: f64,
    /// Optional JSON file replacing the built-in reference tables
    pub tables_path: Option<PathBuf>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Serial link: 9600 8N1, slave 1, 14 registers from 0
            baud_rate: 9600,
            slave_address: 1,
            timeout_ms: 1000,
            register_start: 0,
            register_count: 14,

            // Plausibility
            min_plausible_ph: 3.0,
            min_inserted_moisture_percent: 15.0,
            airborne_threshold: 1.0,

            // Dosage
            fallback_dosage_kg_per_ha: 100.0,
            min_dosage_kg_per_ha: 50.0,
            tables_path: None,
        }
    }
}

impl SystemConfig {
    /// Per-attempt timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be non-zero"));
        }
        if self.slave_address == 0 || self.slave_address > 247 {
            return Err(ConfigError::ValidationFailed("slave_address must be 1..=247"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("timeout_ms must be non-zero"));
        }
        if self.register_count == 0 || self.register_count > crate::modbus::MAX_READ_REGISTERS as u16 {
            return Err(ConfigError::ValidationFailed("register_count must be 1..=125"));
        }
        if self.register_count < crate::sensors::REQUIRED_REGISTERS as u16 {
            return Err(ConfigError::ValidationFailed(
                "register_count too small to decode a measurement",
            ));
        }
        if !self.min_plausible_ph.is_finite() || !(0.0..=14.0).contains(&self.min_plausible_ph) {
            return Err(ConfigError::ValidationFailed("min_plausible_ph must be 0..=14"));
        }
        if !self.min_inserted_moisture_percent.is_finite()
            || !(0.0..=100.0).contains(&self.min_inserted_moisture_percent)
        {
            return Err(ConfigError::ValidationFailed(
                "min_inserted_moisture_percent must be 0..=100",
            ));
        }
        if !self.airborne_threshold.is_finite() || self.airborne_threshold < 0.0 {
            return Err(ConfigError::ValidationFailed("airborne_threshold must be >= 0"));
        }
        if !self.min_dosage_kg_per_ha.is_finite() || self.min_dosage_kg_per_ha < 0.0 {
            return Err(ConfigError::ValidationFailed("min_dosage_kg_per_ha must be >= 0"));
        }
        if !self.fallback_dosage_kg_per_ha.is_finite() || self.fallback_dosage_kg_per_ha < 0.0 {
            return Err(ConfigError::ValidationFailed("fallback_dosage_kg_per_ha must be >= 0"));
        }
        Ok(())
    }
}
