//! Insertion plausibility checks.
//!
//! A probe held in the air, in a hand or half inserted still answers on
//! the bus, so a successful read says nothing about whether it is in
//! soil.  Two layers guard against that:
//!
//! 1. **Coarse check** ([`PlausibilityCheck::readings_too_low`]): every one
//!    of N, P, K and moisture below the airborne threshold means the probe
//!    is not touching anything conductive.
//! 2. **Fine check** ([`PlausibilityCheck::classify`]): pH and moisture
//!    ranges that skin contact or partial insertion produce.
//!
//! Exact zeros are inconclusive in the fine check: a 0.0 pH is a sensor
//! fault and a 0.0 moisture means the sensor has not sampled yet, and
//! neither is taken as evidence against insertion.

use core::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::sensors::SoilMeasurement;

/// Why a reading was judged implausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidReason {
    /// pH lower than natural soils produce (skin reads 0–2).
    PhNotPlausible,
    /// Moisture in the range hand contact produces.
    MoistureTooLow,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhNotPlausible => write!(f, "pH not plausible for soil"),
            Self::MoistureTooLow => write!(f, "moisture too low for an inserted probe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidityVerdict {
    Valid,
    Invalid(InvalidReason),
}

impl ValidityVerdict {
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Threshold set for both checks.
#[derive(Debug, Clone, Copy)]
pub struct PlausibilityCheck {
    min_ph: f64,
    min_moisture_percent: f64,
    airborne_threshold: f64,
}

impl Default for PlausibilityCheck {
    fn default() -> Self {
        Self::new(&SystemConfig::default())
    }
}

impl PlausibilityCheck {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            min_ph: config.min_plausible_ph,
            min_moisture_percent: config.min_inserted_moisture_percent,
            airborne_threshold: config.airborne_threshold,
        }
    }

    /// pH first, then moisture; the first failing rule is reported.
    #[allow(clippy::float_cmp)]
    pub fn classify(&self, m: &SoilMeasurement) -> ValidityVerdict {
        if m.ph < self.min_ph && m.ph != 0.0 {
            warn!("PLAUSIBILITY | non-soil pH {:.1}", m.ph);
            return ValidityVerdict::Invalid(InvalidReason::PhNotPlausible);
        }
        if m.moisture_percent > 0.0 && m.moisture_percent < self.min_moisture_percent {
            warn!("PLAUSIBILITY | low moisture {:.1}%", m.moisture_percent);
            return ValidityVerdict::Invalid(InvalidReason::MoistureTooLow);
        }
        ValidityVerdict::Valid
    }

    /// True when N, P, K and moisture all sit below the airborne threshold.
    pub fn readings_too_low(&self, m: &SoilMeasurement) -> bool {
        [
            m.nitrogen_mg_kg,
            m.phosphorus_mg_kg,
            m.potassium_mg_kg,
            m.moisture_percent,
        ]
        .iter()
        .all(|&v| v < self.airborne_threshold)
    }
}

/// [`PlausibilityCheck::classify`] with the default thresholds.
pub fn classify_validity(m: &SoilMeasurement) -> ValidityVerdict {
    PlausibilityCheck::default().classify(m)
}
