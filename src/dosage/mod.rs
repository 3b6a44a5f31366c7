//! Fertilizer dosage calculation.
//!
//! For a crop, a fertilizer, a soil type and the current N/P/K levels:
//!
//! 1. take the midpoint of the crop's recommended range per nutrient,
//! 2. divide by the soil efficiency factor (lossy soils need more),
//! 3. subtract what the soil already holds (never below zero),
//! 4. convert each deficit into fertilizer mass via its nutrient content,
//! 5. the most limiting nutrient sets the rate, floored at a minimum.
//!
//! The calculator never fails: unknown crops or fertilizers and any
//! numeric problem produce the configured fallback rate instead.
//! Nutrient levels (mg/kg) are compared directly with kg/ha targets.

pub mod tables;

use core::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::error::DosageError;
pub use tables::{
    CropRecommendationRange, FertilizerComposition, ReferenceTables, SoilEfficiencyFactors,
};

const UNIT_SUFFIX: &str = "kg/ha";

const DEFAULT_N_RANGE: &str = "50-100";
const DEFAULT_P_RANGE: &str = "30-50";
const DEFAULT_K_RANGE: &str = "30-50";

/// Current soil nutrient concentration, mg/kg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientLevels {
    #[serde(rename = "N", default)]
    pub n: f64,
    #[serde(rename = "P", default)]
    pub p: f64,
    #[serde(rename = "K", default)]
    pub k: f64,
}

/// How a recommendation's amount was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageBasis {
    /// Full deficit calculation.
    Computed,
    /// Crop not in the recommendation table.
    UnknownCrop,
    /// Fertilizer not in the composition table.
    UnknownFertilizer,
    /// A calculation step failed.
    CalculationFailed,
}

impl DosageBasis {
    pub fn is_fallback(self) -> bool {
        self != Self::Computed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageRecommendation {
    pub fertilizer: String,
    pub amount_kg_per_ha: f64,
    pub basis: DosageBasis,
}

impl fmt::Display for DosageRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Apply {:.2} kg/ha of {}", self.amount_kg_per_ha, self.fertilizer)
    }
}

/// Midpoint of a `"<low>-<high> kg/ha"` range, or the value of a bare
/// `"<n> kg/ha"`.  Bounds must be integers; the unit suffix is optional.
pub fn parse_range(text: &str) -> Result<f64, DosageError> {
    let stripped = text.replace(UNIT_SUFFIX, "");
    let value = stripped.trim();
    let int = |part: &str| {
        part.trim()
            .parse::<i64>()
            .map(|v| v as f64)
            .map_err(|_| DosageError::UnparsableRange(text.to_owned()))
    };

    match value.split_once('-') {
        Some((low, high)) => Ok((int(low)? + int(high)?) / 2.0),
        None => int(value),
    }
}

/// Per-nutrient working values.
#[derive(Debug, Clone, Copy)]
struct Npk {
    n: f64,
    p: f64,
    k: f64,
}

/// Dosage engine bound to a set of reference tables.
pub struct DosageCalculator<'a> {
    tables: &'a ReferenceTables,
    fallback_kg_per_ha: f64,
    min_kg_per_ha: f64,
}

impl DosageCalculator<'static> {
    /// Built-in tables with the default fallback and floor.
    pub fn builtin() -> Self {
        Self::new(ReferenceTables::builtin(), &SystemConfig::default())
    }
}

impl<'a> DosageCalculator<'a> {
    pub fn new(tables: &'a ReferenceTables, config: &SystemConfig) -> Self {
        Self {
            tables,
            fallback_kg_per_ha: config.fallback_dosage_kg_per_ha,
            min_kg_per_ha: config.min_dosage_kg_per_ha,
        }
    }

    pub fn tables(&self) -> &'a ReferenceTables {
        self.tables
    }

    /// Recommended rate in kg/ha.  Always finite and at least the floor,
    /// or exactly the fallback rate.
    pub fn compute_dosage(
        &self,
        crop: &str,
        levels: &NutrientLevels,
        fertilizer: &str,
        soil_type: &str,
    ) -> f64 {
        self.recommend(crop, levels, fertilizer, soil_type).amount_kg_per_ha
    }

    /// [`compute_dosage`](Self::compute_dosage) plus the fertilizer it refers
    /// to and whether a fallback was used.
    pub fn recommend(
        &self,
        crop: &str,
        levels: &NutrientLevels,
        fertilizer: &str,
        soil_type: &str,
    ) -> DosageRecommendation {
        let (amount_kg_per_ha, basis) = match self.calculate(crop, levels, fertilizer, soil_type) {
            Ok(Some(amount)) => (amount, DosageBasis::Computed),
            Ok(None) if self.tables.crop(crop).is_none() => {
                warn!("DOSAGE | unknown crop {crop:?}, using fallback");
                (self.fallback_kg_per_ha, DosageBasis::UnknownCrop)
            }
            Ok(None) => {
                warn!("DOSAGE | unknown fertilizer {fertilizer:?}, using fallback");
                (self.fallback_kg_per_ha, DosageBasis::UnknownFertilizer)
            }
            Err(e) => {
                warn!("DOSAGE | calculation failed ({e}), using fallback");
                (self.fallback_kg_per_ha, DosageBasis::CalculationFailed)
            }
        };

        DosageRecommendation {
            fertilizer: fertilizer.to_owned(),
            amount_kg_per_ha,
            basis,
        }
    }

    /// `Ok(None)` when the crop or fertilizer is not in the tables.
    fn calculate(
        &self,
        crop: &str,
        levels: &NutrientLevels,
        fertilizer: &str,
        soil_type: &str,
    ) -> Result<Option<f64>, DosageError> {
        let Some(range) = self.tables.crop(crop) else {
            return Ok(None);
        };

        let target = Npk {
            n: parse_range(range.n.as_deref().unwrap_or(DEFAULT_N_RANGE))?,
            p: parse_range(range.p.as_deref().unwrap_or(DEFAULT_P_RANGE))?,
            k: parse_range(range.k.as_deref().unwrap_or(DEFAULT_K_RANGE))?,
        };

        let Some(content) = self.tables.fertilizer(fertilizer) else {
            return Ok(None);
        };

        let efficiency = match self.tables.soil(soil_type) {
            Some(factors) => *factors,
            None => {
                debug!("DOSAGE | unknown soil {soil_type:?}, no efficiency correction");
                SoilEfficiencyFactors::IDENTITY
            }
        };

        // An infinite level just clears the deficit; NaN has no ordering.
        if [levels.n, levels.p, levels.k].iter().any(|v| v.is_nan()) {
            return Err(DosageError::NonFinite("nutrient level"));
        }

        let adjusted = Npk {
            n: adjust(target.n, efficiency.n, "N")?,
            p: adjust(target.p, efficiency.p, "P")?,
            k: adjust(target.k, efficiency.k, "K")?,
        };

        let deficit = Npk {
            n: (adjusted.n - levels.n).max(0.0),
            p: (adjusted.p - levels.p).max(0.0),
            k: (adjusted.k - levels.k).max(0.0),
        };

        let amount = Npk {
            n: mass_needed(deficit.n, content.n),
            p: mass_needed(deficit.p, content.p),
            k: mass_needed(deficit.k, content.k),
        };

        let rate = amount.n.max(amount.p).max(amount.k).max(self.min_kg_per_ha);
        if !rate.is_finite() {
            return Err(DosageError::NonFinite("dosage"));
        }

        debug!(
            "DOSAGE | {crop}/{fertilizer}/{soil_type} | deficit N={:.1} P={:.1} K={:.1} | \
             amount N={:.1} P={:.1} K={:.1} | rate={:.2}",
            deficit.n, deficit.p, deficit.k, amount.n, amount.p, amount.k, rate
        );
        Ok(Some(rate))
    }
}

fn adjust(target: f64, factor: f64, nutrient: &'static str) -> Result<f64, DosageError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(DosageError::InvalidEfficiency(nutrient));
    }
    Ok(target / factor)
}

/// Fertilizer mass (kg/ha) supplying `deficit` at `content_percent`.
/// A nutrient the fertilizer does not contain contributes nothing.
fn mass_needed(deficit: f64, content_percent: f64) -> f64 {
    if content_percent > 0.0 {
        deficit * 100.0 / content_percent
    } else {
        0.0
    }
}
