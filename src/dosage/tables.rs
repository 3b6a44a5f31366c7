//! Agronomic reference tables.
//!
//! Three closed lookup tables drive the dosage calculation:
//! per-crop N/P/K recommendation ranges, per-fertilizer nutrient
//! content and per-soil efficiency factors.  A fourth maps crop names
//! onto the crop categories used by the fertilizer classifier.
//!
//! The built-in set is constructed once on first use and never mutated.
//! A JSON file of the same shape can replace it at startup.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recommended application ranges for one crop, e.g. `"100-120 kg/ha"`.
///
/// A missing nutrient falls back to a generic range in the calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRecommendationRange {
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(rename = "K", default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

/// Nutrient content of a fertilizer, percent by mass (0–100, may be 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilizerComposition {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

/// Fraction of applied nutrient that becomes available in a soil type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilEfficiencyFactors {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
}

impl SoilEfficiencyFactors {
    /// No correction; used for unrecognised soil types.
    pub const IDENTITY: Self = Self { n: 1.0, p: 1.0, k: 1.0 };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub crops: BTreeMap<String, CropRecommendationRange>,
    pub fertilizers: BTreeMap<String, FertilizerComposition>,
    pub soils: BTreeMap<String, SoilEfficiencyFactors>,
    #[serde(default)]
    pub crop_categories: BTreeMap<String, String>,
}

static BUILTIN: LazyLock<ReferenceTables> = LazyLock::new(ReferenceTables::build_builtin);

// (crop, N, P, K)
const CROP_RANGES: &[(&str, &str, &str, &str)] = &[
    ("rice", "100-120 kg/ha", "40-50 kg/ha", "40-60 kg/ha"),
    ("maize", "120-150 kg/ha", "50-60 kg/ha", "30-40 kg/ha"),
    ("chickpea", "20-30 kg/ha", "40-50 kg/ha", "20-30 kg/ha"),
    ("kidneybeans", "25-30 kg/ha", "50-60 kg/ha", "30-40 kg/ha"),
    ("pigeonpeas", "20-25 kg/ha", "40-50 kg/ha", "20-30 kg/ha"),
    ("mothbeans", "15-20 kg/ha", "30-40 kg/ha", "15-20 kg/ha"),
    ("mungbean", "20-25 kg/ha", "40-50 kg/ha", "20-30 kg/ha"),
    ("blackgram", "15-20 kg/ha", "30-40 kg/ha", "15-20 kg/ha"),
    ("lentil", "25-30 kg/ha", "40-50 kg/ha", "20-30 kg/ha"),
    ("pomegranate", "70-80 kg/ha", "30-40 kg/ha", "50-60 kg/ha"),
    ("banana", "150-180 kg/ha", "50-60 kg/ha", "150-200 kg/ha"),
    ("mango", "90-100 kg/ha", "30-40 kg/ha", "80-100 kg/ha"),
    ("grapes", "100-120 kg/ha", "30-40 kg/ha", "140-160 kg/ha"),
    ("watermelon", "70-80 kg/ha", "30-40 kg/ha", "70-80 kg/ha"),
    ("muskmelon", "70-80 kg/ha", "30-40 kg/ha", "70-80 kg/ha"),
    ("apple", "70-80 kg/ha", "30-40 kg/ha", "50-60 kg/ha"),
    ("orange", "80-90 kg/ha", "30-40 kg/ha", "60-70 kg/ha"),
    ("papaya", "90-100 kg/ha", "30-40 kg/ha", "90-100 kg/ha"),
    ("coconut", "90-100 kg/ha", "40-50 kg/ha", "100-120 kg/ha"),
    ("cotton", "70-80 kg/ha", "30-40 kg/ha", "30-40 kg/ha"),
    ("jute", "40-50 kg/ha", "20-30 kg/ha", "20-30 kg/ha"),
    ("coffee", "100-120 kg/ha", "30-40 kg/ha", "70-80 kg/ha"),
];

// (fertilizer, N%, P%, K%)
const FERTILIZERS: &[(&str, f64, f64, f64)] = &[
    ("Urea", 46.0, 0.0, 0.0),
    ("TSP", 0.0, 46.0, 0.0),
    ("Superphosphate", 0.0, 20.0, 0.0),
    ("Potassium sulfate", 0.0, 0.0, 50.0),
    ("Potassium chloride", 0.0, 0.0, 60.0),
    ("DAP", 18.0, 46.0, 0.0),
    ("28-28", 28.0, 28.0, 0.0),
    ("20-20", 20.0, 20.0, 0.0),
    ("17-17-17", 17.0, 17.0, 17.0),
    ("15-15-15", 15.0, 15.0, 15.0),
    ("14-35-14", 14.0, 35.0, 14.0),
    ("14-14-14", 14.0, 14.0, 14.0),
    ("10-26-26", 10.0, 26.0, 26.0),
    ("10-10-10", 10.0, 10.0, 10.0),
];

// (soil type, N, P, K)
const SOILS: &[(&str, f64, f64, f64)] = &[
    ("Sandy", 0.7, 0.5, 0.6),
    ("Clayey", 1.2, 1.1, 1.3),
    ("Red", 0.8, 0.7, 0.8),
    ("Black", 1.0, 1.0, 1.1),
    ("Loamy", 1.0, 1.0, 1.0),
    ("Clay", 1.2, 1.1, 1.3),
    ("Silt", 0.9, 0.8, 0.9),
    ("Peaty", 1.3, 0.7, 0.8),
    ("Chalky", 0.8, 1.2, 0.9),
];

// (crop, fertilizer-classifier crop category)
const CROP_CATEGORIES: &[(&str, &str)] = &[
    ("rice", "rice"),
    ("maize", "Maize"),
    ("chickpea", "Pulses"),
    ("kidneybeans", "kidneybeans"),
    ("pigeonpeas", "Pulses"),
    ("mothbeans", "Pulses"),
    ("mungbean", "Pulses"),
    ("blackgram", "Pulses"),
    ("lentil", "Pulses"),
    ("pomegranate", "pomegranate"),
    ("banana", "pomegranate"),
    ("mango", "pomegranate"),
    ("grapes", "pomegranate"),
    ("watermelon", "watermelon"),
    ("muskmelon", "watermelon"),
    ("apple", "pomegranate"),
    ("orange", "orange"),
    ("papaya", "pomegranate"),
    ("coconut", "Oil seeds"),
    ("cotton", "Cotton"),
    ("jute", "Cotton"),
    ("coffee", "coffee"),
];

impl ReferenceTables {
    /// The compiled-in tables.
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Load replacement tables from a JSON file and validate them.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading reference tables from {}", path.display()))?;
        let tables: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing reference tables in {}", path.display()))?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn crop(&self, name: &str) -> Option<&CropRecommendationRange> {
        self.crops.get(name)
    }

    pub fn fertilizer(&self, name: &str) -> Option<&FertilizerComposition> {
        self.fertilizers.get(name)
    }

    pub fn soil(&self, name: &str) -> Option<&SoilEfficiencyFactors> {
        self.soils.get(name)
    }

    /// Fertilizer-classifier category for a crop.  Matching is
    /// case-insensitive; unmapped crops map to their lowercased name.
    pub fn crop_category(&self, crop: &str) -> String {
        let lower = crop.to_lowercase();
        match self.crop_categories.get(&lower) {
            Some(category) => category.clone(),
            None => lower,
        }
    }

    /// Compositions must be percentages and efficiency factors positive.
    pub fn validate(&self) -> Result<()> {
        for c in self.fertilizers.values() {
            if [c.n, c.p, c.k].iter().any(|v| !v.is_finite() || !(0.0..=100.0).contains(v)) {
                return Err(Error::Config("fertilizer content must be 0..=100 percent"));
            }
        }
        for s in self.soils.values() {
            if [s.n, s.p, s.k].iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(Error::Config("efficiency factors must be positive"));
            }
        }
        Ok(())
    }

    fn build_builtin() -> Self {
        let crops = CROP_RANGES
            .iter()
            .map(|&(crop, n, p, k)| {
                let range = CropRecommendationRange {
                    n: Some(n.to_owned()),
                    p: Some(p.to_owned()),
                    k: Some(k.to_owned()),
                };
                (crop.to_owned(), range)
            })
            .collect();
        let fertilizers = FERTILIZERS
            .iter()
            .map(|&(name, n, p, k)| (name.to_owned(), FertilizerComposition { n, p, k }))
            .collect();
        let soils = SOILS
            .iter()
            .map(|&(name, n, p, k)| (name.to_owned(), SoilEfficiencyFactors { n, p, k }))
            .collect();
        let crop_categories = CROP_CATEGORIES
            .iter()
            .map(|&(crop, category)| (crop.to_owned(), category.to_owned()))
            .collect();

        Self {
            crops,
            fertilizers,
            soils,
            crop_categories,
        }
    }
}
