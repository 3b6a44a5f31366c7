//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the configuration, the plausibility thresholds and
//! the dosage calculator.  It exposes a hardware-agnostic API; all I/O
//! flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!  ProbePort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │         AppService           │
//!                │  probe loop · validity ·     │
//!                │  dosage                      │
//!                └─────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::dosage::{DosageCalculator, DosageRecommendation, NutrientLevels, ReferenceTables};
use crate::error::DeviceError;
use crate::sensors::SoilMeasurement;
use crate::validity::{PlausibilityCheck, ValidityVerdict};

use super::events::AppEvent;
use super::outcome::{AcquisitionOutcome, EndpointFailure, SoilCheck};
use super::ports::{EventSink, LinkSettings, ProbePort, SerialEndpointDescriptor};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<'a> {
    config: SystemConfig,
    plausibility: PlausibilityCheck,
    dosage: DosageCalculator<'a>,
}

impl<'a> AppService<'a> {
    pub fn new(config: SystemConfig, tables: &'a ReferenceTables) -> Self {
        let plausibility = PlausibilityCheck::new(&config);
        let dosage = DosageCalculator::new(tables, &config);
        Self {
            config,
            plausibility,
            dosage,
        }
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Acquisition ───────────────────────────────────────────

    /// Enumerate candidate endpoints (diagnostics / port listing).
    pub fn list_endpoints(
        &self,
        probe: &mut impl ProbePort,
    ) -> Result<Vec<SerialEndpointDescriptor>, DeviceError> {
        probe.discover()
    }

    /// One read transaction against one endpoint, no retry.
    pub fn attempt_read(
        &self,
        probe: &mut impl ProbePort,
        endpoint: &SerialEndpointDescriptor,
    ) -> Result<SoilMeasurement, DeviceError> {
        let link = LinkSettings::from_config(&self.config)?;
        let registers = probe.read_registers(endpoint, &link)?;
        SoilMeasurement::from_registers(&registers)
    }

    /// Read a named port without enumerating (bench checks, `--port`).
    pub fn read_port(
        &self,
        probe: &mut impl ProbePort,
        name: &str,
    ) -> Result<SoilMeasurement, DeviceError> {
        self.attempt_read(probe, &named_endpoint(name))
    }

    /// Probe every discovered endpoint in order until one answers.
    pub fn acquire_measurement(
        &self,
        probe: &mut impl ProbePort,
        sink: &mut impl EventSink,
    ) -> AcquisitionOutcome {
        let endpoints = match probe.discover() {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!("Port discovery failed: {e}");
                sink.emit(&AppEvent::DiscoveryFailed(e.clone()));
                return AcquisitionOutcome::DeviceError(e.to_string());
            }
        };

        sink.emit(&AppEvent::EndpointsDiscovered(endpoints.len()));
        if endpoints.is_empty() {
            warn!("No serial ports found");
            return AcquisitionOutcome::NoEndpointsFound;
        }

        let mut failures = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            info!("Trying {} ({})", endpoint.name, endpoint.description);
            match self.attempt_read(probe, &endpoint) {
                Ok(measurement) => {
                    sink.emit(&AppEvent::MeasurementAcquired {
                        endpoint: endpoint.name.clone(),
                        measurement,
                    });
                    return AcquisitionOutcome::Success(measurement);
                }
                Err(error) => {
                    warn!("Failed on {}: {error}", endpoint.name);
                    sink.emit(&AppEvent::AttemptFailed {
                        endpoint: endpoint.clone(),
                        error: error.clone(),
                    });
                    failures.push(EndpointFailure { endpoint, error });
                }
            }
        }

        sink.emit(&AppEvent::AcquisitionFailed {
            attempts: failures.len(),
        });
        AcquisitionOutcome::AllEndpointsFailed(failures)
    }

    /// Acquire, then apply the coarse airborne check and the fine
    /// plausibility rules.
    pub fn check_soil(&self, probe: &mut impl ProbePort, sink: &mut impl EventSink) -> SoilCheck {
        let measurement = match self.acquire_measurement(probe, sink) {
            AcquisitionOutcome::Success(m) => m,
            other => return SoilCheck::Unavailable(other),
        };
        self.assess(&measurement, sink)
    }

    /// [`check_soil`](Self::check_soil) against one named port.
    pub fn check_port(
        &self,
        probe: &mut impl ProbePort,
        name: &str,
        sink: &mut impl EventSink,
    ) -> SoilCheck {
        let endpoint = named_endpoint(name);
        match self.attempt_read(probe, &endpoint) {
            Ok(measurement) => {
                sink.emit(&AppEvent::MeasurementAcquired {
                    endpoint: endpoint.name,
                    measurement,
                });
                self.assess(&measurement, sink)
            }
            Err(error) => {
                warn!("Failed on {name}: {error}");
                sink.emit(&AppEvent::AttemptFailed {
                    endpoint: endpoint.clone(),
                    error: error.clone(),
                });
                SoilCheck::Unavailable(AcquisitionOutcome::AllEndpointsFailed(vec![
                    EndpointFailure { endpoint, error },
                ]))
            }
        }
    }

    /// Plausibility layers only, for a measurement obtained elsewhere.
    pub fn assess(&self, measurement: &SoilMeasurement, sink: &mut impl EventSink) -> SoilCheck {
        if self.plausibility.readings_too_low(measurement) {
            warn!("All sensor readings near zero, probe likely not in soil");
            sink.emit(&AppEvent::ReadingsTooLow(*measurement));
            return SoilCheck::ReadingsTooLow(*measurement);
        }
        match self.plausibility.classify(measurement) {
            ValidityVerdict::Valid => SoilCheck::Ready(*measurement),
            ValidityVerdict::Invalid(reason) => {
                sink.emit(&AppEvent::ReadingImplausible(reason));
                SoilCheck::Implausible(*measurement, reason)
            }
        }
    }

    // ── Dosage ────────────────────────────────────────────────

    /// Recommended rate in kg/ha; never fails.
    pub fn compute_dosage(
        &self,
        crop: &str,
        levels: &NutrientLevels,
        fertilizer: &str,
        soil_type: &str,
    ) -> f64 {
        self.dosage.compute_dosage(crop, levels, fertilizer, soil_type)
    }

    pub fn recommend(
        &self,
        crop: &str,
        levels: &NutrientLevels,
        fertilizer: &str,
        soil_type: &str,
        sink: &mut impl EventSink,
    ) -> DosageRecommendation {
        let rec = self.dosage.recommend(crop, levels, fertilizer, soil_type);
        sink.emit(&AppEvent::DosageRecommended(rec.clone()));
        rec
    }

    /// Fertilizer-classifier crop category for a predicted crop.
    pub fn crop_category(&self, crop: &str) -> String {
        self.dosage.tables().crop_category(crop)
    }
}

fn named_endpoint(name: &str) -> SerialEndpointDescriptor {
    SerialEndpointDescriptor {
        name: name.to_owned(),
        description: "selected by name".into(),
    }
}
