//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (rendered by `env_logger` in the CLI).
//! A UI or telemetry adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::DiscoveryFailed(error) => {
                warn!("DISCOVER | failed: {}", error);
            }
            AppEvent::EndpointsDiscovered(n) => {
                info!("DISCOVER | {} endpoint(s)", n);
            }
            AppEvent::AttemptFailed { endpoint, error } => {
                warn!("ATTEMPT | {} ({}) failed: {}", endpoint.name, endpoint.description, error);
            }
            AppEvent::MeasurementAcquired { endpoint, measurement: m } => {
                info!(
                    "READ | {} | T={:.1}\u{00b0}C | moisture={:.1}% | pH={:.1} | \
                     N={:.1} P={:.1} K={:.1} mg/kg | EC={:.0}\u{00b5}S/cm",
                    endpoint,
                    m.temperature_c,
                    m.moisture_percent,
                    m.ph,
                    m.nitrogen_mg_kg,
                    m.phosphorus_mg_kg,
                    m.potassium_mg_kg,
                    m.conductivity_us_cm,
                );
            }
            AppEvent::AcquisitionFailed { attempts } => {
                warn!("READ | all {} endpoint(s) failed", attempts);
            }
            AppEvent::ReadingsTooLow(m) => {
                warn!(
                    "CHECK | readings near zero (N={:.1} P={:.1} K={:.1} moisture={:.1}%)",
                    m.nitrogen_mg_kg, m.phosphorus_mg_kg, m.potassium_mg_kg, m.moisture_percent
                );
            }
            AppEvent::ReadingImplausible(reason) => {
                warn!("CHECK | rejected: {}", reason);
            }
            AppEvent::DosageRecommended(rec) => {
                info!("DOSAGE | {} | basis={:?}", rec, rec.basis);
            }
        }
    }
}
