//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to the console, collect them in
//! tests, forward them to a UI.

use crate::app::ports::SerialEndpointDescriptor;
use crate::dosage::DosageRecommendation;
use crate::error::DeviceError;
use crate::sensors::SoilMeasurement;
use crate::validity::InvalidReason;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Serial port enumeration itself failed.
    DiscoveryFailed(DeviceError),

    /// Discovery finished with this many candidate endpoints.
    EndpointsDiscovered(usize),

    /// One endpoint failed; the probe loop moves on.
    AttemptFailed {
        endpoint: SerialEndpointDescriptor,
        error: DeviceError,
    },

    /// A reading was decoded from this endpoint.
    MeasurementAcquired {
        endpoint: String,
        measurement: SoilMeasurement,
    },

    /// Every discovered endpoint failed.
    AcquisitionFailed { attempts: usize },

    /// Every nutrient and moisture reads near zero.
    ReadingsTooLow(SoilMeasurement),

    /// The reading failed a plausibility rule.
    ReadingImplausible(InvalidReason),

    /// A dosage recommendation was produced.
    DosageRecommended(DosageRecommendation),
}
