//! Results of the acquisition and soil-check operations.
//!
//! Acquisition failures are always surfaced to the caller; nothing here
//! is defaulted.  Each failure carries a user-facing message telling the
//! operator what to do next.

use crate::app::ports::SerialEndpointDescriptor;
use crate::error::DeviceError;
use crate::sensors::SoilMeasurement;
use crate::validity::InvalidReason;

/// One endpoint the probe loop tried and gave up on.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFailure {
    pub endpoint: SerialEndpointDescriptor,
    pub error: DeviceError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionOutcome {
    Success(SoilMeasurement),
    /// Discovery returned no candidate endpoints.
    NoEndpointsFound,
    /// Endpoints exist but none produced a reading; one entry per attempt,
    /// in probe order.
    AllEndpointsFailed(Vec<EndpointFailure>),
    /// Discovery itself failed.
    DeviceError(String),
}

impl AcquisitionOutcome {
    pub fn measurement(&self) -> Option<&SoilMeasurement> {
        match self {
            Self::Success(m) => Some(m),
            _ => None,
        }
    }

    /// Operator guidance; `None` on success.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Success(_) => None,
            Self::NoEndpointsFound => {
                Some("No serial ports found. Please connect your soil sensor device.".into())
            }
            Self::AllEndpointsFailed(failures) => Some(format!(
                "Could not connect to soil sensor on any of {} port(s). \
                 Please check that the sensor is properly connected and powered.",
                failures.len()
            )),
            Self::DeviceError(msg) => Some(format!("Sensor detection error: {msg}")),
        }
    }
}

/// Acquisition followed by both plausibility layers.
#[derive(Debug, Clone, PartialEq)]
pub enum SoilCheck {
    /// Probe is inserted and the reading can be used.
    Ready(SoilMeasurement),
    /// N, P, K and moisture all near zero: probe is in the air.
    ReadingsTooLow(SoilMeasurement),
    /// Reading failed a fine plausibility rule.
    Implausible(SoilMeasurement, InvalidReason),
    /// No reading was obtained.
    Unavailable(AcquisitionOutcome),
}

impl SoilCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Operator guidance; `None` when ready.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Ready(_) => None,
            Self::ReadingsTooLow(_) => Some(
                "Sensor readings too low. Please ensure sensor is inserted in soil.".into(),
            ),
            Self::Implausible(..) => Some(
                "Sensor appears to be not inserted correctly into the soil. \
                 Please insert fully into soil."
                    .into(),
            ),
            Self::Unavailable(outcome) => outcome
                .user_message()
                .map(|msg| format!("Sensor error: {msg}")),
        }
    }
}
