//! Location sample domain model.
//!
//! # Responsibility
//! - Define the raw position record reported by the platform location provider.
//! - Define the persisted and remote-document projections of accepted samples.
//!
//! # Invariants
//! - Coordinates are finite; latitude is within [-90, 90] and longitude
//!   within [-180, 180].
//! - `accuracy_m`, when present, is finite and non-negative.
//! - Deserialized samples pass the same validation as constructed ones.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a persisted location document.
pub type LocationId = Uuid;

/// Validation error for location sample invariants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValidationError {
    /// Latitude or longitude is NaN or infinite.
    NonFiniteCoordinate,
    /// Latitude is outside [-90, 90].
    LatitudeOutOfRange(f64),
    /// Longitude is outside [-180, 180].
    LongitudeOutOfRange(f64),
    /// Accuracy radius is negative, NaN or infinite.
    InvalidAccuracy(f64),
}

impl Display for SampleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCoordinate => write!(f, "coordinates must be finite"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude ({value}) must be within [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude ({value}) must be within [-180, 180]")
            }
            Self::InvalidAccuracy(value) => {
                write!(f, "accuracy_m ({value}) must be finite and >= 0")
            }
        }
    }
}

impl Error for SampleValidationError {}

/// A plain WGS84 coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns whether this is the provider's "no fix" sentinel (exactly 0, 0).
    pub fn is_no_fix(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    /// Formats as `"<lat>, <lon>"` with six decimals.
    pub fn format_coordinates(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// One device position as delivered by the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocationSample")]
pub struct LocationSample {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Horizontal accuracy radius in meters, when the provider reports one.
    pub accuracy_m: Option<f64>,
    /// Unix epoch milliseconds at which the fix was captured.
    pub captured_at_ms: i64,
}

#[derive(Deserialize)]
struct RawLocationSample {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy_m: Option<f64>,
    captured_at_ms: i64,
}

impl TryFrom<RawLocationSample> for LocationSample {
    type Error = SampleValidationError;

    fn try_from(raw: RawLocationSample) -> Result<Self, Self::Error> {
        Self::new(
            raw.latitude,
            raw.longitude,
            raw.accuracy_m,
            raw.captured_at_ms,
        )
    }
}

impl LocationSample {
    /// Creates a validated sample.
    ///
    /// # Errors
    /// - Returns `SampleValidationError` when coordinates or accuracy are
    ///   outside their physical ranges.
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy_m: Option<f64>,
        captured_at_ms: i64,
    ) -> Result<Self, SampleValidationError> {
        let sample = Self {
            latitude,
            longitude,
            accuracy_m,
            captured_at_ms,
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Checks range invariants without consuming the sample.
    pub fn validate(&self) -> Result<(), SampleValidationError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(SampleValidationError::NonFiniteCoordinate);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SampleValidationError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SampleValidationError::LongitudeOutOfRange(self.longitude));
        }
        if let Some(accuracy) = self.accuracy_m {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(SampleValidationError::InvalidAccuracy(accuracy));
            }
        }
        Ok(())
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A sample as stored in the local `locations` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLocation {
    pub id: LocationId,
    pub latitude: f64,
    pub longitude: f64,
    /// Capture time in Unix epoch milliseconds.
    pub timestamp_ms: i64,
    /// Set once the remote document store acknowledged the upload.
    pub synced_at_ms: Option<i64>,
}

impl StoredLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn is_synced(&self) -> bool {
        self.synced_at_ms.is_some()
    }

    pub fn to_document(&self) -> LocationDocument {
        LocationDocument {
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp_ms,
        }
    }
}

/// Remote document shape: exactly three fields, no schema enforcement
/// on the store side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationDocument {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}
