#![forbid(unsafe_code)]
mod cache;
mod coordinates;
mod country;
pub mod csv;
pub mod encoding;
pub mod geocoder;
mod markers;
mod model;
mod resolver;
mod stats;

pub use cache::{Lookup, ResolutionCache};
pub use coordinates::CountryCoordinates;
pub use country::normalize;
pub use encoding::{encode, Color, Encoding, Scale};
pub use geocoder::GeocodingService;
pub use markers::*;
pub use model::*;
pub use resolver::Resolver;
pub use stats::Statistics;

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns [`Coordinates`] if the pair is usable as a remote lookup result.
    /// Non-finite values and pairs where any component is exactly zero are rejected,
    /// since services use `0` to signal "no data".
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && latitude != 0.0
            && longitude != 0.0;
        valid.then_some(Self::new(latitude, longitude))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}
