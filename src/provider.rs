use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AppError;

/// Geographic coordinates reported by the asset source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components exactly zero reads as "no location recorded".
    pub fn has_location(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    /// The asset no longer exists locally. Benign: the record can never be
    /// classified and is discarded with its page.
    #[error("asset no longer exists locally")]
    AssetMissing,
    /// Transient provider failure; the affected ID is skipped, never fatal.
    #[error(transparent)]
    Provider(#[from] AppError),
}

/// Resolves a local ID to the authoritative coordinates for that asset.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn lookup(&self, local_id: &str) -> Result<Coordinates, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_zero_is_no_location() {
        assert!(!Coordinates::new(0.0, 0.0).has_location());
    }

    #[test]
    fn either_nonzero_component_counts() {
        assert!(Coordinates::new(51.5, 0.0).has_location());
        assert!(Coordinates::new(0.0, -0.13).has_location());
        assert!(Coordinates::new(-33.9, 151.2).has_location());
    }
}
