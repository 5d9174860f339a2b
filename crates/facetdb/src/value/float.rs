use serde::{Deserialize, Deserializer, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};
use thiserror::Error as ThisError;

///
/// Float64
///
/// Finite f64 only; -0.0 canonically stored as 0.0
///

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Float64(f64);

impl Float64 {
    /// Fallible constructor that rejects non-finite values and normalizes -0.0.
    #[must_use]
    pub fn try_new(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }

        // canonicalize -0.0 to 0.0 so Eq/Hash/Ord are consistent
        Some(Self(if v == 0.0 { 0.0 } else { v }))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

///
/// Float64Error
///

#[derive(Debug, ThisError)]
pub enum Float64Error {
    #[error("non-finite float64 value")]
    NonFinite,
}

impl TryFrom<f64> for Float64 {
    type Error = Float64Error;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::try_new(v).ok_or(Float64Error::NonFinite)
    }
}

impl fmt::Display for Float64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Float64 {}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        // finite-only payloads make partial_cmp total
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

impl Hash for Float64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl<'de> Deserialize<'de> for Float64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Self::try_new(raw).ok_or_else(|| serde::de::Error::custom("non-finite float64 payload"))
    }
}
