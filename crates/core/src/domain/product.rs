use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The configurable product a customer asks a quote for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Tipping-body truck configuration.
    Damper,
    /// Trailer.
    Dorse,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [ProductType::Damper, ProductType::Dorse];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Damper => "damper",
            Self::Dorse => "dorse",
        }
    }

    /// Brand, model and cargo type only describe a damper build.
    pub fn has_chassis_details(&self) -> bool {
        matches!(self, Self::Damper)
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "damper" => Ok(Self::Damper),
            "dorse" => Ok(Self::Dorse),
            other => Err(DomainError::UnsupportedProductType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "pesin")]
    Upfront,
    #[serde(rename = "vadeli")]
    Deferred,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Upfront, PaymentMethod::Deferred];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upfront => "pesin",
            Self::Deferred => "vadeli",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pesin" | "upfront" => Ok(Self::Upfront),
            "vadeli" | "deferred" => Ok(Self::Deferred),
            other => Err(DomainError::UnsupportedPaymentMethod(other.to_string())),
        }
    }
}
