use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductType;
use crate::errors::DomainError;

pub const UNSPECIFIED_PAYMENT_METHOD: &str = "unspecified";
pub const DEFAULT_QUANTITY: &str = "1";

/// Time-derived quote identifier, serialized as a plain JSON number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub i64);

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuoteId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(QuoteId)
    }
}

/// Hands out millisecond timestamps as ids, bumping by one when two requests
/// land in the same millisecond so ids stay unique and increasing.
#[derive(Debug, Default)]
pub struct QuoteIdGenerator {
    last: AtomicI64,
}

impl QuoteIdGenerator {
    pub fn starting_after(id: QuoteId) -> Self {
        Self { last: AtomicI64::new(id.0) }
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> QuoteId {
        let candidate = now.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        QuoteId(candidate.max(previous.saturating_add(1)))
    }
}

/// Incoming quote payload. Everything is optional at the type level so that
/// presence checks report every missing field instead of failing on the first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub cargo_type: Option<String>,
    pub thickness: Option<String>,
    pub volume_m3: Option<String>,
    pub quantity: Option<String>,
    pub company_name: Option<String>,
    pub contact_phone: Option<String>,
    pub email: Option<String>,
    pub contact_person: Option<String>,
    pub payment_method: Option<String>,
    pub heard_from: Option<String>,
}

/// A request that passed presence validation and is ready to be stamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidQuoteRequest {
    product_type: ProductType,
    request: QuoteRequest,
}

impl QuoteRequest {
    pub fn validate(self) -> Result<ValidQuoteRequest, DomainError> {
        let required = [
            ("type", &self.product_type),
            ("companyName", &self.company_name),
            ("contactPhone", &self.contact_phone),
            ("email", &self.email),
            ("contactPerson", &self.contact_person),
        ];
        let missing: Vec<&'static str> =
            required.iter().filter(|(_, value)| present(value).is_none()).map(|(name, _)| *name).collect();
        if !missing.is_empty() {
            return Err(DomainError::MissingRequiredFields { fields: missing });
        }

        let product_type = present(&self.product_type).unwrap_or_default().parse::<ProductType>()?;
        Ok(ValidQuoteRequest { product_type, request: self })
    }
}

impl ValidQuoteRequest {
    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Stamps the request into an immutable record, dropping chassis details
    /// that do not apply to the selected product.
    pub fn into_record(self, id: QuoteId, created_at: DateTime<Utc>) -> QuoteRecord {
        let Self { product_type, request } = self;
        let chassis = |value: Option<String>| {
            if product_type.has_chassis_details() {
                non_blank(value)
            } else {
                None
            }
        };

        QuoteRecord {
            id,
            product_type,
            brand: chassis(request.brand),
            model: chassis(request.model),
            cargo_type: chassis(request.cargo_type),
            thickness: non_blank(request.thickness),
            volume_m3: non_blank(request.volume_m3),
            quantity: non_blank(request.quantity).unwrap_or_else(|| DEFAULT_QUANTITY.to_string()),
            payment_method: non_blank(request.payment_method)
                .unwrap_or_else(|| UNSPECIFIED_PAYMENT_METHOD.to_string()),
            company_name: request.company_name.unwrap_or_default(),
            contact_phone: request.contact_phone.unwrap_or_default(),
            email: request.email.unwrap_or_default(),
            contact_person: request.contact_person.unwrap_or_default(),
            heard_from: non_blank(request.heard_from),
            created_at: created_at.trunc_subsecs(3),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub id: QuoteId,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub cargo_type: Option<String>,
    pub thickness: Option<String>,
    pub volume_m3: Option<String>,
    pub quantity: String,
    pub payment_method: String,
    pub company_name: String,
    pub contact_phone: String,
    pub email: String,
    pub contact_person: String,
    pub heard_from: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// ISO-8601 UTC timestamps with millisecond precision (`2026-10-19T10:00:00.000Z`).
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|value| value.with_timezone(&Utc))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
