pub mod config;
pub mod domain;
pub mod errors;
pub mod form;

pub use domain::product::{PaymentMethod, ProductType};
pub use domain::quote::{QuoteId, QuoteIdGenerator, QuoteRecord, QuoteRequest, ValidQuoteRequest};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use form::{Draft, FormField, FormSession, FormState, QuoteIntakeClient, Section, StepGates};
