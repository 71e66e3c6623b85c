use thiserror::Error;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const NOT_FOUND_MESSAGE: &str = "Quote not found.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Server error. Please try again.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("missing required fields: {}", .fields.join(", "))]
    MissingRequiredFields { fields: Vec<&'static str> },
    #[error("unsupported product type `{0}` (expected damper|dorse)")]
    UnsupportedProductType(String),
    #[error("unsupported payment method `{0}` (expected pesin|vadeli)")]
    UnsupportedPaymentMethod(String),
    #[error("malformed quote payload: {0}")]
    MalformedPayload(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("quote `{0}` was not found")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Text that is safe to hand back to the caller. Bad requests carry a
    /// correctable message; everything else collapses to a fixed phrase.
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } => message,
            Self::NotFound { .. } => NOT_FOUND_MESSAGE,
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::MissingRequiredFields { .. }) => {
                Self::BadRequest {
                    message: REQUIRED_FIELDS_MESSAGE.to_owned(),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::NotFound(message) => {
                Self::NotFound { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Persistence(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
