pub mod draft;
pub mod engine;
pub mod states;
pub mod submit;

pub use draft::Draft;
pub use engine::{FieldUpdate, FormPhase, FormSession, FormTransitionError};
pub use states::{FormField, FormState, Section, StepGates};
pub use submit::{
    classify_response, IntakeEnvelope, QuoteIntakeClient, SubmitError, SubmitOutcome,
    CONNECTIVITY_MESSAGE, GENERIC_FAILURE_MESSAGE,
};
