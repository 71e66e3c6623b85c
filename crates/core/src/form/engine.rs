use thiserror::Error;

use crate::domain::product::ProductType;
use crate::domain::quote::{QuoteRecord, QuoteRequest};
use crate::form::draft::Draft;
use crate::form::states::{FormField, FormState, Section, StepGates};
use crate::form::submit::{QuoteIntakeClient, SubmitError, SubmitOutcome};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Editing,
    Submitting,
    Submitted(QuoteRecord),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormTransitionError {
    #[error("select a product type before filling in the form")]
    NoProductSelected,
    #[error("field `{field}` does not apply to {product} quotes")]
    FieldNotApplicable { field: &'static str, product: ProductType },
    #[error("field `{field}` is locked until the previous step is complete ({section:?})")]
    SectionLocked { field: &'static str, section: Section },
    #[error("unknown form field `{0}`")]
    UnknownField(String),
    #[error("invalid value `{value}` for field `{field}`")]
    InvalidValue { field: &'static str, value: String },
    #[error("cannot {action} while the form is in state {state:?}")]
    InvalidTransition { state: FormState, action: &'static str },
}

/// Result of a field write. `newly_completed` is the cue an interactive
/// surface uses to scroll to or focus the section that just unlocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldUpdate {
    pub field: FormField,
    pub newly_completed: Option<Section>,
}

/// Single-session quote request form.
#[derive(Clone, Debug, Default)]
pub struct FormSession {
    draft: Draft,
    phase: FormPhase,
    last_error: Option<SubmitError>,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    pub fn submitted_record(&self) -> Option<&QuoteRecord> {
        match &self.phase {
            FormPhase::Submitted(record) => Some(record),
            _ => None,
        }
    }

    pub fn gates(&self) -> StepGates {
        StepGates::evaluate(&self.draft)
    }

    pub fn illustration_index(&self) -> u8 {
        self.gates().illustration_index()
    }

    pub fn state(&self) -> FormState {
        match &self.phase {
            FormPhase::Submitting => FormState::Submitting,
            FormPhase::Submitted(_) => FormState::Submitted,
            FormPhase::Editing => {
                let Some(product) = self.draft.product_type else {
                    return FormState::Unselected;
                };
                let gates = self.gates();
                Section::sequence(product)
                    .iter()
                    .copied()
                    .find(|section| !gates.is_complete(*section))
                    .map_or(FormState::EnteringContact, Section::editing_state)
            }
        }
    }

    /// A section accepts input once every section before it is complete.
    pub fn is_section_enabled(&self, section: Section) -> bool {
        if self.phase != FormPhase::Editing {
            return false;
        }
        let Some(product) = self.draft.product_type else {
            return false;
        };

        let sequence = Section::sequence(product);
        let Some(position) = sequence.iter().position(|candidate| *candidate == section) else {
            return false;
        };
        let gates = self.gates();
        sequence[..position].iter().all(|earlier| gates.is_complete(*earlier))
    }

    pub fn is_submittable(&self) -> bool {
        self.phase == FormPhase::Editing && self.gates().submittable
    }

    pub fn select_type(&mut self, product: ProductType) -> Result<FormState, FormTransitionError> {
        self.ensure_not_in_flight("select a product type")?;
        if matches!(self.phase, FormPhase::Submitted(_)) {
            return Err(self.invalid("select a product type"));
        }

        self.draft = Draft::for_product(product);
        self.last_error = None;
        Ok(self.state())
    }

    pub fn set_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<FieldUpdate, FormTransitionError> {
        if self.phase != FormPhase::Editing {
            return Err(self.invalid("edit the form"));
        }
        let product = self.draft.product_type.ok_or(FormTransitionError::NoProductSelected)?;
        let section = field
            .section(product)
            .ok_or(FormTransitionError::FieldNotApplicable { field: field.name(), product })?;
        if !self.is_section_enabled(section) {
            return Err(FormTransitionError::SectionLocked { field: field.name(), section });
        }

        let before = self.gates();
        self.draft.write(field, value.into())?;
        let after = self.gates();

        let newly_completed = Section::sequence(product)
            .iter()
            .copied()
            .find(|section| !before.is_complete(*section) && after.is_complete(*section));
        Ok(FieldUpdate { field, newly_completed })
    }

    pub fn set_field_by_name(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<FieldUpdate, FormTransitionError> {
        let field = name.parse::<FormField>()?;
        self.set_field(field, value)
    }

    /// Abandons the draft and returns to product selection.
    pub fn go_back(&mut self) -> Result<FormState, FormTransitionError> {
        self.ensure_not_in_flight("go back")?;
        self.clear();
        Ok(self.state())
    }

    /// Starts a submission. Returns the payload to send, or `None` when the
    /// draft is incomplete or another submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<QuoteRequest> {
        if !self.is_submittable() {
            return None;
        }

        self.phase = FormPhase::Submitting;
        self.last_error = None;
        Some(self.draft.to_request())
    }

    pub fn finish_submit(&mut self, result: Result<QuoteRecord, SubmitError>) -> FormState {
        if self.phase != FormPhase::Submitting {
            return self.state();
        }

        match result {
            Ok(record) => self.phase = FormPhase::Submitted(record),
            Err(error) => {
                self.phase = FormPhase::Editing;
                self.last_error = Some(error);
            }
        }
        self.state()
    }

    pub async fn submit<C>(&mut self, client: &C) -> SubmitOutcome
    where
        C: QuoteIntakeClient + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return SubmitOutcome::Skipped;
        };

        let result = client.create_quote(&request).await;
        let outcome = match &result {
            Ok(record) => SubmitOutcome::Submitted(record.clone()),
            Err(error) => SubmitOutcome::Failed(error.clone()),
        };
        self.finish_submit(result);
        outcome
    }

    /// Leaves the confirmation screen with a fresh draft.
    pub fn reset(&mut self) -> Result<FormState, FormTransitionError> {
        if !matches!(self.phase, FormPhase::Submitted(_)) {
            return Err(self.invalid("reset"));
        }
        self.clear();
        Ok(self.state())
    }

    fn clear(&mut self) {
        self.draft = Draft::default();
        self.phase = FormPhase::Editing;
        self.last_error = None;
    }

    fn ensure_not_in_flight(&self, action: &'static str) -> Result<(), FormTransitionError> {
        if self.phase == FormPhase::Submitting {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> FormTransitionError {
        FormTransitionError::InvalidTransition { state: self.state(), action }
    }
}
