use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductType;
use crate::form::draft::Draft;
use crate::form::engine::FormTransitionError;

/// Where the customer currently is in the request form. Derived from the
/// draft and the submission phase, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormState {
    Unselected,
    ConfiguringStep1,
    ConfiguringStep2,
    ConfiguringStep3,
    ChoosingPayment,
    EnteringContact,
    Submitting,
    Submitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Step1,
    Step2,
    Step3,
    Payment,
    Contact,
}

impl Section {
    /// Linear section order for a product; each section unlocks the next.
    pub fn sequence(product: ProductType) -> &'static [Section] {
        match product {
            ProductType::Damper => {
                &[Section::Step1, Section::Step2, Section::Step3, Section::Payment, Section::Contact]
            }
            ProductType::Dorse => &[Section::Step1, Section::Step2, Section::Payment, Section::Contact],
        }
    }

    pub fn fields(self, product: ProductType) -> &'static [FormField] {
        use FormField::*;

        match (product, self) {
            (ProductType::Damper, Section::Step1) => &[Brand, Model],
            (ProductType::Damper, Section::Step2) => &[CargoType],
            (ProductType::Damper, Section::Step3) => &[VolumeM3, Thickness],
            (ProductType::Dorse, Section::Step1) => &[VolumeM3],
            (ProductType::Dorse, Section::Step2) => &[Thickness],
            (ProductType::Dorse, Section::Step3) => &[],
            (_, Section::Payment) => &[PaymentMethod, Quantity],
            (_, Section::Contact) => &[CompanyName, ContactPerson, ContactPhone, Email, HeardFrom],
        }
    }

    pub fn editing_state(self) -> FormState {
        match self {
            Section::Step1 => FormState::ConfiguringStep1,
            Section::Step2 => FormState::ConfiguringStep2,
            Section::Step3 => FormState::ConfiguringStep3,
            Section::Payment => FormState::ChoosingPayment,
            Section::Contact => FormState::EnteringContact,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    Brand,
    Model,
    CargoType,
    VolumeM3,
    Thickness,
    Quantity,
    PaymentMethod,
    CompanyName,
    ContactPerson,
    ContactPhone,
    Email,
    HeardFrom,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::Brand,
        FormField::Model,
        FormField::CargoType,
        FormField::VolumeM3,
        FormField::Thickness,
        FormField::Quantity,
        FormField::PaymentMethod,
        FormField::CompanyName,
        FormField::ContactPerson,
        FormField::ContactPhone,
        FormField::Email,
        FormField::HeardFrom,
    ];

    /// Wire name, identical to the JSON key of the quote payload.
    pub fn name(self) -> &'static str {
        match self {
            FormField::Brand => "brand",
            FormField::Model => "model",
            FormField::CargoType => "cargoType",
            FormField::VolumeM3 => "volumeM3",
            FormField::Thickness => "thickness",
            FormField::Quantity => "quantity",
            FormField::PaymentMethod => "paymentMethod",
            FormField::CompanyName => "companyName",
            FormField::ContactPerson => "contactPerson",
            FormField::ContactPhone => "contactPhone",
            FormField::Email => "email",
            FormField::HeardFrom => "heardFrom",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, FormField::Quantity | FormField::HeardFrom)
    }

    pub fn section(self, product: ProductType) -> Option<Section> {
        Section::sequence(product)
            .iter()
            .copied()
            .find(|section| section.fields(product).contains(&self))
    }
}

impl FromStr for FormField {
    type Err = FormTransitionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.name() == value)
            .ok_or_else(|| FormTransitionError::UnknownField(value.to_string()))
    }
}

/// Completion flags derived from a draft. Pure function of the draft so any
/// surface (terminal, web, tests) sees identical gating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepGates {
    pub step1: bool,
    pub step2: bool,
    pub step3: bool,
    pub payment_valid: bool,
    pub contact_valid: bool,
    pub submittable: bool,
}

impl StepGates {
    pub fn evaluate(draft: &Draft) -> Self {
        let filled = |value: &str| !value.is_empty();

        let (step1, step2, step3) = match draft.product_type {
            Some(ProductType::Damper) => (
                filled(&draft.brand) && filled(&draft.model),
                filled(&draft.cargo_type),
                filled(&draft.volume_m3) && filled(&draft.thickness),
            ),
            Some(ProductType::Dorse) => (filled(&draft.volume_m3), filled(&draft.thickness), false),
            None => (false, false, false),
        };
        let payment_valid = draft.payment_method.is_some();
        let contact_valid = filled(&draft.company_name)
            && filled(&draft.contact_phone)
            && filled(&draft.email)
            && filled(&draft.contact_person);

        let submittable = match draft.product_type {
            Some(ProductType::Damper) => step1 && step2 && step3 && payment_valid && contact_valid,
            Some(ProductType::Dorse) => step1 && step2 && payment_valid && contact_valid,
            None => false,
        };

        Self { step1, step2, step3, payment_valid, contact_valid, submittable }
    }

    pub fn is_complete(&self, section: Section) -> bool {
        match section {
            Section::Step1 => self.step1,
            Section::Step2 => self.step2,
            Section::Step3 => self.step3,
            Section::Payment => self.payment_valid,
            Section::Contact => self.contact_valid,
        }
    }

    /// Illustration shown beside the form: advances with steps one and two.
    pub fn illustration_index(&self) -> u8 {
        if self.step2 {
            2
        } else if self.step1 {
            1
        } else {
            0
        }
    }
}
