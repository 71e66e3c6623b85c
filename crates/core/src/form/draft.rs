use serde::{Deserialize, Serialize};

use crate::domain::product::{PaymentMethod, ProductType};
use crate::domain::quote::{QuoteRequest, DEFAULT_QUANTITY};
use crate::form::engine::FormTransitionError;
use crate::form::states::FormField;

/// The in-progress quote held by the client before submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub product_type: Option<ProductType>,
    pub brand: String,
    pub model: String,
    pub cargo_type: String,
    pub volume_m3: String,
    pub thickness: String,
    pub quantity: String,
    pub payment_method: Option<PaymentMethod>,
    pub company_name: String,
    pub contact_person: String,
    pub contact_phone: String,
    pub email: String,
    pub heard_from: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            product_type: None,
            brand: String::new(),
            model: String::new(),
            cargo_type: String::new(),
            volume_m3: String::new(),
            thickness: String::new(),
            quantity: DEFAULT_QUANTITY.to_string(),
            payment_method: None,
            company_name: String::new(),
            contact_person: String::new(),
            contact_phone: String::new(),
            email: String::new(),
            heard_from: String::new(),
        }
    }
}

impl Draft {
    pub fn for_product(product_type: ProductType) -> Self {
        Self { product_type: Some(product_type), ..Self::default() }
    }

    /// Current value of a field as the form displays it.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Brand => &self.brand,
            FormField::Model => &self.model,
            FormField::CargoType => &self.cargo_type,
            FormField::VolumeM3 => &self.volume_m3,
            FormField::Thickness => &self.thickness,
            FormField::Quantity => &self.quantity,
            FormField::PaymentMethod => self.payment_method.as_ref().map_or("", PaymentMethod::as_str),
            FormField::CompanyName => &self.company_name,
            FormField::ContactPerson => &self.contact_person,
            FormField::ContactPhone => &self.contact_phone,
            FormField::Email => &self.email,
            FormField::HeardFrom => &self.heard_from,
        }
    }

    pub(crate) fn write(&mut self, field: FormField, value: String) -> Result<(), FormTransitionError> {
        let slot = match field {
            FormField::PaymentMethod => {
                self.payment_method = if value.is_empty() {
                    None
                } else {
                    let method = value.parse::<PaymentMethod>().map_err(|_| {
                        FormTransitionError::InvalidValue { field: field.name(), value: value.clone() }
                    })?;
                    Some(method)
                };
                return Ok(());
            }
            FormField::Brand => &mut self.brand,
            FormField::Model => &mut self.model,
            FormField::CargoType => &mut self.cargo_type,
            FormField::VolumeM3 => &mut self.volume_m3,
            FormField::Thickness => &mut self.thickness,
            FormField::Quantity => &mut self.quantity,
            FormField::CompanyName => &mut self.company_name,
            FormField::ContactPerson => &mut self.contact_person,
            FormField::ContactPhone => &mut self.contact_phone,
            FormField::Email => &mut self.email,
            FormField::HeardFrom => &mut self.heard_from,
        };
        *slot = value;
        Ok(())
    }

    /// Builds the wire payload. Chassis fields are sent as typed; the intake
    /// service is the one that drops them for trailers.
    pub fn to_request(&self) -> QuoteRequest {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        QuoteRequest {
            product_type: self.product_type.map(|product| product.as_str().to_string()),
            brand: optional(&self.brand),
            model: optional(&self.model),
            cargo_type: optional(&self.cargo_type),
            thickness: optional(&self.thickness),
            volume_m3: optional(&self.volume_m3),
            quantity: optional(&self.quantity),
            company_name: optional(&self.company_name),
            contact_phone: optional(&self.contact_phone),
            email: optional(&self.email),
            contact_person: optional(&self.contact_person),
            payment_method: self.payment_method.map(|method| method.as_str().to_string()),
            heard_from: optional(&self.heard_from),
        }
    }
}
