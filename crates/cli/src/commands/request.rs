use std::io::{self, BufRead, Write};

use thiserror::Error;

use ozunlu_core::domain::product::ProductType;
use ozunlu_core::domain::quote::QuoteRecord;
use ozunlu_core::form::{
    FormField, FormSession, FormTransitionError, QuoteIntakeClient, Section, SubmitError,
    SubmitOutcome,
};

use crate::commands::{intake_client, runtime, CommandResult};

const COMMAND: &str = "request";
const BACK: &str = "back";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("input ended before the quote request was submitted")]
    Aborted,
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Form(#[from] FormTransitionError),
    #[error("{}", .0.user_message())]
    Submit(SubmitError),
    #[error("the form was not complete at submission time")]
    Incomplete,
}

enum FieldStep {
    Done,
    Back,
}

pub fn run(base_url: Option<String>) -> CommandResult {
    let client = match intake_client(COMMAND, base_url) {
        Ok(client) => client,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match runtime.block_on(run_session(&mut input, &mut output, &client)) {
        Ok(record) => CommandResult::success_with_data(
            COMMAND,
            format!("quote {} received for {}", record.id, record.company_name),
            &record,
        ),
        Err(SessionError::Submit(error @ SubmitError::Connectivity(_))) => {
            CommandResult::failure(COMMAND, "service_unreachable", error.to_string(), 6)
        }
        Err(SessionError::Submit(error @ SubmitError::Rejected { .. })) => {
            CommandResult::failure(COMMAND, "rejected", error.to_string(), 7)
        }
        Err(error) => CommandResult::failure(COMMAND, "input", error.to_string(), 9),
    }
}

/// Walks one customer through the request form and submits it once every
/// section is complete. Typing `back` at any field prompt abandons the draft
/// and returns to product selection.
pub async fn run_session<R, W, C>(
    input: &mut R,
    output: &mut W,
    client: &C,
) -> Result<QuoteRecord, SessionError>
where
    R: BufRead,
    W: Write,
    C: QuoteIntakeClient + ?Sized,
{
    let mut session = FormSession::new();

    'form: loop {
        let product = prompt_product(input, output)?;
        session.select_type(product)?;
        writeln!(output, "Configuring a {product} quote. Type `{BACK}` at any prompt to start over.")?;

        for section in Section::sequence(product) {
            for field in section.fields(product) {
                if let FieldStep::Back = prompt_field(input, output, &mut session, *field)? {
                    session.go_back()?;
                    writeln!(output, "Draft discarded, back to product selection.")?;
                    continue 'form;
                }
            }
        }

        loop {
            writeln!(output, "Submitting quote request...")?;
            match session.submit(client).await {
                SubmitOutcome::Submitted(record) => {
                    writeln!(
                        output,
                        "Thank you, {}. Quote {} has been received.",
                        record.contact_person, record.id
                    )?;
                    return Ok(record);
                }
                SubmitOutcome::Failed(error) => {
                    writeln!(output, "{}", error.user_message())?;
                    if !confirm(input, output, "Try again? [y/N]: ")? {
                        return Err(SessionError::Submit(error));
                    }
                }
                SubmitOutcome::Skipped => return Err(SessionError::Incomplete),
            }
        }
    }
}

fn prompt_product<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<ProductType, SessionError> {
    loop {
        write!(output, "Product type [damper|dorse]: ")?;
        output.flush()?;
        let answer = read_answer(input)?;
        match answer.parse::<ProductType>() {
            Ok(product) => return Ok(product),
            Err(error) => writeln!(output, "{error}")?,
        }
    }
}

fn prompt_field<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    session: &mut FormSession,
    field: FormField,
) -> Result<FieldStep, SessionError> {
    loop {
        write!(output, "{}{}: ", label(field), hint(field))?;
        output.flush()?;
        let answer = read_answer(input)?;

        if answer.eq_ignore_ascii_case(BACK) {
            return Ok(FieldStep::Back);
        }
        if answer.is_empty() {
            if !field.is_required() {
                return Ok(FieldStep::Done);
            }
            writeln!(output, "{} is required.", label(field))?;
            continue;
        }

        match session.set_field(field, answer) {
            Ok(update) => {
                if let Some(section) = update.newly_completed {
                    writeln!(output, "{} complete.", section_label(section))?;
                }
                return Ok(FieldStep::Done);
            }
            Err(error) => writeln!(output, "{error}")?,
        }
    }
}

fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<bool, SessionError> {
    write!(output, "{question}")?;
    output.flush()?;
    let answer = read_answer(input)?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String, SessionError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(SessionError::Aborted);
    }
    Ok(line.trim().to_string())
}

fn label(field: FormField) -> &'static str {
    match field {
        FormField::Brand => "Chassis brand",
        FormField::Model => "Chassis model",
        FormField::CargoType => "Cargo type",
        FormField::VolumeM3 => "Volume (m3)",
        FormField::Thickness => "Sheet thickness (floor / side)",
        FormField::Quantity => "Quantity",
        FormField::PaymentMethod => "Payment method",
        FormField::CompanyName => "Company name",
        FormField::ContactPerson => "Contact person",
        FormField::ContactPhone => "Contact phone",
        FormField::Email => "Email",
        FormField::HeardFrom => "How did you hear about us",
    }
}

fn hint(field: FormField) -> &'static str {
    match field {
        FormField::PaymentMethod => " [pesin|vadeli]",
        FormField::Quantity => " (default 1)",
        other if !other.is_required() => " (optional)",
        _ => "",
    }
}

fn section_label(section: Section) -> &'static str {
    match section {
        Section::Step1 => "Step 1",
        Section::Step2 => "Step 2",
        Section::Step3 => "Step 3",
        Section::Payment => "Payment",
        Section::Contact => "Contact details",
    }
}
