use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::domain::{InquirySubmission, InspectionType, NewInquiry};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_PROPERTY_ADDRESS: &str = "property_address";
pub const FIELD_INSPECTION_TYPE: &str = "inspection_type";
pub const FIELD_PREFERRED_DATE: &str = "preferred_date";
pub const FIELD_MESSAGE: &str = "message";
/// Key used when the request body itself cannot be read as a form.
pub const FIELD_BODY: &str = "body";

const PREFERRED_DATE_FORMAT: &str = "%Y-%m-%d";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"))
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')')
}

/// Field-level rejection reasons, keyed by submission field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    /// Fold `other` in. Messages already recorded for a field are kept.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.fields.entry(field).or_insert(message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid inquiry submission")?;
        for (index, (field, message)) in self.iter().enumerate() {
            let separator = if index == 0 { ": " } else { ", " };
            write!(f, "{separator}{field} ({message})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Upper bounds on free-text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    pub name: usize,
    pub phone: usize,
    pub property_address: usize,
    pub message: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name: 100,
            phone: 20,
            property_address: 200,
            message: 1000,
        }
    }
}

/// Turns raw contact-form payloads into [`NewInquiry`] values or a complete error map.
#[derive(Debug, Clone, Default)]
pub struct InquiryValidator {
    limits: FieldLimits,
}

impl InquiryValidator {
    pub fn with_limits(limits: FieldLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> FieldLimits {
        self.limits
    }

    /// Validate a raw JSON body. Fields that hold anything other than a string or null are
    /// reported as `<field> must be text` alongside the usual rule failures.
    pub fn validate_json(&self, body: &Value) -> Result<NewInquiry, ValidationErrors> {
        let Some(object) = body.as_object() else {
            return Err(ValidationErrors::single(FIELD_BODY, "expected a JSON object"));
        };

        let mut type_errors = ValidationErrors::default();
        let mut text = |field: &str| match object.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(_) => {
                type_errors.insert(field, format!("{field} must be text"));
                None
            }
        };

        let submission = InquirySubmission {
            name: text(FIELD_NAME),
            email: text(FIELD_EMAIL),
            phone: text(FIELD_PHONE),
            property_address: text(FIELD_PROPERTY_ADDRESS),
            inspection_type: text(FIELD_INSPECTION_TYPE),
            preferred_date: text(FIELD_PREFERRED_DATE),
            message: text(FIELD_MESSAGE),
        };

        match self.validate(submission) {
            Ok(new_inquiry) if type_errors.is_empty() => Ok(new_inquiry),
            Ok(_) => Err(type_errors),
            Err(rule_errors) => {
                type_errors.merge(rule_errors);
                Err(type_errors)
            }
        }
    }

    /// Validate every field, collecting all failures before rejecting.
    pub fn validate(&self, submission: InquirySubmission) -> Result<NewInquiry, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(submission.name.as_deref(), FIELD_NAME, "name required", &mut errors);
        if let Some(name) = name {
            check_length(name, self.limits.name, FIELD_NAME, "name too long", &mut errors);
        }

        let email = required(
            submission.email.as_deref(),
            FIELD_EMAIL,
            "email required",
            &mut errors,
        );
        if let Some(email) = email {
            if !email_pattern().is_match(email) {
                errors.insert(FIELD_EMAIL, "invalid email");
            }
        }

        let phone = required(
            submission.phone.as_deref(),
            FIELD_PHONE,
            "phone required",
            &mut errors,
        );
        if let Some(phone) = phone {
            if !phone.chars().all(is_phone_char) {
                errors.insert(FIELD_PHONE, "invalid phone");
            }
            check_length(phone, self.limits.phone, FIELD_PHONE, "phone too long", &mut errors);
        }

        let property_address = required(
            submission.property_address.as_deref(),
            FIELD_PROPERTY_ADDRESS,
            "address required",
            &mut errors,
        );
        if let Some(address) = property_address {
            check_length(
                address,
                self.limits.property_address,
                FIELD_PROPERTY_ADDRESS,
                "address too long",
                &mut errors,
            );
        }

        let inspection_type = match trimmed(submission.inspection_type.as_deref()) {
            None => Some(InspectionType::default()),
            Some(raw) => match raw.parse::<InspectionType>() {
                Ok(kind) => Some(kind),
                Err(_) => {
                    errors.insert(FIELD_INSPECTION_TYPE, "unsupported inspection type");
                    None
                }
            },
        };

        let preferred_date = match trimmed(submission.preferred_date.as_deref()) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(raw, PREFERRED_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(FIELD_PREFERRED_DATE, "invalid date");
                    None
                }
            },
        };

        let message = trimmed(submission.message.as_deref());
        if let Some(message) = message {
            check_length(
                message,
                self.limits.message,
                FIELD_MESSAGE,
                "message too long",
                &mut errors,
            );
        }

        match (name, email, phone, property_address, inspection_type) {
            (Some(name), Some(email), Some(phone), Some(property_address), Some(inspection_type))
                if errors.is_empty() =>
            {
                Ok(NewInquiry {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    property_address: property_address.to_string(),
                    inspection_type,
                    preferred_date,
                    message: message.map(str::to_string),
                })
            }
            _ => Err(errors),
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn required<'a>(
    value: Option<&'a str>,
    field: &str,
    message: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a str> {
    let value = trimmed(value);
    if value.is_none() {
        errors.insert(field, message);
    }
    value
}

fn check_length(
    value: &str,
    max: usize,
    field: &str,
    message: &str,
    errors: &mut ValidationErrors,
) {
    if value.chars().count() > max {
        errors.insert(field, message);
    }
}
