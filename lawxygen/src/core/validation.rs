//! Pre-submission checks for the consultation form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{FormField, FormFields};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should be valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Problem {
    /// Required field is empty or whitespace.
    Required,
    MalformedEmail,
    /// Service is not one of the offered options.
    UnknownService,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Problem::Required => "is required",
            Problem::MalformedEmail => "is not a valid email address",
            Problem::UnknownService => "is not an offered service",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProblem {
    pub field: FormField,
    pub problem: Problem,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Every problem found in one pass over the form, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid consultation request: {}", join_problems(.problems))]
pub struct ValidationError {
    pub problems: Vec<FieldProblem>,
}

impl ValidationError {
    pub fn has(&self, field: FormField, problem: Problem) -> bool {
        self.problems
            .iter()
            .any(|p| p.field == field && p.problem == problem)
    }
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check required fields, email shape, and the chosen service.
///
/// An empty service is allowed; the picker is optional.
pub fn validate_request<S: AsRef<str>>(
    fields: &FormFields,
    services: &[S],
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    for field in FormField::ALL {
        if field.is_required() && fields.get(field).trim().is_empty() {
            problems.push(FieldProblem {
                field,
                problem: Problem::Required,
            });
        }
    }

    let email = fields.email.trim();
    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        problems.push(FieldProblem {
            field: FormField::Email,
            problem: Problem::MalformedEmail,
        });
    }

    let service = fields.service.trim();
    if !service.is_empty() && !services.iter().any(|s| s.as_ref() == service) {
        problems.push(FieldProblem {
            field: FormField::Service,
            problem: Problem::UnknownService,
        });
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: [&str; 2] = ["Tax Compliance", "Legal Consultation"];

    fn filled() -> FormFields {
        FormFields {
            name: "Jane".to_string(),
            email: "j@x.com".to_string(),
            phone: "555".to_string(),
            service: "Tax Compliance".to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn accepts_complete_request() {
        assert_eq!(validate_request(&filled(), &SERVICES), Ok(()));
    }

    #[test]
    fn accepts_missing_service_and_message() {
        let mut fields = filled();
        fields.service.clear();
        assert_eq!(validate_request(&fields, &SERVICES), Ok(()));
    }

    #[test]
    fn reports_every_blank_required_field() {
        let fields = FormFields {
            name: "   ".to_string(),
            ..FormFields::default()
        };
        let err = validate_request(&fields, &SERVICES).expect_err("blank form");
        assert_eq!(err.problems.len(), 3);
        assert!(err.has(FormField::Name, Problem::Required));
        assert!(err.has(FormField::Email, Problem::Required));
        assert!(err.has(FormField::Phone, Problem::Required));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["jane", "jane@", "@x.com", "jane@x", "ja ne@x.com"] {
            let mut fields = filled();
            fields.email = email.to_string();
            let err = validate_request(&fields, &SERVICES).expect_err(email);
            assert!(err.has(FormField::Email, Problem::MalformedEmail), "{email}");
        }
    }

    #[test]
    fn rejects_service_outside_offer() {
        let mut fields = filled();
        fields.service = "Astrology".to_string();
        let err = validate_request(&fields, &SERVICES).expect_err("unknown service");
        assert_eq!(
            err.problems,
            vec![FieldProblem {
                field: FormField::Service,
                problem: Problem::UnknownService,
            }]
        );
        assert_eq!(
            err.to_string(),
            "invalid consultation request: service is not an offered service"
        );
    }
}
