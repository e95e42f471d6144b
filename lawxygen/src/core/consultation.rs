//! Consultation form lifecycle: idle → submitting → submitted → idle.
//!
//! A submission that the submitter rejects lands in `Failed`, which keeps the
//! field values so the visitor can retry. Timing lives in the controller;
//! this module only enforces which transitions are legal.

use thiserror::Error;
use tracing::debug;

use crate::core::types::{FormField, FormFields, Phase};
use crate::core::validation::{ValidationError, validate_request};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsultationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("form is not editable while {phase}")]
    NotEditable { phase: &'static str },
    #[error("consultation controller has shut down")]
    Closed,
}

/// Field values plus lifecycle phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsultationForm {
    fields: FormFields,
    phase: Phase,
}

impl ConsultationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }

    pub fn is_editable(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failed { .. })
    }

    /// Overwrite one field. Editing after a failure returns the form to idle.
    pub fn update_field(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), ConsultationError> {
        self.ensure_editable()?;
        self.fields.set(field, value);
        if matches!(self.phase, Phase::Failed { .. }) {
            self.phase = Phase::Idle;
        }
        Ok(())
    }

    /// Validate and enter `Submitting`, returning the values to send.
    ///
    /// On a validation error the phase is left as it was.
    pub fn begin_submit<S: AsRef<str>>(
        &mut self,
        services: &[S],
    ) -> Result<FormFields, ConsultationError> {
        self.ensure_editable()?;
        validate_request(&self.fields, services)?;
        self.phase = Phase::Submitting;
        debug!("consultation submitting");
        Ok(self.fields.clone())
    }

    /// Record the submitter's answer. Returns false if no submission was
    /// pending, leaving the state unchanged.
    pub fn finish_submit(&mut self, result: Result<(), String>) -> bool {
        if !self.is_submitting() {
            return false;
        }
        self.phase = match result {
            Ok(()) => Phase::Submitted,
            Err(reason) => Phase::Failed { reason },
        };
        debug!(phase = self.phase.name(), "consultation submission finished");
        true
    }

    /// Leave the acknowledgement and clear every field.
    ///
    /// Only legal from `Submitted`; returns false otherwise.
    pub fn reset(&mut self) -> bool {
        if !self.is_submitted() {
            return false;
        }
        self.fields = FormFields::default();
        self.phase = Phase::Idle;
        debug!("consultation reset");
        true
    }

    fn ensure_editable(&self) -> Result<(), ConsultationError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(ConsultationError::NotEditable {
                phase: self.phase.name(),
            })
        }
    }
}
