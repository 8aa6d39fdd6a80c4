use super::FlowError;
use crate::api::ApiClient;
use crate::error::ValidationError;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const STATUS_TTL: Duration = Duration::from_secs(5);
pub const TERMS_REQUIRED: &str = "You must agree to the Terms of Service.";
pub const SENT: &str = "Your message has been sent successfully!";
pub const SEND_FAILED: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    pub message: String,
    pub agree_to_terms: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Banner shown after a submit. Disappears on its own after [`STATUS_TTL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitStatus {
    pub kind: StatusKind,
    pub message: String,
    shown_at: Instant,
}

impl SubmitStatus {
    fn new(kind: StatusKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= STATUS_TTL
    }
}

#[derive(Debug, Default)]
pub struct Contact {
    pub form: ContactForm,
    status: Option<SubmitStatus>,
}

impl Contact {
    /// Current banner, dropping it once expired.
    pub fn status(&mut self) -> Option<&SubmitStatus> {
        if self.status.as_ref().is_some_and(SubmitStatus::is_expired) {
            self.status = None;
        }
        self.status.as_ref()
    }

    /// Sends the form. The form is cleared only on success.
    #[tracing::instrument(name = "Contact us", skip_all)]
    pub async fn submit(&mut self, api: &ApiClient) -> Result<(), FlowError> {
        self.status = None;
        if !self.form.agree_to_terms {
            self.status = Some(SubmitStatus::new(StatusKind::Error, TERMS_REQUIRED));
            return Err(ValidationError::new(TERMS_REQUIRED).into());
        }

        match api.contact_us(&self.form).await {
            Ok(_) => {
                self.form = ContactForm::default();
                self.status = Some(SubmitStatus::new(StatusKind::Success, SENT));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "contact form failed");
                self.status = Some(SubmitStatus::new(StatusKind::Error, SEND_FAILED));
                Err(e.into())
            }
        }
    }
}
