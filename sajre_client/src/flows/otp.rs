use super::{is_blank, FlowError};
use crate::api::ApiClient;
use crate::error::{StorageError, ValidationError};
use crate::routes::Route;
use crate::session::Session;

pub const INVALID_OTP: &str = "Invalid OTP";
pub const NO_PENDING_EMAIL: &str = "No pending email found.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtpState {
    AwaitingInput { email: String, error: Option<String> },
    Verifying { email: String },
    /// Terminal: nothing was registered on this device.
    NoPendingEmail,
    Verified,
}

/// Confirms the email left behind by registration. Success does not sign
/// the user in; they are sent to the login page.
#[derive(Debug)]
pub struct OtpVerification {
    state: OtpState,
}

impl OtpVerification {
    pub fn start(session: &Session) -> Result<Self, StorageError> {
        let state = match session.pending_email()? {
            Some(email) => OtpState::AwaitingInput { email, error: None },
            None => OtpState::NoPendingEmail,
        };
        Ok(Self { state })
    }

    pub fn state(&self) -> &OtpState {
        &self.state
    }

    pub fn email(&self) -> Option<&str> {
        match &self.state {
            OtpState::AwaitingInput { email, .. } | OtpState::Verifying { email } => Some(email),
            _ => None,
        }
    }

    #[tracing::instrument(name = "Verify OTP", skip(self, api, session, otp))]
    pub async fn verify(&mut self, api: &ApiClient, session: &Session, otp: &str) -> Result<Route, FlowError> {
        let email = match &self.state {
            OtpState::AwaitingInput { email, .. } => email.clone(),
            OtpState::Verifying { .. } => return Err(ValidationError::new("Verification already in progress").into()),
            OtpState::NoPendingEmail | OtpState::Verified => {
                return Err(ValidationError::new(NO_PENDING_EMAIL).into())
            }
        };
        if is_blank(otp) {
            let err = ValidationError::new("Please enter the OTP");
            self.state = OtpState::AwaitingInput {
                email,
                error: Some(err.message().to_string()),
            };
            return Err(err.into());
        }

        self.state = OtpState::Verifying { email: email.clone() };
        let result = match api.verify_otp(&email, otp.trim()).await {
            Ok(_) => session.clear_pending_email().map_err(FlowError::from),
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => {
                tracing::info!(%email, "email verified");
                self.state = OtpState::Verified;
                Ok(Route::Login)
            }
            Err(e) => {
                self.state = OtpState::AwaitingInput {
                    email,
                    error: Some(e.user_message(INVALID_OTP)),
                };
                Err(e)
            }
        }
    }
}
