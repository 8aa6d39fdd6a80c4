//! Sign-up: pick a role, fill the form, submit, then wait for the OTP.

use super::{is_blank, FlowError};
use crate::api::ApiClient;
use crate::error::ValidationError;
use crate::routes::Route;
use crate::session::Session;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Value};

pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Roles a visitor may sign up as. Admins are never self-registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupRole {
    Student,
    Vendor,
    Mentor,
}

impl SignupRole {
    pub fn parse(value: &str) -> Option<SignupRole> {
        match value.trim().to_lowercase().as_str() {
            "student" | "user" => Some(SignupRole::Student),
            "vendor" => Some(SignupRole::Vendor),
            "mentor" => Some(SignupRole::Mentor),
            _ => None,
        }
    }
}

/// The key each role must present, plus the mentor's extra fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupDetails {
    Student {
        referral_code: String,
    },
    Vendor {
        vendor_key: String,
    },
    Mentor {
        mentor_key: String,
        specialization: String,
        bio: String,
    },
}

impl SignupDetails {
    pub fn empty(role: SignupRole) -> Self {
        match role {
            SignupRole::Student => SignupDetails::Student {
                referral_code: String::new(),
            },
            SignupRole::Vendor => SignupDetails::Vendor {
                vendor_key: String::new(),
            },
            SignupRole::Mentor => SignupDetails::Mentor {
                mentor_key: String::new(),
                specialization: String::new(),
                bio: String::new(),
            },
        }
    }

    pub fn role(&self) -> SignupRole {
        match self {
            SignupDetails::Student { .. } => SignupRole::Student,
            SignupDetails::Vendor { .. } => SignupRole::Vendor,
            SignupDetails::Mentor { .. } => SignupRole::Mentor,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            SignupDetails::Student { referral_code } if is_blank(referral_code) => {
                Err(ValidationError::new("Referral code is required for students"))
            }
            SignupDetails::Vendor { vendor_key } if is_blank(vendor_key) => {
                Err(ValidationError::new("Vendor key is required for vendors"))
            }
            SignupDetails::Mentor { mentor_key, .. } if is_blank(mentor_key) => {
                Err(ValidationError::new("Mentor referral code is required for mentors"))
            }
            SignupDetails::Mentor { specialization, .. } if is_blank(specialization) => {
                Err(ValidationError::new("Specialization is required for mentors"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
    pub phone: String,
    pub details: SignupDetails,
}

impl RegistrationForm {
    pub fn new(role: SignupRole) -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: Secret::new(String::new()),
            phone: String::new(),
            details: SignupDetails::empty(role),
        }
    }

    /// Request body for the role's register endpoint.
    pub fn payload(&self) -> Value {
        let mut body = json!({
            "name": self.name,
            "email": self.email,
            "password": self.password.expose_secret(),
            "phone": self.phone,
        });
        let extra = match &self.details {
            SignupDetails::Student { referral_code } => json!({ "referralCode": referral_code }),
            SignupDetails::Vendor { vendor_key } => json!({ "vendorKey": vendor_key }),
            SignupDetails::Mentor {
                mentor_key,
                specialization,
                bio,
            } => json!({ "mentorKey": mentor_key, "specialization": specialization, "bio": bio }),
        };
        if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
            body.extend(extra);
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    SelectingRole,
    FillingForm,
    Submitting,
    AwaitingOtp { email: String },
    /// The form stays editable; submitting again is allowed.
    Failed { message: String },
}

#[derive(Debug)]
pub struct Registration {
    state: RegistrationState,
    form: Option<RegistrationForm>,
}

impl Default for Registration {
    fn default() -> Self {
        Self::new()
    }
}

impl Registration {
    pub fn new() -> Self {
        Self {
            state: RegistrationState::SelectingRole,
            form: None,
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    /// Switching roles keeps the common fields and resets the role's own.
    pub fn select_role(&mut self, role: SignupRole) -> &mut RegistrationForm {
        self.state = RegistrationState::FillingForm;
        let form = self.form.get_or_insert_with(|| RegistrationForm::new(role));
        if form.details.role() != role {
            form.details = SignupDetails::empty(role);
        }
        form
    }

    pub fn form_mut(&mut self) -> Option<&mut RegistrationForm> {
        self.form.as_mut()
    }

    /// Validates, posts to the role's endpoint and stashes the email for the
    /// OTP step. Returns the next route.
    #[tracing::instrument(name = "Register", skip_all)]
    pub async fn submit(&mut self, api: &ApiClient, session: &Session) -> Result<Route, FlowError> {
        let Some(form) = self.form.as_ref() else {
            return Err(ValidationError::new("Please choose a role").into());
        };
        if let Err(e) = form.details.validate() {
            self.state = RegistrationState::Failed {
                message: e.message().to_string(),
            };
            return Err(e.into());
        }

        self.state = RegistrationState::Submitting;
        let payload = form.payload();
        let result = match form.details.role() {
            SignupRole::Student => api.register_student(&payload).await,
            SignupRole::Vendor => api.register_vendor(&payload).await,
            SignupRole::Mentor => api.register_mentor(&payload).await,
        };

        let outcome = match result {
            Ok(_) => session
                .set_pending_email(&form.email)
                .map(|_| form.email.clone())
                .map_err(FlowError::from),
            Err(e) => Err(FlowError::from(e)),
        };
        match outcome {
            Ok(email) => {
                tracing::info!(%email, "registration accepted, awaiting OTP");
                self.state = RegistrationState::AwaitingOtp { email };
                Ok(Route::Otp)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                self.state = RegistrationState::Failed {
                    message: e.user_message(REGISTRATION_FAILED),
                };
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_requires_its_key() {
        let cases = [
            (SignupRole::Student, "Referral code is required for students"),
            (SignupRole::Vendor, "Vendor key is required for vendors"),
            (SignupRole::Mentor, "Mentor referral code is required for mentors"),
        ];
        for (role, message) in cases {
            let err = SignupDetails::empty(role).validate().unwrap_err();
            assert_eq!(err.message(), message);
        }
    }

    #[test]
    fn mentor_needs_specialization_after_key() {
        let details = SignupDetails::Mentor {
            mentor_key: "VEN-ABC234".into(),
            specialization: "   ".into(),
            bio: String::new(),
        };
        assert_eq!(
            details.validate().unwrap_err().message(),
            "Specialization is required for mentors"
        );
    }

    #[test]
    fn whitespace_key_is_missing() {
        let details = SignupDetails::Student {
            referral_code: " \t".into(),
        };
        assert!(details.validate().is_err());
    }

    #[test]
    fn payload_carries_only_the_role_fields() {
        let mut registration = Registration::new();
        let form = registration.select_role(SignupRole::Vendor);
        form.name = "Acme".into();
        form.email = "ops@acme.io".into();
        form.password = Secret::new("pw".into());
        form.details = SignupDetails::Vendor {
            vendor_key: "ADM-XYZ234".into(),
        };
        let payload = form.payload();
        assert_eq!(payload["vendorKey"], "ADM-XYZ234");
        assert_eq!(payload["password"], "pw");
        assert!(payload.get("referralCode").is_none());
        assert!(payload.get("mentorKey").is_none());
    }

    #[test]
    fn switching_role_keeps_common_fields() {
        let mut registration = Registration::new();
        assert_eq!(registration.state(), &RegistrationState::SelectingRole);
        registration.select_role(SignupRole::Student).email = "a@b.com".into();
        let form = registration.select_role(SignupRole::Mentor);
        assert_eq!(form.email, "a@b.com");
        assert_eq!(form.details.role(), SignupRole::Mentor);
        assert_eq!(registration.state(), &RegistrationState::FillingForm);
    }
}
