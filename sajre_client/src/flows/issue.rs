//! Issuing the key the next role down registers with: admins create vendors,
//! vendors create mentors, mentors hand out student codes.

use super::{is_blank, FlowError};
use crate::api::ApiClient;
use crate::error::{ApiError, ValidationError};
use crate::models::{Envelope, ReferralCodeRecord, Role};
use serde_json::json;

pub const GENERATE_FAILED: &str = "Failed to generate code.";
pub const STUDENT_CODE_DESCRIPTION: &str = "Student referral code";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueRequest {
    Vendor { company_name: String, description: String },
    Mentor { mentor_name: String, specialization: String },
    StudentCode,
}

impl IssueRequest {
    /// Role that may send this request.
    pub fn issuer(&self) -> Role {
        match self {
            IssueRequest::Vendor { .. } => Role::Admin,
            IssueRequest::Mentor { .. } => Role::Vendor,
            IssueRequest::StudentCode => Role::Mentor,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            IssueRequest::Vendor {
                company_name,
                description,
            } if is_blank(company_name) || is_blank(description) => Err(ValidationError::new(
                "Company Name and Description are required to create a vendor.",
            )),
            IssueRequest::Mentor {
                mentor_name,
                specialization,
            } if is_blank(mentor_name) || is_blank(specialization) => Err(ValidationError::new(
                "Mentor Name and Specialization are required to create a mentor key.",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedKey {
    pub code: String,
    pub share_link: String,
}

/// `<origin>/register?ref=<code>`, the link handed to the invitee.
pub fn share_link(origin: &str, code: &str) -> String {
    format!("{}/register?ref={}", origin.trim_end_matches('/'), code)
}

fn accepted<T>(response: Envelope<T>, pick: impl FnOnce(T) -> String) -> Result<String, FlowError> {
    if !response.success {
        return Err(FlowError::Rejected(
            response.message.filter(|m| !m.is_empty()).unwrap_or_else(|| GENERATE_FAILED.to_string()),
        ));
    }
    response
        .data
        .map(pick)
        .filter(|code| !code.is_empty())
        .ok_or_else(|| FlowError::Rejected(GENERATE_FAILED.to_string()))
}

/// Sends the request for `role` and returns the new key with its share link.
#[tracing::instrument(name = "Issue referral key", skip(api, token, request, origin))]
pub async fn issue(
    api: &ApiClient,
    token: &str,
    role: Role,
    request: &IssueRequest,
    origin: &str,
) -> Result<IssuedKey, FlowError> {
    if request.issuer() != role {
        return Err(ValidationError::new(format!("A {} cannot issue this key", role.label())).into());
    }
    request.validate()?;

    let code = match request {
        IssueRequest::Vendor {
            company_name,
            description,
        } => {
            let body = json!({ "companyName": company_name, "description": description });
            accepted(api.create_vendor(&body, token).await?, |d| d.vendor_key)?
        }
        IssueRequest::Mentor {
            mentor_name,
            specialization,
        } => {
            let body = json!({ "mentorName": mentor_name, "specialization": specialization });
            accepted(api.create_mentor(&body, token).await?, |d| d.mentor_key)?
        }
        IssueRequest::StudentCode => {
            let body = json!({ "description": STUDENT_CODE_DESCRIPTION });
            accepted(api.create_mentor_referral_code(&body, token).await?, |d| d.code)?
        }
    };
    tracing::info!(%code, "referral key issued");
    Ok(IssuedKey {
        share_link: share_link(origin, &code),
        code,
    })
}

/// Mentor's own codes, active and retired.
pub async fn mentor_codes(api: &ApiClient, token: &str) -> Result<Vec<ReferralCodeRecord>, ApiError> {
    Ok(api.get_mentor_referral_codes(token).await?.into_data())
}
