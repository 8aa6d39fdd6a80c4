//! Course checkout against the dummy payment endpoint.

use super::{is_blank, server_message, FlowError};
use crate::api::ApiClient;
use crate::error::{AccessError, StoreError, ValidationError};
use crate::routes::Route;
use crate::session::Session;
use crate::store::LocalStore;
use serde::Serialize;
use serde_json::Value;

pub const PAYMENT_PATH: &str = "/api/student/dummy-payment";
pub const COURSE_PRICE: u32 = 6999;
pub const PAYMENT_FAILED: &str = "Payment failed.";
pub const PAYMENT_ERROR: &str = "An error occurred during payment.";

pub const WALLETS: [(&str, &str); 4] = [
    ("paytm", "Paytm"),
    ("phonepe", "PhonePe"),
    ("googlepay", "Google Pay"),
    ("amazonpay", "Amazon Pay"),
];

pub const BANKS: [&str; 7] = [
    "State Bank of India",
    "HDFC Bank",
    "ICICI Bank",
    "Axis Bank",
    "Kotak Mahindra Bank",
    "Punjab National Bank",
    "Bank of Baroda",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    Card {
        number: String,
        expiry: String,
        cvv: String,
        holder: String,
    },
    Upi {
        id: String,
    },
    Wallet {
        wallet: String,
    },
    NetBanking {
        bank: String,
    },
}

impl PaymentMethod {
    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Card { .. } => "card",
            PaymentMethod::Upi { .. } => "upi",
            PaymentMethod::Wallet { .. } => "wallet",
            PaymentMethod::NetBanking { .. } => "netbanking",
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = match self {
            PaymentMethod::Card {
                number,
                expiry,
                cvv,
                holder,
            } => [
                (number, "Please enter card number"),
                (expiry, "Please enter expiry date"),
                (cvv, "Please enter CVV"),
                (holder, "Please enter cardholder name"),
            ]
            .into_iter()
            .find(|(value, _)| is_blank(value))
            .map(|(_, message)| message),
            PaymentMethod::Upi { id } if is_blank(id) => Some("Please enter UPI ID"),
            PaymentMethod::Wallet { wallet } if wallet.is_empty() => Some("Please select a wallet"),
            PaymentMethod::NetBanking { bank } if bank.is_empty() => Some("Please select your bank"),
            _ => None,
        };
        match missing {
            Some(message) => Err(ValidationError::new(message)),
            None => Ok(()),
        }
    }

    /// Only the last four card digits leave the client.
    pub fn details(&self) -> PaymentDetails {
        let mut details = PaymentDetails {
            payment_method: self.id().to_string(),
            ..PaymentDetails::default()
        };
        match self {
            PaymentMethod::Card { number, holder, .. } => {
                let digits: Vec<char> = number.chars().collect();
                let start = digits.len().saturating_sub(4);
                details.card_number = Some(digits[start..].iter().collect());
                details.card_holder = Some(holder.clone());
            }
            PaymentMethod::Upi { id } => details.upi_id = Some(id.clone()),
            PaymentMethod::Wallet { wallet } => details.selected_wallet = Some(wallet.clone()),
            PaymentMethod::NetBanking { bank } => details.selected_bank = Some(bank.clone()),
        }
        details
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_bank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_details: PaymentDetails,
    pub amount: u32,
    pub course_id: String,
    pub referral_code: String,
}

/// Digits only, grouped in fours. `None` when the grouped form would reach
/// 20 characters; the previous value should be kept.
pub fn format_card_number(value: &str) -> Option<String> {
    let digits: Vec<char> = value.chars().filter(char::is_ascii_digit).collect();
    let grouped = digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    (grouped.len() < 20).then_some(grouped)
}

/// `MMYY` typed as digits becomes `MM/YY`.
pub fn format_expiry_date(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() >= 2 {
        let year: String = digits.chars().skip(2).take(2).collect();
        format!("{}/{}", &digits[..2], year)
    } else {
        digits
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub response: Value,
}

/// Pays for `course_id` with the signed-in session. Without a session the
/// caller is sent to the login page.
#[tracing::instrument(name = "Pay for course", skip(api, session, method, referral_code))]
pub async fn pay(
    api: &ApiClient,
    session: &mut Session,
    method: &PaymentMethod,
    course_id: &str,
    referral_code: &str,
) -> Result<PaymentReceipt, FlowError> {
    let token = match session.token() {
        Some(token) if session.user().is_some() => token.to_string(),
        _ => return Err(AccessError::NotSignedIn.into()),
    };
    method.validate()?;

    let request = PaymentRequest {
        payment_details: method.details(),
        amount: COURSE_PRICE,
        course_id: course_id.to_string(),
        referral_code: referral_code.to_string(),
    };
    let response = api.post(PAYMENT_PATH, &request, Some(&token)).await?;

    if response.get("success").and_then(Value::as_bool) != Some(true) {
        let message = server_message(&response).unwrap_or_else(|| PAYMENT_FAILED.to_string());
        tracing::warn!(%message, "payment rejected");
        return Err(FlowError::Rejected(message));
    }

    if let Some(mut user) = session.user().cloned() {
        user.is_enrolled = Some(true);
        session.update_user(user)?;
    }
    tracing::info!(course_id, "payment accepted");
    Ok(PaymentReceipt { response })
}

/// Where an unauthenticated visitor to the payment page goes.
pub fn guard(session: &Session) -> Result<(), Route> {
    if session.is_signed_in() {
        Ok(())
    } else {
        Err(Route::Login)
    }
}

/// Mirrors a successful payment into the offline store: the store's current
/// user, when it is a student, becomes enrolled. Returns whether anything
/// changed.
pub fn record_local_enrollment(store: &mut LocalStore) -> Result<bool, StoreError> {
    let Some(id) = store.current_user().map(|e| e.id.clone()) else {
        return Ok(false);
    };
    let changed = store.mark_enrolled(&id)?;
    if changed {
        tracing::info!(%id, "store student enrolled");
    }
    Ok(changed)
}
