//! Auth domain data types
//!
//! Requests and outcomes passed between the bot, the OTP ledger and the
//! HTTP layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::AccountId;

/// Number of digits in a one-time code.
pub const CODE_LENGTH: usize = 6;

/// How long an issued code stays valid.
pub const CODE_TTL_MINUTES: i64 = 5;

pub fn code_ttl() -> chrono::Duration {
    chrono::Duration::minutes(CODE_TTL_MINUTES)
}

/// A shared contact as received from the chat platform.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    /// Platform id of the account that sent the message.
    pub sender_identity: String,
    /// Platform id attached to the shared contact card, if any.
    pub contact_identity: Option<String>,
    pub raw_phone: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedCode {
    pub phone_number: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum IssuanceOutcome {
    Issued(IssuedCode),
    Rejected(RejectReason),
}

/// Why the security gate refused to issue a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("contact does not belong to the sender")]
    NotOwnContact,
    #[error("phone number is outside the served numbering plan")]
    UnsupportedNumber,
    #[error("phone number is registered to another account")]
    PhoneClaimed,
}

/// Result of looking up and consuming a code in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    Invalid,
    Expired,
}

impl CodeCheck {
    /// Classify a consumed ledger row. `None` means nothing matched.
    pub fn from_consumed(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match expires_at {
            None => CodeCheck::Invalid,
            Some(expires_at) if now > expires_at => CodeCheck::Expired,
            Some(_) => CodeCheck::Valid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    InvalidCode,
    Expired,
}

impl From<CodeCheck> for VerifyOutcome {
    fn from(check: CodeCheck) -> Self {
        match check {
            CodeCheck::Valid => VerifyOutcome::Verified,
            CodeCheck::Invalid => VerifyOutcome::InvalidCode,
            CodeCheck::Expired => VerifyOutcome::Expired,
        }
    }
}

/// Session handed to the client after a successful verification.
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub access_token: String,
    pub account_id: AccountId,
    pub telegram_id: String,
    pub is_admin: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid or expired verification code")]
    InvalidCode,
    #[error("Verification code has expired, request a new one in the Telegram bot")]
    Expired,
    #[error("User not found. Please complete registration in the Telegram bot first.")]
    AccountNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
