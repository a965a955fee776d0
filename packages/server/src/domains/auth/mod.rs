//! Auth domain - phone verification through the Telegram bot
//!
//! Flow:
//!   bot receives shared contact → security gate → code stored in ledger
//!   client posts phone + code → code consumed → account resolved → JWT
//!
//! Responsibilities:
//! - Phone normalization for the served numbering plan
//! - One-time code issuance and verification
//! - Session/JWT token management

pub mod activities;
pub mod jwt;
pub mod models;
pub mod phone;
pub mod security;
pub mod types;

pub use jwt::{Claims, JwtService};
pub use phone::{mask_phone, PhonePlan};
pub use types::{
    AuthError, CodeCheck, IssuanceOutcome, IssuanceRequest, IssuedCode, RejectReason,
    SessionToken, VerifyOutcome,
};
