// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Issuance, verification and session rules live in the auth domain and talk
// to storage and the chat platform through these seams.
//
// Naming convention: Base* for trait names (e.g., BaseOtpLedger)

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use telegram::models::{SendMessage, Update};

use crate::domains::accounts::models::{Account, NewAccount};
use crate::domains::auth::models::{ContactUpsert, OneTimeCode, PlatformContact};
use crate::domains::auth::CodeCheck;

// =============================================================================
// Contact Registry (Infrastructure - bot users)
// =============================================================================

#[async_trait]
pub trait BaseContactRegistry: Send + Sync {
    /// Insert or merge a contact keyed by its platform id
    async fn upsert(&self, contact: ContactUpsert) -> Result<PlatformContact>;

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<PlatformContact>>;

    async fn find_by_identity(&self, telegram_id: &str) -> Result<Option<PlatformContact>>;
}

// =============================================================================
// OTP Ledger (Infrastructure - one pending code per phone)
// =============================================================================

#[async_trait]
pub trait BaseOtpLedger: Send + Sync {
    /// Replace any code stored for the number with a fresh one
    async fn issue(&self, phone_number: &str, code: &str, ttl: Duration) -> Result<OneTimeCode>;

    /// Match and delete in one step; a mismatch leaves the stored code alone
    async fn verify_and_consume(&self, phone_number: &str, code: &str) -> Result<CodeCheck>;

    /// Unexpired code for the number, not consumed
    async fn find_active(&self, phone_number: &str) -> Result<Option<OneTimeCode>>;
}

// =============================================================================
// Account Store (Infrastructure - application users)
// =============================================================================

#[async_trait]
pub trait BaseAccountStore: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Account>>;

    async fn find_by_identity(&self, telegram_id: &str) -> Result<Option<Account>>;

    async fn create(&self, account: NewAccount) -> Result<Account>;
}

// =============================================================================
// Chat Service (Infrastructure - Telegram Bot API)
// =============================================================================

#[async_trait]
pub trait BaseChatService: Send + Sync {
    async fn send_message(&self, message: &SendMessage) -> Result<()>;

    /// Long-poll for updates after `offset`
    async fn get_updates(&self, offset: Option<i64>, timeout_secs: u32) -> Result<Vec<Update>>;
}
