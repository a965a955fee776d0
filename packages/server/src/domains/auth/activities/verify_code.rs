//! Verify a one-time code and exchange it for a session

use anyhow::Context;
use tracing::{error, info};

use crate::domains::accounts::models::{Account, NewAccount};
use crate::domains::auth::phone::mask_phone;
use crate::domains::auth::types::{AuthError, SessionToken, VerifyOutcome};
use crate::kernel::ServerDeps;

/// Check `code` against the ledger for an already canonical phone number.
///
/// Storage failures are logged and reported as an invalid code so callers
/// never see internal errors from this step.
pub async fn verify_code(phone_number: &str, code: &str, deps: &ServerDeps) -> VerifyOutcome {
    match deps.otp_ledger.verify_and_consume(phone_number, code.trim()).await {
        Ok(check) => check.into(),
        Err(e) => {
            error!(
                phone_number = %mask_phone(phone_number),
                error = %e,
                "Code verification failed"
            );
            VerifyOutcome::InvalidCode
        }
    }
}

/// Verify the code, resolve the account and mint a session token.
///
/// Accounts are provisioned on first login from the contact the bot
/// recorded for the number. A number nobody registered through the bot
/// yields `AccountNotFound`.
pub async fn authenticate(
    raw_phone: &str,
    code: &str,
    deps: &ServerDeps,
) -> Result<SessionToken, AuthError> {
    let phone_number = deps.phone_plan.canonical_or_raw(raw_phone);

    match verify_code(&phone_number, code, deps).await {
        VerifyOutcome::Verified => {}
        VerifyOutcome::InvalidCode => return Err(AuthError::InvalidCode),
        VerifyOutcome::Expired => return Err(AuthError::Expired),
    }

    let account = resolve_account(&phone_number, deps).await?;
    let is_admin = deps.is_admin(&account.telegram_id);

    let access_token = deps
        .jwt_service
        .create_token(&account.telegram_id, account.id, is_admin)
        .context("Failed to create session token")?;

    info!(account_id = %account.id, is_admin, "Session issued");

    Ok(SessionToken {
        access_token,
        account_id: account.id,
        telegram_id: account.telegram_id,
        is_admin,
    })
}

async fn resolve_account(phone_number: &str, deps: &ServerDeps) -> Result<Account, AuthError> {
    if let Some(account) = deps.accounts.find_by_phone(phone_number).await? {
        return Ok(account);
    }

    let Some(contact) = deps.contacts.find_by_phone(phone_number).await? else {
        info!(phone_number = %mask_phone(phone_number), "Verified number has no bot contact");
        return Err(AuthError::AccountNotFound);
    };

    // Same Telegram user who registered earlier under another number
    if let Some(account) = deps.accounts.find_by_identity(&contact.telegram_id).await? {
        return Ok(account);
    }

    let account = deps
        .accounts
        .create(NewAccount {
            telegram_id: contact.telegram_id.clone(),
            phone_number: phone_number.to_string(),
            full_name: contact
                .display_name()
                .unwrap_or_else(|| phone_number.to_string()),
            telegram_username: contact.username.clone(),
        })
        .await
        .context("Failed to create account")?;

    info!(account_id = %account.id, telegram_id = %account.telegram_id, "Created account");
    Ok(account)
}
