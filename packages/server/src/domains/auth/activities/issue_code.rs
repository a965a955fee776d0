//! Issue a one-time code for a contact shared in the bot

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::domains::auth::models::{ContactUpsert, OneTimeCode};
use crate::domains::auth::phone::mask_phone;
use crate::domains::auth::security::{is_self_asserted, is_unclaimed_or_own};
use crate::domains::auth::types::{
    code_ttl, IssuanceOutcome, IssuanceRequest, IssuedCode, RejectReason, CODE_LENGTH,
};
use crate::kernel::ServerDeps;

/// Uniformly random decimal code of `CODE_LENGTH` digits.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Run the security gate and, when it passes, remember the contact and
/// store a fresh code.
///
/// Checks run in order: ownership of the shared card, numbering plan, then
/// whether another Telegram account already holds the number. Nothing is
/// written on rejection.
pub async fn start_issuance(
    request: IssuanceRequest,
    deps: &ServerDeps,
) -> Result<IssuanceOutcome> {
    if !is_self_asserted(request.contact_identity.as_deref(), &request.sender_identity) {
        warn!(
            sender = %request.sender_identity,
            contact = ?request.contact_identity,
            "Rejected shared contact that does not belong to the sender"
        );
        return Ok(IssuanceOutcome::Rejected(RejectReason::NotOwnContact));
    }

    let Some(phone_number) = deps.phone_plan.normalize(&request.raw_phone) else {
        info!(sender = %request.sender_identity, "Rejected phone outside numbering plan");
        return Ok(IssuanceOutcome::Rejected(RejectReason::UnsupportedNumber));
    };

    let owner = deps
        .contacts
        .find_by_phone(&phone_number)
        .await
        .context("Failed to look up phone owner")?;
    let current_owner = owner.as_ref().map(|c| c.telegram_id.as_str());
    if !is_unclaimed_or_own(current_owner, &request.sender_identity) {
        warn!(
            sender = %request.sender_identity,
            phone_number = %mask_phone(&phone_number),
            "Rejected phone registered to another Telegram account"
        );
        return Ok(IssuanceOutcome::Rejected(RejectReason::PhoneClaimed));
    }

    // A code is only stored once its contact is on record
    deps.contacts
        .upsert(ContactUpsert {
            telegram_id: request.sender_identity.clone(),
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            phone_number: Some(phone_number.clone()),
        })
        .await
        .context("Failed to save bot contact")?;

    let code = generate_code();
    let record: OneTimeCode = deps
        .otp_ledger
        .issue(&phone_number, &code, code_ttl())
        .await
        .context("Failed to store verification code")?;

    info!(
        sender = %request.sender_identity,
        phone_number = %mask_phone(&phone_number),
        "Issued verification code"
    );
    debug!(expires_at = %record.expires_at, "Verification code expiry");

    Ok(IssuanceOutcome::Issued(IssuedCode {
        phone_number,
        code,
        expires_at: record.expires_at,
    }))
}

/// The code still waiting to be used by this Telegram account, if any.
pub async fn active_code_for(telegram_id: &str, deps: &ServerDeps) -> Result<Option<OneTimeCode>> {
    let Some(contact) = deps.contacts.find_by_identity(telegram_id).await? else {
        return Ok(None);
    };
    let Some(phone_number) = contact.phone_number else {
        return Ok(None);
    };
    deps.otp_ledger.find_active(&phone_number).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::auth::CodeCheck;
    use crate::kernel::test_dependencies::{MockContactRegistry, MockOtpLedger};
    use crate::kernel::TestDependencies;

    fn request(sender: &str, contact: Option<&str>, phone: &str) -> IssuanceRequest {
        IssuanceRequest {
            sender_identity: sender.to_string(),
            contact_identity: contact.map(String::from),
            raw_phone: phone.to_string(),
            username: Some("ali".to_string()),
            first_name: Some("Ali".to_string()),
            last_name: None,
        }
    }

    fn issued(outcome: IssuanceOutcome) -> IssuedCode {
        match outcome {
            IssuanceOutcome::Issued(code) => code,
            IssuanceOutcome::Rejected(reason) => panic!("expected a code, got {reason:?}"),
        }
    }

    fn rejected(outcome: IssuanceOutcome) -> RejectReason {
        match outcome {
            IssuanceOutcome::Rejected(reason) => reason,
            IssuanceOutcome::Issued(code) => panic!("expected rejection, got {code:?}"),
        }
    }

    #[test]
    fn test_generated_code_shape() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_issues_code_and_records_contact() {
        let contacts = MockContactRegistry::new();
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_contacts(contacts.clone())
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let code = issued(
            start_issuance(request("100", Some("100"), "+998 90 123 45 67"), &deps)
                .await
                .unwrap(),
        );

        assert_eq!(code.phone_number, "+998901234567");
        assert_eq!(ledger.stored_code("+998901234567").as_deref(), Some(code.code.as_str()));
        let contact = contacts.get("100").unwrap();
        assert_eq!(contact.phone_number.as_deref(), Some("+998901234567"));
        assert_eq!(contact.first_name.as_deref(), Some("Ali"));
    }

    #[tokio::test]
    async fn test_foreign_contact_rejected_without_writes() {
        let contacts = MockContactRegistry::new();
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_contacts(contacts.clone())
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let reason = rejected(
            start_issuance(request("100", Some("200"), "+998901234567"), &deps)
                .await
                .unwrap(),
        );

        assert_eq!(reason, RejectReason::NotOwnContact);
        assert!(ledger.is_empty());
        assert!(contacts.get("100").is_none());
    }

    #[tokio::test]
    async fn test_contact_without_identity_rejected() {
        let deps = TestDependencies::new().into_server_deps();
        let reason = rejected(
            start_issuance(request("100", None, "+998901234567"), &deps)
                .await
                .unwrap(),
        );
        assert_eq!(reason, RejectReason::NotOwnContact);
    }

    #[tokio::test]
    async fn test_foreign_number_rejected() {
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let reason = rejected(
            start_issuance(request("100", Some("100"), "+12025550100"), &deps)
                .await
                .unwrap(),
        );

        assert_eq!(reason, RejectReason::UnsupportedNumber);
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_number_claimed_by_other_account_rejected() {
        let contacts = MockContactRegistry::new().with_contact("200", "+998901234567");
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_contacts(contacts.clone())
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let reason = rejected(
            start_issuance(request("100", Some("100"), "+998901234567"), &deps)
                .await
                .unwrap(),
        );

        assert_eq!(reason, RejectReason::PhoneClaimed);
        assert!(ledger.is_empty());
        assert!(contacts.get("100").is_none());
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let first = issued(
            start_issuance(request("100", Some("100"), "+998901234567"), &deps)
                .await
                .unwrap(),
        );
        let second = issued(
            start_issuance(request("100", Some("100"), "+998901234567"), &deps)
                .await
                .unwrap(),
        );

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.stored_code("+998901234567").as_deref(), Some(second.code.as_str()));
        if first.code != second.code {
            let check = ledger.verify_now("+998901234567", &first.code).await;
            assert_eq!(check, CodeCheck::Invalid);
        }
    }

    #[tokio::test]
    async fn test_ledger_failure_is_an_error() {
        let deps = TestDependencies::new()
            .mock_ledger(MockOtpLedger::failing())
            .into_server_deps();

        let result = start_issuance(request("100", Some("100"), "+998901234567"), &deps).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_contact_write_failure_leaves_no_code() {
        let ledger = MockOtpLedger::new();
        let deps = TestDependencies::new()
            .mock_contacts(MockContactRegistry::failing_writes())
            .mock_ledger(ledger.clone())
            .into_server_deps();

        let result = start_issuance(request("100", Some("100"), "+998901234567"), &deps).await;

        assert!(result.is_err());
        assert!(ledger.stored_code("+998901234567").is_none());
    }

    #[tokio::test]
    async fn test_active_code_lookup() {
        let deps = TestDependencies::new().into_server_deps();
        assert!(active_code_for("100", &deps).await.unwrap().is_none());

        let code = issued(
            start_issuance(request("100", Some("100"), "+998901234567"), &deps)
                .await
                .unwrap(),
        );

        let active = active_code_for("100", &deps).await.unwrap().unwrap();
        assert_eq!(active.code, code.code);
        assert!(active_code_for("200", &deps).await.unwrap().is_none());
    }
}
