//! Integration tests for the Postgres-backed auth stores.
//!
//! Requires Docker; run with `cargo test -- --ignored`.

mod common;

use chrono::Duration;
use common::{unique_phone, unique_telegram_id, TestHarness};
use shop_core::domains::auth::activities::{authenticate, start_issuance};
use shop_core::domains::auth::models::ContactUpsert;
use shop_core::domains::auth::{CodeCheck, IssuanceOutcome, IssuanceRequest};
use shop_core::domains::accounts::Account;
use shop_core::kernel::{
    BaseContactRegistry, BaseOtpLedger, PostgresContactRegistry, PostgresOtpLedger,
};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_code_verifies_once(ctx: &TestHarness) {
    let ledger = PostgresOtpLedger::new(ctx.db_pool.clone());
    let phone = unique_phone();

    ledger.issue(&phone, "482913", Duration::minutes(5)).await.unwrap();

    assert_eq!(
        ledger.verify_and_consume(&phone, "482913").await.unwrap(),
        CodeCheck::Valid
    );
    assert_eq!(
        ledger.verify_and_consume(&phone, "482913").await.unwrap(),
        CodeCheck::Invalid
    );
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_reissue_replaces_previous_code(ctx: &TestHarness) {
    let ledger = PostgresOtpLedger::new(ctx.db_pool.clone());
    let phone = unique_phone();

    ledger.issue(&phone, "111111", Duration::minutes(5)).await.unwrap();
    ledger.issue(&phone, "222222", Duration::minutes(5)).await.unwrap();

    assert_eq!(
        ledger.verify_and_consume(&phone, "111111").await.unwrap(),
        CodeCheck::Invalid
    );
    assert_eq!(
        ledger.verify_and_consume(&phone, "222222").await.unwrap(),
        CodeCheck::Valid
    );
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_wrong_code_leaves_valid_code_in_place(ctx: &TestHarness) {
    let ledger = PostgresOtpLedger::new(ctx.db_pool.clone());
    let phone = unique_phone();

    ledger.issue(&phone, "333333", Duration::minutes(5)).await.unwrap();

    assert_eq!(
        ledger.verify_and_consume(&phone, "000000").await.unwrap(),
        CodeCheck::Invalid
    );
    assert!(ledger.find_active(&phone).await.unwrap().is_some());
    assert_eq!(
        ledger.verify_and_consume(&phone, "333333").await.unwrap(),
        CodeCheck::Valid
    );
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_expired_code_is_reported_and_removed(ctx: &TestHarness) {
    let ledger = PostgresOtpLedger::new(ctx.db_pool.clone());
    let phone = unique_phone();

    ledger.issue(&phone, "444444", Duration::minutes(-1)).await.unwrap();

    assert!(ledger.find_active(&phone).await.unwrap().is_none());
    assert_eq!(
        ledger.verify_and_consume(&phone, "444444").await.unwrap(),
        CodeCheck::Expired
    );
    assert_eq!(
        ledger.verify_and_consume(&phone, "444444").await.unwrap(),
        CodeCheck::Invalid
    );
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_contact_upsert_keeps_known_fields(ctx: &TestHarness) {
    let contacts = PostgresContactRegistry::new(ctx.db_pool.clone());
    let telegram_id = unique_telegram_id();
    let phone = unique_phone();

    contacts
        .upsert(ContactUpsert {
            telegram_id: telegram_id.clone(),
            username: Some("aziz".to_string()),
            first_name: Some("Aziz".to_string()),
            last_name: None,
            phone_number: Some(phone.clone()),
        })
        .await
        .unwrap();

    // A later /start carries no phone; the stored one must survive
    let updated = contacts
        .upsert(ContactUpsert {
            telegram_id: telegram_id.clone(),
            first_name: Some("Azizbek".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.first_name.as_deref(), Some("Azizbek"));
    assert_eq!(updated.username.as_deref(), Some("aziz"));
    assert_eq!(updated.phone_number.as_deref(), Some(phone.as_str()));

    let by_phone = contacts.find_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(by_phone.telegram_id, telegram_id);
}

#[test_context(TestHarness)]
#[tokio::test]
#[ignore = "requires Docker"]
async fn test_sign_in_creates_account_once(ctx: &TestHarness) {
    let deps = ctx.deps();
    let telegram_id = unique_telegram_id();
    let phone = unique_phone();

    let mut account_ids = Vec::new();
    for _ in 0..2 {
        let request = IssuanceRequest {
            sender_identity: telegram_id.clone(),
            contact_identity: Some(telegram_id.clone()),
            raw_phone: phone.clone(),
            username: None,
            first_name: Some("Dilnoza".to_string()),
            last_name: None,
        };
        let IssuanceOutcome::Issued(issued) = start_issuance(request, &deps).await.unwrap() else {
            panic!("expected a code to be issued");
        };

        let session = authenticate(&phone, &issued.code, &deps).await.unwrap();
        account_ids.push(session.account_id);
    }

    assert_eq!(account_ids[0], account_ids[1]);

    let account = Account::find_by_phone(&phone, &ctx.db_pool)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.telegram_id, telegram_id);
    assert_eq!(account.full_name, "Dilnoza");
}
