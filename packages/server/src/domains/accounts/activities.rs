//! Interaction activities - keep account lists and product counters in step.
//!
//! Counters only move when the membership list actually changed, so a
//! repeated like or an unlike of something never liked leaves them alone.

use anyhow::Result;
use sqlx::PgPool;
use tracing::debug;

use crate::common::{AccountId, ProductId};
use crate::domains::accounts::interactions::InteractionList;
use crate::domains::accounts::models::Account;
use crate::domains::catalog::models::{Counter, Product};

fn counter_for(list: InteractionList) -> Counter {
    match list {
        InteractionList::Likes => Counter::Likes,
        InteractionList::Bookmarks => Counter::Bookmarks,
    }
}

/// Returns whether the product was newly added.
pub async fn add_interaction(
    account_id: AccountId,
    list: InteractionList,
    product_id: ProductId,
    pool: &PgPool,
) -> Result<bool> {
    let added = Account::add_to_list(account_id, list, product_id, pool).await?;
    if added {
        Product::increment(product_id, counter_for(list), pool).await?;
    }
    debug!(account_id = %account_id, product_id = %product_id, ?list, added, "Interaction added");
    Ok(added)
}

/// Returns whether the product was present and removed.
pub async fn remove_interaction(
    account_id: AccountId,
    list: InteractionList,
    product_id: ProductId,
    pool: &PgPool,
) -> Result<bool> {
    let removed = Account::remove_from_list(account_id, list, product_id, pool).await?;
    if removed {
        Product::decrement(product_id, counter_for(list), pool).await?;
    }
    debug!(
        account_id = %account_id,
        product_id = %product_id,
        ?list,
        removed,
        "Interaction removed"
    );
    Ok(removed)
}

/// Every click counts, even repeated ones; history keeps each product once.
pub async fn record_click(
    account_id: AccountId,
    product_id: ProductId,
    pool: &PgPool,
) -> Result<()> {
    Product::increment(product_id, Counter::Clicks, pool).await?;
    Account::record_click(account_id, product_id, pool).await
}
