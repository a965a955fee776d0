//! Accounts domain - application users and their product interactions.

pub mod activities;
pub mod interactions;
pub mod models;

pub use interactions::{InteractionList, CLICK_HISTORY_CAP, RECENT_CLICKS_SHOWN};
pub use models::{Account, AccountUpdate, NewAccount};
