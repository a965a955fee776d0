//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, TelegramAdapter};
pub use stores::{PostgresAccountStore, PostgresContactRegistry, PostgresOtpLedger};
pub use test_dependencies::{
    MockAccountStore, MockChatService, MockContactRegistry, MockOtpLedger, TestDependencies,
};
pub use traits::*;
