//! Auth domain activities - business logic functions
//!
//! Called by the HTTP handlers and the bot; storage and Telegram access go
//! through the traits on `ServerDeps`.

mod issue_code;
mod verify_code;

pub use issue_code::{active_code_for, generate_code, start_issuance};
pub use verify_code::{authenticate, verify_code};
