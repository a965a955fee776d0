//! Bot domain - the Telegram conversation that hands out codes.

pub mod handlers;
pub mod messages;
pub mod poller;

pub use handlers::handle_update;
pub use poller::{BotPoller, BotPollerConfig};
