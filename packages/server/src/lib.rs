// InBazar clothing shop - API Core
//
// REST backend for catalog browsing, likes/bookmarks/click history and admin
// CRUD. Sign-in is phone based: the Telegram bot proves phone ownership and
// hands out a one-time code, which the API trades for a bearer token.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
