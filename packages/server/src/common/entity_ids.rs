//! Typed ID definitions for the shop's entities.

pub use super::id::Id;

/// Marker type for Account entities (application users).
pub struct Account;

/// Marker type for Product entities.
pub struct Product;

/// Marker type for Category entities.
pub struct Category;

/// Marker type for contacts captured by the Telegram bot.
pub struct Contact;

pub type AccountId = Id<Account>;

pub type ProductId = Id<Product>;

pub type CategoryId = Id<Category>;

pub type ContactId = Id<Contact>;
