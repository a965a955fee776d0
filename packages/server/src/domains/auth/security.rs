//! Security gate for code issuance.
//!
//! Pure checks; the caller supplies whatever storage lookups they need.

/// The shared contact card must carry the sender's own platform id.
///
/// Cards without an id (typed-in contacts, forwarded cards of people without
/// an account) never pass.
pub fn is_self_asserted(contact_identity: Option<&str>, sender_identity: &str) -> bool {
    matches!(contact_identity, Some(id) if id == sender_identity)
}

/// A number may be claimed when nobody holds it yet or the requester already does.
pub fn is_unclaimed_or_own(current_owner: Option<&str>, requester: &str) -> bool {
    current_owner.map_or(true, |owner| owner == requester)
}
