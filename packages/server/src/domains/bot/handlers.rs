//! Turn incoming Telegram updates into replies.
//!
//! Shared by the webhook route and the long-polling bot binary.

use telegram::models::{Message, SendMessage, Update};
use tracing::{debug, error};

use super::messages;
use crate::domains::auth::activities::{active_code_for, start_issuance};
use crate::domains::auth::types::CODE_TTL_MINUTES;
use crate::domains::auth::{IssuanceOutcome, IssuanceRequest};
use crate::kernel::ServerDeps;

/// Reply for `update`, or `None` when it carries nothing the bot answers.
///
/// Never fails: storage errors are logged and answered with a generic
/// message so the user can retry.
pub async fn handle_update(update: &Update, deps: &ServerDeps) -> Option<SendMessage> {
    let message = update.message.as_ref()?;
    let sender = message.from.as_ref()?;
    if sender.is_bot {
        return None;
    }

    let chat_id = message.chat.id;
    let sender_identity = sender.id.to_string();

    if message.contact.is_some() {
        return Some(handle_contact(message, deps).await);
    }

    match message.text.as_deref().map(str::trim) {
        Some(text) if text.starts_with("/start") => {
            Some(messages::reply(chat_id, messages::WELCOME))
        }
        Some(_) => Some(remind(chat_id, &sender_identity, deps).await),
        None => {
            debug!(update_id = update.update_id, "Ignoring update without text or contact");
            None
        }
    }
}

async fn handle_contact(message: &Message, deps: &ServerDeps) -> SendMessage {
    let chat_id = message.chat.id;
    let (Some(sender), Some(contact)) = (message.from.as_ref(), message.contact.as_ref()) else {
        return messages::reply(chat_id, messages::GENERIC_FAILURE);
    };

    let request = IssuanceRequest {
        sender_identity: sender.id.to_string(),
        contact_identity: contact.user_id.map(|id| id.to_string()),
        raw_phone: contact.phone_number.clone(),
        username: sender.username.clone(),
        first_name: Some(sender.first_name.clone()),
        last_name: sender.last_name.clone(),
    };

    match start_issuance(request, deps).await {
        Ok(IssuanceOutcome::Issued(issued)) => messages::reply(
            chat_id,
            messages::code_issued(&issued.code, &issued.phone_number, CODE_TTL_MINUTES),
        )
        .markdown(),
        Ok(IssuanceOutcome::Rejected(reason)) => messages::reply(
            chat_id,
            messages::rejection(reason, &deps.phone_plan.country_code),
        ),
        Err(e) => {
            error!(chat_id, error = %e, "Failed to issue verification code");
            messages::reply(chat_id, messages::GENERIC_FAILURE)
        }
    }
}

async fn remind(chat_id: i64, sender_identity: &str, deps: &ServerDeps) -> SendMessage {
    match active_code_for(sender_identity, deps).await {
        Ok(Some(active)) => {
            messages::reply(chat_id, messages::active_code(&active.code, &active.phone_number))
                .markdown()
        }
        Ok(None) => messages::reply(chat_id, messages::REMINDER),
        Err(e) => {
            error!(chat_id, error = %e, "Failed to look up active code");
            messages::reply(chat_id, messages::REMINDER)
        }
    }
}
