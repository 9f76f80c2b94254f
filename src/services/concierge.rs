use std::sync::Arc;

use serde::Serialize;

use crate::errors::AppError;
use crate::services::ai::prompt::{build_messages, SYSTEM_PROMPT};
use crate::services::reservation::resolve_active_property;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Faq,
    Generated,
    NoReservation,
    SystemError,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Faq => "faq",
            ReplySource::Generated => "generated",
            ReplySource::NoReservation => "no_reservation",
            ReplySource::SystemError => "system_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

pub fn no_reservation_reply(contact: &str) -> String {
    format!(
        "Gentile ospite, non trovo una prenotazione attiva associata a questo numero. Per assistenza contatta {contact}."
    )
}

pub fn system_error_reply(contact: &str) -> String {
    format!(
        "Gentile ospite, al momento non riesco a rispondere. Per assistenza contatta {contact}."
    )
}

/// Answers one inbound guest message. Never fails: pipeline errors become one
/// of the two fixed apologies and are only logged.
///
/// Requests for the same phone are serialized for the whole cycle, so
/// concurrent messages each keep their exchange in the session.
pub async fn handle_message(state: &Arc<AppState>, phone: &str, message: &str) -> Reply {
    let _guard = state.phone_locks.lock(phone).await;

    let reply = match resolve_answer(state, phone, message).await {
        Ok(reply) => reply,
        Err(e) => {
            let contact = &state.config.support_contact;
            let reply = match e {
                AppError::NotFound(_) => Reply {
                    text: no_reservation_reply(contact),
                    source: ReplySource::NoReservation,
                },
                _ => Reply {
                    text: system_error_reply(contact),
                    source: ReplySource::SystemError,
                },
            };
            if reply.source == ReplySource::NoReservation {
                tracing::info!(phone = %phone, reason = %e, "no active reservation for guest");
            } else {
                tracing::error!(phone = %phone, error = %e, "message not answered");
            }
            record_apology(state, phone, message, &reply.text).await;
            reply
        }
    };

    tracing::info!(phone = %phone, outcome = reply.source.as_str(), "reply sent");
    reply
}

async fn resolve_answer(state: &AppState, phone: &str, message: &str) -> Result<Reply, AppError> {
    let token = state.gateway.authenticate().await?;

    let client = state
        .gateway
        .find_client_by_phone(phone, &token)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no client for {phone}")))?;

    let reservations = state
        .gateway
        .list_confirmed_reservations(&client.id, &token)
        .await?;
    let property_name = resolve_active_property(&reservations).ok_or_else(|| {
        AppError::NotFound(format!("no confirmed reservation for client {}", client.id))
    })?;
    tracing::debug!(phone = %phone, client_id = %client.id, property = %property_name, "property resolved");

    let mut session = state.sessions.get(phone).await?;

    let reply = match state.knowledge.lookup_answer(&property_name, message) {
        Some(answer) => Reply {
            text: answer.to_string(),
            source: ReplySource::Faq,
        },
        None => {
            let messages = build_messages(
                &property_name,
                state.knowledge.lookup_property(&property_name),
                session.recent(state.config.history_turns),
                message,
            );
            let text = state
                .llm
                .chat(SYSTEM_PROMPT, &messages)
                .await
                .map_err(|e| AppError::Generative(format!("{e:#}")))?;
            Reply {
                text,
                source: ReplySource::Generated,
            }
        }
    };

    session.push(message, &reply.text);
    state.sessions.save(&mut session).await?;

    Ok(reply)
}

/// Apologies are shown in the thread too; a store failure here is only logged.
async fn record_apology(state: &AppState, phone: &str, message: &str, reply: &str) {
    let result = async {
        let mut session = state.sessions.get(phone).await?;
        session.push(message, reply);
        state.sessions.save(&mut session).await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(phone = %phone, error = %e, "failed to record apology in session");
    }
}
