//! Contact-form handler
//!
//! Save-then-notify: the message is committed to the store first, then the
//! owner notification and auto-reply are attempted. Mail failures are
//! reported in the response (`emailed: false`) but never undo the save or
//! fail the request.

use axum::{extract::State, Json};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppState;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::ContactRequest;
use crate::services::mailer::Envelope;
use crate::services::store;

lazy_static! {
    /// Liberal shape check, only used to decide whether an auto-reply is
    /// worth attempting.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Handle a contact-form submission
///
/// POST /api/messages
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactRequest>,
) -> AppResult<Json<Value>> {
    tracing::info!(
        name = %body.name,
        len = body.message.len(),
        honeypot = !body.hp.is_empty(),
        "Contact submission received"
    );

    // Bots fill the hidden field; pretend success and do nothing.
    if !body.hp.is_empty() {
        metrics::record_contact_message("honeypot");
        return Ok(Json(json!({ "ok": true, "skipped": true })));
    }

    if body.name.trim().is_empty() || body.message.trim().is_empty() {
        metrics::record_contact_message("invalid");
        return Err(AppError::BadRequest("name_message_required"));
    }

    let id = state
        .store
        .insert(
            store::MESSAGES,
            json!({
                "name": body.name,
                "email": body.email,
                "message": body.message,
            }),
        )
        .await?;
    metrics::record_contact_message("saved");

    let (emailed, message_id) = if state.config.mail.enabled {
        notify(&state, &body).await
    } else {
        (false, None)
    };

    Ok(Json(json!({
        "ok": true,
        "id": id,
        "emailed": emailed,
        "messageId": message_id,
    })))
}

/// Owner notification plus optional auto-reply; best effort only.
async fn notify(state: &AppState, body: &ContactRequest) -> (bool, Option<String>) {
    let owner = Envelope {
        to: state.config.mail.owner_email.clone(),
        reply_to: (!body.email.is_empty()).then(|| body.email.clone()),
        subject: format!("New portfolio message from {}", body.name),
        text: format!(
            "{}\n\nFrom: {} <{}>",
            body.message,
            body.name,
            if body.email.is_empty() {
                "no-email"
            } else {
                &body.email
            }
        ),
    };

    let message_id = match state.mailer.send(&owner).await {
        Ok(id) => {
            tracing::info!(message_id = %id.0, "Owner notification sent");
            metrics::record_mail_sent("owner", true);
            id.0
        }
        Err(e) => {
            tracing::error!("Owner notification failed: {}", e);
            metrics::record_mail_sent("owner", false);
            return (false, None);
        }
    };

    if EMAIL_RE.is_match(&body.email) {
        let reply = Envelope {
            to: body.email.clone(),
            reply_to: None,
            subject: "Thanks for reaching out".to_string(),
            text: format!(
                "Hi {},\n\nThanks for your message. I'll get back to you soon.\n\n{}",
                body.name, state.config.mail.owner_name
            ),
        };

        match state.mailer.send(&reply).await {
            Ok(id) => {
                tracing::info!(message_id = %id.0, "Auto-reply sent");
                metrics::record_mail_sent("autoreply", true);
            }
            Err(e) => {
                // The owner already has the message; the auto-reply is optional.
                tracing::warn!("Auto-reply failed: {}", e);
                metrics::record_mail_sent("autoreply", false);
            }
        }
    }

    (true, Some(message_id))
}
