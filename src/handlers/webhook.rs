use actix_web::{web, HttpResponse, Result};
use chrono::Datelike;
use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::database::Database;
use crate::models::notification::MessageType;
use crate::models::task::NewTask;
use crate::services::notifier::{self, notify};
use crate::services::task_extraction::extract_task;
use crate::state::AppServices;
use crate::utils::errors::ServiceError;
use crate::utils::time::{current_instant, parse_due};

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub text: Option<String>,
    pub from: Option<TelegramUser>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: Option<String>,
}

// Only text messages from the configured manager account are acted upon
fn manager_command<'a>(update: &'a TelegramUpdate, manager_id: Option<i64>) -> Option<(i64, &'a str)> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    let sender = message.from.as_ref()?;

    if Some(sender.id) != manager_id {
        log::warn!(
            "⚠️ Ignoring message from {} ({}), not the manager",
            sender.id,
            sender.first_name.as_deref().unwrap_or("User")
        );
        return None;
    }
    Some((sender.id, text))
}

async fn create_task_from_chat(
    db: &Database,
    config: &AppConfig,
    services: &AppServices,
    text: &str,
) -> Result<String, ServiceError> {
    let client = services.completion.as_ref().ok_or_else(|| {
        ServiceError::ExternalService("AI completion is not configured".to_string())
    })?;
    let manager_id = config.manager_user_id.ok_or_else(|| {
        ServiceError::InternalError("MANAGER_USER_ID is not configured".to_string())
    })?;

    let year = current_instant(services.clock.as_ref()).year();
    let details = extract_task(client.as_ref(), text, year).await?;
    log::info!("Extracted task '{}' for '{}'", details.title, details.employee_name);

    let employee = db
        .find_employee_by_name(&details.employee_name)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("No employee named '{}'", details.employee_name))
        })?;

    let due_date = if parse_due(Some(&details.deadline)).is_some() {
        Some(details.deadline.clone())
    } else {
        log::warn!("Model returned unreadable deadline '{}', storing none", details.deadline);
        None
    };

    let task = db
        .create_task(&NewTask {
            title: details.title.clone(),
            description: Some(details.description.clone()),
            assigned_to: employee.id,
            assigned_by: manager_id,
            due_date,
        })
        .await?;

    let message = notifier::new_task_from_chat(&task.title, &details.deadline);
    notify(db, employee.id, &message, MessageType::NewTask).await?;

    Ok(format!(
        "✅ Task '{}' assigned to {} with deadline {}.",
        task.title, employee.full_name, details.deadline
    ))
}

// The chat is an outside surface, so only the caller-safe part of the error is echoed
fn failure_reply(err: &ServiceError) -> String {
    format!("❌ Could not create the task: {}", err.public_message())
}

/// Telegram bot webhook. Always answers 200 so Telegram does not redeliver.
pub async fn telegram_webhook(
    db: web::Data<Database>,
    config: web::Data<AppConfig>,
    services: web::Data<AppServices>,
    update: web::Json<TelegramUpdate>,
) -> Result<HttpResponse, ServiceError> {
    log::info!("POST /telegram-webhook");

    let Some((chat_id, text)) = manager_command(&update, config.manager_telegram_id) else {
        return Ok(HttpResponse::Ok().json(json!({ "ok": true })));
    };
    log::info!("📩 Task command from {}: {}", chat_id, text);

    match create_task_from_chat(&db, &config, &services, text).await {
        Ok(confirmation) => {
            if let Err(e) = services.replier.send_message(chat_id, &confirmation).await {
                log::error!("❌ Failed to send Telegram reply: {}", e);
            }
            Ok(HttpResponse::Ok().json(json!({ "ok": true })))
        }
        Err(e) => {
            log::error!("❌ Error creating task from chat: {}", e);
            let reply = failure_reply(&e);
            if let Err(send_err) = services.replier.send_message(chat_id, &reply).await {
                log::error!("❌ Failed to send Telegram reply: {}", send_err);
            }
            Ok(HttpResponse::Ok().json(json!({ "ok": true, "error": e.public_message() })))
        }
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/telegram-webhook", web::post().to(telegram_webhook));
}
