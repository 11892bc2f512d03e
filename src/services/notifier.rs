//! Notification emitter and the message templates shared by every producer.

use uuid::Uuid;

use crate::models::notification::MessageType;
use crate::repositories::NotificationStore;
use crate::utils::errors::ServiceError;

/// Appends one message for `recipient_id`. No retry, batching or dedup.
pub async fn notify<N>(
    store: &N,
    recipient_id: Uuid,
    content: &str,
    message_type: MessageType,
) -> Result<(), ServiceError>
where
    N: NotificationStore + ?Sized,
{
    let stored = store.insert(recipient_id, content, message_type).await?;
    log::debug!(
        "Notification {} ({}) stored for {}",
        stored.id,
        message_type.as_str(),
        recipient_id
    );
    Ok(())
}

pub fn deadline_warning(title: &str) -> String {
    format!("⏰ URGENT: Task '{}' is due in less than 24 hours!", title)
}

pub fn task_completed(title: &str, employee_name: &str) -> String {
    format!("✅ '{}' completed by {}!", title, employee_name)
}

/// `due` is the already formatted `dd/mm/YYYY HH:MM` display string, if any.
pub fn new_task(title: &str, due: Option<&str>) -> String {
    match due.and_then(|d| d.split_once(' ')) {
        Some((date, time)) => format!("✅ New Task: '{}' - Due {} at {} IST", title, date, time),
        None => format!("✅ New Task: '{}' - No due date", title),
    }
}

pub fn new_task_from_chat(title: &str, deadline: &str) -> String {
    format!("New Task Assigned: {} with deadline {}", title, deadline)
}

pub fn task_edited(title: &str) -> String {
    format!("✏️ Task '{}' was updated by your manager", title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryStore;

    #[tokio::test]
    async fn notify_appends_one_record() {
        let store = MemoryStore::default();
        let recipient = Uuid::new_v4();

        notify(&store, recipient, "hello", MessageType::Info).await.unwrap();

        let messages = store.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient_id, recipient);
        assert_eq!(messages[0].message_type, MessageType::Info);
    }

    #[tokio::test]
    async fn recipient_listing_is_newest_first() {
        let store = MemoryStore::default();
        let recipient = Uuid::new_v4();

        notify(&store, recipient, "first", MessageType::Info).await.unwrap();
        notify(&store, Uuid::new_v4(), "other", MessageType::Info).await.unwrap();
        notify(&store, recipient, "second", MessageType::Warning).await.unwrap();

        let listed = store.list_for_recipient(recipient).await.unwrap();
        let contents: Vec<&str> = listed.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[test]
    fn templates_carry_the_title() {
        assert!(deadline_warning("Ship v2").contains("'Ship v2'"));
        assert_eq!(task_completed("Ship v2", "Meera"), "✅ 'Ship v2' completed by Meera!");
        assert_eq!(
            new_task("Ship v2", Some("20/01/2026 17:00")),
            "✅ New Task: 'Ship v2' - Due 20/01/2026 at 17:00 IST"
        );
        assert_eq!(new_task("Ship v2", None), "✅ New Task: 'Ship v2' - No due date");
    }
}
