//! One-shot messages carried across a redirect in the session

use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

/// Queue a message for the next page render.
pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), tower_sessions::session::Error> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await
}

/// Drain queued messages. Session failures only cost the messages.
pub async fn take(session: &Session) -> Vec<String> {
    match session.remove::<Vec<String>>(FLASH_KEY).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read flash messages");
            Vec::new()
        }
    }
}
