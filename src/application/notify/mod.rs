//! Recipient resolution and delivery for anything that needs to reach a
//! user: alert triggers, stop-loss triggers, the daily digest. Resolution
//! order (§4.I): an explicit channel/chat id on the triggering record, else
//! the user's most recent session, else the platform identity the user
//! first registered with. If none resolve, the notification is dropped and
//! logged rather than erroring the caller's scan loop.

pub mod log_sender;

pub use log_sender::LogMessageSender;

use std::sync::Arc;

use crate::domain::ids::Channel;
use crate::domain::ports::{MessageSender, Store};

pub struct Notifier {
    store: Arc<dyn Store>,
    sender: Arc<dyn MessageSender>,
}

impl Notifier {
    pub fn new(store: Arc<dyn Store>, sender: Arc<dyn MessageSender>) -> Self {
        Self { store, sender }
    }

    pub async fn notify_user(
        &self,
        user_id: &str,
        explicit: Option<(Channel, String)>,
        text: &str,
    ) {
        match self.resolve_recipient(user_id, explicit).await {
            Some((channel, chat_id)) => {
                if let Err(err) = self.sender.send_message(channel, &chat_id, text).await {
                    tracing::warn!(user_id, %channel, error = %err, "failed to deliver notification");
                }
            }
            None => {
                tracing::warn!(user_id, "no deliverable recipient found, dropping notification");
            }
        }
    }

    async fn resolve_recipient(
        &self,
        user_id: &str,
        explicit: Option<(Channel, String)>,
    ) -> Option<(Channel, String)> {
        if let Some(target) = explicit {
            return Some(target);
        }

        if let Ok(Some(session)) = self.store.latest_session(user_id).await {
            return Some((session.channel, session.chat_id));
        }

        if let Ok(user) = self.store.get_user(user_id).await {
            return Some((user.platform, user.platform_user_id));
        }

        None
    }
}
