//! Default `MessageSender`: emits structured log lines instead of calling
//! out to a chat platform. Wiring a real Telegram/Discord/Slack client is
//! outer-surface work this backbone doesn't own; engines only need the
//! capability trait to exist and deliveries to be observable.

use crate::domain::ids::Channel;
use crate::domain::ports::MessageSender;

#[derive(Debug, Default)]
pub struct LogMessageSender;

#[async_trait::async_trait]
impl MessageSender for LogMessageSender {
    async fn send_message(&self, channel: Channel, chat_id: &str, text: &str) -> anyhow::Result<()> {
        tracing::info!(%channel, chat_id, text, "notification delivered");
        Ok(())
    }
}
