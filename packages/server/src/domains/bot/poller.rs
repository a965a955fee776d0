//! Long-polling loop for running the bot without a public webhook.
//!
//! ```text
//! BotPoller
//!     │
//!     ├─► getUpdates(offset) via BaseChatService
//!     ├─► handle_update → reply
//!     └─► sendMessage, advance offset past the batch
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use super::handlers::handle_update;
use crate::kernel::{BaseChatService, ServerDeps};

#[derive(Debug, Clone)]
pub struct BotPollerConfig {
    /// Server-side long-poll timeout passed to getUpdates
    pub poll_timeout_secs: u32,
    /// Pause after a failed getUpdates call
    pub error_backoff: Duration,
}

impl Default for BotPollerConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            error_backoff: Duration::from_secs(5),
        }
    }
}

pub struct BotPoller {
    chat: Arc<dyn BaseChatService>,
    deps: Arc<ServerDeps>,
    config: BotPollerConfig,
    shutdown: Arc<AtomicBool>,
}

impl BotPoller {
    pub fn new(chat: Arc<dyn BaseChatService>, deps: Arc<ServerDeps>) -> Self {
        Self::with_config(chat, deps, BotPollerConfig::default())
    }

    pub fn with_config(
        chat: Arc<dyn BaseChatService>,
        deps: Arc<ServerDeps>,
        config: BotPollerConfig,
    ) -> Self {
        Self {
            chat,
            deps,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Call `store(true, Ordering::SeqCst)` on the returned Arc to stop the loop.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Poll until shutdown is requested.
    pub async fn run(self) -> Result<()> {
        info!(
            poll_timeout_secs = self.config.poll_timeout_secs,
            "telegram bot polling started"
        );

        let mut offset = None;
        while !self.is_shutdown_requested() {
            match self.poll_once(offset).await {
                Ok(next) => offset = next,
                Err(e) => {
                    error!(error = %e, "failed to fetch telegram updates");
                    tokio::time::sleep(self.config.error_backoff).await;
                }
            }
        }

        info!("telegram bot polling stopped");
        Ok(())
    }

    /// Fetch one batch, answer each update and return the offset for the
    /// next call. Replies that fail to send are logged and skipped so one
    /// blocked chat cannot stall the queue.
    pub async fn poll_once(&self, offset: Option<i64>) -> Result<Option<i64>> {
        let updates = self
            .chat
            .get_updates(offset, self.config.poll_timeout_secs)
            .await?;

        if updates.is_empty() {
            return Ok(offset);
        }
        debug!(count = updates.len(), "received telegram updates");

        let mut next = offset;
        for update in &updates {
            next = Some(next.map_or(update.update_id + 1, |n| n.max(update.update_id + 1)));

            if let Some(reply) = handle_update(update, &self.deps).await {
                if let Err(e) = self.chat.send_message(&reply).await {
                    warn!(
                        update_id = update.update_id,
                        chat_id = reply.chat_id,
                        error = %e,
                        "failed to send reply"
                    );
                }
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegram::models::{Chat, Message, Update, User};

    use crate::kernel::test_dependencies::MockChatService;
    use crate::kernel::TestDependencies;

    fn start(update_id: i64, chat_id: i64) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: update_id,
                from: Some(User {
                    id: chat_id,
                    is_bot: false,
                    first_name: "Ali".to_string(),
                    last_name: None,
                    username: None,
                }),
                chat: Chat { id: chat_id },
                text: Some("/start".to_string()),
                contact: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_poll_once_replies_and_advances_offset() {
        let chat = MockChatService::new().with_updates(vec![start(10, 1), start(11, 2)]);
        let deps = Arc::new(TestDependencies::new().into_server_deps());
        let poller = BotPoller::new(Arc::new(chat.clone()), deps);

        let next = poller.poll_once(None).await.unwrap();

        assert_eq!(next, Some(12));
        let sent = chat.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].chat_id, 1);
        assert_eq!(sent[1].chat_id, 2);
    }

    #[tokio::test]
    async fn test_empty_batch_keeps_offset() {
        let chat = MockChatService::new();
        let deps = Arc::new(TestDependencies::new().into_server_deps());
        let poller = BotPoller::new(Arc::new(chat.clone()), deps);

        assert_eq!(poller.poll_once(Some(7)).await.unwrap(), Some(7));
        assert_eq!(chat.requested_offsets(), vec![Some(7)]);
    }

    #[tokio::test]
    async fn test_fetch_failure_surfaces() {
        let chat = MockChatService::new().with_failure("conflict");
        let deps = Arc::new(TestDependencies::new().into_server_deps());
        let poller = BotPoller::new(Arc::new(chat), deps);

        assert!(poller.poll_once(None).await.is_err());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let chat = MockChatService::new().with_updates(vec![start(1, 1)]);
        let deps = Arc::new(TestDependencies::new().into_server_deps());
        let poller = BotPoller::new(Arc::new(chat), deps);
        poller.shutdown_handle().store(true, Ordering::SeqCst);

        poller.run().await.unwrap();
    }
}
