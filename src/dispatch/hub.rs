//! In-process worker sessions for the channel transport.
//!
//! A worker registers under a label and gets back a receiver of
//! [`Envelope`]s. Each envelope carries a one-shot reply slot; answering it
//! resolves the sender's pending [`SessionSender::send`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc, oneshot};

use super::channel::{SendError, SendRequest, SessionSender};

/// A request delivered to a worker session.
#[derive(Debug)]
pub struct Envelope {
    pub request: SendRequest,
    reply_tx: oneshot::Sender<Result<String, String>>,
}

impl Envelope {
    /// Answer the request. `Err` means the worker rejects the task.
    /// Returns false if the sender already gave up (timed out).
    pub fn reply(self, result: Result<String, String>) -> bool {
        self.reply_tx.send(result).is_ok()
    }
}

/// Label → session mailbox. RwLock allows registration while sends are in
/// flight.
#[derive(Default)]
pub struct SessionHub {
    sessions: RwLock<HashMap<String, mpsc::Sender<Envelope>>>,
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session mailbox. Re-registering a label replaces the old
    /// mailbox.
    pub async fn register(&self, label: &str, capacity: usize) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.sessions.write().await.insert(label.to_string(), tx);
        rx
    }

    pub async fn unregister(&self, label: &str) {
        self.sessions.write().await.remove(label);
    }

    pub async fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        labels.sort();
        labels
    }
}

#[async_trait]
impl SessionSender for SessionHub {
    async fn send(&self, request: SendRequest) -> Result<String, SendError> {
        let label = request.label.clone();
        let tx = self
            .sessions
            .read()
            .await
            .get(&label)
            .cloned()
            .ok_or_else(|| SendError::Unavailable(format!("no session labelled `{label}`")))?;

        let timeout = Duration::from_secs(request.timeout_seconds);
        let (reply_tx, reply_rx) = oneshot::channel();

        let exchange = async move {
            tx.send(Envelope { request, reply_tx })
                .await
                .map_err(|_| SendError::Unavailable(format!("session `{label}` is closed")))?;
            match reply_rx.await {
                Ok(Ok(ack)) => Ok(ack),
                Ok(Err(reason)) => Err(SendError::Rejected(reason)),
                Err(_) => Err(SendError::Unavailable(format!(
                    "session `{label}` dropped the request"
                ))),
            }
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .unwrap_or(Err(SendError::Timeout))
    }
}
