//! Handing a task to a managed worker session over an async send.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::{Delivery, DispatchResult, Transport, Via, tail};
use crate::consts::DEFAULT_OUTPUT_TAIL_CHARS;
use crate::error::DispatchError;
use crate::registry::{Specialist, TransportKind};
use crate::task::Task;

/// What goes over the wire to a worker session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SendRequest {
    pub message: String,
    /// Session address; the specialist label.
    pub label: String,
    pub timeout_seconds: u64,
    pub thinking: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SendError {
    #[error("send timed out")]
    Timeout,
    /// The session received the task and refused or failed it.
    #[error("rejected by session: {0}")]
    Rejected(String),
    /// The session couldn't be reached at all.
    #[error("session unavailable: {0}")]
    Unavailable(String),
}

/// The send primitive: deliver a request, resolve to the session's
/// acknowledgment.
#[async_trait]
pub trait SessionSender: Send + Sync {
    async fn send(&self, request: SendRequest) -> Result<String, SendError>;
}

/// Dispatches channel-send specialists through a [`SessionSender`].
/// Never retries.
pub struct ChannelTransport {
    sender: Arc<dyn SessionSender>,
    tail_chars: usize,
}

impl ChannelTransport {
    pub fn new(sender: Arc<dyn SessionSender>) -> Self {
        Self {
            sender,
            tail_chars: DEFAULT_OUTPUT_TAIL_CHARS,
        }
    }

    pub fn with_tail_chars(mut self, tail_chars: usize) -> Self {
        self.tail_chars = tail_chars;
        self
    }

    pub fn request_for(specialist: &Specialist, thinking: &str, task: &Task) -> SendRequest {
        SendRequest {
            message: format!("Task for {}: {}", specialist.name, task),
            label: specialist.label.clone(),
            timeout_seconds: specialist.timeout.as_secs().max(1),
            thinking: thinking.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn invoke(&self, specialist: &Specialist, task: &Task) -> DispatchResult {
        let TransportKind::ChannelSend { thinking } = &specialist.transport else {
            return Err(DispatchError::transport(format!(
                "{} is not a channel specialist",
                specialist.label
            )));
        };

        let request = Self::request_for(specialist, thinking, task);
        match self.sender.send(request).await {
            Ok(ack) => Ok(Delivery {
                output: tail(&ack, self.tail_chars),
                total_chars: ack.chars().count(),
                via: Via::Channel,
            }),
            Err(SendError::Timeout) => Err(DispatchError::Timeout {
                after: specialist.timeout,
            }),
            Err(SendError::Rejected(reason)) => Err(DispatchError::NonZeroExit {
                code: None,
                stderr: tail(&reason, self.tail_chars),
            }),
            Err(e @ SendError::Unavailable(_)) => Err(DispatchError::transport(e.to_string())),
        }
    }
}
