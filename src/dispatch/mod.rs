//! Invoking the routed specialist.
//!
//! One [`Dispatcher`] fronts both transports. The specialist's
//! [`TransportKind`] picks which one runs, and the dispatcher owns the
//! timeout: when it elapses the invocation future is dropped, which kills
//! the child process or abandons the pending channel reply.

pub mod channel;
pub mod hub;
pub mod subprocess;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{info, warn};

use crate::classifier::RoutingDecision;
use crate::error::DispatchError;
use crate::registry::{Specialist, TransportKind};
use crate::task::Task;

/// Which transport produced a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via {
    Subprocess,
    Channel,
}

/// A successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Possibly tail-truncated.
    pub output: String,
    /// Character count before truncation.
    pub total_chars: usize,
    pub via: Via,
}

impl Delivery {
    pub fn is_truncated(&self) -> bool {
        self.output.chars().count() < self.total_chars
    }
}

pub type DispatchResult = Result<Delivery, DispatchError>;

/// A way of reaching a specialist.
///
/// Implementations don't need their own timeout, but they must release
/// whatever they hold (processes, reply channels) when dropped mid-flight.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(&self, specialist: &Specialist, task: &Task) -> DispatchResult;
}

/// Keeps the last `max_chars` characters of `text`.
pub fn tail(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    text.chars().skip(total - max_chars).collect()
}

/// Holds no per-call state; one instance can serve concurrent requests.
pub struct Dispatcher {
    subprocess: Arc<dyn Transport>,
    channel: Option<Arc<dyn Transport>>,
}

impl Dispatcher {
    pub fn new(subprocess: Arc<dyn Transport>) -> Self {
        Self {
            subprocess,
            channel: None,
        }
    }

    /// Enable channel-send specialists. Without this they fail with a
    /// transport error.
    pub fn with_channel(mut self, channel: Arc<dyn Transport>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Invoke the routed specialist. Unrouted decisions return
    /// [`DispatchError::NotFound`] without touching any transport.
    pub async fn dispatch(&self, decision: &RoutingDecision<'_>, task: &Task) -> DispatchResult {
        let Some(specialist) = decision.specialist else {
            return Err(DispatchError::NotFound);
        };

        let transport = match &specialist.transport {
            TransportKind::Subprocess { .. } => &self.subprocess,
            TransportKind::ChannelSend { .. } => match &self.channel {
                Some(channel) => channel,
                None => {
                    warn!(specialist = %specialist.label, "no channel transport configured");
                    return Err(DispatchError::transport("no channel transport configured"));
                }
            },
        };

        info!(
            specialist = %specialist.label,
            transport = specialist.transport.name(),
            timeout_secs = specialist.timeout.as_secs_f64(),
            "dispatching task"
        );
        let started = Instant::now();

        let invocation = AssertUnwindSafe(transport.invoke(specialist, task)).catch_unwind();
        let result = match tokio::time::timeout(specialist.timeout, invocation).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(DispatchError::transport(format!(
                "transport panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => Err(DispatchError::Timeout {
                after: specialist.timeout,
            }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(delivery) => info!(
                specialist = %specialist.label,
                elapsed_ms,
                chars = delivery.total_chars,
                "specialist finished"
            ),
            Err(e) => warn!(
                specialist = %specialist.label,
                elapsed_ms,
                kind = ?e.kind(),
                error = %e,
                "dispatch failed"
            ),
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
