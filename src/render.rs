//! Turning a routing decision and dispatch outcome into user-facing text.
//!
//! Pure formatting. Every failure kind gets its own wording and its own
//! [`ResponseKind`], so nothing downstream has to parse the text.

use std::fmt::Write;

use crate::classifier::RoutingDecision;
use crate::config::Persona;
use crate::consts::{HELP_EXAMPLES_SHOWN, HELP_KEYWORDS_SHOWN};
use crate::dispatch::{Delivery, DispatchResult, Via};
use crate::error::{DispatchError, ErrorKind};
use crate::registry::{SpecialistRegistry, TransportKind};
use crate::task::Task;

/// Which branch produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Unrouted,
    /// A subprocess specialist finished successfully.
    Completed,
    /// A channel session acknowledged the task.
    Delegated,
    Failed(ErrorKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub text: String,
    pub kind: ResponseKind,
}

/// The fixed reply for tasks no specialist claims.
pub fn render_unrouted(persona: &Persona) -> RenderedResponse {
    RenderedResponse {
        text: format!("{} {}", persona.emoji, persona.acknowledgments.unknown),
        kind: ResponseKind::Unrouted,
    }
}

pub fn render(
    persona: &Persona,
    decision: &RoutingDecision<'_>,
    task: &Task,
    result: &DispatchResult,
) -> RenderedResponse {
    let Some(specialist) = decision.specialist else {
        return render_unrouted(persona);
    };
    let acks = &persona.acknowledgments;
    let name = &specialist.name;
    let mut text = format!("{} {} {}\n", persona.emoji, acks.routing, name);

    let kind = match result {
        Ok(delivery) => {
            render_delivery(&mut text, persona, name, task, delivery);
            match delivery.via {
                Via::Subprocess => ResponseKind::Completed,
                Via::Channel => ResponseKind::Delegated,
            }
        }
        Err(err) => {
            let line = match err {
                DispatchError::Timeout { after } => {
                    format!("{name} timed out after {}s", after.as_secs_f64())
                }
                DispatchError::NonZeroExit { code: Some(code), stderr } => {
                    with_detail(format!("{name} exited with status {code}"), stderr)
                }
                DispatchError::NonZeroExit { code: None, stderr } => {
                    let line = match specialist.transport {
                        TransportKind::Subprocess { .. } => {
                            format!("{name} was terminated by a signal")
                        }
                        TransportKind::ChannelSend { .. } => format!("{name} rejected the task"),
                    };
                    with_detail(line, stderr)
                }
                DispatchError::TransportFailure(detail) => {
                    format!("{name} could not be reached: {detail}")
                }
                DispatchError::NotFound => "no specialist available for this task".to_string(),
            };
            text.push_str(&format!("{}: {}", acks.error, line));
            ResponseKind::Failed(err.kind())
        }
    };

    RenderedResponse { text, kind }
}

fn render_delivery(text: &mut String, persona: &Persona, name: &str, task: &Task, delivery: &Delivery) {
    let acks = &persona.acknowledgments;
    match delivery.via {
        Via::Subprocess => {
            text.push_str(&acks.complete);
            text.push_str("\n\n");
            if delivery.output.trim().is_empty() {
                text.push_str("(no output)");
            } else {
                text.push_str(delivery.output.trim_end());
            }
        }
        Via::Channel => {
            let _ = write!(text, "{} to {}: {}", acks.delegated, name, task);
            if !delivery.output.trim().is_empty() {
                text.push_str("\n\n");
                text.push_str(delivery.output.trim_end());
            }
        }
    }
    if delivery.is_truncated() {
        let _ = write!(
            text,
            "\n\n[showing last {} of {} characters]",
            delivery.output.chars().count(),
            delivery.total_chars
        );
    }
}

fn with_detail(line: String, detail: &str) -> String {
    if detail.trim().is_empty() {
        line
    } else {
        format!("{line}\n{detail}")
    }
}

/// Capability summary shown when no task is given.
pub fn capabilities(persona: &Persona, registry: &SpecialistRegistry) -> String {
    let mut out = format!("{} **{} - Orchestrator**\n\n", persona.emoji, persona.name);
    out.push_str("**Specialists:**\n");

    for specialist in registry.iter() {
        let keywords: Vec<&str> = specialist
            .keywords
            .iter()
            .take(HELP_KEYWORDS_SHOWN)
            .map(String::as_str)
            .collect();
        let _ = write!(
            out,
            "\n{} **{}** ({}, {})\n   Keywords: {}\n",
            persona.emoji,
            specialist.name,
            specialist.label,
            specialist.transport.name(),
            keywords.join(", ")
        );
    }

    if !persona.examples.is_empty() {
        out.push_str("\n**Examples:**\n");
        for example in persona.examples.iter().take(HELP_EXAMPLES_SHOWN) {
            let _ = writeln!(out, "   • `{}, {}`", persona.name, example);
        }
    }
    out
}
