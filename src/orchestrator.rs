//! The facade: classify once, dispatch if routed, render.

use std::sync::Arc;

use tracing::info;

use crate::classifier::classify;
use crate::config::{Persona, Profile};
use crate::dispatch::Dispatcher;
use crate::registry::SpecialistRegistry;
use crate::render::{RenderedResponse, capabilities, render, render_unrouted};
use crate::task::Task;

/// Stateless between calls; share it behind an `Arc` and call
/// [`handle`](Self::handle) from as many tasks as you like.
pub struct Orchestrator {
    persona: Persona,
    registry: Arc<SpecialistRegistry>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(profile: Profile, dispatcher: Dispatcher) -> Self {
        Self {
            persona: profile.persona,
            registry: Arc::new(profile.registry),
            dispatcher,
        }
    }

    /// Route and run one task. Always produces a response; failures are
    /// part of the rendered text and its [`ResponseKind`](crate::render::ResponseKind).
    pub async fn handle(&self, task: &Task) -> RenderedResponse {
        let decision = classify(task, &self.registry);
        if !decision.is_routed() {
            info!("task not routed");
            return render_unrouted(&self.persona);
        }

        let result = self.dispatcher.dispatch(&decision, task).await;
        render(&self.persona, &decision, task, &result)
    }

    /// Help text listing specialists and example tasks.
    pub fn capabilities(&self) -> String {
        capabilities(&self.persona, &self.registry)
    }
}
