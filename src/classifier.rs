//! Keyword routing: task text → specialist.

use tracing::debug;

use crate::registry::{Specialist, SpecialistRegistry};
use crate::task::Task;

/// Where a task is going. `specialist == None` means no keyword matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingDecision<'a> {
    pub specialist: Option<&'a Specialist>,
    /// Always one of `specialist.keywords` when `specialist` is set.
    pub matched_keyword: Option<&'a str>,
}

impl<'a> RoutingDecision<'a> {
    pub fn unrouted() -> Self {
        Self {
            specialist: None,
            matched_keyword: None,
        }
    }

    pub fn is_routed(&self) -> bool {
        self.specialist.is_some()
    }
}

/// First specialist (registry order), first keyword (keyword order) whose
/// text occurs anywhere in the lower-cased task. Substring match, so
/// `test` also hits "latest".
pub fn classify<'a>(task: &Task, registry: &'a SpecialistRegistry) -> RoutingDecision<'a> {
    let lowered = task.as_str().to_lowercase();

    for specialist in registry.iter() {
        if let Some(keyword) = specialist
            .keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
        {
            debug!(specialist = %specialist.label, keyword = %keyword, "routed task");
            return RoutingDecision {
                specialist: Some(specialist),
                matched_keyword: Some(keyword.as_str()),
            };
        }
    }

    debug!("no specialist matched");
    RoutingDecision::unrouted()
}
