//! JSON profile loading: persona text plus the specialist table.
//!
//! A broken or missing document is never fatal. [`Profile::load_or_default`]
//! logs the problem and hands back [`Profile::builtin`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use tracing::{info, warn};

use crate::consts::{
    CONFIG_FILE_NAME, DEFAULT_CHANNEL_TIMEOUT, DEFAULT_SUBPROCESS_TIMEOUT, DEFAULT_THINKING,
    user_config_path,
};
use crate::error::ConfigError;
use crate::registry::{Specialist, SpecialistRegistry, TransportKind};

/// Canned phrases used when rendering responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Acknowledgments {
    pub routing: String,
    pub delegated: String,
    pub complete: String,
    pub error: String,
    pub unknown: String,
}

/// Who the orchestrator presents itself as.
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub name: String,
    pub emoji: String,
    pub tone: String,
    pub acknowledgments: Acknowledgments,
    pub examples: Vec<String>,
}

impl Persona {
    pub fn builtin() -> Self {
        Self {
            name: "Betty".into(),
            emoji: "🎭".into(),
            tone: "brisk and friendly".into(),
            acknowledgments: Acknowledgments {
                routing: "Routing to".into(),
                delegated: "✅ Task delegated".into(),
                complete: "✅ Complete".into(),
                error: "❌ Error".into(),
                unknown: "❓ Not sure what you mean".into(),
            },
            examples: vec![
                "scan 20 markets for hedges".into(),
                "review the code in src/main.rs".into(),
                "research competitor pricing".into(),
                "find hedges with 95% coverage".into(),
            ],
        }
    }
}

/// Everything the orchestrator needs from configuration.
#[derive(Debug, Clone)]
pub struct Profile {
    pub persona: Persona,
    pub registry: SpecialistRegistry,
}

#[derive(Debug, Deserialize)]
struct ProfileDocument {
    name: String,
    emoji: String,
    tone: String,
    acknowledgments: Acknowledgments,
    #[serde(deserialize_with = "ordered_entries")]
    specialists: Vec<(String, SpecialistEntry)>,
    examples: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransportName {
    #[default]
    Subprocess,
    Channel,
}

#[derive(Debug, Deserialize)]
struct SpecialistEntry {
    name: String,
    keywords: Vec<String>,
    #[serde(default)]
    transport: TransportName,
    command: Option<Vec<String>>,
    timeout_seconds: Option<u64>,
    thinking: Option<String>,
}

impl SpecialistEntry {
    fn into_specialist(self, label: String) -> Result<Specialist, ConfigError> {
        let (transport, default_timeout) = match self.transport {
            TransportName::Subprocess => {
                let command = self.command.unwrap_or_else(|| {
                    vec![format!("{{dir}}/{label}"), "--task".into(), "{task}".into()]
                });
                (
                    TransportKind::Subprocess { command },
                    DEFAULT_SUBPROCESS_TIMEOUT,
                )
            }
            TransportName::Channel => {
                if self.command.is_some() {
                    return Err(ConfigError::invalid(
                        label,
                        "`command` only applies to the subprocess transport",
                    ));
                }
                let thinking = self.thinking.unwrap_or_else(|| DEFAULT_THINKING.into());
                (TransportKind::ChannelSend { thinking }, DEFAULT_CHANNEL_TIMEOUT)
            }
        };
        let timeout = self
            .timeout_seconds
            .map_or(default_timeout, Duration::from_secs);
        Ok(Specialist::new(label, self.name, self.keywords, transport, timeout))
    }
}

/// `specialists` is a JSON object whose key order is the routing precedence,
/// so it's read entry by entry instead of into a hash map.
fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, SpecialistEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, SpecialistEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of specialist label to specialist")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((label, entry)) = map.next_entry::<String, SpecialistEntry>()? {
                entries.push((label, entry));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

impl Profile {
    pub fn builtin() -> Self {
        Self {
            persona: Persona::builtin(),
            registry: SpecialistRegistry::builtin(),
        }
    }

    /// Parse a profile document. Duplicate labels, empty keywords and zero
    /// timeouts are rejected along with missing fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: ProfileDocument = serde_json::from_str(json)?;
        let specialists = doc
            .specialists
            .into_iter()
            .map(|(label, entry)| entry.into_specialist(label))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            persona: Persona {
                name: doc.name,
                emoji: doc.emoji,
                tone: doc.tone,
                acknowledgments: doc.acknowledgments,
                examples: doc.examples,
            },
            registry: SpecialistRegistry::new(specialists)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from `path`, or fall back to the built-in profile when there is
    /// no path or the document is unusable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            warn!("no config found, using built-in profile");
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(profile) => {
                info!(
                    path = %path.display(),
                    specialists = profile.registry.len(),
                    "loaded profile"
                );
                profile
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not load config, using built-in profile");
                Self::builtin()
            }
        }
    }
}

/// Pick the config file: an explicit path wins even if it doesn't exist
/// (so the failure gets logged), then `<base_dir>/switchboard.json`, then
/// `~/.switchboard/switchboard.json`.
pub fn discover(explicit: Option<&Path>, base_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|p| p.is_file())
}
