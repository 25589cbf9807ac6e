use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The statically known set of answer providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Gemini,
}

impl ProviderId {
    /// Every valid provider, in default dispatch order.
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::Gemini];

    /// Wire tag accepted in selections and emitted in events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OpenAI",
            ProviderId::Gemini => "Gemini",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "gemini" => Ok(ProviderId::Gemini),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// The providers selected for one run.
///
/// Always non-empty: unknown tags are dropped, and an empty or all-invalid
/// selection falls back to [`ProviderId::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection(Vec<ProviderId>);

impl ProviderSelection {
    /// The full default set.
    pub fn all() -> Self {
        ProviderSelection(ProviderId::ALL.to_vec())
    }

    /// Resolve caller-supplied tags, preserving order and removing duplicates.
    pub fn resolve<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = Vec::new();
        for tag in tags {
            if let Ok(id) = tag.as_ref().parse::<ProviderId>() {
                if !selected.contains(&id) {
                    selected.push(id);
                }
            }
        }

        if selected.is_empty() {
            return Self::all();
        }
        ProviderSelection(selected)
    }

    /// Resolve a JSON-encoded array of tags such as `["gemini"]`.
    ///
    /// Anything that is not a JSON array of strings selects the default set.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Vec<String>>(text) {
            Ok(tags) => Self::resolve(tags),
            Err(_) => Self::all(),
        }
    }

    pub fn ids(&self) -> &[ProviderId] {
        &self.0
    }
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl From<ProviderId> for ProviderSelection {
    fn from(id: ProviderId) -> Self {
        ProviderSelection(vec![id])
    }
}
