use serde::{Deserialize, Serialize};

pub const TERMINAL_ICON: &str = "utilities-terminal";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    name: String,
}

impl HostEntry {
    pub fn new(name: &str) -> Self {
        Self::from_owned(name.to_string())
    }

    pub fn from_owned(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Relevance class of a suggestion. Variants are declared from most to least
/// relevant, so the derived `Ord` sorts best matches first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Possible,
    Completion,
    LiteralFallback,
}

impl MatchTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Possible => "possible",
            Self::Completion => "completion",
            Self::LiteralFallback => "literal_fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub host: String,
    pub tier: MatchTier,
}

impl Suggestion {
    pub fn new(host: &str, tier: MatchTier) -> Self {
        Self {
            host: host.to_string(),
            tier,
        }
    }

    pub fn text(&self) -> String {
        match self.tier {
            MatchTier::LiteralFallback => format!("SSH to {}", self.host),
            _ => format!("SSH to host {}", self.host),
        }
    }

    pub fn icon(&self) -> &'static str {
        TERMINAL_ICON
    }

    /// Secondary actions offered next to the suggestion. Only a typed-in
    /// address gets the explicit remote-host action.
    pub fn actions(&self) -> &'static [SuggestionAction] {
        match self.tier {
            MatchTier::LiteralFallback => &[SSH_REMOTE_ACTION],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionAction {
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
}

pub const SSH_REMOTE_ACTION: SuggestionAction = SuggestionAction {
    id: "ssh",
    title: "SSH to remote host",
    icon: TERMINAL_ICON,
};
