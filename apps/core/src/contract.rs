use serde::{Deserialize, Serialize};

use crate::model::{MatchTier, Suggestion, SuggestionAction};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionDto {
    pub id: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionDto {
    pub host: String,
    pub tier: MatchTier,
    pub text: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResponse {
    pub suggestions: Vec<SuggestionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRequest {
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunResponse {
    pub launched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostsResponse {
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreRequest {
    Match(MatchRequest),
    Run(RunRequest),
    Hosts,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum CoreResponse {
    Match(MatchResponse),
    Run(RunResponse),
    Hosts(HostsResponse),
}

impl From<&SuggestionAction> for ActionDto {
    fn from(value: &SuggestionAction) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title.to_string(),
            icon: value.icon.to_string(),
        }
    }
}

impl From<Suggestion> for SuggestionDto {
    fn from(value: Suggestion) -> Self {
        let text = value.text();
        let icon = value.icon().to_string();
        let actions = value.actions().iter().map(ActionDto::from).collect();
        Self {
            host: value.host,
            tier: value.tier,
            text,
            icon,
            actions,
        }
    }
}
