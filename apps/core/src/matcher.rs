use std::sync::Arc;

use crate::model::{HostEntry, MatchTier, Suggestion};
use crate::ssh_config::HostConfigStore;

const SSH_PREFIX: &str = "ssh ";
const MIN_PARTIAL_QUERY_CHARS: usize = 3;

/// Ranks the hosts of a [`HostConfigStore`] against launcher queries.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    store: Arc<HostConfigStore>,
}

impl MatchEngine {
    pub fn new(store: Arc<HostConfigStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &HostConfigStore {
        &self.store
    }

    pub fn match_query(&self, query: &str) -> Vec<Suggestion> {
        let (request, explicit_ssh) = strip_ssh_prefix(query);
        if request.is_empty() {
            return Vec::new();
        }

        match self.store.snapshot() {
            Some(snapshot) => rank(snapshot.entries(), request, explicit_ssh),
            None => rank(&[], request, explicit_ssh),
        }
    }
}

/// Scores `hosts` against an already prefix-stripped request.
///
/// Output is ordered by tier, then by position in `hosts`. When the user typed
/// the `ssh ` keyword and no host matched exactly, the request itself is
/// appended as a [`MatchTier::LiteralFallback`].
pub fn rank(hosts: &[HostEntry], request: &str, explicit_ssh: bool) -> Vec<Suggestion> {
    if request.is_empty() {
        return Vec::new();
    }

    let folded_request = request.to_lowercase();
    let allow_partial = request.chars().count() >= MIN_PARTIAL_QUERY_CHARS;

    let mut scored: Vec<(MatchTier, usize, &HostEntry)> = hosts
        .iter()
        .enumerate()
        .filter_map(|(index, host)| {
            score_host(host.name(), &folded_request, allow_partial).map(|tier| (tier, index, host))
        })
        .collect();

    let exact_match_found = scored.iter().any(|(tier, _, _)| *tier == MatchTier::Exact);
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut out: Vec<Suggestion> = scored
        .into_iter()
        .map(|(tier, _, host)| Suggestion::new(host.name(), tier))
        .collect();

    if explicit_ssh && !exact_match_found {
        out.push(Suggestion::new(request, MatchTier::LiteralFallback));
    }
    out
}

/// Splits off a leading case-insensitive `ssh ` keyword.
pub fn strip_ssh_prefix(query: &str) -> (&str, bool) {
    match query.get(..SSH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SSH_PREFIX) => {
            (&query[SSH_PREFIX.len()..], true)
        }
        _ => (query, false),
    }
}

fn score_host(name: &str, folded_request: &str, allow_partial: bool) -> Option<MatchTier> {
    let folded_name = name.to_lowercase();
    if folded_name == folded_request {
        return Some(MatchTier::Exact);
    }
    if !allow_partial {
        return None;
    }

    if folded_name.starts_with(folded_request) {
        Some(MatchTier::Possible)
    } else if folded_name.contains(folded_request) {
        Some(MatchTier::Completion)
    } else {
        None
    }
}
