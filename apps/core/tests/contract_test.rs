use sshrunner_core::contract::{CoreRequest, CoreResponse, MatchRequest, RunRequest, SuggestionDto};
use sshrunner_core::core_service::CoreService;
use sshrunner_core::model::{MatchTier, Suggestion};
use sshrunner_core::ssh_config::HostConfigStore;

#[test]
fn encodes_requests_with_snake_case_kind() {
    let request = CoreRequest::Match(MatchRequest {
        query: "ssh work".to_string(),
    });

    let encoded = serde_json::to_string(&request).unwrap();

    assert_eq!(encoded, r#"{"kind":"match","payload":{"query":"ssh work"}}"#);
}

#[test]
fn decodes_hosts_request_without_payload() {
    let decoded: CoreRequest = serde_json::from_str(r#"{"kind":"hosts"}"#).unwrap();
    assert_eq!(decoded, CoreRequest::Hosts);

    let run: CoreRequest =
        serde_json::from_str(r#"{"kind":"run","payload":{"host":"work"}}"#).unwrap();
    assert_eq!(
        run,
        CoreRequest::Run(RunRequest {
            host: "work".to_string()
        })
    );
}

#[test]
fn fallback_dto_carries_display_text_and_action() {
    let dto = SuggestionDto::from(Suggestion::new("10.0.0.5", MatchTier::LiteralFallback));

    assert_eq!(dto.text, "SSH to 10.0.0.5");
    assert_eq!(dto.icon, "utilities-terminal");
    assert_eq!(dto.actions.len(), 1);
    assert_eq!(dto.actions[0].id, "ssh");

    let encoded = serde_json::to_string(&dto).unwrap();
    assert!(encoded.contains(r#""tier":"literal_fallback""#));
}

#[test]
fn handles_match_command_and_serializes_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    std::fs::write(&path, "Host work\nHost network\n").unwrap();
    let service =
        CoreService::with_store(Default::default(), HostConfigStore::with_path(&path)).unwrap();

    let response = service
        .handle_command(CoreRequest::Match(MatchRequest {
            query: "work".to_string(),
        }))
        .unwrap();

    match &response {
        CoreResponse::Match(body) => {
            let hosts: Vec<&str> = body.suggestions.iter().map(|s| s.host.as_str()).collect();
            assert_eq!(hosts, vec!["work", "network"]);
            assert!(body.suggestions.iter().all(|s| s.actions.is_empty()));
        }
        other => panic!("unexpected response: {other:?}"),
    }

    let encoded = serde_json::to_string(&response).unwrap();
    let decoded: CoreResponse = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, response);
}
