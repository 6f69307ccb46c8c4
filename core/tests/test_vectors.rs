//! Verify request building and team-lookup parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering
//! cannot cause false negatives.

use invite_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, OrgClient, RequestOutcome};
use url::Url;

const BASE_URL: &str = "http://localhost:3000";

fn client(token: &str) -> OrgClient {
    OrgClient::new(Url::parse(BASE_URL).unwrap(), token)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let arr = h.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match req.body.as_deref() {
        Some(body) => {
            let body: serde_json::Value = serde_json::from_str(body).unwrap();
            assert_eq!(body, expected["body"], "{name}: body");
        }
        None => assert!(expected["body"].is_null(), "{name}: body"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let c = client(vectors["token"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let org = input["org"].as_str().unwrap();
        let req = match case["operation"].as_str().unwrap() {
            "resolve_team" => c.build_resolve_team(org, input["team_slug"].as_str().unwrap()).unwrap(),
            "send_invitation" => c
                .build_send_invitation(
                    org,
                    input["email"].as_str().unwrap(),
                    input["team_id"].as_u64().unwrap(),
                )
                .unwrap(),
            other => panic!("{name}: unknown operation {other}"),
        };
        assert_request(name, &req, &case["expected_request"]);
    }
}

// ---------------------------------------------------------------------------
// Team lookup
// ---------------------------------------------------------------------------

#[test]
fn team_lookup_test_vectors() {
    let raw = include_str!("../../test-vectors/team_lookup.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let c = client("t");

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let outcome = RequestOutcome::from_response(
            HttpResponse {
                status: case["status"].as_u64().unwrap() as u16,
                body: case["body"].as_str().unwrap().to_string(),
            },
            1,
        );
        let result = c.parse_team_id(&outcome);
        let expected = &case["expected"];

        if let Some(id) = expected["team_id"].as_u64() {
            assert_eq!(result.unwrap(), id, "{name}");
            continue;
        }
        let err = result.unwrap_err();
        let matched = match expected["error"].as_str().unwrap() {
            "missing_team_id" => matches!(err, ApiError::MissingTeamId),
            "deserialization" => matches!(err, ApiError::DeserializationError(_)),
            "unexpected_outcome" => matches!(err, ApiError::UnexpectedOutcome(_)),
            other => panic!("{name}: unknown expected error {other}"),
        };
        assert!(matched, "{name}: got {err}");
    }
}
