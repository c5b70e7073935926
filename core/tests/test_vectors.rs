//! Verify classification and header construction against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use api_core::{classify, join_url, request_headers, Classified, Payload};

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();
        let expected = &case["expected"];

        let classified = classify(body);
        match expected["kind"].as_str().unwrap() {
            "empty" => assert_eq!(classified, Classified::Data(Payload::Empty), "{name}"),
            "json" => assert_eq!(
                classified,
                Classified::Data(Payload::Json(expected["value"].clone())),
                "{name}"
            ),
            "text" => assert_eq!(
                classified,
                Classified::Data(Payload::Text(expected["value"].as_str().unwrap().to_string())),
                "{name}"
            ),
            "expired" => assert_eq!(classified, Classified::SessionExpired, "{name}"),
            "rejected" => {
                let Classified::Rejected(rejection) = classified else {
                    panic!("{name}: expected rejection, got {classified:?}");
                };
                assert_eq!(
                    rejection.status_code,
                    expected["status"].as_u64().unwrap(),
                    "{name}: status"
                );
                assert_eq!(
                    rejection.message.as_deref(),
                    expected["message"].as_str(),
                    "{name}: message"
                );
                let payload: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(rejection.payload, payload, "{name}: payload");
            }
            other => panic!("{name}: unknown kind {other}"),
        }
    }
}

#[test]
fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let headers = request_headers(
            case["has_body"].as_bool().unwrap(),
            case["token"].as_str(),
            case["upload"].as_bool().unwrap(),
        );

        let expected: Vec<(String, String)> = case["expected"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(headers, expected, "{name}");
    }
}

#[test]
fn url_joining() {
    for (root, path, expected) in [
        ("https://h", "/x", "https://h/x"),
        ("https://h", "x", "https://h/x"),
        ("https://h/", "/x", "https://h/x"),
        ("https://h/api", "notes/1", "https://h/api/notes/1"),
        ("", "/x", "/x"),
    ] {
        assert_eq!(join_url(root, path), expected, "{root} + {path}");
    }
}
