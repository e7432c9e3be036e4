use apipub_integrations::{RequestEnvelope, greeting, ping};

#[test]
fn test_ping_always_pongs() {
    let response = ping(&RequestEnvelope::new("/ping").with_query("ignored", "x"));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "{\n  \"ping\": \"Pong\"\n}");
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[test]
fn test_greeting_with_name() {
    let response = greeting(&RequestEnvelope::new("/greeting").with_query("greeting", "World"));

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "{\n  \"greeting\": \"Hello World\"\n}");
}

#[test]
fn test_greeting_with_empty_name() {
    let response = greeting(&RequestEnvelope::new("/greeting").with_query("greeting", ""));

    assert_eq!(response.status_code, 200);
    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["greeting"], "Hello ");
}

#[test]
fn test_greeting_without_name_fails() {
    let response = greeting(&RequestEnvelope::new("/prod/greeting"));

    assert_eq!(response.status_code, 500);
    assert_eq!(
        response.body,
        r#"{"error": "greeting is expected as a query parameter but it was not present in the request; /prod/greeting"}"#
    );
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[test]
fn test_greeting_ignores_other_parameters() {
    let response = greeting(&RequestEnvelope::new("/greeting").with_query("name", "World"));
    assert_eq!(response.status_code, 500);
}
