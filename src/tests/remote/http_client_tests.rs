use super::*;

#[test]
fn resolve_url_keeps_absolute_and_joins_relative() {
    let client = MetermanClient::new("http://gw-hub:8080/").unwrap();
    assert_eq!(client.base_url(), "http://gw-hub:8080");
    assert_eq!(
        client.resolve_url("/meterman/download/metermon"),
        "http://gw-hub:8080/meterman/download/metermon"
    );
    assert_eq!(
        client.resolve_url("files/metermon"),
        "http://gw-hub:8080/files/metermon"
    );
    assert_eq!(
        client.resolve_url("https://cdn.example.org/metermon"),
        "https://cdn.example.org/metermon"
    );
}

#[test]
fn unexpected_status_names_the_request() {
    let err = RemoteError::UnexpectedStatus {
        label: "state query".to_string(),
        status: reqwest::StatusCode::BAD_GATEWAY,
    };
    assert_eq!(err.to_string(), "state query: unexpected status 502 Bad Gateway");
}
