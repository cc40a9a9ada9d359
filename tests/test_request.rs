use httpwire::http::error::ParseError;
use httpwire::http::request::{ParseState, Request, RequestBuilder};

#[test]
fn test_request_header_retrieval() {
    let req = RequestBuilder::new()
        .method("GET")
        .target("/")
        .header("Host", "example.com")
        .header("Content-Type", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_returns_first_value() {
    let req = RequestBuilder::new()
        .method("GET")
        .target("/")
        .header("Accept", "text/html")
        .header("accept", "application/json")
        .build()
        .unwrap();

    assert_eq!(req.header("Accept"), Some("text/html"));
    assert_eq!(req.headers.get("accept").unwrap().len(), 2);
}

#[test]
fn test_request_content_length_parsing() {
    let req = RequestBuilder::new()
        .method("POST")
        .target("/api")
        .header("Content-Length", "42")
        .build()
        .unwrap();

    assert_eq!(req.content_length(), 42);
}

#[test]
fn test_request_content_length_missing() {
    let req = RequestBuilder::new().method("GET").target("/").build().unwrap();

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let req = RequestBuilder::new()
        .method("POST")
        .target("/api")
        .header("Content-Length", "not-a-number")
        .build()
        .unwrap();

    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_built_request_is_done() {
    let req = RequestBuilder::new()
        .method("POST")
        .target("/api")
        .body("test body content")
        .build()
        .unwrap();

    assert!(req.is_done());
    assert_eq!(req.request_line.version, "1.1");
    assert_eq!(req.body, b"test body content".to_vec());
}

#[test]
fn test_builder_requires_method_and_target() {
    let missing_method = RequestBuilder::new().target("/").build();
    assert!(matches!(missing_method, Err(ParseError::MalformedRequestLine)));

    let empty_target = RequestBuilder::new().method("GET").target("").build();
    assert!(matches!(empty_target, Err(ParseError::MalformedRequestLine)));
}

#[test]
fn test_builder_rejects_invalid_header_name() {
    let result = RequestBuilder::new()
        .method("GET")
        .target("/")
        .header("Bad Header", "x")
        .build();

    assert!(matches!(result, Err(ParseError::InvalidFieldName)));
}

#[test]
fn test_new_request_starts_in_init() {
    let req = Request::new();

    assert_eq!(req.state, ParseState::Init);
    assert!(!req.is_done());
    assert!(req.headers.is_empty());
    assert!(req.body.is_empty());
}

#[test]
fn test_parse_states_are_ordered() {
    assert!(ParseState::Init < ParseState::Headers);
    assert!(ParseState::Headers < ParseState::Body);
    assert!(ParseState::Body < ParseState::Done);
}
