use httpwire::http::error::ParseError;
use httpwire::http::headers::{Headers, is_token_char};

/// Feeds `data` through `Headers::parse` `chunk_size` bytes at a time,
/// keeping unconsumed bytes buffered between calls like a socket reader would.
fn parse_in_chunks(data: &[u8], chunk_size: usize) -> (Headers, usize, bool) {
    let mut headers = Headers::new();
    let mut buffer = Vec::new();
    let mut total = 0;

    for chunk in data.chunks(chunk_size) {
        buffer.extend_from_slice(chunk);

        let (consumed, done) = headers.parse(&buffer).unwrap();
        buffer.drain(..consumed);
        total += consumed;

        if done {
            return (headers, total, true);
        }
    }

    (headers, total, false)
}

#[test]
fn test_parse_single_header() {
    let data = b"Host: localhost\r\n\r\n";
    let (headers, consumed, done) = parse_in_chunks(data, 3);

    assert!(done);
    assert_eq!(headers.get("host"), Some(&["localhost".to_string()][..]));
    assert_eq!(consumed, data.len());
}

#[test]
fn test_parse_multiple_headers() {
    let data = b"Host: api.example.com\r\nContent-Type: application/json\r\nUser-Agent: curl/8.0\r\n\r\n";
    let (headers, consumed, done) = parse_in_chunks(data, 5);

    assert!(done);
    assert_eq!(headers.get_first("host"), Some("api.example.com"));
    assert_eq!(headers.get_first("content-type"), Some("application/json"));
    assert_eq!(headers.get_first("user-agent"), Some("curl/8.0"));
    assert_eq!(consumed, data.len());
}

#[test]
fn test_repeated_header_appends_case_insensitively() {
    let data = b"Content-Type: text/html\r\ncontent-type: application/json\r\n\r\n";
    let (headers, _, done) = parse_in_chunks(data, 4);

    assert!(done);
    assert_eq!(headers.len(), 1);
    assert_eq!(
        headers.get("content-type").unwrap(),
        ["text/html".to_string(), "application/json".to_string()]
    );
    assert_eq!(headers.get("CONTENT-TYPE"), headers.get("content-type"));
}

#[test]
fn test_split_points_do_not_change_result() {
    let data: &[u8] = b"Host: localhost:42069\r\nSet-Cookie: a=1\r\nAccept:   */*  \r\nset-cookie: b=2\r\nX-Empty:\r\n\r\n";

    let mut whole = Headers::new();
    let (consumed, done) = whole.parse(data).unwrap();
    assert!(done);
    assert_eq!(consumed, data.len());

    for chunk_size in 1..=data.len() {
        let (headers, consumed, done) = parse_in_chunks(data, chunk_size);
        assert!(done, "chunk size {chunk_size}");
        assert_eq!(consumed, data.len(), "chunk size {chunk_size}");
        assert_eq!(headers, whole, "chunk size {chunk_size}");
    }

    // Every two-piece split, including uneven ones.
    for split in 1..data.len() {
        let mut headers = Headers::new();
        let (first, done) = headers.parse(&data[..split]).unwrap();
        assert!(!done);

        let mut rest = data[first..split].to_vec();
        rest.extend_from_slice(&data[split..]);
        let (second, done) = headers.parse(&rest).unwrap();

        assert!(done, "split at {split}");
        assert_eq!(first + second, data.len());
        assert_eq!(headers, whole, "split at {split}");
    }
}

#[test]
fn test_values_are_trimmed() {
    let mut headers = Headers::new();
    headers.parse(b"Accept:   */*  \r\n      Host: localhost  \r\n\r\n").unwrap();

    assert_eq!(headers.get_first("accept"), Some("*/*"));
    assert_eq!(headers.get_first("host"), Some("localhost"));
}

#[test]
fn test_incomplete_line_is_not_consumed() {
    let mut headers = Headers::new();
    let (consumed, done) = headers
        .parse(b"Host: localhost\r\nUser-Agent: test")
        .unwrap();

    assert!(!done);
    assert_eq!(consumed, 17); // "Host: localhost\r\n"
    assert_eq!(headers.get_first("host"), Some("localhost"));
    assert!(!headers.contains("user-agent"));
}

#[test]
fn test_no_crlf_consumes_nothing() {
    let mut headers = Headers::new();
    assert_eq!(headers.parse(b"Host: localho").unwrap(), (0, false));
    assert_eq!(headers.parse(b"").unwrap(), (0, false));
    assert!(headers.is_empty());
}

#[test]
fn test_empty_header_block() {
    let mut headers = Headers::new();
    let (consumed, done) = headers.parse(b"\r\n").unwrap();

    assert!(done);
    assert_eq!(consumed, 2);
    assert!(headers.is_empty());
}

#[test]
fn test_bytes_after_blank_line_are_left() {
    let mut headers = Headers::new();
    let (consumed, done) = headers.parse(b"Host: x\r\n\r\nbody").unwrap();

    assert!(done);
    assert_eq!(consumed, 11);
}

#[test]
fn test_missing_colon() {
    let mut headers = Headers::new();
    let result = headers.parse(b"Host localhost\r\n\r\n");

    assert!(matches!(result, Err(ParseError::NoFieldName)));
    assert!(headers.is_empty());
}

#[test]
fn test_empty_field_name() {
    let mut headers = Headers::new();
    let result = headers.parse(b"   : value\r\n\r\n");

    assert!(matches!(result, Err(ParseError::NoFieldName)));
    assert!(headers.is_empty());
}

#[test]
fn test_invalid_field_name() {
    let mut headers = Headers::new();
    let result = headers.parse(b"H\xc2\xa9st: localhost\r\n\r\n");
    assert!(matches!(result, Err(ParseError::InvalidFieldName)));

    let mut headers = Headers::new();
    let result = headers.parse(b"Bad Name: value\r\n\r\n");
    assert!(matches!(result, Err(ParseError::InvalidFieldName)));
}

#[test]
fn test_error_keeps_earlier_lines() {
    let mut headers = Headers::new();
    let result = headers.parse(b"Host: localhost\r\nBroken\r\nAccept: */*\r\n\r\n");

    assert!(matches!(result, Err(ParseError::NoFieldName)));
    assert_eq!(headers.get_first("host"), Some("localhost"));
    assert!(!headers.contains("accept"));
}

#[test]
fn test_value_may_contain_colons() {
    let mut headers = Headers::new();
    headers.parse(b"Host: localhost:42069\r\n\r\n").unwrap();

    assert_eq!(headers.get_first("host"), Some("localhost:42069"));
}

#[test]
fn test_set_append_remove() {
    let mut headers = Headers::new();
    headers.append("Set-Cookie", "a=1").unwrap();
    headers.append("set-cookie", "b=2").unwrap();
    headers.set("Content-Type", "text/plain").unwrap();
    headers.set("content-type", "text/html").unwrap();

    assert_eq!(headers.get("set-cookie").unwrap().len(), 2);
    assert_eq!(headers.get("content-type").unwrap(), ["text/html".to_string()]);

    let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["set-cookie", "content-type"]);

    assert_eq!(headers.remove("SET-COOKIE").unwrap().len(), 2);
    assert!(!headers.contains("set-cookie"));
    assert!(headers.remove("missing").is_none());
}

#[test]
fn test_set_validates_name() {
    let mut headers = Headers::new();

    assert!(matches!(headers.set("", "x"), Err(ParseError::NoFieldName)));
    assert!(matches!(headers.append("a:b", "x"), Err(ParseError::InvalidFieldName)));
    assert!(headers.is_empty());
}

#[test]
fn test_token_characters() {
    for b in b"!#$%&'*+-.^_`|~azAZ09".iter().copied() {
        assert!(is_token_char(b), "{}", b as char);
    }
    for b in b" :\"(),/;<=>?@[\\]{}\t".iter().copied() {
        assert!(!is_token_char(b), "{}", b as char);
    }
}
