use crate::http::error::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Case-insensitive, multi-valued header collection.
///
/// Names are stored lower-cased and always consist of RFC 7230 token
/// characters. Both the names and the values under each name keep their
/// insertion order; a repeated name appends to the existing list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses as many complete header lines from `data` as possible.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// ends the header block was reached. A trailing partial line is never
    /// consumed, so the caller can append more bytes and call again with the
    /// unconsumed remainder.
    ///
    /// On error, lines accepted earlier in the same call stay in the store,
    /// but the number of bytes they covered is not reported. Callers are
    /// expected to abandon the message.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::headers::Headers;
    /// let mut headers = Headers::new();
    /// let (consumed, done) = headers.parse(b"Host: localhost\r\n\r\n").unwrap();
    /// assert_eq!(consumed, 19);
    /// assert!(done);
    /// assert_eq!(headers.get_first("host"), Some("localhost"));
    /// ```
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut read = 0;

        loop {
            let Some(idx) = find_crlf(&data[read..]) else {
                return Ok((read, false));
            };

            if idx == 0 {
                return Ok((read + CRLF.len(), true));
            }

            let (name, value) = parse_field_line(&data[read..read + idx])?;
            self.push(name.to_ascii_lowercase(), value);

            read += idx + CRLF.len();
        }
    }

    /// All values stored under `name`, in the order they were added.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    /// The first value stored under `name`.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Appends a value under `name`, keeping any existing values.
    pub fn append(&mut self, name: &str, value: impl Into<String>) -> Result<(), ParseError> {
        let name = validate_field_name(name.trim().as_bytes())?;
        self.push(name.to_ascii_lowercase(), value.into().trim().to_string());
        Ok(())
    }

    /// Replaces every value under `name` with a single `value`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ParseError> {
        let name = validate_field_name(name.trim().as_bytes())?;
        let value = value.into().trim().to_string();

        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value],
            None => self.entries.push((name.to_ascii_lowercase(), vec![value])),
        }
        Ok(())
    }

    /// `set` for lower-case token names fixed at compile time.
    pub(crate) fn set_static(&mut self, name: &'static str, value: impl Into<String>) {
        debug_assert!(
            name.bytes().all(|b| is_token_char(b) && !b.is_ascii_uppercase()),
            "{name} is not a lower-case token"
        );

        let value = value.into();
        match self.position(name) {
            Some(i) => self.entries[i].1 = vec![value],
            None => self.entries.push((name.to_string(), vec![value])),
        }
    }

    /// Removes `name` and returns the values it held.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Iterates over `(name, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(stored, _)| stored.eq_ignore_ascii_case(name))
    }

    fn push(&mut self, name: String, value: String) {
        match self.position(&name) {
            Some(i) => self.entries[i].1.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }
}

/// Splits a header line on its first colon and validates the name.
fn parse_field_line(line: &[u8]) -> Result<(&str, String), ParseError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(ParseError::NoFieldName)?;

    let name = validate_field_name(line[..colon].trim_ascii())?;
    let value = String::from_utf8_lossy(line[colon + 1..].trim_ascii()).into_owned();

    Ok((name, value))
}

fn validate_field_name(name: &[u8]) -> Result<&str, ParseError> {
    if name.is_empty() {
        return Err(ParseError::NoFieldName);
    }

    if !name.iter().copied().all(is_token_char) {
        return Err(ParseError::InvalidFieldName);
    }

    // Token characters are all ASCII.
    std::str::from_utf8(name).map_err(|_| ParseError::InvalidFieldName)
}

/// RFC 7230 `tchar`.
pub fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
    )
}

pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}
