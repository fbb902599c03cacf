//! Link marker parsing.
//!
//! Linked files carry their file identifier near the top of the file inside
//! an HTML comment, e.g. `<!-- fileId:8c0e...3f1d -->`. Only the leading
//! bytes of a file are ever inspected.

/// Number of leading bytes read from a file when looking for its marker.
pub const DEFAULT_HEAD_BYTES: usize = 64;

const TOKEN_START: char = ':';
const TOKEN_END: &str = " -->";

/// Extract the file identifier from a marker line.
///
/// Returns the text between the first `:` and the first ` -->` following it.
/// The token itself is not validated; `"a: -->"` yields an empty token.
///
/// # Examples
///
/// ```
/// use linkmap_fs::parse_file_id;
/// assert_eq!(parse_file_id("<!-- fileId:abc123 -->"), Some("abc123"));
/// assert_eq!(parse_file_id("<!-- no marker here -->"), None);
/// ```
pub fn parse_file_id(text: &str) -> Option<&str> {
    let start = text.find(TOKEN_START)? + TOKEN_START.len_utf8();
    let end = text[start..].find(TOKEN_END)?;
    Some(&text[start..start + end])
}

/// Extract the file identifier from the raw leading bytes of a file.
///
/// The bytes are decoded lossily: a head read can split a multi-byte
/// character at its boundary, which must not hide an otherwise valid marker.
pub fn read_file_id(head: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(head);
    parse_file_id(&text).map(str::to_string)
}
