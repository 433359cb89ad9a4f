//! Small string helpers shared by the codecs and the validators.

/// Splits on `delimiter` the way a line reader would: a trailing delimiter
/// does not produce a final empty piece, interior empty pieces are kept.
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    let mut parts: Vec<String> = value.split(delimiter).map(str::to_string).collect();
    if value.ends_with(delimiter) {
        parts.pop();
    }
    parts
}

pub fn join_list<S: AsRef<str>>(values: &[S], delimiter: &str) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(delimiter)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Trimmed, upper-cased form used for case-insensitive token matching.
pub fn canonical_token(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}
