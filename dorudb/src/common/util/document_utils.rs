use crate::common::DOC_KEY_WIDTH;
use crate::errors::{DoruError, DoruResult, ErrorKind};

/// Formats a document ID as its fixed-width on-disk key.
///
/// The zero padding makes a sorted directory listing follow numeric ID
/// order.
///
/// ```rust
/// use dorudb::common::document_key;
///
/// assert_eq!(document_key(42), "0000000042");
/// ```
pub fn document_key(id: u64) -> String {
    format!("{:0width$}", id, width = DOC_KEY_WIDTH)
}

/// Parses an on-disk document key back to its ID.
///
/// Any all-digit name is accepted, so keys written with a wider ID still
/// parse.
pub fn parse_document_key(key: &str) -> DoruResult<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DoruError::new(
            &format!("Not a document key: {}", key),
            ErrorKind::InvalidArgument,
        ));
    }
    Ok(key.parse::<u64>()?)
}

/// Returns `true` for directory entries that can hold a document: exactly
/// [`DOC_KEY_WIDTH`] digits.
pub(crate) fn is_document_key(name: &str) -> bool {
    name.len() == DOC_KEY_WIDTH && parse_document_key(name).is_ok()
}
