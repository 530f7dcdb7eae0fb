use crate::common::INDEX_NAME_SEPARATOR;
use crate::errors::{DoruError, DoruResult, ErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;

static COLLECTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("collection name pattern is valid"));

/// Checks a collection name against `[A-Za-z0-9_-]+`.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidArgument`] for an empty name or one with any
/// other character.
pub fn validate_collection_name(name: &str) -> DoruResult<()> {
    if name.is_empty() {
        log::error!("Collection name is empty");
        return Err(DoruError::new(
            "Collection not specified",
            ErrorKind::InvalidArgument,
        ));
    }

    if !COLLECTION_NAME.is_match(name) {
        log::error!("Invalid collection name {}", name);
        return Err(DoruError::new(
            &format!(
                "Only [a-zA-Z0-9_-] are allowed in the collection names, found {}",
                name
            ),
            ErrorKind::InvalidArgument,
        ));
    }
    Ok(())
}

/// Checks a field name usable for an index file.
pub fn validate_field_name(field: &str) -> DoruResult<()> {
    if field.is_empty() || field.contains('/') || field.contains('\\') {
        log::error!("Invalid index field name {:?}", field);
        return Err(DoruError::new(
            &format!("Invalid index field name {:?}", field),
            ErrorKind::InvalidArgument,
        ));
    }
    Ok(())
}

/// Derives the file name of the index on `field` of `collection`.
pub fn index_file_name(collection: &str, field: &str) -> String {
    format!("{}{}{}", collection, INDEX_NAME_SEPARATOR, field)
}

/// Splits a store-root entry name into `(collection, field)` if it names an
/// index file.
///
/// Hidden entries (leading `.`) and names without a separator are not index
/// files. The split happens at the first separator since collection names
/// cannot contain one.
pub fn parse_index_file_name(name: &str) -> Option<(&str, &str)> {
    if name.starts_with(INDEX_NAME_SEPARATOR) {
        return None;
    }
    let (collection, field) = name.split_once(INDEX_NAME_SEPARATOR)?;
    if field.is_empty() {
        return None;
    }
    Some((collection, field))
}
