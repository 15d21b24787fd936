use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '/'")]
    LeadingSlash,
    #[error("asset key must not contain '\\\\'")]
    Backslash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub(crate) fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(AssetKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(AssetKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(AssetKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

/// Relative asset paths use forward slashes and may contain dots in file
/// names, but never climb out of the asset root.
pub(crate) fn validate_relative_asset_path(path: &str) -> Result<(), AssetKeyError> {
    if path.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if path.starts_with('/') {
        return Err(AssetKeyError::LeadingSlash);
    }
    if path.contains('\\') {
        return Err(AssetKeyError::Backslash);
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(AssetKeyError::ParentTraversal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["tiles", "player", "maps/level-1", "a_b"] {
            assert!(validate_asset_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "Tiles", "a.b"] {
            assert!(validate_asset_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn relative_paths_allow_file_extensions_but_not_traversal() {
        assert!(validate_relative_asset_path("maps/map.json").is_ok());
        assert!(validate_relative_asset_path("tilesets/tiles.v2.png").is_ok());
        assert_eq!(
            validate_relative_asset_path("../secret.png"),
            Err(AssetKeyError::ParentTraversal)
        );
        assert_eq!(
            validate_relative_asset_path("/etc/passwd"),
            Err(AssetKeyError::LeadingSlash)
        );
    }
}
