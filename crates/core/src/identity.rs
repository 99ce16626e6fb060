use sha2::{Digest, Sha256};

/// Content identifier of a compiled definition: lowercase hex SHA-256 of
/// its canonical rendered text. Identical definitions always share an id.
pub fn definition_id(canonical: &str) -> String {
    let hash = Sha256::digest(canonical.as_bytes());
    format!("{:x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_hex_sha256() {
        assert_eq!(
            definition_id(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn id_tracks_content() {
        assert_eq!(definition_id("{}"), definition_id("{}"));
        assert_ne!(definition_id("{}"), definition_id("{ }"));
    }
}
