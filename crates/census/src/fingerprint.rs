use sha2::{Digest, Sha256};

/// Content hash plus the length of the exact bytes that were hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Lowercase hex SHA-256.
    pub sha256: String,
    pub bytes: u64,
}

impl Fingerprint {
    #[must_use]
    pub fn of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        Self {
            sha256: format!("{digest:x}"),
            bytes: content.len() as u64,
        }
    }
}
