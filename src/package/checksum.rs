use crate::core::{StickerResult, UpdateError, UpdateErrorKind};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const READ_CHUNK: usize = 64 * 1024;

/// Checksum algorithm for verifying archive integrity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumAlgorithm {
    /// SHA-256 (default; what the hub publishes as bare hex)
    #[default]
    Sha256,
    /// BLAKE3
    Blake3,
}

impl ChecksumAlgorithm {
    /// Parse algorithm from a prefixed checksum string. Bare hex is SHA-256.
    pub fn from_checksum(checksum: &str) -> Self {
        if checksum.starts_with("blake3:") {
            ChecksumAlgorithm::Blake3
        } else {
            ChecksumAlgorithm::Sha256
        }
    }

    /// Parse a config value ("sha256" / "blake3").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" => Some(ChecksumAlgorithm::Sha256),
            "blake3" => Some(ChecksumAlgorithm::Blake3),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Blake3 => "blake3",
        }
    }
}

/// Hex part of a checksum, lowercased, without the algorithm prefix.
pub fn checksum_hex(checksum: &str) -> String {
    checksum
        .split_once(':')
        .map(|(_, h)| h)
        .unwrap_or(checksum)
        .trim()
        .to_ascii_lowercase()
}

/// Whether two checksum strings name the same digest.
///
/// Prefixes are compared only when both sides carry one, so a bare hub
/// digest matches the `sha256:`-prefixed form recorded in a manifest.
pub fn checksums_match(a: &str, b: &str) -> bool {
    let prefix = |s: &str| s.split_once(':').map(|(p, _)| p.to_ascii_lowercase());
    if let (Some(pa), Some(pb)) = (prefix(a), prefix(b)) {
        if pa != pb {
            return false;
        }
    }
    checksum_hex(a) == checksum_hex(b)
}

/// Calculate the prefixed checksum of a file, reading it in chunks.
pub fn checksum_file(path: &Path, algorithm: ChecksumAlgorithm) -> StickerResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = vec![0u8; READ_CHUNK];

    let hex = match algorithm {
        ChecksumAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            hex::encode(hasher.finalize())
        }
        ChecksumAlgorithm::Blake3 => {
            let mut hasher = blake3::Hasher::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            hasher.finalize().to_hex().to_string()
        }
    };

    Ok(format!("{}:{}", algorithm.prefix(), hex))
}

/// Verify a file against an expected checksum (SHA-256 or BLAKE3, by prefix).
pub fn verify_file(path: &Path, expected: &str) -> StickerResult<()> {
    let algorithm = ChecksumAlgorithm::from_checksum(expected);
    let actual = checksum_file(path, algorithm)?;

    if checksums_match(&actual, expected) {
        Ok(())
    } else {
        Err(UpdateError::new(
            UpdateErrorKind::ChecksumMismatch,
            format!(
                "{}: expected {}, got {}",
                path.display(),
                checksum_hex(expected),
                checksum_hex(&actual)
            ),
        )
        .into())
    }
}
