//! Artifact integrity: SHA-256 manifest and optional Ed25519 signature.
//!
//! `manifest.json` binds every artifact file to its SHA-256 digest. When
//! `artifacts.sig` is present it must be a valid Ed25519 signature over the
//! exact manifest bytes, checked against the configured verifying key.
//!
//! Both files are optional unless the policy requires signed artifacts.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ArtifactError;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "artifacts.sig";
pub const MANIFEST_VERSION: u32 = 1;

/// Signed content: artifact file name to lowercase hex SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash `names` inside `dir`.
    ///
    /// # Errors
    /// Returns `ArtifactError::Missing` or `ArtifactError::Io` if a file
    /// cannot be read.
    pub fn for_files(dir: &Path, names: &[&str]) -> Result<Self, ArtifactError> {
        let mut files = BTreeMap::new();
        for name in names {
            let bytes = read_file(&dir.join(name))?;
            files.insert((*name).to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }
}

/// How strictly artifacts are verified.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    /// Refuse to load without both manifest and signature
    pub require_signed: bool,
    /// Base64 Ed25519 verifying key (32 bytes)
    pub public_key_b64: Option<String>,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ArtifactError::Signature` if the key is malformed.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ArtifactError::Signature("invalid public key base64".into()))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ArtifactError::Signature("public key must be 32 bytes".into()))?;
    VerifyingKey::from_bytes(&key)
        .map_err(|_| ArtifactError::Signature("invalid verifying key".into()))
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn verify_signature(
    manifest_bytes: &[u8],
    sig_bytes: &[u8],
    policy: &IntegrityPolicy,
) -> Result<(), ArtifactError> {
    let key_b64 = policy.public_key_b64.as_deref().ok_or_else(|| {
        ArtifactError::Signature(format!(
            "{SIGNATURE_FILE} present but no verifying key is configured"
        ))
    })?;
    let key = verifying_key_from_b64(key_b64)?;

    let sig: [u8; 64] = sig_bytes.try_into().map_err(|_| {
        ArtifactError::Signature("invalid signature length (expected 64 bytes)".into())
    })?;
    key.verify(manifest_bytes, &Signature::from_bytes(&sig))
        .map_err(|_| ArtifactError::Signature("manifest signature does not verify".into()))
}

/// Check `artifact_files` in `dir` against the manifest and signature.
///
/// Returns the verified manifest, or `None` when no manifest is present and
/// the policy allows that.
///
/// # Errors
/// Returns `ArtifactError::Integrity` or `ArtifactError::Signature` on any
/// mismatch.
pub fn verify(
    dir: &Path,
    artifact_files: &[&str],
    policy: &IntegrityPolicy,
) -> Result<Option<ArtifactManifest>, ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if !manifest_path.exists() {
        if policy.require_signed {
            return Err(ArtifactError::Integrity(format!(
                "{MANIFEST_FILE} is required but missing from {}",
                dir.display()
            )));
        }
        if sig_path.exists() {
            return Err(ArtifactError::Integrity(format!(
                "{SIGNATURE_FILE} present without {MANIFEST_FILE}"
            )));
        }
        tracing::warn!("No {MANIFEST_FILE} in {:?}; artifacts are not integrity-checked", dir);
        return Ok(None);
    }

    let manifest_bytes = read_file(&manifest_path)?;

    if sig_path.exists() {
        verify_signature(&manifest_bytes, &read_file(&sig_path)?, policy)?;
        tracing::info!("Artifact manifest signature verified");
    } else if policy.require_signed {
        return Err(ArtifactError::Signature(format!(
            "{SIGNATURE_FILE} is required but missing"
        )));
    }

    let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| ArtifactError::Integrity(format!("invalid {MANIFEST_FILE}: {e}")))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(ArtifactError::Incompatible(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }

    for name in artifact_files {
        let expected = manifest.files.get(*name).ok_or_else(|| {
            ArtifactError::Integrity(format!("{name} is not listed in {MANIFEST_FILE}"))
        })?;
        let actual = sha256_hex(&read_file(&dir.join(name))?);
        if !constant_time_eq_str(&actual, &expected.to_ascii_lowercase()) {
            return Err(ArtifactError::Integrity(format!("hash mismatch for {name}")));
        }
    }

    tracing::info!("Verified {} artifact hashes", artifact_files.len());
    Ok(Some(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::RngCore;
    use tempfile::tempdir;

    fn signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    fn pubkey_b64(key: &SigningKey) -> String {
        base64::engine::general_purpose::STANDARD.encode(key.verifying_key().to_bytes())
    }

    fn write_manifest(dir: &Path, names: &[&str]) -> Vec<u8> {
        let manifest = ArtifactManifest::for_files(dir, names).expect("manifest");
        let bytes = serde_json::to_vec_pretty(&manifest).expect("serialize");
        fs::write(dir.join(MANIFEST_FILE), &bytes).expect("write manifest");
        bytes
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_no_manifest_is_allowed_by_default() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{}").expect("write");
        let result = verify(dir.path(), &["a.json"], &IntegrityPolicy::default());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_no_manifest_fails_when_required() {
        let dir = tempdir().expect("tempdir");
        let policy = IntegrityPolicy {
            require_signed: true,
            public_key_b64: None,
        };
        let err = verify(dir.path(), &["a.json"], &policy).expect_err("must fail");
        assert!(matches!(err, ArtifactError::Integrity(_)));
    }

    #[test]
    fn test_hash_mismatch() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{\"x\":1}").expect("write");
        write_manifest(dir.path(), &["a.json"]);
        fs::write(dir.path().join("a.json"), b"{\"x\":2}").expect("tamper");

        let err = verify(dir.path(), &["a.json"], &IntegrityPolicy::default())
            .expect_err("tampered");
        assert!(err.to_string().contains("hash mismatch for a.json"));
    }

    #[test]
    fn test_unlisted_artifact() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{}").expect("write");
        fs::write(dir.path().join("b.json"), b"{}").expect("write");
        write_manifest(dir.path(), &["a.json"]);

        let err = verify(dir.path(), &["a.json", "b.json"], &IntegrityPolicy::default())
            .expect_err("unlisted");
        assert!(err.to_string().contains("b.json is not listed"));
    }

    #[test]
    fn test_signed_manifest_roundtrip() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{}").expect("write");
        let bytes = write_manifest(dir.path(), &["a.json"]);

        let key = signing_key();
        let sig: Signature = key.sign(&bytes);
        fs::write(dir.path().join(SIGNATURE_FILE), sig.to_bytes()).expect("write sig");

        let policy = IntegrityPolicy {
            require_signed: true,
            public_key_b64: Some(pubkey_b64(&key)),
        };
        let manifest = verify(dir.path(), &["a.json"], &policy)
            .expect("verified")
            .expect("manifest present");
        assert!(manifest.files.contains_key("a.json"));
    }

    #[test]
    fn test_signature_from_other_key_is_rejected() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{}").expect("write");
        let bytes = write_manifest(dir.path(), &["a.json"]);

        let sig: Signature = signing_key().sign(&bytes);
        fs::write(dir.path().join(SIGNATURE_FILE), sig.to_bytes()).expect("write sig");

        let policy = IntegrityPolicy {
            require_signed: false,
            public_key_b64: Some(pubkey_b64(&signing_key())),
        };
        let err = verify(dir.path(), &["a.json"], &policy).expect_err("wrong key");
        assert!(matches!(err, ArtifactError::Signature(_)));
    }

    #[test]
    fn test_signature_without_key_is_rejected() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.json"), b"{}").expect("write");
        let bytes = write_manifest(dir.path(), &["a.json"]);
        let sig: Signature = signing_key().sign(&bytes);
        fs::write(dir.path().join(SIGNATURE_FILE), sig.to_bytes()).expect("write sig");

        let err = verify(dir.path(), &["a.json"], &IntegrityPolicy::default())
            .expect_err("no key");
        assert!(err.to_string().contains("no verifying key"));
    }
}
