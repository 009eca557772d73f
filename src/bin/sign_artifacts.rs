//! Artifact signing utility.
//!
//! Writes `manifest.json` (SHA-256 of every artifact) and `artifacts.sig`
//! (Ed25519 over the manifest bytes) into an artifact directory, or
//! generates a fresh signing seed.
//!
//! # Usage
//!
//! ```bash
//! sign_artifacts <artifact_dir>
//! sign_artifacts --generate-key <seed_path> [--force]
//! ```
//!
//! The seed is read from the file named by `WEIGHTWISE_SIGNING_KEY_B64_FILE`
//! (or `WEIGHTWISE_SIGNING_KEY_B64` itself in debug builds). Only the public
//! key is printed; pass it to the app as `WEIGHTWISE_ARTIFACT_PUBKEY_B64`.

use std::env;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use weightwise::adapters::artifacts::integrity::{MANIFEST_FILE, SIGNATURE_FILE};
use weightwise::adapters::artifacts::{ArtifactManifest, ARTIFACT_FILES};

const KEY_FILE_ENV: &str = "WEIGHTWISE_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "WEIGHTWISE_SIGNING_KEY_B64";

const USAGE: &str =
    "Usage: sign_artifacts <artifact_dir> | sign_artifacts --generate-key <seed_path> [--force]";

enum Command {
    Sign(PathBuf),
    Generate { seed_path: PathBuf, force: bool },
}

fn parse_args() -> Result<Command> {
    let mut args = env::args().skip(1);
    let mut dir: Option<PathBuf> = None;
    let mut seed_path: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--generate-key" => {
                let p = args.next().context(USAGE)?;
                seed_path = Some(PathBuf::from(p));
            }
            "--force" => force = true,
            "-h" | "--help" => bail!(USAGE),
            _ if dir.is_none() => dir = Some(PathBuf::from(arg)),
            _ => bail!(USAGE),
        }
    }

    match (dir, seed_path) {
        (Some(dir), None) => Ok(Command::Sign(dir)),
        (None, Some(seed_path)) => Ok(Command::Generate { seed_path, force }),
        _ => bail!(USAGE),
    }
}

fn read_seed_b64() -> Result<Zeroizing<String>> {
    let secret = if let Ok(path) = env::var(KEY_FILE_ENV) {
        Zeroizing::new(
            fs::read_to_string(path.trim()).context("Failed reading signing key file")?,
        )
    } else if cfg!(debug_assertions) && env::var(KEY_ENV).is_ok() {
        // Dev-only fallback.
        Zeroizing::new(env::var(KEY_ENV).unwrap_or_default())
    } else {
        bail!("Missing signing key. Set {KEY_FILE_ENV} (or {KEY_ENV} in debug builds).");
    };

    let trimmed = Zeroizing::new(secret.trim().to_string());
    if trimmed.is_empty() {
        bail!("Empty signing key");
    }
    Ok(trimmed)
}

fn read_signing_key() -> Result<SigningKey> {
    let b64 = read_seed_b64()?;
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.as_bytes())
            .context("Invalid base64 in signing key")?,
    );
    let mut seed: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
        anyhow::anyhow!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        )
    })?;
    let key = SigningKey::from_bytes(&seed);
    seed.zeroize();
    Ok(key)
}

fn sign(dir: &Path) -> Result<()> {
    let signing_key = read_signing_key()?;

    let manifest = ArtifactManifest::for_files(dir, &ARTIFACT_FILES)
        .with_context(|| format!("Failed to hash artifacts in {dir:?}"))?;
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .with_context(|| format!("Failed to write {manifest_path:?}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes()).with_context(|| format!("Failed to write {sig_path:?}"))?;

    println!("Signed manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "WEIGHTWISE_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn generate(seed_path: &Path, force: bool) -> Result<()> {
    if seed_path.exists() && !force {
        bail!("Refusing to overwrite existing file {seed_path:?}. Use --force.");
    }

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let signing_key = SigningKey::from_bytes(&seed);
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed));
    seed.zeroize();

    if let Some(parent) = seed_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    opts.mode(0o600);

    use std::io::Write;
    let mut file = opts
        .open(seed_path)
        .with_context(|| format!("Failed to open {seed_path:?}"))?;
    file.write_all(seed_b64.as_bytes())?;
    file.write_all(b"\n")?;

    println!("Wrote signing seed (base64) to {seed_path:?}");
    println!(
        "WEIGHTWISE_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn main() -> Result<()> {
    match parse_args()? {
        Command::Sign(dir) => sign(&dir),
        Command::Generate { seed_path, force } => generate(&seed_path, force),
    }
}
