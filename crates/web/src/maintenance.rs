//! Configuration backup and restore
//!
//! A backup is a gzip'd tar holding `config.json` (the full store contents)
//! and `manifest.sha256` (`<hex digest>  config.json`).

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use foris_common::tree::StoreEntry;
use foris_common::uci::{self, Config, UciList, UciOption};
use foris_common::{ConfigTree, Uci};
use sha2::{Digest, Sha256};
use std::io::Read;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENTRY: &str = "config.json";
pub const MANIFEST_ENTRY: &str = "manifest.sha256";

/// Largest accepted decompressed size of a single backup entry
pub const MAX_ENTRY_BYTES: u64 = 4 * 1024 * 1024;

/// Reasons an uploaded backup is rejected
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Archive error: {0}")]
    Archive(#[from] std::io::Error),

    #[error("Backup is missing {0}")]
    MissingEntry(&'static str),

    #[error("Backup entry {entry} exceeds {limit} bytes")]
    TooLarge { entry: String, limit: u64 },

    #[error("Backup checksum mismatch")]
    ChecksumMismatch,

    #[error("Backup contents are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn append(builder: &mut tar::Builder<GzEncoder<Vec<u8>>>, name: &str, data: &[u8]) -> std::io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o600);
    header.set_mtime(chrono::Utc::now().timestamp().max(0) as u64);
    header.set_cksum();
    builder.append_data(&mut header, name, data)
}

/// Pack the store contents into a backup archive
pub fn create_backup(tree: &ConfigTree) -> Result<Vec<u8>, BackupError> {
    let config = serde_json::to_vec_pretty(tree)?;
    let manifest = format!("{}  {}\n", sha256_hex(&config), CONFIG_ENTRY);

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append(&mut builder, CONFIG_ENTRY, &config)?;
    append(&mut builder, MANIFEST_ENTRY, manifest.as_bytes())?;
    let archive = builder.into_inner()?.finish()?;
    debug!(bytes = archive.len(), "Created configuration backup");
    Ok(archive)
}

/// Read at most `limit` bytes of an entry, failing if there is more
fn read_entry(entry: impl Read, path: &str, limit: u64) -> Result<Vec<u8>, BackupError> {
    let mut content = Vec::new();
    entry.take(limit + 1).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Err(BackupError::TooLarge {
            entry: path.to_string(),
            limit,
        });
    }
    Ok(content)
}

/// Unpack and verify a backup archive
pub fn read_backup(archive: &[u8]) -> Result<ConfigTree, BackupError> {
    read_backup_limited(archive, MAX_ENTRY_BYTES)
}

fn read_backup_limited(archive: &[u8], limit: u64) -> Result<ConfigTree, BackupError> {
    let mut config = None;
    let mut manifest = None;

    let mut reader = tar::Archive::new(GzDecoder::new(archive));
    for entry in reader.entries()? {
        let entry = entry?;
        let path = entry.path()?.to_string_lossy().into_owned();
        match path.as_str() {
            CONFIG_ENTRY => config = Some(read_entry(entry, &path, limit)?),
            MANIFEST_ENTRY => manifest = Some(read_entry(entry, &path, limit)?),
            _ => debug!("Ignoring backup entry {}", path),
        }
    }

    let config = config.ok_or(BackupError::MissingEntry(CONFIG_ENTRY))?;
    let manifest = manifest.ok_or(BackupError::MissingEntry(MANIFEST_ENTRY))?;
    let expected = String::from_utf8_lossy(&manifest)
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if expected != sha256_hex(&config) {
        return Err(BackupError::ChecksumMismatch);
    }
    Ok(serde_json::from_slice(&config)?)
}

/// Tree replacing every config present in the backup; other configs are left alone
pub fn restore_tree(backup: &ConfigTree) -> Uci {
    let mut tree = Uci::new();
    for (name, config) in backup.configs() {
        let target = tree.add_replace(Config::new(name));
        for (section_name, section) in config.sections() {
            let target = target.add(uci::Section::new(section_name, &section.kind));
            for (option, entry) in section.options() {
                match entry {
                    StoreEntry::Option(value) => {
                        target.add(UciOption::new(option, value.as_str()));
                    }
                    StoreEntry::List(values) if values.is_empty() => {}
                    StoreEntry::List(values) => {
                        target.add(UciList::from_values(option, values.iter().map(String::as_str)));
                    }
                }
            }
        }
    }
    tree
}
