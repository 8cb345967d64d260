//! OKG Export - artifact serialization and integrity binding
//!
//! Serializes the audited dataset into its persisted artifacts:
//! - `jira.json` - every ticket, ordered by id
//! - `mail_<PER-XXXX>.jsonl` - one mailbox per person, ordered by timestamp
//! - `manifest.json` - artifact name -> SHA-256 digest -> record count
//!
//! Writes are atomic (temp file, then rename). Export refuses to run while
//! the audit report carries hard-fail violations.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use okg_audit::{AuditPolicy, AuditReport};
use okg_model::{ContentDigest, Dataset, MailMessage, Ticket};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Requested artifact families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// The aggregate ticket artifact
    Jira,
    /// Per-person mailbox artifacts
    Email,
}

/// Export failures - fatal
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Audit left unresolved hard-fail violations
    #[error("dataset incomplete: {violations} unresolved hard-fail violations")]
    IncompleteDataset { violations: usize },

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Round-trip verification mismatch
    #[error("integrity mismatch in {name}: {detail}")]
    IntegrityMismatch { name: String, detail: String },
}

/// One artifact's manifest entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// File name inside the output directory
    pub name: String,
    /// Artifact family: `jira_tickets` or `mailbox`
    pub kind: String,
    /// Records serialized into the artifact
    pub records: usize,
    /// SHA-256 over the artifact bytes
    pub sha256: ContentDigest,
}

/// Aggregate record counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ManifestTotals {
    pub tickets: usize,
    pub messages: usize,
    pub mailboxes: usize,
}

/// The manifest binding every artifact to its digest and counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Run seed, for fixture provenance
    pub seed: u64,
    /// Aggregate counts
    pub totals: ManifestTotals,
    /// Per-artifact entries, in write order
    pub artifacts: Vec<ManifestEntry>,
}

/// Manifest file name
pub const MANIFEST_NAME: &str = "manifest.json";
/// Ticket artifact file name
pub const JIRA_NAME: &str = "jira.json";

/// Serialize the dataset into `out_dir` and return the manifest
///
/// # Errors
/// [`ExportError::IncompleteDataset`] under a hard-fail policy with a
/// non-empty report; I/O and serialization failures otherwise.
pub fn export(
    dataset: &Dataset,
    report: &AuditReport,
    policy: AuditPolicy,
    outputs: &[OutputKind],
    out_dir: &Path,
    seed: u64,
) -> Result<Manifest, ExportError> {
    if policy == AuditPolicy::HardFail && !report.passed() {
        return Err(ExportError::IncompleteDataset {
            violations: report.violations.len(),
        });
    }

    fs::create_dir_all(out_dir)?;
    let mut artifacts = Vec::new();
    let mut totals = ManifestTotals::default();

    if outputs.contains(&OutputKind::Jira) {
        let mut tickets: Vec<&Ticket> = dataset.tickets().collect();
        tickets.sort_by(|a, b| a.id.cmp(&b.id));

        let bytes = serde_json::to_vec_pretty(&tickets)?;
        let digest = write_atomic(out_dir, JIRA_NAME, &bytes)?;
        totals.tickets = tickets.len();
        artifacts.push(ManifestEntry {
            name: JIRA_NAME.to_owned(),
            kind: "jira_tickets".to_owned(),
            records: tickets.len(),
            sha256: digest,
        });
    }

    if outputs.contains(&OutputKind::Email) {
        for (owner, mailbox) in dataset.mailboxes() {
            if mailbox.is_empty() {
                continue;
            }
            let mut messages: Vec<&MailMessage> = mailbox.iter().collect();
            messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));

            let mut bytes = Vec::new();
            for message in &messages {
                serde_json::to_writer(&mut bytes, message)?;
                bytes.push(b'\n');
            }

            let name = format!("mail_{owner}.jsonl");
            let digest = write_atomic(out_dir, &name, &bytes)?;
            totals.messages += messages.len();
            totals.mailboxes += 1;
            artifacts.push(ManifestEntry {
                name,
                kind: "mailbox".to_owned(),
                records: messages.len(),
                sha256: digest,
            });
        }
    }

    let manifest = Manifest {
        seed,
        totals,
        artifacts,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
    write_atomic(out_dir, MANIFEST_NAME, &manifest_bytes)?;

    tracing::info!(
        artifacts = manifest.artifacts.len(),
        tickets = manifest.totals.tickets,
        messages = manifest.totals.messages,
        "export complete"
    );

    Ok(manifest)
}

/// Write bytes atomically and return their digest
fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<ContentDigest, ExportError> {
    let tmp = dir.join(format!("{name}.tmp"));
    let target = dir.join(name);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, &target)?;
    Ok(ContentDigest::compute(bytes))
}

impl Manifest {
    /// Re-read every artifact and verify digests and record counts
    ///
    /// # Errors
    /// [`ExportError::IntegrityMismatch`] naming the first failing artifact.
    pub fn verify(&self, out_dir: &Path) -> Result<(), ExportError> {
        for entry in &self.artifacts {
            let bytes = fs::read(out_dir.join(&entry.name))?;
            let digest = ContentDigest::compute(&bytes);
            if digest != entry.sha256 {
                return Err(ExportError::IntegrityMismatch {
                    name: entry.name.clone(),
                    detail: format!("digest {} != manifest {}", digest.short(), entry.sha256.short()),
                });
            }

            let records = match entry.kind.as_str() {
                "jira_tickets" => serde_json::from_slice::<Vec<Ticket>>(&bytes)?.len(),
                "mailbox" => {
                    let mut count = 0;
                    for line in bytes.split(|b| *b == b'\n').filter(|l| !l.is_empty()) {
                        serde_json::from_slice::<MailMessage>(line)?;
                        count += 1;
                    }
                    count
                }
                other => {
                    return Err(ExportError::IntegrityMismatch {
                        name: entry.name.clone(),
                        detail: format!("unknown artifact kind {other:?}"),
                    })
                }
            };
            if records != entry.records {
                return Err(ExportError::IntegrityMismatch {
                    name: entry.name.clone(),
                    detail: format!("{records} records != manifest {}", entry.records),
                });
            }
        }
        Ok(())
    }
}

/// Remove previously exported artifacts from `out_dir`
///
/// Only files this crate writes are touched; returns how many were removed.
///
/// # Errors
/// I/O failure while scanning or removing.
pub fn clear_output(out_dir: &Path) -> Result<usize, ExportError> {
    if !out_dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(out_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let ours = name == JIRA_NAME
            || name == MANIFEST_NAME
            || (name.starts_with("mail_") && name.ends_with(".jsonl"));
        if ours {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
