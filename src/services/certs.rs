use crate::domain::models::StoreReport;
use crate::services::storage::backup_file;
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum CertPathError {
    #[error("certificate path not found: {0}")]
    Missing(PathBuf),
    #[error("certificate path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

const CERT_EXTENSIONS: [&str; 2] = ["crt", "pem"];

/// Enumerate `*.crt` / `*.pem` files in `dir`, sorted by file name so the
/// append order is deterministic.
pub fn discover_certs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(CertPathError::Missing(dir.to_path_buf()).into());
    }
    if !dir.is_dir() {
        return Err(CertPathError::NotADirectory(dir.to_path_buf()).into());
    }
    let mut certs = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| CERT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            .unwrap_or(false);
        if matches {
            certs.push(path);
        }
    }
    certs.sort();
    Ok(certs)
}

/// Append each certificate's text to the store, skipping text that is already
/// present. The store is created when absent; an existing non-empty store is
/// backed up once, before the first mutation of the run. Certificates already
/// appended stay appended if a later read fails.
pub fn append_certs(store: &Path, certs: &[PathBuf], backup: bool) -> anyhow::Result<StoreReport> {
    let mut contents = if store.exists() {
        std::fs::read_to_string(store)
            .with_context(|| format!("reading store {}", store.display()))?
    } else {
        String::new()
    };
    let original_len = contents.len() as u64;

    let mut appended = Vec::new();
    let mut skipped = Vec::new();
    let mut backup_path = None;

    for cert in certs {
        let name = cert
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let body = std::fs::read_to_string(cert)
            .with_context(|| format!("reading certificate {}", cert.display()))?;
        let needle = body.trim_end();
        if needle.is_empty() || contents.contains(needle) {
            skipped.push(name);
            continue;
        }
        if appended.is_empty() {
            if backup && !contents.is_empty() {
                backup_path = Some(backup_file(store)?);
            }
            // Only the pre-existing tail gets a separator; appended
            // certificates are concatenated verbatim.
            if !contents.is_empty() && !contents.ends_with('\n') {
                contents.push('\n');
            }
        }
        contents.push_str(&body);
        appended.push(name);
    }

    if !appended.is_empty() {
        if let Some(parent) = store.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(store, &contents)
            .with_context(|| format!("writing store {}", store.display()))?;
    }

    Ok(StoreReport {
        store: store.display().to_string(),
        appended,
        skipped,
        bytes_appended: contents.len() as u64 - original_len,
        backup: backup_path.map(|p| p.display().to_string()),
    })
}
