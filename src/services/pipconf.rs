use crate::domain::models::PipReport;
use crate::services::env::EnvContext;
use crate::services::storage::backup_file;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Resolve pip's config file the way pip documents it: the active virtualenv
/// first, then the per-user location for the platform.
pub fn pip_config_path(ctx: &EnvContext) -> anyhow::Result<PathBuf> {
    if let Some(venv) = ctx.get("VIRTUAL_ENV") {
        if !venv.is_empty() {
            return Ok(PathBuf::from(venv).join("pip.conf"));
        }
    }
    if cfg!(windows) {
        let appdata = ctx.get("APPDATA").context("APPDATA is not set")?;
        return Ok(PathBuf::from(appdata).join("pip").join("pip.ini"));
    }
    let home = PathBuf::from(ctx.get("HOME").context("HOME is not set")?);
    if cfg!(target_os = "macos") {
        let support = home
            .join("Library")
            .join("Application Support")
            .join("pip");
        if support.is_dir() {
            return Ok(support.join("pip.conf"));
        }
    }
    Ok(home.join(".config").join("pip").join("pip.conf"))
}

/// Rewrite `existing` so `[global]` carries `cert = <store>`, touching nothing
/// else. Returns the new content and a status label; "unchanged" returns the
/// input byte-for-byte.
pub fn render_pip_config(existing: Option<&str>, cert: &str) -> (String, &'static str) {
    let Some(existing) = existing else {
        return (format!("[global]\ncert = {cert}\n"), "created");
    };

    let mut lines: Vec<String> = existing.lines().map(str::to_string).collect();
    let mut section = String::new();
    let mut global_header: Option<usize> = None;
    let mut cert_line: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = trimmed[1..trimmed.len() - 1].trim().to_ascii_lowercase();
            if section == "global" && global_header.is_none() {
                global_header = Some(i);
            }
            continue;
        }
        if section != "global" || cert_line.is_some() {
            continue;
        }
        let key = trimmed.split(['=', ':']).next().unwrap_or("").trim();
        if key.eq_ignore_ascii_case("cert") {
            cert_line = Some(i);
        }
    }

    let wanted = format!("cert = {cert}");
    let status;
    if let Some(i) = cert_line {
        let current = lines[i]
            .splitn(2, ['=', ':'])
            .nth(1)
            .map(str::trim)
            .unwrap_or("");
        if current == cert {
            return (existing.to_string(), "unchanged");
        }
        lines[i] = wanted;
        status = "updated";
    } else if let Some(i) = global_header {
        lines.insert(i + 1, wanted);
        status = "appended_key";
    } else {
        if lines.last().map(|l| !l.trim().is_empty()).unwrap_or(false) {
            lines.push(String::new());
        }
        lines.push("[global]".to_string());
        lines.push(wanted);
        status = "appended_key";
    }

    let mut out = lines.join("\n");
    out.push('\n');
    (out, status)
}

pub fn write_pip_config(path: &Path, store: &Path, backup: bool) -> anyhow::Result<PipReport> {
    let cert = store.display().to_string();
    let existing = if path.exists() {
        Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        )
    } else {
        None
    };
    let (content, status) = render_pip_config(existing.as_deref(), &cert);
    let mut backup_path = None;
    if status != "unchanged" {
        if backup && existing.is_some() {
            backup_path = Some(backup_file(path)?);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &content)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(PipReport {
        config: path.display().to_string(),
        cert,
        status: status.to_string(),
        backup: backup_path.map(|p| p.display().to_string()),
    })
}
