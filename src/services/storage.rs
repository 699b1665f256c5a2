use crate::domain::models::Config;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub fn config_base_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")?;
    Ok(PathBuf::from(home).join(".config").join("certup"))
}

pub fn load_config() -> anyhow::Result<Config> {
    let path = config_base_dir()?.join("config.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

pub fn audit(action: &str, data: serde_json::Value) {
    let base = match config_base_dir() {
        Ok(b) => b,
        Err(_) => return,
    };
    let path = base.join("audit.jsonl");
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let event = serde_json::json!({
        "ts": unix_now(),
        "action": action,
        "data": data
    });
    let line = format!("{}\n", event);
    let _ = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Copy `path` to a timestamped sibling before mutating it.
pub fn backup_file(path: &Path) -> anyhow::Result<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let backup = path.with_file_name(format!("{stem}-backup_{}{ext}", unix_now()));
    std::fs::copy(path, &backup)
        .with_context(|| format!("backing up {}", path.display()))?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::backup_file;
    use std::fs;

    #[test]
    fn backup_keeps_original_and_copies_content() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("bundle.pem");
        fs::write(&original, "CERT\n").unwrap();

        let backup = backup_file(&original).unwrap();
        assert!(original.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "CERT\n");
        let name = backup.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("bundle-backup_"));
        assert!(name.ends_with(".pem"));
    }
}
