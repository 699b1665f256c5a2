use crate::cli::EnvMap;
use crate::domain::models::{EnvChange, EnvOp};
use crate::services::storage::config_base_dir;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Explicit snapshot of the process environment. All mutations happen against
/// the snapshot; the process is only touched once the whole mapping has been
/// resolved, and store resolution reads from here so assignments made in the
/// same invocation are observable downstream.
#[derive(Debug, Default)]
pub struct EnvContext {
    vars: BTreeMap<String, String>,
}

impl EnvContext {
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    #[cfg(test)]
    pub fn from_vars(pairs: &[(&str, &str)]) -> Self {
        Self {
            vars: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn apply(&mut self, map: &EnvMap, op: EnvOp) -> Vec<EnvChange> {
        map.0
            .iter()
            .map(|(key, value)| self.apply_one(key, value, op))
            .collect()
    }

    fn apply_one(&mut self, key: &str, value: &str, op: EnvOp) -> EnvChange {
        let previous = self.vars.get(key).cloned();
        let (next, status) = match op {
            EnvOp::Set => {
                if previous.as_deref() == Some(value) {
                    (value.to_string(), "unchanged")
                } else {
                    (value.to_string(), "applied")
                }
            }
            EnvOp::Prepend => match previous.as_deref() {
                None | Some("") => (value.to_string(), "applied"),
                // Whole-component match; `X` must not count as present in `XY`.
                Some(old) if old.split(PATH_LIST_SEPARATOR).any(|c| c == value) => {
                    (old.to_string(), "unchanged")
                }
                Some(old) => (format!("{value}{PATH_LIST_SEPARATOR}{old}"), "applied"),
            },
        };
        self.vars.insert(key.to_string(), next.clone());
        EnvChange {
            key: key.to_string(),
            op,
            previous,
            value: next,
            status: status.to_string(),
        }
    }

    pub fn export_to_process(&self, changes: &[EnvChange]) {
        for c in changes {
            if c.status == "applied" {
                std::env::set_var(&c.key, &c.value);
            }
        }
    }
}

pub fn session_script_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("env.sh"))
}

/// Merge applied changes into the session script so later shells can source
/// the assignments. Existing keys are updated in place, unrelated keys kept.
pub fn persist_changes(changes: &[EnvChange]) -> anyhow::Result<Option<PathBuf>> {
    if !changes.iter().any(|c| c.status == "applied") {
        return Ok(None);
    }
    let path = session_script_path()?;
    let mut entries = if path.exists() {
        parse_session_script(&std::fs::read_to_string(&path)?)
    } else {
        BTreeMap::new()
    };
    for c in changes.iter().filter(|c| c.status == "applied") {
        entries.insert(c.key.clone(), c.value.clone());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, render_session_script(&entries))?;
    Ok(Some(path))
}

fn parse_session_script(raw: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for line in raw.lines() {
        let Some(rest) = line.trim().strip_prefix("export ") else {
            continue;
        };
        let Some((key, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        out.insert(key.trim().to_string(), unescape(value));
    }
    out
}

fn render_session_script(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::from("# session environment managed by certup\n");
    for (key, value) in entries {
        out.push_str(&format!("export {}=\"{}\"\n", key, escape(value)));
    }
    out
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(n) = chars.next() {
                out.push(n);
            }
        } else {
            out.push(c);
        }
    }
    out
}
