use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// User configuration at `$HOME/.config/certup/config.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: ConfigGeneral,
}

#[derive(Debug, Deserialize)]
pub struct ConfigGeneral {
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default = "default_backup")]
    pub backup: bool,
}

impl Default for ConfigGeneral {
    fn default() -> Self {
        Self {
            store: None,
            backup: default_backup(),
        }
    }
}

fn default_backup() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvOp {
    Set,
    Prepend,
}

/// One environment assignment as it was resolved against the context.
/// `value` is the resulting value, so a prepend reports the joined string.
#[derive(Debug, Serialize)]
pub struct EnvChange {
    pub key: String,
    pub op: EnvOp,
    pub previous: Option<String>,
    pub value: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StoreReport {
    pub store: String,
    pub appended: Vec<String>,
    pub skipped: Vec<String>,
    pub bytes_appended: u64,
    pub backup: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PipReport {
    pub config: String,
    pub cert: String,
    pub status: String,
    pub backup: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AwsReport {
    pub status: String,
    pub store: Option<StoreReport>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub env: Vec<EnvChange>,
    pub store: Option<StoreReport>,
    pub pip: Option<PipReport>,
    pub aws: Option<AwsReport>,
}
