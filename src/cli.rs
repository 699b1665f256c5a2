use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "certup",
    version,
    about = "Append corporate SSL certificates to a trusted bundle and wire up env/pip configuration"
)]
pub struct Cli {
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory of *.crt / *.pem files to append to the trusted store"
    )]
    pub cert_path: Option<PathBuf>,
    #[arg(
        long,
        value_name = "KEY1=VAL1,KEY2=VAL2",
        value_parser = parse_env_map,
        help = "Overwrite environment variables"
    )]
    pub set_env: Option<EnvMap>,
    #[arg(
        long,
        value_name = "KEY1=VAL1,KEY2=VAL2",
        value_parser = parse_env_map,
        help = "Prepend to environment variables, new value first"
    )]
    pub prepend_env: Option<EnvMap>,
    #[arg(
        long,
        help = "Write or update pip SSL configuration to point at the trusted store"
    )]
    pub pip: bool,
    #[arg(
        long,
        help = "Also append certificates to the AWS CLI bundle (windows only)"
    )]
    pub aws: bool,
    #[arg(
        long,
        value_name = "FILE",
        help = "Trusted certificate store to append to (overrides config file and SSL_CERT_FILE)"
    )]
    pub store: Option<PathBuf>,
}

impl Cli {
    pub fn has_action(&self) -> bool {
        self.cert_path.is_some()
            || self.set_env.is_some()
            || self.prepend_env.is_some()
            || self.pip
            || self.aws
    }
}

/// Ordered key=value assignments parsed from one comma-separated flag value.
/// Order is preserved so later pairs win for a repeated key.
#[derive(Clone, Debug)]
pub struct EnvMap(pub Vec<(String, String)>);

/// Boundary validation: the whole mapping is rejected before any mutation
/// happens, so a malformed pair never leaves a half-applied environment.
fn parse_env_map(raw: &str) -> Result<EnvMap, String> {
    let mut pairs = Vec::new();
    for chunk in raw.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }
        let Some((key, value)) = chunk.split_once('=') else {
            return Err(format!("malformed KEY=VALUE pair: {chunk}"));
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(format!("malformed KEY=VALUE pair: {chunk}"));
        }
        pairs.push((key.to_string(), value.to_string()));
    }
    if pairs.is_empty() {
        return Err("expected at least one KEY=VALUE pair".to_string());
    }
    Ok(EnvMap(pairs))
}

#[cfg(test)]
mod tests {
    use super::parse_env_map;

    #[test]
    fn parses_pairs_in_order() {
        let map = parse_env_map("HTTPS_PROXY=http://proxy:8080,NO_PROXY=localhost").unwrap();
        assert_eq!(
            map.0,
            vec![
                ("HTTPS_PROXY".to_string(), "http://proxy:8080".to_string()),
                ("NO_PROXY".to_string(), "localhost".to_string()),
            ]
        );
    }

    #[test]
    fn value_may_contain_equals() {
        let map = parse_env_map("TOKEN=abc=def==").unwrap();
        assert_eq!(map.0, vec![("TOKEN".to_string(), "abc=def==".to_string())]);
    }

    #[test]
    fn rejects_pair_without_equals() {
        let err = parse_env_map("GOOD=1,NOEQUALS").unwrap_err();
        assert!(err.contains("malformed KEY=VALUE pair: NOEQUALS"));
    }

    #[test]
    fn rejects_empty_or_spaced_key() {
        assert!(parse_env_map("=value").is_err());
        assert!(parse_env_map("A B=value").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_env_map("").is_err());
        assert!(parse_env_map(",,").is_err());
    }
}
