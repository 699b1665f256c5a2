use crate::cli::Cli;
use crate::domain::constants::{AWS_BUNDLE_OVERRIDE_ENV, AWS_BUNDLE_WINDOWS, STORE_ENV};
use crate::domain::models::Config;
use crate::services::env::EnvContext;
use crate::services::storage::config_base_dir;
use std::path::PathBuf;

/// Resolution order: `--store` flag, config file, `SSL_CERT_FILE` from the
/// environment context, then the managed default bundle.
pub fn resolve_store(cli: &Cli, config: &Config, ctx: &EnvContext) -> anyhow::Result<PathBuf> {
    if let Some(store) = &cli.store {
        return Ok(store.clone());
    }
    if let Some(store) = &config.general.store {
        return Ok(PathBuf::from(store));
    }
    if let Some(store) = ctx.get(STORE_ENV) {
        if !store.is_empty() {
            return Ok(PathBuf::from(store));
        }
    }
    Ok(config_base_dir()?.join("ca-bundle.pem"))
}

/// Extra bundle shipped with the windows AWS CLI installer; `None` means the
/// target does not apply on this platform.
pub fn aws_bundle(ctx: &EnvContext) -> Option<PathBuf> {
    if let Some(path) = ctx.get(AWS_BUNDLE_OVERRIDE_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    if cfg!(windows) {
        Some(PathBuf::from(AWS_BUNDLE_WINDOWS))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{aws_bundle, resolve_store};
    use crate::cli::Cli;
    use crate::domain::models::{Config, ConfigGeneral};
    use crate::services::env::EnvContext;
    use std::path::PathBuf;

    fn cli(store: Option<&str>) -> Cli {
        Cli {
            json: false,
            cert_path: None,
            set_env: None,
            prepend_env: None,
            pip: false,
            aws: false,
            store: store.map(PathBuf::from),
        }
    }

    fn config(store: Option<&str>) -> Config {
        Config {
            general: ConfigGeneral {
                store: store.map(str::to_string),
                backup: true,
            },
        }
    }

    #[test]
    fn flag_wins_over_config_and_env() {
        let ctx = EnvContext::from_vars(&[("SSL_CERT_FILE", "/env.pem")]);
        let store = resolve_store(&cli(Some("/flag.pem")), &config(Some("/cfg.pem")), &ctx);
        assert_eq!(store.unwrap(), PathBuf::from("/flag.pem"));
    }

    #[test]
    fn config_wins_over_env() {
        let ctx = EnvContext::from_vars(&[("SSL_CERT_FILE", "/env.pem")]);
        let store = resolve_store(&cli(None), &config(Some("/cfg.pem")), &ctx);
        assert_eq!(store.unwrap(), PathBuf::from("/cfg.pem"));
    }

    #[test]
    fn env_var_used_when_flag_and_config_absent() {
        let ctx = EnvContext::from_vars(&[("SSL_CERT_FILE", "/env.pem")]);
        let store = resolve_store(&cli(None), &config(None), &ctx);
        assert_eq!(store.unwrap(), PathBuf::from("/env.pem"));
    }

    #[test]
    fn falls_back_to_managed_bundle() {
        let ctx = EnvContext::from_vars(&[]);
        let store = resolve_store(&cli(None), &config(None), &ctx).unwrap();
        assert!(store.ends_with(".config/certup/ca-bundle.pem"));
    }

    #[test]
    fn aws_bundle_honors_override() {
        let ctx = EnvContext::from_vars(&[("CERTUP_AWS_BUNDLE", "/opt/aws/cacert.pem")]);
        assert_eq!(
            aws_bundle(&ctx),
            Some(PathBuf::from("/opt/aws/cacert.pem"))
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn aws_bundle_absent_off_windows() {
        let ctx = EnvContext::from_vars(&[]);
        assert_eq!(aws_bundle(&ctx), None);
    }
}
