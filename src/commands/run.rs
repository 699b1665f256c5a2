use crate::cli::Cli;
use crate::domain::models::{AwsReport, Config, EnvOp, RunReport};
use crate::services::certs::{append_certs, discover_certs};
use crate::services::env::{persist_changes, EnvContext};
use crate::services::output::print_one;
use crate::services::pipconf::{pip_config_path, write_pip_config};
use crate::services::storage::{audit, load_config};
use crate::services::stores::{aws_bundle, resolve_store};

pub fn handle_run(cli: &Cli) -> anyhow::Result<()> {
    if !cli.has_action() {
        return print_one(
            cli.json,
            "nothing to do: pass at least one of --cert-path, --set-env, --prepend-env, --pip, --aws",
            |s| s.to_string(),
        );
    }

    let config = load_config()?;
    let mut ctx = EnvContext::from_process();

    // Environment first: an SSL_CERT_FILE assignment made here steers the
    // store resolution below within the same invocation.
    let mut env_changes = Vec::new();
    if let Some(map) = &cli.set_env {
        env_changes.extend(ctx.apply(map, EnvOp::Set));
    }
    if let Some(map) = &cli.prepend_env {
        env_changes.extend(ctx.apply(map, EnvOp::Prepend));
    }
    if !env_changes.is_empty() {
        ctx.export_to_process(&env_changes);
        if let Some(script) = persist_changes(&env_changes)? {
            audit(
                "env_configured",
                serde_json::json!({
                    "script": script.display().to_string(),
                    "applied": env_changes.iter().filter(|c| c.status == "applied").count(),
                }),
            );
        }
    }

    let store = resolve_store(cli, &config, &ctx)?;

    let store_report = match &cli.cert_path {
        Some(dir) => {
            let certs = discover_certs(dir)?;
            let report = append_certs(&store, &certs, config.general.backup)?;
            audit(
                "certs_appended",
                serde_json::json!({
                    "store": &report.store,
                    "appended": &report.appended,
                    "bytes": report.bytes_appended,
                }),
            );
            Some(report)
        }
        None => None,
    };

    let pip_report = if cli.pip {
        let path = pip_config_path(&ctx)?;
        let report = write_pip_config(&path, &store, config.general.backup)?;
        audit(
            "pip_configured",
            serde_json::json!({
                "config": &report.config,
                "status": &report.status,
            }),
        );
        Some(report)
    } else {
        None
    };

    let aws_report = if cli.aws {
        Some(configure_aws(cli, &config, &ctx)?)
    } else {
        None
    };

    let report = RunReport {
        env: env_changes,
        store: store_report,
        pip: pip_report,
        aws: aws_report,
    };
    print_one(cli.json, report, render_text)
}

fn configure_aws(cli: &Cli, config: &Config, ctx: &EnvContext) -> anyhow::Result<AwsReport> {
    let Some(bundle) = aws_bundle(ctx) else {
        return Ok(AwsReport {
            status: "skipped_not_windows".to_string(),
            store: None,
        });
    };
    let Some(dir) = &cli.cert_path else {
        return Ok(AwsReport {
            status: "skipped_no_cert_path".to_string(),
            store: None,
        });
    };
    // Only touch bundles an AWS CLI install actually shipped.
    if !bundle.is_file() {
        return Ok(AwsReport {
            status: "skipped_bundle_missing".to_string(),
            store: None,
        });
    }
    let certs = discover_certs(dir)?;
    let report = append_certs(&bundle, &certs, config.general.backup)?;
    audit(
        "aws_configured",
        serde_json::json!({
            "store": &report.store,
            "appended": &report.appended,
        }),
    );
    Ok(AwsReport {
        status: "appended".to_string(),
        store: Some(report),
    })
}

fn render_text(report: &RunReport) -> String {
    let mut lines = Vec::new();
    for c in &report.env {
        lines.push(format!(
            "{}\t{}\t{}",
            format!("{:?}", c.op).to_lowercase(),
            c.key,
            c.status
        ));
    }
    if let Some(s) = &report.store {
        lines.push(format!(
            "appended {} certificate(s) to {} ({} bytes, {} skipped)",
            s.appended.len(),
            s.store,
            s.bytes_appended,
            s.skipped.len()
        ));
        if let Some(backup) = &s.backup {
            lines.push(format!("store backed up at {}", backup));
        }
    }
    if let Some(p) = &report.pip {
        lines.push(format!("pip config {}: {} (cert = {})", p.status, p.config, p.cert));
    }
    if let Some(a) = &report.aws {
        match &a.store {
            Some(s) => lines.push(format!(
                "aws bundle: appended {} certificate(s) to {}",
                s.appended.len(),
                s.store
            )),
            None => lines.push(format!("aws bundle: {}", a.status)),
        }
    }
    lines.join("\n")
}
