use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub certs: PathBuf,
    pub store: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let certs = make_fixture_certs(tmp.path());
        let store = tmp.path().join("bundle").join("ca-bundle.pem");

        Self {
            _tmp: tmp,
            home,
            certs,
            store,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("certup");
        cmd.env("HOME", &self.home)
            .env_remove("SSL_CERT_FILE")
            .env_remove("VIRTUAL_ENV")
            .env_remove("CERTUP_AWS_BUNDLE");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_store(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--store")
            .arg(self.store.to_str().expect("store path utf8"))
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn store_bytes(&self) -> Vec<u8> {
        fs::read(&self.store).unwrap_or_default()
    }

    pub fn pip_config(&self) -> PathBuf {
        self.home.join(".config/pip/pip.conf")
    }

    pub fn session_script(&self) -> PathBuf {
        self.home.join(".config/certup/env.sh")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.home.join(".config/certup/audit.jsonl")
    }
}

fn make_fixture_certs(base: &Path) -> PathBuf {
    let certs = base.join("certs");
    fs::create_dir_all(&certs).expect("create certs dir");
    // a.crt is 10 bytes and b.pem is 5 so growth sums are easy to assert.
    fs::write(certs.join("a.crt"), "AAAA\nBBBB\n").expect("write a.crt");
    fs::write(certs.join("b.pem"), "CCCC\n").expect("write b.pem");
    fs::write(certs.join("notes.txt"), "not a certificate\n").expect("write notes.txt");
    certs
}
