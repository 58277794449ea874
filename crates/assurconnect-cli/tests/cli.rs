use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    temp: TempDir,
    db_path: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let db_path = temp.path().join("assurconnect.sqlite3");
        Self { temp, db_path }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("assurconnect");
        cmd.env("XDG_CONFIG_HOME", self.temp.path().join("config"))
            .env("XDG_DATA_HOME", self.temp.path().join("data"))
            .env_remove("RUST_LOG")
            .args(["--db-path", self.db_path.to_str().expect("db path")]);
        cmd
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().expect("run command");
        assert!(output.status.success(), "command failed: {:?}", output);
        String::from_utf8(output.stdout).expect("utf8")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run command");
        assert!(output.status.success(), "command failed: {:?}", output);
        serde_json::from_slice(&output.stdout).expect("parse json")
    }

    fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.temp.path().join("assurconnect.toml");
        fs::write(&path, contents).expect("write config");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).expect("chmod");
        }
        path
    }
}

const CONTACT: [&str; 8] = [
    "--last-name",
    "Martin",
    "--first-name",
    "Jean",
    "--email",
    "jean.martin@example.fr",
    "--phone",
    "06 12 34 56 78",
];

fn submit_auto(env: &Env) -> String {
    let mut args = vec!["submit", "auto"];
    args.extend(CONTACT);
    args.extend([
        "--zip-code",
        "75011",
        "--birth-date",
        "1985-04-12",
        "--vehicle-type",
        "citadine",
        "--license-date",
        "2004-06-01",
        "--bonus-malus",
        "0.85",
        "--situation",
        "married",
        "--consent",
    ]);
    env.run(&args)
}

fn submit_home(env: &Env) -> String {
    let mut args = vec!["submit", "home"];
    args.extend(CONTACT);
    args.extend([
        "--zip-code",
        "69003",
        "--housing-type",
        "apartment",
        "--surface",
        "64",
        "--status",
        "tenant",
        "--consent",
    ]);
    env.run(&args)
}

fn csv_lines(dir: &Path) -> Vec<String> {
    let entries: Vec<_> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(entries.len(), 1, "expected one export file: {:?}", entries);
    let name = entries[0].file_name().and_then(|n| n.to_str()).expect("name");
    assert!(name.starts_with("leads_export_") && name.ends_with(".csv"));
    fs::read_to_string(&entries[0])
        .expect("read csv")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn cli_submit_list_export_flow() {
    let env = Env::new();

    let confirmation = submit_auto(&env);
    assert!(confirmation.contains("Jean"));
    submit_home(&env);

    let list = env.run_json(&["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["category"], "home");
    assert_eq!(items[1]["category"], "auto");
    assert_eq!(items[0]["status"], "new");
    assert_eq!(items[1]["payload"]["zipCode"], "75011");
    assert_ne!(items[0]["id"], items[1]["id"]);

    let autos = env.run_json(&["list", "--category", "auto"]);
    assert_eq!(autos.as_array().expect("array").len(), 1);

    let out_dir = env.temp.path().join("exports");
    fs::create_dir(&out_dir).expect("create out dir");
    let report = env.run_json(&["export", "--out-dir", out_dir.to_str().expect("out dir")]);
    assert_eq!(report["rows"], 2);

    let lines = csv_lines(&out_dir);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ID,Type,Date,Status,Data");
    assert!(lines[1].contains(",home,"));
    assert!(lines[1].contains("\"\"firstName\"\":\"\"Jean\"\""));
}

#[test]
fn cli_export_empty_store_writes_nothing() {
    let env = Env::new();
    let out_dir = env.temp.path().join("exports");
    fs::create_dir(&out_dir).expect("create out dir");

    let stdout = env.run(&["export", "--out-dir", out_dir.to_str().expect("out dir")]);
    assert!(stdout.contains("nothing to export"));
    assert_eq!(fs::read_dir(&out_dir).expect("read dir").count(), 0);
}

#[test]
fn cli_rejects_invalid_submissions() {
    let env = Env::new();

    let mut no_consent = vec!["submit", "pet"];
    no_consent.extend(CONTACT);
    no_consent.extend([
        "--zip-code", "33000", "--animal-type", "dog", "--breed", "beagle", "--age", "3",
    ]);
    env.cmd().args(&no_consent).assert().code(3);

    let mut bad_email = vec![
        "submit",
        "rc-pro",
        "--last-name",
        "Martin",
        "--first-name",
        "Jean",
        "--email",
        "not-an-email",
        "--phone",
        "0612345678",
    ];
    bad_email.extend([
        "--company-name",
        "Atelier Martin",
        "--activity",
        "carpentry",
        "--turnover",
        "250000",
        "--workforce",
        "4",
        "--consent",
    ]);
    env.cmd().args(&bad_email).assert().code(3);

    let list = env.run_json(&["list"]);
    assert!(list.as_array().expect("array").is_empty());
}

#[test]
fn cli_list_rejects_unknown_category() {
    let env = Env::new();
    env.cmd()
        .args(["list", "--category", "boat"])
        .assert()
        .code(3);
}

#[test]
fn cli_stdout_notifications_announce_new_leads() {
    let env = Env::new();
    let config = env.write_config(
        "[dispatch]\nenabled = false\n\n[notifications]\nenabled = true\nbackend = \"stdout\"\n",
    );

    let mut args = vec!["--config", config.to_str().expect("config path"), "submit", "auto"];
    args.extend(CONTACT);
    args.extend([
        "--zip-code",
        "75011",
        "--birth-date",
        "1985-04-12",
        "--vehicle-type",
        "citadine",
        "--license-date",
        "2004-06-01",
        "--bonus-malus",
        "0.85",
        "--situation",
        "single",
        "--consent",
    ]);
    let stdout = env.run(&args);
    assert!(stdout.contains("New lead: Auto insurance"));
}

#[test]
fn cli_rejects_unknown_config_keys() {
    let env = Env::new();
    let config = env.write_config("[dispatch]\nretries = 3\n");
    env.cmd()
        .args(["--config", config.to_str().expect("config path"), "list"])
        .assert()
        .code(3);
}
