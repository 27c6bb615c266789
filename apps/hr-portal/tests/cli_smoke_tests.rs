//! CLI smoke tests for the hr-portal binary
//!
//! Every test gets its own home directory through a generated config file, so the
//! JSON storage file persists between invocations of the same test only.

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Helper to run the hr-portal binary with given arguments
fn run_hr_portal(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hr-portal"))
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute hr-portal")
}

struct Portal {
    home: TempDir,
    config: PathBuf,
}

impl Portal {
    fn new() -> Self {
        let home = TempDir::new().expect("Failed to create temp dir");
        let config = home.path().join("config.yaml");
        let content = format!(
            r#"
home_dir: "{}"
storage:
  path: "storage/local_storage.json"
logging:
  default:
    console_level: "off"
    file: "logs/hr_portal.log"
    file_level: debug
"#,
            home.path().display().to_string().replace('\\', "/")
        );
        std::fs::write(&config, content).expect("Failed to write config file");
        Self { home, config }
    }

    fn run(&self, args: &[&str]) -> Output {
        let mut full = vec!["--config", self.config.to_str().unwrap()];
        full.extend_from_slice(args);
        run_hr_portal(&full)
    }

    fn storage_file(&self) -> PathBuf {
        self.home.path().join("storage").join("local_storage.json")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "STDOUT: {}\nSTDERR: {}",
        stdout(output),
        stderr(output)
    );
}

#[test]
fn test_cli_help_command() {
    let output = run_hr_portal(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let out = stdout(&output);
    assert!(out.contains("hr-portal"), "Should contain binary name");
    assert!(out.contains("Usage:"), "Should contain usage information");
    for sub in ["register", "login", "open", "account", "employee", "request", "check"] {
        assert!(out.contains(sub), "Should contain '{sub}' subcommand");
    }
    assert!(out.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_hr_portal(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");
    assert!(stdout(&output).contains("hr-portal"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_hr_portal(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    assert!(stderr(&output).contains("error"));
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_hr_portal(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");
    assert!(
        stderr(&output).contains("config file not found"),
        "Should mention config file issue: {}",
        stderr(&output)
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_hr_portal(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    assert!(
        stderr(&output).contains("yaml"),
        "Should mention YAML parsing issue: {}",
        stderr(&output)
    );
}

#[test]
fn test_cli_check_valid_config() {
    let portal = Portal::new();
    let output = portal.run(&["check"]);

    assert_ok(&output);
    let out = stdout(&output);
    assert!(out.contains("Configuration check passed"));
    assert!(out.contains("snapshot_key: ipt_demo_v1"));
}

#[test]
fn test_cli_register_verify_login_flow() {
    let portal = Portal::new();

    let output = portal.run(&[
        "register",
        "--first-name",
        "Bob",
        "--last-name",
        "Stone",
        "--email",
        "bob@x.com",
        "--password",
        "secret1",
    ]);
    assert_ok(&output);
    assert!(stdout(&output).contains("A verification link was sent to bob@x.com"));
    assert!(portal.storage_file().is_file());

    let output = portal.run(&["login", "--email", "bob@x.com", "--password", "secret1"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid_credentials"));

    let output = portal.run(&["verify"]);
    assert_ok(&output);
    assert!(stderr(&output).contains("[success] Email verified successfully!"));
    let output = portal.run(&["login", "--email", "bob@x.com", "--password", "secret1"]);
    assert_ok(&output);
    assert!(stderr(&output).contains("[success] Login successful!"));

    let output = portal.run(&["whoami"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("Bob Stone <bob@x.com> (User)"));

    let output = portal.run(&["open", "#/accounts"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("== Home =="));
    assert!(stderr(&output).contains("Admin access required"));

    let output = portal.run(&["logout"]);
    assert_ok(&output);
    assert!(stderr(&output).contains("[info] Logged out successfully"));
    let output = portal.run(&["open", "#/profile"]);
    assert!(stdout(&output).contains("== Login =="));
    assert!(stderr(&output).contains("Please log in to access this page"));
}

#[test]
fn test_cli_admin_manages_employees_and_requests() {
    let portal = Portal::new();
    assert_ok(&portal.run(&[
        "login",
        "--email",
        "admin@example.com",
        "--password",
        "Password123!",
    ]));

    let output = portal.run(&[
        "employee",
        "add",
        "--employee-id",
        "E-1",
        "--user-email",
        "ghost@x.com",
        "--position",
        "Engineer",
        "--department-id",
        "1",
        "--hire-date",
        "2024-03-01",
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown_user_email"));

    assert_ok(&portal.run(&[
        "employee",
        "add",
        "--employee-id",
        "E-1",
        "--user-email",
        "admin@example.com",
        "--position",
        "Engineer",
        "--department-id",
        "1",
        "--hire-date",
        "2024-03-01",
    ]));
    let output = portal.run(&["employee", "list"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("Admin User"));
    assert!(stdout(&output).contains("Engineering"));

    // no --yes and no stdin answer declines the prompt
    let output = portal.run(&["employee", "delete", "E-1"]);
    assert!(stderr(&output).contains("cancelled"));
    assert_ok(&portal.run(&["--yes", "employee", "delete", "E-1"]));

    let output = portal.run(&["department", "add", "--name", "Ops"]);
    assert!(stderr(&output).contains("not_implemented"));

    assert_ok(&portal.run(&[
        "request", "new", "--type", "Equipment", "--item", "Laptop:1", "--item", "Mouse:2",
    ]));
    let output = portal.run(&["request", "list"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("Laptop x1, Mouse x2"));
    assert!(stdout(&output).contains("Pending"));
}

#[test]
fn test_cli_memory_backend_leaves_no_file() {
    let portal = Portal::new();
    let output = portal.run(&["--memory", "open"]);

    assert_ok(&output);
    assert!(stdout(&output).contains("== Home =="));
    assert!(!portal.storage_file().exists());
}

#[test]
fn test_cli_corrupt_storage_is_not_fatal() {
    let portal = Portal::new();
    std::fs::create_dir_all(portal.storage_file().parent().unwrap()).unwrap();
    std::fs::write(portal.storage_file(), "{not json").unwrap();

    let output = portal.run(&["open", "#/"]);
    assert_ok(&output);
    assert!(stdout(&output).contains("== Home =="));
    assert!(
        stderr(&output).contains("Error loading data"),
        "STDERR: {}",
        stderr(&output)
    );
    assert_eq!(
        std::fs::read_to_string(portal.storage_file()).unwrap(),
        "{not json"
    );

    // the first save replaces the unreadable file
    assert_ok(&portal.run(&[
        "register",
        "--first-name",
        "Bob",
        "--last-name",
        "Stone",
        "--email",
        "bob@x.com",
        "--password",
        "secret1",
    ]));
    let raw = std::fs::read_to_string(portal.storage_file()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(doc["ipt_demo_v1"].as_str().unwrap().contains("bob@x.com"));
    assert_eq!(doc["unverified_email"], "bob@x.com");

    let output = portal.run(&["open", "#/"]);
    assert_ok(&output);
    assert!(!stderr(&output).contains("Error loading data"));
}

#[test]
fn test_cli_check_reports_corrupt_storage() {
    let portal = Portal::new();
    std::fs::create_dir_all(portal.storage_file().parent().unwrap()).unwrap();
    std::fs::write(portal.storage_file(), "{not json").unwrap();

    let output = portal.run(&["check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not a JSON object"));
}
