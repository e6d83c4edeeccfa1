//! End-to-end tests for the backoffice binary.
//!
//! Each test runs the CLI inside its own temp directory so configuration,
//! `.env` files and the database never leak between tests.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A backoffice command rooted in `dir`, with the env overrides cleared.
fn backoffice(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("backoffice");
    cmd.current_dir(dir.path())
        .env_remove("BACKOFFICE_DB")
        .env_remove("BACKOFFICE_PORT")
        .env_remove("RUST_LOG");
    cmd
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("backoffice.db")
}

/// Create the database with a superuser and the demo items.
fn init_with_demo(dir: &TempDir) {
    backoffice(dir)
        .arg("--db-path")
        .arg(db_path(dir))
        .args(["init", "--admin", "admin", "--password", "s3cret-pass"])
        .args(["--email", "admin@example.com", "--demo"])
        .assert()
        .success();
}

// =============================================================================
// Basic CLI
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"))
            .stdout(predicate::str::contains("export"));
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("backoffice"));
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir).arg("frobnicate").assert().failure();
    }

    #[test]
    fn test_password_requires_admin() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .args(["init", "--password", "whatever123"])
            .assert()
            .failure();
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_commands {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--config-dir")
            .arg(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created backoffice.toml"));

        let content = fs::read_to_string(dir.path().join("backoffice.toml")).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[database]"));
    }

    #[test]
    fn test_config_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("backoffice.toml"), "[server]\nport = 9000\n").unwrap();

        backoffice(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        let content = fs::read_to_string(dir.path().join("backoffice.toml")).unwrap();
        assert!(content.contains("9000"));
    }

    #[test]
    fn test_config_validate_without_file() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Using defaults"));
    }

    #[test]
    fn test_config_validate_valid_file() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir).args(["config", "init"]).assert().success();
        backoffice(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_config_show_reflects_file_and_env() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("backoffice.toml"), "[server]\nport = 9100\n").unwrap();

        backoffice(&dir)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 9100"));

        backoffice(&dir)
            .env("BACKOFFICE_PORT", "9200")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("port = 9200"));
    }
}

// =============================================================================
// Init
// =============================================================================

mod init_command {
    use super::*;

    #[test]
    fn test_init_creates_database() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized database"));
        assert!(db_path(&dir).exists());
    }

    #[test]
    fn test_init_with_admin_and_demo() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["init", "--admin", "admin", "--password", "s3cret-pass", "--demo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created superuser 'admin'"))
            .stdout(predicate::str::contains("Added 6 demo items"));
    }

    #[test]
    fn test_init_rejects_duplicate_admin() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["init", "--admin", "admin", "--password", "another-pass"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn test_init_rejects_short_password() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["init", "--admin", "admin", "--password", "short"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Password must be at least"));
    }

    #[test]
    fn test_init_demo_is_not_repeated() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["init", "--demo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("demo data skipped"));
    }

    #[test]
    fn test_init_honours_env_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("from-env.db");
        backoffice(&dir)
            .env("BACKOFFICE_DB", &path)
            .arg("init")
            .assert()
            .success();
        assert!(path.exists());
    }
}

// =============================================================================
// Export
// =============================================================================

mod export_command {
    use super::*;

    #[test]
    fn test_export_users_csv_to_file() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        let out = dir.path().join("users.csv");

        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["export", "users", "csv", "--output"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Exported 1 rows"));

        let content = fs::read_to_string(&out).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Username,Email,Activo,Fecha de alta"));
        assert!(lines.next().unwrap().starts_with("admin,admin@example.com"));
    }

    #[test]
    fn test_export_items_csv_to_stdout_with_query() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);

        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["export", "items", "csv", "-q", "q=backup"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Backup nocturno"))
            .stdout(predicate::str::contains("Servidor principal").not());
    }

    #[test]
    fn test_export_items_xlsx() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        let out = dir.path().join("items.xlsx");

        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["export", "items", "xlsx", "-o"])
            .arg(&out)
            .assert()
            .success();

        // XLSX is a zip archive.
        let bytes = fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_export_unknown_listing_fails() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["export", "invoices", "csv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown listing"));
    }

    #[test]
    fn test_failed_export_does_not_create_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("dashboard.csv");
        backoffice(&dir)
            .args(["export", "dashboard", "csv", "--output"])
            .arg(&out)
            .assert()
            .failure()
            .stderr(predicate::str::contains("disabled"));
        assert!(!out.exists());
    }

    #[test]
    fn test_export_unknown_format_fails() {
        let dir = TempDir::new().unwrap();
        init_with_demo(&dir);
        backoffice(&dir)
            .arg("--db-path")
            .arg(db_path(&dir))
            .args(["export", "users", "docx"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown export format"));
    }

    #[test]
    fn test_export_dashboard_is_disabled() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .args(["export", "dashboard", "csv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("disabled"));
    }

    #[test]
    fn test_export_without_database_fails() {
        let dir = TempDir::new().unwrap();
        backoffice(&dir)
            .arg("--db-path")
            .arg(dir.path().join("missing.db"))
            .args(["export", "users", "csv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("backoffice init"));
    }
}
