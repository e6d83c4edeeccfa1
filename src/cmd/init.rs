//! Database bootstrap command: `backoffice init`.

use anyhow::{Context, Result, bail};
use backoffice::admin::db::BackofficeDb;
use backoffice::admin::forms::MIN_PASSWORD_LENGTH;
use backoffice::admin::models::{ItemStatus, NewUser};
use backoffice::admin::passwords::hash_password;
use backoffice::config::BackofficeToml;

const DEMO_ITEMS: [(&str, ItemStatus); 6] = [
    ("Servidor principal", ItemStatus::Active),
    ("Backup nocturno", ItemStatus::Active),
    ("Impresora planta 2", ItemStatus::Inactive),
    ("Licencias ofimática", ItemStatus::Active),
    ("VPN sucursal", ItemStatus::Inactive),
    ("Portal de clientes", ItemStatus::Active),
];

pub struct InitOptions {
    pub admin: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub demo: bool,
}

pub fn cmd_init(settings: &BackofficeToml, options: InitOptions) -> Result<()> {
    let db_path = &settings.database.path;
    super::ensure_parent_dir(db_path).context("Failed to create database directory")?;
    let db = BackofficeDb::new(db_path)?;
    db.load_global_config()?;
    println!("Initialized database at {}", db_path.display());

    if let Some(username) = options.admin.as_deref().map(str::trim) {
        let password = options.password.as_deref().unwrap_or_default();
        if username.is_empty() {
            bail!("--admin needs a username");
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            bail!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            );
        }
        if db.get_user_by_username(username)?.is_some() {
            bail!("User '{}' already exists", username);
        }

        let email = options.email.as_deref().unwrap_or_default().trim();
        let mut admin = NewUser::new(username, email, hash_password(password)?);
        admin.is_superuser = true;
        let user = db.create_user(&admin)?;
        tracing::info!(user = user.id, "superuser created");
        println!("Created superuser '{}'", user.username);
    }

    if options.demo {
        if db.count_items()? > 0 {
            println!("Items table is not empty; demo data skipped.");
        } else {
            for (name, status) in DEMO_ITEMS {
                db.create_item(name, status)?;
            }
            println!("Added {} demo items", DEMO_ITEMS.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice::admin::passwords::verify_password;
    use tempfile::tempdir;

    fn settings_at(dir: &std::path::Path) -> BackofficeToml {
        let mut settings = BackofficeToml::default();
        settings.database.path = dir.join("data").join("bo.db");
        settings
    }

    #[test]
    fn test_init_creates_superuser_and_demo_items() {
        let dir = tempdir().unwrap();
        let settings = settings_at(dir.path());
        cmd_init(
            &settings,
            InitOptions {
                admin: Some("root".into()),
                password: Some("correct-horse".into()),
                email: None,
                demo: true,
            },
        )
        .unwrap();

        let db = BackofficeDb::new(&settings.database.path).unwrap();
        let root = db.get_user_by_username("root").unwrap().unwrap();
        assert!(root.is_superuser);
        assert!(verify_password("correct-horse", &root.password_hash));
        assert_eq!(db.count_items().unwrap(), DEMO_ITEMS.len() as i64);
    }

    #[test]
    fn test_init_rejects_short_password_and_duplicates() {
        let dir = tempdir().unwrap();
        let settings = settings_at(dir.path());
        let short = cmd_init(
            &settings,
            InitOptions {
                admin: Some("root".into()),
                password: Some("short".into()),
                email: None,
                demo: false,
            },
        );
        assert!(short.is_err());

        let options = || InitOptions {
            admin: Some("root".into()),
            password: Some("correct-horse".into()),
            email: None,
            demo: false,
        };
        cmd_init(&settings, options()).unwrap();
        let err = cmd_init(&settings, options()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
