use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::models::*;

/// Async-safe handle to the backoffice database.
///
/// Wraps `BackofficeDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O
/// never ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BackofficeDb>>,
}

impl DbHandle {
    pub fn new(db: BackofficeDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&BackofficeDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database mutex synchronously. For startup, CLI commands
    /// and tests; never from a request handler.
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, BackofficeDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

pub struct BackofficeDb {
    conn: Connection,
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password_hash, is_active, is_superuser, permissions, date_joined";
const ITEM_COLUMNS: &str = "id, name, status, created_at";

impl BackofficeDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE,
                    email TEXT NOT NULL DEFAULT '',
                    first_name TEXT NOT NULL DEFAULT '',
                    last_name TEXT NOT NULL DEFAULT '',
                    password_hash TEXT NOT NULL DEFAULT '',
                    is_active INTEGER NOT NULL DEFAULT 1,
                    is_superuser INTEGER NOT NULL DEFAULT 0,
                    permissions TEXT NOT NULL DEFAULT '[]',
                    date_joined TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'active',
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS global_config (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    site_name TEXT NOT NULL,
                    primary_color TEXT NOT NULL,
                    secondary_color TEXT NOT NULL,
                    company_address TEXT NOT NULL DEFAULT '',
                    company_phone TEXT NOT NULL DEFAULT '',
                    company_email TEXT NOT NULL DEFAULT '',
                    social_facebook TEXT NOT NULL DEFAULT '',
                    social_twitter TEXT NOT NULL DEFAULT '',
                    social_instagram TEXT NOT NULL DEFAULT '',
                    social_linkedin TEXT NOT NULL DEFAULT '',
                    navbar_fixed INTEGER NOT NULL DEFAULT 1,
                    sidebar_collapsed INTEGER NOT NULL DEFAULT 0,
                    updated_at TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_users_email ON users(email COLLATE NOCASE);
                CREATE INDEX IF NOT EXISTS idx_items_status ON items(status);
                ",
            )
            .context("Failed to create tables")?;

        Ok(())
    }

    // ── User CRUD ─────────────────────────────────────────────────────

    pub fn create_user(&self, new: &NewUser) -> Result<User> {
        let permissions =
            serde_json::to_string(&new.permissions).context("Failed to encode permissions")?;
        self.conn
            .execute(
                "INSERT INTO users (username, email, first_name, last_name, password_hash, is_active, is_superuser, permissions, date_joined)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    new.username,
                    new.email,
                    new.first_name,
                    new.last_name,
                    new.password_hash,
                    new.is_active,
                    new.is_superuser,
                    permissions,
                    new.date_joined.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to insert user '{}'", new.username))?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.context("User not found after insert")
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .context("Failed to prepare list_users")?;
        let rows = stmt
            .query_map([], UserRow::from_row)
            .context("Failed to query users")?;
        let mut users = Vec::new();
        for row in rows {
            let r = row.context("Failed to read user row")?;
            users.push(r.into_user()?);
        }
        Ok(users)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                UserRow::from_row,
            )
            .optional()
            .context("Failed to query user")?
            .map(UserRow::into_user)
            .transpose()
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                UserRow::from_row,
            )
            .optional()
            .context("Failed to query user by username")?
            .map(UserRow::into_user)
            .transpose()
    }

    pub fn count_users(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .context("Failed to count users")
    }

    pub fn username_taken(&self, username: &str) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                params![username],
                |row| row.get(0),
            )
            .context("Failed to check username")
    }

    /// Case-insensitive email lookup, ignoring `exclude_id` (the record being
    /// edited). Empty emails never collide.
    pub fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        if email.trim().is_empty() {
            return Ok(false);
        }
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower(?1) AND id != ?2)",
                params![email.trim(), exclude_id.unwrap_or(-1)],
                |row| row.get(0),
            )
            .context("Failed to check email")
    }

    pub fn update_user(&self, id: i64, changes: &UserChanges) -> Result<User> {
        self.conn
            .execute(
                "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3, is_active = ?4 WHERE id = ?5",
                params![
                    changes.first_name,
                    changes.last_name,
                    changes.email,
                    changes.is_active,
                    id
                ],
            )
            .context("Failed to update user")?;
        self.get_user(id)?.context("User not found after update")
    }

    /// Update the fields a user may change on their own profile.
    pub fn update_profile(
        &self,
        id: i64,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<User> {
        self.conn
            .execute(
                "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3 WHERE id = ?4",
                params![first_name, last_name, email, id],
            )
            .context("Failed to update profile")?;
        self.get_user(id)?.context("User not found after profile update")
    }

    pub fn set_user_active(&self, id: i64, is_active: bool) -> Result<User> {
        self.conn
            .execute(
                "UPDATE users SET is_active = ?1 WHERE id = ?2",
                params![is_active, id],
            )
            .context("Failed to update user status")?;
        self.get_user(id)?.context("User not found after status update")
    }

    pub fn set_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let count = self
            .conn
            .execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, id],
            )
            .context("Failed to update password")?;
        anyhow::ensure!(count == 1, "User {} not found", id);
        Ok(())
    }

    pub fn set_permissions(&self, id: i64, permissions: &[String]) -> Result<User> {
        let encoded = serde_json::to_string(permissions).context("Failed to encode permissions")?;
        self.conn
            .execute(
                "UPDATE users SET permissions = ?1 WHERE id = ?2",
                params![encoded, id],
            )
            .context("Failed to update permissions")?;
        self.get_user(id)?.context("User not found after permission update")
    }

    // ── Item CRUD ─────────────────────────────────────────────────────

    pub fn create_item(&self, name: &str, status: ItemStatus) -> Result<Item> {
        self.create_item_at(name, status, Utc::now())
    }

    pub fn create_item_at(
        &self,
        name: &str,
        status: ItemStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Item> {
        self.conn
            .execute(
                "INSERT INTO items (name, status, created_at) VALUES (?1, ?2, ?3)",
                params![name, status.as_str(), created_at.to_rfc3339()],
            )
            .context("Failed to insert item")?;
        let id = self.conn.last_insert_rowid();
        self.get_item(id)?.context("Item not found after insert")
    }

    pub fn list_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))
            .context("Failed to prepare list_items")?;
        let rows = stmt
            .query_map([], ItemRow::from_row)
            .context("Failed to query items")?;
        let mut items = Vec::new();
        for row in rows {
            let r = row.context("Failed to read item row")?;
            items.push(r.into_item()?);
        }
        Ok(items)
    }

    pub fn get_item(&self, id: i64) -> Result<Option<Item>> {
        self.conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"),
                params![id],
                ItemRow::from_row,
            )
            .optional()
            .context("Failed to query item")?
            .map(ItemRow::into_item)
            .transpose()
    }

    pub fn update_item(&self, id: i64, name: &str, status: ItemStatus) -> Result<Item> {
        self.conn
            .execute(
                "UPDATE items SET name = ?1, status = ?2 WHERE id = ?3",
                params![name, status.as_str(), id],
            )
            .context("Failed to update item")?;
        self.get_item(id)?.context("Item not found after update")
    }

    pub fn delete_item(&self, id: i64) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])
            .context("Failed to delete item")?;
        Ok(count > 0)
    }

    pub fn count_items(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
            .context("Failed to count items")
    }

    // ── Organization settings ─────────────────────────────────────────

    /// Load the singleton settings row, creating it with defaults on first use.
    pub fn load_global_config(&self) -> Result<GlobalConfig> {
        let defaults = GlobalConfig::default();
        self.conn
            .execute(
                "INSERT OR IGNORE INTO global_config (id, site_name, primary_color, secondary_color, navbar_fixed, sidebar_collapsed)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)",
                params![
                    defaults.site_name,
                    defaults.primary_color,
                    defaults.secondary_color,
                    defaults.navbar_fixed,
                    defaults.sidebar_collapsed,
                ],
            )
            .context("Failed to seed global config")?;

        let row = self
            .conn
            .query_row(
                "SELECT site_name, primary_color, secondary_color, company_address, company_phone, company_email,
                        social_facebook, social_twitter, social_instagram, social_linkedin,
                        navbar_fixed, sidebar_collapsed, updated_at
                 FROM global_config WHERE id = 1",
                [],
                |row| {
                    Ok((
                        GlobalConfig {
                            site_name: row.get(0)?,
                            primary_color: row.get(1)?,
                            secondary_color: row.get(2)?,
                            company_address: row.get(3)?,
                            company_phone: row.get(4)?,
                            company_email: row.get(5)?,
                            social_facebook: row.get(6)?,
                            social_twitter: row.get(7)?,
                            social_instagram: row.get(8)?,
                            social_linkedin: row.get(9)?,
                            navbar_fixed: row.get(10)?,
                            sidebar_collapsed: row.get(11)?,
                            updated_at: None,
                        },
                        row.get::<_, Option<String>>(12)?,
                    ))
                },
            )
            .context("Failed to load global config")?;

        let (mut config, updated_at) = row;
        config.updated_at = updated_at.as_deref().map(parse_timestamp).transpose()?;
        Ok(config)
    }

    pub fn save_global_config(&self, config: &GlobalConfig) -> Result<GlobalConfig> {
        self.load_global_config()?;
        self.conn
            .execute(
                "UPDATE global_config SET
                    site_name = ?1, primary_color = ?2, secondary_color = ?3,
                    company_address = ?4, company_phone = ?5, company_email = ?6,
                    social_facebook = ?7, social_twitter = ?8, social_instagram = ?9, social_linkedin = ?10,
                    navbar_fixed = ?11, sidebar_collapsed = ?12, updated_at = ?13
                 WHERE id = 1",
                params![
                    config.site_name,
                    config.primary_color,
                    config.secondary_color,
                    config.company_address,
                    config.company_phone,
                    config.company_email,
                    config.social_facebook,
                    config.social_twitter,
                    config.social_instagram,
                    config.social_linkedin,
                    config.navbar_fixed,
                    config.sidebar_collapsed,
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to save global config")?;
        self.load_global_config()
    }
}

// ── Row mapping ───────────────────────────────────────────────────────

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp '{}'", raw))
}

/// Intermediate row struct for users.
struct UserRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    is_active: bool,
    is_superuser: bool,
    permissions: String,
    date_joined: String,
}

impl UserRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            password_hash: row.get(5)?,
            is_active: row.get(6)?,
            is_superuser: row.get(7)?,
            permissions: row.get(8)?,
            date_joined: row.get(9)?,
        })
    }

    fn into_user(self) -> Result<User> {
        let permissions: Vec<String> = serde_json::from_str(&self.permissions)
            .context("Failed to parse user permissions JSON")?;
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash: self.password_hash,
            is_active: self.is_active,
            is_superuser: self.is_superuser,
            permissions,
            date_joined: parse_timestamp(&self.date_joined)?,
        })
    }
}

/// Intermediate row struct for items.
struct ItemRow {
    id: i64,
    name: String,
    status: String,
    created_at: String,
}

impl ItemRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            status: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_item(self) -> Result<Item> {
        let status = ItemStatus::from_str(&self.status)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse item status")?;
        Ok(Item {
            id: self.id,
            name: self.name,
            status,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::new(username, email, String::new())
    }

    #[test]
    fn test_create_database_and_run_migrations() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;

        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('users', 'items', 'global_config')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 3, "Expected 3 tables to exist");

        // Migrations are idempotent
        db.run_migrations()?;
        Ok(())
    }

    #[test]
    fn test_open_on_disk() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("backoffice.db");
        {
            let db = BackofficeDb::new(&path)?;
            db.create_item("persisted", ItemStatus::Active)?;
        }
        let db = BackofficeDb::new(&path)?;
        assert_eq!(db.count_items()?, 1);
        Ok(())
    }

    #[test]
    fn test_create_and_get_user() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let mut new = new_user("ana", "ana@example.com");
        new.permissions = vec![perms::VIEW_USER.to_string()];

        let user = db.create_user(&new)?;
        assert!(user.id > 0);
        assert_eq!(user.username, "ana");
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.permissions, vec![perms::VIEW_USER.to_string()]);

        let by_name = db.get_user_by_username("ana")?.expect("user should exist");
        assert_eq!(by_name.id, user.id);
        assert!(db.get_user_by_username("nobody")?.is_none());
        assert!(db.get_user(999)?.is_none());
        Ok(())
    }

    #[test]
    fn test_duplicate_username_is_rejected() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        db.create_user(&new_user("ana", ""))?;
        assert!(db.username_taken("ana")?);
        assert!(!db.username_taken("bruno")?);
        assert!(db.create_user(&new_user("ana", "")).is_err());
        Ok(())
    }

    #[test]
    fn test_email_taken_is_case_insensitive() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let ana = db.create_user(&new_user("ana", "Ana@Example.com"))?;

        assert!(db.email_taken("ana@example.com", None)?);
        assert!(db.email_taken(" ANA@EXAMPLE.COM ", None)?);
        assert!(!db.email_taken("ana@example.com", Some(ana.id))?);
        assert!(!db.email_taken("bruno@example.com", None)?);
        Ok(())
    }

    #[test]
    fn test_empty_emails_never_collide() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        db.create_user(&new_user("ana", ""))?;
        assert!(!db.email_taken("", None)?);
        Ok(())
    }

    #[test]
    fn test_update_user_and_status() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let user = db.create_user(&new_user("ana", ""))?;

        let updated = db.update_user(
            user.id,
            &UserChanges {
                first_name: "Ana".into(),
                last_name: "Pérez".into(),
                email: "ana@example.com".into(),
                is_active: false,
            },
        )?;
        assert_eq!(updated.full_name(), "Ana Pérez");
        assert_eq!(updated.email, "ana@example.com");
        assert!(!updated.is_active);

        let reactivated = db.set_user_active(user.id, true)?;
        assert!(reactivated.is_active);
        Ok(())
    }

    #[test]
    fn test_update_profile_keeps_status() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let user = db.create_user(&new_user("ana", ""))?;
        let updated = db.update_profile(user.id, "Ana", "", "a@x.io")?;
        assert_eq!(updated.first_name, "Ana");
        assert_eq!(updated.email, "a@x.io");
        assert!(updated.is_active);
        Ok(())
    }

    #[test]
    fn test_set_password() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let user = db.create_user(&new_user("ana", ""))?;
        db.set_password(user.id, "$argon2id$stub")?;
        assert_eq!(db.get_user(user.id)?.unwrap().password_hash, "$argon2id$stub");
        assert!(db.set_password(999, "x").is_err());
        Ok(())
    }

    #[test]
    fn test_set_permissions() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let user = db.create_user(&new_user("ana", ""))?;
        let updated =
            db.set_permissions(user.id, &[perms::VIEW_ITEM.to_string(), perms::ADD_ITEM.to_string()])?;
        assert!(updated.has_perm(perms::ADD_ITEM));
        assert!(!updated.has_perm(perms::VIEW_USER));
        Ok(())
    }

    #[test]
    fn test_date_joined_roundtrip() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let mut new = new_user("ana", "");
        new.date_joined = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        let user = db.create_user(&new)?;
        assert_eq!(user.date_joined, new.date_joined);
        Ok(())
    }

    #[test]
    fn test_item_crud() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;

        let item = db.create_item("Widget", ItemStatus::Active)?;
        assert_eq!(item.name, "Widget");
        assert_eq!(item.status, ItemStatus::Active);

        let updated = db.update_item(item.id, "Gadget", ItemStatus::Inactive)?;
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.status, ItemStatus::Inactive);

        db.create_item("Other", ItemStatus::Active)?;
        let items = db.list_items()?;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Gadget");

        assert!(db.delete_item(item.id)?);
        assert!(!db.delete_item(item.id)?);
        assert!(db.get_item(item.id)?.is_none());
        assert_eq!(db.count_items()?, 1);
        Ok(())
    }

    #[test]
    fn test_bad_item_status_in_row_is_an_error() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        db.conn.execute(
            "INSERT INTO items (name, status, created_at) VALUES ('x', 'archived', ?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        assert!(db.list_items().is_err());
        Ok(())
    }

    #[test]
    fn test_global_config_defaults_on_first_load() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let config = db.load_global_config()?;
        assert_eq!(config, GlobalConfig::default());

        // Loading twice keeps a single row
        db.load_global_config()?;
        let rows: i32 = db
            .conn
            .query_row("SELECT COUNT(*) FROM global_config", [], |row| row.get(0))?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn test_save_global_config() -> Result<()> {
        let db = BackofficeDb::new_in_memory()?;
        let mut config = db.load_global_config()?;
        config.site_name = "Acme".into();
        config.primary_color = "#112233".into();
        config.social_linkedin = "https://linkedin.com/company/acme".into();

        let saved = db.save_global_config(&config)?;
        assert_eq!(saved.site_name, "Acme");
        assert_eq!(saved.primary_color, "#112233");
        assert!(saved.updated_at.is_some());
        assert_eq!(db.load_global_config()?.site_name, "Acme");
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_call_runs_on_blocking_pool() -> Result<()> {
        let handle = DbHandle::new(BackofficeDb::new_in_memory()?);
        let item = handle
            .call(|db| db.create_item("async", ItemStatus::Active))
            .await?;
        let fetched = handle.call(move |db| db.get_item(item.id)).await?;
        assert_eq!(fetched.unwrap().name, "async");
        assert_eq!(handle.lock_sync()?.count_items()?, 1);
        Ok(())
    }
}
