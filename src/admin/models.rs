use std::str::FromStr;

use backoffice_kit::{FieldValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Permission codenames checked by the authorizer.
pub mod perms {
    pub const VIEW_USER: &str = "auth.view_user";
    pub const ADD_USER: &str = "auth.add_user";
    pub const CHANGE_USER: &str = "auth.change_user";
    pub const DELETE_USER: &str = "auth.delete_user";

    pub const VIEW_ITEM: &str = "crud_example.view_item";
    pub const ADD_ITEM: &str = "crud_example.add_item";
    pub const CHANGE_ITEM: &str = "crud_example.change_item";
    pub const DELETE_ITEM: &str = "crud_example.delete_item";

    pub const ALL: [&str; 8] = [
        VIEW_USER,
        ADD_USER,
        CHANGE_USER,
        DELETE_USER,
        VIEW_ITEM,
        ADD_ITEM,
        CHANGE_ITEM,
        DELETE_ITEM,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Name shown in the navbar: full name when set, username otherwise.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }

    pub fn has_perm(&self, codename: &str) -> bool {
        self.is_active && (self.is_superuser || self.permissions.iter().any(|p| p == codename))
    }
}

impl Record for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "username" => self.username.as_str().into(),
            "email" => self.email.as_str().into(),
            "first_name" => self.first_name.as_str().into(),
            "last_name" => self.last_name.as_str().into(),
            "full_name" => self.full_name().into(),
            "is_active" => self.is_active.into(),
            "is_superuser" => self.is_superuser.into(),
            "status" => ItemStatus::from_active(self.is_active).as_str().into(),
            "date_joined" => self.date_joined.into(),
            _ => FieldValue::Null,
        }
    }
}

/// Fields for a new account. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub permissions: Vec<String>,
    pub date_joined: DateTime<Utc>,
}

impl NewUser {
    /// An active, unprivileged account joined now.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash,
            is_active: true,
            is_superuser: false,
            permissions: Vec::new(),
            date_joined: Utc::now(),
        }
    }
}

/// Editable account fields.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    Inactive,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 2] = [ItemStatus::Active, ItemStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Activo",
            Self::Inactive => "Inactivo",
        }
    }

    pub fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for Item {
    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "name" => self.name.as_str().into(),
            "status" => self.status.as_str().into(),
            "status_label" => self.status.label().into(),
            "created_at" => self.created_at.into(),
            _ => FieldValue::Null,
        }
    }
}

/// Singleton organization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub site_name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub social_facebook: String,
    pub social_twitter: String,
    pub social_instagram: String,
    pub social_linkedin: String,
    pub navbar_fixed: bool,
    pub sidebar_collapsed: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            site_name: "Backoffice".to_string(),
            primary_color: "#0d6efd".to_string(),
            secondary_color: "#6c757d".to_string(),
            company_address: String::new(),
            company_phone: String::new(),
            company_email: String::new(),
            social_facebook: String::new(),
            social_twitter: String::new(),
            social_instagram: String::new(),
            social_linkedin: String::new(),
            navbar_fixed: true,
            sidebar_collapsed: false,
            updated_at: None,
        }
    }
}

impl GlobalConfig {
    /// Social links that are set, as `(network, url)` pairs.
    pub fn social_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", self.social_facebook.as_str()),
            ("Twitter", self.social_twitter.as_str()),
            ("Instagram", self.social_instagram.as_str()),
            ("LinkedIn", self.social_linkedin.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .collect()
    }
}
