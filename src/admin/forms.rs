//! Submitted forms and their validation.
//!
//! Every form deserializes from `application/x-www-form-urlencoded` with
//! missing fields defaulted, so extraction never fails on a partial body.
//! Validation collects all errors in a [`FormErrors`] instead of stopping at
//! the first one; the handler re-renders the form when it is not empty.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use super::db::BackofficeDb;
use super::models::{GlobalConfig, ItemStatus, NewUser, User, UserChanges};
use super::passwords::verify_password;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_ITEM_NAME_LENGTH: usize = 200;

pub const MSG_REQUIRED: &str = "Este campo es obligatorio.";
pub const MSG_EMAIL_REQUIRED: &str = "El email es obligatorio";
pub const MSG_EMAIL_INVALID: &str = "Introduce una dirección de email válida.";
pub const MSG_EMAIL_TAKEN: &str = "Ya existe un usuario con este email";
pub const MSG_USERNAME_TAKEN: &str = "Ya existe un usuario con este nombre.";
pub const MSG_USERNAME_INVALID: &str =
    "Introduce un nombre de usuario válido: letras, números y @/./+/-/_ únicamente.";
pub const MSG_PASSWORD_MISMATCH: &str = "Las contraseñas no coinciden";
pub const MSG_PASSWORD_NUMERIC: &str = "La contraseña no puede ser completamente numérica.";
pub const MSG_OLD_PASSWORD: &str = "Tu contraseña actual es incorrecta.";
pub const MSG_SELF_DEACTIVATE: &str = "No puedes desactivar tu propio usuario";
pub const MSG_INVALID_CHOICE: &str = "Selecciona una opción válida.";
pub const MSG_INVALID_COLOR: &str = "Introduce un color en formato #RRGGBB.";
pub const MSG_INVALID_URL: &str = "Introduce una URL válida (http:// o https://).";

fn msg_password_too_short() -> String {
    format!(
        "La contraseña es demasiado corta. Debe contener al menos {} caracteres.",
        MIN_PASSWORD_LENGTH
    )
}

// ── Errors ────────────────────────────────────────────────────────────

/// Validation errors keyed by field name, plus form-wide errors.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
    pub non_field: Vec<String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Uniqueness lookups needed by the account forms.
pub trait AccountLookup {
    fn username_taken(&self, username: &str) -> Result<bool>;
    fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool>;
}

impl AccountLookup for BackofficeDb {
    fn username_taken(&self, username: &str) -> Result<bool> {
        BackofficeDb::username_taken(self, username)
    }

    fn email_taken(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        BackofficeDb::email_taken(self, email, exclude_id)
    }
}

// ── Field helpers ─────────────────────────────────────────────────────

/// HTML checkboxes submit `on` when checked and nothing otherwise.
pub fn checkbox(value: &Option<String>) -> bool {
    matches!(value.as_deref().map(str::trim), Some("on" | "true" | "1"))
}

pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

fn check_email_format(errors: &mut FormErrors, field: &str, email: &str) {
    if !email.is_empty() && !is_valid_email(email) {
        errors.add(field, MSG_EMAIL_INVALID);
    }
}

fn check_new_password(errors: &mut FormErrors, field: &str, password: &str) {
    if password.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return;
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(field, msg_password_too_short());
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, MSG_PASSWORD_NUMERIC);
    }
}

// ── Users ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserCreateForm {
    pub username: String,
    pub email: String,
    pub is_active: Option<String>,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl UserCreateForm {
    /// Blank form: new accounts start active.
    pub fn initial() -> Self {
        Self {
            is_active: Some("on".to_string()),
            ..Self::default()
        }
    }

    pub fn validate(&self, lookup: &impl AccountLookup) -> Result<FormErrors> {
        let mut errors = FormErrors::default();
        let username = self.username.trim();
        let email = self.email.trim();

        if username.is_empty() {
            errors.add("username", MSG_REQUIRED);
        } else if username.chars().count() > MAX_USERNAME_LENGTH || !is_valid_username(username)
        {
            errors.add("username", MSG_USERNAME_INVALID);
        } else if lookup.username_taken(username)? {
            errors.add("username", MSG_USERNAME_TAKEN);
        }

        check_email_format(&mut errors, "email", email);
        if !errors.has("email") && lookup.email_taken(email, None)? {
            errors.add("email", MSG_EMAIL_TAKEN);
        }

        check_new_password(&mut errors, "password1", &self.password1);
        if self.password2.is_empty() {
            errors.add("password2", MSG_REQUIRED);
        }
        if !self.password1.is_empty()
            && !self.password2.is_empty()
            && self.password1 != self.password2
        {
            errors.add_non_field(MSG_PASSWORD_MISMATCH);
        }

        Ok(errors)
    }

    pub fn to_new_user(&self, password_hash: String) -> NewUser {
        let mut user = NewUser::new(self.username.trim(), self.email.trim(), password_hash);
        user.is_active = checkbox(&self.is_active);
        user
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserEditForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: Option<String>,
}

impl UserEditForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_active: user.is_active.then(|| "on".to_string()),
        }
    }

    /// `editor_id` is the principal submitting the form; nobody may
    /// deactivate their own account.
    pub fn validate(
        &self,
        lookup: &impl AccountLookup,
        target_id: i64,
        editor_id: Option<i64>,
    ) -> Result<FormErrors> {
        let mut errors = FormErrors::default();
        let email = self.email.trim();

        check_email_format(&mut errors, "email", email);
        if !errors.has("email") && lookup.email_taken(email, Some(target_id))? {
            errors.add("email", MSG_EMAIL_TAKEN);
        }
        if editor_id == Some(target_id) && !checkbox(&self.is_active) {
            errors.add("is_active", MSG_SELF_DEACTIVATE);
        }

        Ok(errors)
    }

    pub fn to_changes(&self) -> UserChanges {
        UserChanges {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            is_active: checkbox(&self.is_active),
        }
    }
}

// ── Items ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub name: String,
    pub status: String,
}

impl ItemForm {
    pub fn initial() -> Self {
        Self {
            name: String::new(),
            status: ItemStatus::Active.as_str().to_string(),
        }
    }

    pub fn from_item(name: &str, status: ItemStatus) -> Self {
        Self {
            name: name.to_string(),
            status: status.as_str().to_string(),
        }
    }

    pub fn clean(&self) -> Result<(String, ItemStatus), FormErrors> {
        let mut errors = FormErrors::default();
        let name = self.name.trim();

        if name.is_empty() {
            errors.add("name", MSG_REQUIRED);
        } else if name.chars().count() > MAX_ITEM_NAME_LENGTH {
            errors.add(
                "name",
                format!(
                    "Asegúrate de que este valor tenga como máximo {} caracteres.",
                    MAX_ITEM_NAME_LENGTH
                ),
            );
        }
        let status = self.status.trim().parse::<ItemStatus>();
        if status.is_err() {
            errors.add("status", MSG_INVALID_CHOICE);
        }

        match status {
            Ok(status) if errors.is_empty() => Ok((name.to_string(), status)),
            _ => Err(errors),
        }
    }
}

// ── Accounts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }

    pub fn validate(&self, lookup: &impl AccountLookup, user_id: i64) -> Result<FormErrors> {
        let mut errors = FormErrors::default();
        let email = self.email.trim();

        if email.is_empty() {
            errors.add("email", MSG_EMAIL_REQUIRED);
        } else {
            check_email_format(&mut errors, "email", email);
        }
        if !errors.has("email") && lookup.email_taken(email, Some(user_id))? {
            errors.add("email", MSG_EMAIL_TAKEN);
        }

        Ok(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

impl PasswordChangeForm {
    pub fn validate(&self, user: &User) -> FormErrors {
        let mut errors = FormErrors::default();

        if self.old_password.is_empty() {
            errors.add("old_password", MSG_REQUIRED);
        } else if !verify_password(&self.old_password, &user.password_hash) {
            errors.add("old_password", MSG_OLD_PASSWORD);
        }

        check_new_password(&mut errors, "new_password1", &self.new_password1);
        if self.new_password2.is_empty() {
            errors.add("new_password2", MSG_REQUIRED);
        } else if self.new_password1 != self.new_password2 {
            errors.add("new_password2", MSG_PASSWORD_MISMATCH);
        }

        errors
    }
}

// ── Organization ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfigForm {
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
}

impl GlobalConfigForm {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            site_name: config.site_name.clone(),
            primary_color: config.primary_color.clone(),
            secondary_color: config.secondary_color.clone(),
            company_address: config.company_address.clone(),
            company_phone: config.company_phone.clone(),
            company_email: config.company_email.clone(),
            social_facebook: config.social_facebook.clone(),
            social_twitter: config.social_twitter.clone(),
            social_instagram: config.social_instagram.clone(),
            social_linkedin: config.social_linkedin.clone(),
        }
    }

    /// Apply the submitted values on top of `current`; layout flags are
    /// not part of this form and are carried over.
    pub fn clean(&self, current: &GlobalConfig) -> Result<GlobalConfig, FormErrors> {
        let mut errors = FormErrors::default();

        let site_name = self.site_name.trim();
        if site_name.is_empty() {
            errors.add("site_name", MSG_REQUIRED);
        }
        for (field, value) in [
            ("primary_color", &self.primary_color),
            ("secondary_color", &self.secondary_color),
        ] {
            if !is_hex_color(value.trim()) {
                errors.add(field, MSG_INVALID_COLOR);
            }
        }
        check_email_format(&mut errors, "company_email", self.company_email.trim());
        for (field, value) in [
            ("social_facebook", &self.social_facebook),
            ("social_twitter", &self.social_twitter),
            ("social_instagram", &self.social_instagram),
            ("social_linkedin", &self.social_linkedin),
        ] {
            let value = value.trim();
            if !value.is_empty() && !is_http_url(value) {
                errors.add(field, MSG_INVALID_URL);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(GlobalConfig {
            site_name: site_name.to_string(),
            primary_color: self.primary_color.trim().to_lowercase(),
            secondary_color: self.secondary_color.trim().to_lowercase(),
            company_address: self.company_address.trim().to_string(),
            company_phone: self.company_phone.trim().to_string(),
            company_email: self.company_email.trim().to_string(),
            social_facebook: self.social_facebook.trim().to_string(),
            social_twitter: self.social_twitter.trim().to_string(),
            social_instagram: self.social_instagram.trim().to_string(),
            social_linkedin: self.social_linkedin.trim().to_string(),
            ..current.clone()
        })
    }
}

// ── Dashboard demo ────────────────────────────────────────────────────

pub const QUICK_ACTION_PRIORITIES: [(&str, &str); 3] =
    [("low", "Baja"), ("medium", "Media"), ("high", "Alta")];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickActionForm {
    pub title: String,
    pub priority: String,
    pub notify: Option<String>,
}

/// A validated quick action; nothing is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickAction {
    pub title: String,
    pub priority: String,
    pub priority_label: String,
    pub notify: bool,
}

impl QuickActionForm {
    pub fn clean(&self) -> Result<QuickAction, FormErrors> {
        let mut errors = FormErrors::default();
        let title = self.title.trim();

        if title.is_empty() {
            errors.add("title", MSG_REQUIRED);
        } else if title.chars().count() < 3 {
            errors.add("title", "El título debe tener al menos 3 caracteres.");
        }
        let priority = QUICK_ACTION_PRIORITIES
            .iter()
            .find(|(value, _)| *value == self.priority.trim());
        if priority.is_none() {
            errors.add("priority", MSG_INVALID_CHOICE);
        }

        match priority {
            Some((value, label)) if errors.is_empty() => Ok(QuickAction {
                title: title.to_string(),
                priority: value.to_string(),
                priority_label: label.to_string(),
                notify: checkbox(&self.notify),
            }),
            _ => Err(errors),
        }
    }
}
