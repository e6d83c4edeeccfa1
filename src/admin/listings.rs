//! Listing configurations for every admin table.
//!
//! Built once at startup by [`Listings::build`] and shared read-only through
//! the application state.

use std::sync::Arc;

use anyhow::{Context, Result};
use backoffice_kit::{
    ActionUrls, CellFormat, ColumnDef, ExportFormat, ExportSettings, FieldValue, FilterDef,
    ListingConfig, ModalLabels, Permissions, Record, SortDir,
};
use serde::Serialize;

use super::models::{Item, User, perms};
use crate::config::BackofficeToml;

pub const USERS: &str = "users";
pub const ITEMS: &str = "items";
pub const DASHBOARD: &str = "dashboard";

/// All listing configurations of the application.
#[derive(Debug, Clone)]
pub struct Listings {
    pub users: Arc<ListingConfig<User>>,
    pub items: Arc<ListingConfig<Item>>,
    pub services: Arc<ListingConfig<ServiceRow>>,
}

impl Listings {
    /// Build the listings with the `[listings.<slug>]` overrides applied.
    pub fn build(config: &BackofficeToml) -> Result<Self> {
        let users = apply_overrides(users_listing(), config)
            .build()
            .context("Invalid users listing")?;
        let items = apply_overrides(items_listing(), config)
            .build()
            .context("Invalid items listing")?;
        let services = apply_overrides(services_listing(), config)
            .build()
            .context("Invalid dashboard listing")?;

        Ok(Self {
            users: Arc::new(users),
            items: Arc::new(items),
            services: Arc::new(services),
        })
    }
}

fn apply_overrides<R>(mut listing: ListingConfig<R>, config: &BackofficeToml) -> ListingConfig<R> {
    let Some(over) = config.listing(&listing.slug) else {
        return listing;
    };
    if let Some(page_size) = over.page_size {
        listing = listing.page_size(page_size.max(1));
    }
    if let Some(formats) = over.formats() {
        listing.export.formats = formats;
    }
    listing
}

// ── Users ─────────────────────────────────────────────────────────────

pub fn users_listing() -> ListingConfig<User> {
    ListingConfig::new(USERS)
        .title("Usuarios")
        .entity("Usuario", "Usuarios")
        .page_size(15)
        .search(&["username", "email", "first_name", "last_name"])
        .column(ColumnDef::new("username", "Username", CellFormat::plain("username")).nowrap())
        .column(ColumnDef::new("email", "Email", CellFormat::dash_if_empty("email")))
        .column(ColumnDef::new(
            "is_active",
            "Estado",
            CellFormat::active_inactive("is_active"),
        ))
        .column(
            ColumnDef::new("date_joined", "Fecha de alta", CellFormat::date("date_joined"))
                .nowrap(),
        )
        .filter(FilterDef::status("status"))
        .filter(FilterDef::date_range("date_joined"))
        .status_options(&[("all", "Todos"), ("active", "Activo"), ("inactive", "Inactivo")])
        .default_sort("date_joined", SortDir::Desc)
        .permissions(Permissions {
            list: Some(perms::VIEW_USER.to_string()),
            create: Some(perms::ADD_USER.to_string()),
            edit: Some(perms::CHANGE_USER.to_string()),
            delete: Some(perms::DELETE_USER.to_string()),
            export: Some(perms::VIEW_USER.to_string()),
        })
        .export(ExportSettings {
            enabled: true,
            fields: to_strings(&["username", "email", "is_active", "date_joined"]),
            headers: to_strings(&["Username", "Email", "Activo", "Fecha de alta"]),
            formats: ExportFormat::ALL.to_vec(),
            filename_base: "users".to_string(),
            title: "Usuarios".to_string(),
        })
        .labels(ModalLabels {
            create_title: "Crear usuario".to_string(),
            edit_title: "Editar usuario {pk}".to_string(),
            delete_title: "Cambiar estado usuario {pk}".to_string(),
            create_submit: "Crear".to_string(),
            edit_submit: "Guardar".to_string(),
            delete_confirm: "Confirmar".to_string(),
        })
        .row_urls(|u: &User| ActionUrls {
            detail: None,
            edit: Some(format!("/users/{}/edit/", u.id)),
            delete: Some(format!("/users/{}/toggle/", u.id)),
        })
}

// ── Items ─────────────────────────────────────────────────────────────

pub fn items_listing() -> ListingConfig<Item> {
    ListingConfig::new(ITEMS)
        .title("CRUD Example")
        .entity("Item", "Items")
        .page_size(10)
        .search(&["name"])
        .column(ColumnDef::new("name", "Nombre", CellFormat::plain("name")))
        .column(ColumnDef::new("status", "Estado", CellFormat::plain("status_label")))
        .column(
            ColumnDef::new("created_at", "Creado", CellFormat::datetime("created_at")).nowrap(),
        )
        .filter(FilterDef::status("status"))
        .filter(FilterDef::date_range("created_at"))
        .status_options(&[("all", "Todos"), ("active", "Activo"), ("inactive", "Inactivo")])
        .default_sort("created_at", SortDir::Asc)
        .permissions(Permissions {
            list: Some(perms::VIEW_ITEM.to_string()),
            create: Some(perms::ADD_ITEM.to_string()),
            edit: Some(perms::CHANGE_ITEM.to_string()),
            delete: Some(perms::DELETE_ITEM.to_string()),
            export: Some(perms::VIEW_ITEM.to_string()),
        })
        .export(ExportSettings {
            enabled: true,
            fields: to_strings(&["name", "status", "created_at"]),
            headers: to_strings(&["Nombre", "Estado", "Creado"]),
            formats: ExportFormat::ALL.to_vec(),
            filename_base: "crud_example_items".to_string(),
            title: "CRUD Example · Items".to_string(),
        })
        .labels(ModalLabels {
            create_title: "Nuevo Item".to_string(),
            edit_title: "Editar Item #{pk}".to_string(),
            delete_title: "Eliminar Item #{pk}".to_string(),
            create_submit: "Crear".to_string(),
            edit_submit: "Guardar".to_string(),
            delete_confirm: "Eliminar".to_string(),
        })
        .row_urls(|item: &Item| ActionUrls {
            detail: None,
            edit: Some(format!("/items/{}/edit/", item.id)),
            delete: Some(format!("/items/{}/delete/", item.id)),
        })
}

// ── Dashboard services ────────────────────────────────────────────────

/// One row of the dashboard's demo service table. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRow {
    pub id: i64,
    pub name: &'static str,
    /// `ok`, `warn` or `down`
    pub status: &'static str,
    pub updated: &'static str,
    pub owner: &'static str,
}

impl ServiceRow {
    pub fn status_label(&self) -> &'static str {
        match self.status {
            "ok" => "OK",
            "warn" => "Warning",
            "down" => "Down",
            other => other,
        }
    }
}

impl Record for ServiceRow {
    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "name" => self.name.into(),
            "status" => self.status.into(),
            "updated" => self.updated.into(),
            "owner" => self.owner.into(),
            _ => FieldValue::Null,
        }
    }
}

const SERVICES: [(&str, &str, &str, &str); 12] = [
    ("API Billing", "ok", "hace 2m", "System"),
    ("Jobs Scheduler", "warn", "hace 12m", "Ops"),
    ("Payments", "ok", "hace 5m", "Finance"),
    ("Email Delivery", "down", "hace 1h", "Comms"),
    ("CRM Sync", "ok", "hace 9m", "Sales"),
    ("Data Warehouse", "warn", "hace 30m", "Data"),
    ("Search", "ok", "hace 3m", "Platform"),
    ("Webhooks", "ok", "hace 6m", "Platform"),
    ("SLA Monitor", "warn", "hace 17m", "Ops"),
    ("Exports", "ok", "hace 4m", "Finance"),
    ("Invoicing", "ok", "hace 11m", "Finance"),
    ("Audit Logs", "ok", "hace 8m", "Security"),
];

pub fn demo_services() -> Vec<ServiceRow> {
    SERVICES
        .iter()
        .zip(1..)
        .map(|(&(name, status, updated, owner), id)| ServiceRow {
            id,
            name,
            status,
            updated,
            owner,
        })
        .collect()
}

pub fn services_listing() -> ListingConfig<ServiceRow> {
    ListingConfig::new(DASHBOARD)
        .title("Servicios")
        .entity("Servicio", "Servicios")
        .page_size(5)
        .search(&["name"])
        .column(ColumnDef::new("name", "Servicio", CellFormat::plain("name")).nowrap())
        .column(ColumnDef::computed("status", "Estado", |s: &ServiceRow| {
            Ok(s.status_label().to_string())
        }))
        .column(ColumnDef::new("updated", "Actualizado", CellFormat::plain("updated")).unsortable())
        .column(ColumnDef::new("owner", "Responsable", CellFormat::plain("owner")))
        .filter(FilterDef::status("status"))
        .status_options(&[("all", "Todos"), ("ok", "OK"), ("warn", "Warning"), ("down", "Down")])
        .default_sort("name", SortDir::Asc)
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
