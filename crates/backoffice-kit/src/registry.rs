//! Declarative listing configuration.
//!
//! A [`ListingConfig`] describes one listing (users, items, ...): which
//! columns it shows, how each cell is rendered, which filters exist, how it
//! sorts by default and what it may export. Configurations are built once at
//! startup and only read afterwards, so they can be shared freely between
//! concurrent requests.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{KitError, KitResult};
use crate::export::ExportFormat;
use crate::params::{DATE_FORMAT, ParamSet, SortDir};
use crate::rows::ActionUrls;

pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
pub const ACTIVE_LABEL: &str = "Activo";
pub const INACTIVE_LABEL: &str = "Inactivo";

// ── Field values ──────────────────────────────────────────────────────

/// A single field read from a record, comparable across records.
///
/// Variants order before their contents, so `Null` always sorts first and
/// mixed-type columns still have a total order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Default on-screen presentation of a raw value.
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(true) => ACTIVE_LABEL.to_string(),
            Self::Bool(false) => INACTIVE_LABEL.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Text used for free-text search matching.
    pub fn search_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            other => Some(other.display()),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Anything a listing can display.
pub trait Record {
    /// Unique identifier, used as the final sort tie-break.
    fn id(&self) -> i64;

    /// Read a field by name. Unknown names yield [`FieldValue::Null`].
    fn field(&self, name: &str) -> FieldValue;
}

// ── Cell rendering ────────────────────────────────────────────────────

pub trait CellRenderer<R>: Send + Sync {
    fn display_value(&self, record: &R) -> KitResult<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Plain,
    /// `-` when the value is empty.
    DashIfEmpty,
    /// `Activo`/`Inactivo` for boolean fields.
    ActiveInactive,
    /// `YYYY-MM-DD` for date and datetime fields.
    DateOnly,
    /// `YYYY-MM-DD HH:MM` for datetime fields.
    DateTime,
}

/// Renders one record field with a fixed presentation style.
#[derive(Debug, Clone)]
pub struct CellFormat {
    pub field: String,
    pub style: CellStyle,
}

impl CellFormat {
    pub fn new(field: impl Into<String>, style: CellStyle) -> Self {
        Self {
            field: field.into(),
            style,
        }
    }

    pub fn plain(field: impl Into<String>) -> Self {
        Self::new(field, CellStyle::Plain)
    }

    pub fn dash_if_empty(field: impl Into<String>) -> Self {
        Self::new(field, CellStyle::DashIfEmpty)
    }

    pub fn active_inactive(field: impl Into<String>) -> Self {
        Self::new(field, CellStyle::ActiveInactive)
    }

    pub fn date(field: impl Into<String>) -> Self {
        Self::new(field, CellStyle::DateOnly)
    }

    pub fn datetime(field: impl Into<String>) -> Self {
        Self::new(field, CellStyle::DateTime)
    }

    fn mismatch(&self, expected: &str, got: &FieldValue) -> KitError {
        KitError::Display {
            column: self.field.clone(),
            message: format!("expected {expected}, got {got:?}"),
        }
    }
}

impl<R: Record> CellRenderer<R> for CellFormat {
    fn display_value(&self, record: &R) -> KitResult<String> {
        let value = record.field(&self.field);
        match self.style {
            CellStyle::Plain => Ok(value.display()),
            CellStyle::DashIfEmpty if value.is_empty() => Ok("-".to_string()),
            CellStyle::DashIfEmpty => Ok(value.display()),
            CellStyle::ActiveInactive => match value {
                FieldValue::Bool(_) => Ok(value.display()),
                other => Err(self.mismatch("a boolean", &other)),
            },
            CellStyle::DateOnly => value
                .as_date()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .ok_or_else(|| self.mismatch("a date", &value)),
            CellStyle::DateTime => match value {
                FieldValue::DateTime(dt) => Ok(dt.format(DATETIME_FORMAT).to_string()),
                other => Err(self.mismatch("a datetime", &other)),
            },
        }
    }
}

/// Renders a cell with an arbitrary function.
pub struct FnRenderer<F>(pub F);

impl<R, F> CellRenderer<R> for FnRenderer<F>
where
    F: Fn(&R) -> KitResult<String> + Send + Sync,
{
    fn display_value(&self, record: &R) -> KitResult<String> {
        (self.0)(record)
    }
}

pub struct ColumnDef<R> {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub nowrap: bool,
    /// Underlying fields the column sorts by, in priority order.
    pub sort_fields: Vec<String>,
    renderer: Box<dyn CellRenderer<R>>,
}

impl<R> ColumnDef<R> {
    /// A sortable column that sorts by the field named like its key.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        renderer: impl CellRenderer<R> + 'static,
    ) -> Self {
        let key = key.into();
        Self {
            sort_fields: vec![key.clone()],
            key,
            label: label.into(),
            sortable: true,
            nowrap: false,
            renderer: Box::new(renderer),
        }
    }

    pub fn computed<F>(key: impl Into<String>, label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&R) -> KitResult<String> + Send + Sync + 'static,
        R: 'static,
    {
        Self::new(key, label, FnRenderer(f))
    }

    pub fn sort_by(mut self, fields: &[&str]) -> Self {
        self.sort_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn nowrap(mut self) -> Self {
        self.nowrap = true;
        self
    }

    pub fn display_value(&self, record: &R) -> KitResult<String> {
        self.renderer.display_value(record)
    }
}

impl<R> std::fmt::Debug for ColumnDef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("sort_fields", &self.sort_fields)
            .finish_non_exhaustive()
    }
}

// ── Filters ───────────────────────────────────────────────────────────

/// Request-scoped information available to filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    pub params: &'a ParamSet,
    /// Id of the user performing the request, when known.
    pub principal_id: Option<i64>,
}

impl<'a> FilterContext<'a> {
    pub fn new(params: &'a ParamSet) -> Self {
        Self {
            params,
            principal_id: None,
        }
    }

    pub fn with_principal(mut self, principal_id: Option<i64>) -> Self {
        self.principal_id = principal_id;
        self
    }
}

pub trait RecordFilter<R>: Send + Sync {
    fn apply<'r>(&self, records: Vec<&'r R>, value: &str, ctx: &FilterContext<'_>) -> Vec<&'r R>;
}

/// Keeps records whose field equals the filter value exactly.
#[derive(Debug, Clone)]
pub struct ExactMatch {
    pub field: String,
}

impl ExactMatch {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl<R: Record> RecordFilter<R> for ExactMatch {
    fn apply<'r>(&self, records: Vec<&'r R>, value: &str, _ctx: &FilterContext<'_>) -> Vec<&'r R> {
        records
            .into_iter()
            .filter(|r| match r.field(&self.field) {
                FieldValue::Text(s) => s == value,
                FieldValue::Int(n) => n.to_string() == value,
                FieldValue::Bool(b) => {
                    matches!((b, value), (true, "true" | "1") | (false, "false" | "0"))
                }
                _ => false,
            })
            .collect()
    }
}

/// Keeps records whose date field lies within `from..=to` (either bound
/// optional), read from the request parameters.
#[derive(Debug, Clone)]
pub struct DateRange {
    pub field: String,
}

impl DateRange {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl<R: Record> RecordFilter<R> for DateRange {
    fn apply<'r>(&self, records: Vec<&'r R>, _value: &str, ctx: &FilterContext<'_>) -> Vec<&'r R> {
        let (from, to) = (ctx.params.date_from, ctx.params.date_to);
        records
            .into_iter()
            .filter(|r| match r.field(&self.field).as_date() {
                Some(date) => from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t),
                None => false,
            })
            .collect()
    }
}

pub struct FnFilter<F>(pub F);

impl<R, F> RecordFilter<R> for FnFilter<F>
where
    F: for<'r> Fn(Vec<&'r R>, &str, &FilterContext<'_>) -> Vec<&'r R> + Send + Sync,
{
    fn apply<'r>(&self, records: Vec<&'r R>, value: &str, ctx: &FilterContext<'_>) -> Vec<&'r R> {
        (self.0)(records, value, ctx)
    }
}

/// Which request parameter feeds a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterParam {
    Status,
    DateRange,
}

pub struct FilterDef<R> {
    pub name: String,
    pub param: FilterParam,
    filter: Box<dyn RecordFilter<R>>,
}

impl<R> FilterDef<R> {
    pub fn new(
        name: impl Into<String>,
        param: FilterParam,
        filter: impl RecordFilter<R> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            param,
            filter: Box::new(filter),
        }
    }

    /// Exact-match filter on `field`, driven by the `status` parameter.
    pub fn status(field: impl Into<String>) -> Self
    where
        R: Record + 'static,
    {
        Self::new("status", FilterParam::Status, ExactMatch::new(field))
    }

    /// Date range filter on `field`, driven by the `from`/`to` parameters.
    pub fn date_range(field: impl Into<String>) -> Self
    where
        R: Record + 'static,
    {
        Self::new("date_range", FilterParam::DateRange, DateRange::new(field))
    }

    pub fn apply_to<'r>(
        &self,
        records: Vec<&'r R>,
        value: &str,
        ctx: &FilterContext<'_>,
    ) -> Vec<&'r R> {
        self.filter.apply(records, value, ctx)
    }
}

impl<R> std::fmt::Debug for FilterDef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDef")
            .field("name", &self.name)
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

// ── Listing configuration ─────────────────────────────────────────────

/// Permission codenames checked before each listing action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Permissions {
    pub list: Option<String>,
    pub create: Option<String>,
    pub edit: Option<String>,
    pub delete: Option<String>,
    pub export: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub enabled: bool,
    /// Record fields (or column keys) exported, in order.
    pub fields: Vec<String>,
    /// Header labels, one per field.
    pub headers: Vec<String>,
    pub formats: Vec<ExportFormat>,
    pub filename_base: String,
    /// Sheet name for XLSX, title line for PDF.
    pub title: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            fields: Vec::new(),
            headers: Vec::new(),
            formats: vec![ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Pdf],
            filename_base: "export".to_string(),
            title: "Export".to_string(),
        }
    }
}

/// Modal titles and button labels. Titles may contain `{pk}`.
#[derive(Debug, Clone, Serialize)]
pub struct ModalLabels {
    pub create_title: String,
    pub edit_title: String,
    pub delete_title: String,
    pub create_submit: String,
    pub edit_submit: String,
    pub delete_confirm: String,
}

impl Default for ModalLabels {
    fn default() -> Self {
        Self {
            create_title: "Crear".to_string(),
            edit_title: "Editar {pk}".to_string(),
            delete_title: "Eliminar {pk}".to_string(),
            create_submit: "Crear".to_string(),
            edit_submit: "Guardar".to_string(),
            delete_confirm: "Confirmar".to_string(),
        }
    }
}

impl ModalLabels {
    pub fn edit_title_for(&self, pk: i64) -> String {
        self.edit_title.replace("{pk}", &pk.to_string())
    }

    pub fn delete_title_for(&self, pk: i64) -> String {
        self.delete_title.replace("{pk}", &pk.to_string())
    }
}

type RowUrlFn<R> = Box<dyn Fn(&R) -> ActionUrls + Send + Sync>;

pub struct ListingConfig<R> {
    pub slug: String,
    pub page_title: String,
    pub entity_label: String,
    pub entity_label_plural: String,
    pub page_size: usize,
    pub search_fields: Vec<String>,
    pub columns: Vec<ColumnDef<R>>,
    pub filters: Vec<FilterDef<R>>,
    /// `(value, label)` pairs offered in the status select.
    pub status_options: Vec<(String, String)>,
    pub default_sort_key: String,
    pub default_dir: SortDir,
    pub permissions: Permissions,
    pub export: ExportSettings,
    pub labels: ModalLabels,
    row_urls: Option<RowUrlFn<R>>,
}

impl<R> ListingConfig<R> {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            page_title: "Listado".to_string(),
            entity_label: String::new(),
            entity_label_plural: String::new(),
            page_size: 10,
            search_fields: Vec::new(),
            columns: Vec::new(),
            filters: Vec::new(),
            status_options: Vec::new(),
            default_sort_key: String::new(),
            default_dir: SortDir::Asc,
            permissions: Permissions::default(),
            export: ExportSettings::default(),
            labels: ModalLabels::default(),
            row_urls: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.page_title = title.into();
        self
    }

    pub fn entity(mut self, label: impl Into<String>, plural: impl Into<String>) -> Self {
        self.entity_label = label.into();
        self.entity_label_plural = plural.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn search(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn column(mut self, column: ColumnDef<R>) -> Self {
        self.columns.push(column);
        self
    }

    pub fn filter(mut self, filter: FilterDef<R>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn status_options(mut self, options: &[(&str, &str)]) -> Self {
        self.status_options = options
            .iter()
            .map(|(v, l)| (v.to_string(), l.to_string()))
            .collect();
        self
    }

    pub fn default_sort(mut self, key: impl Into<String>, dir: SortDir) -> Self {
        self.default_sort_key = key.into();
        self.default_dir = dir;
        self
    }

    pub fn permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn export(mut self, export: ExportSettings) -> Self {
        self.export = export;
        self
    }

    pub fn labels(mut self, labels: ModalLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn row_urls<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> ActionUrls + Send + Sync + 'static,
    {
        self.row_urls = Some(Box::new(f));
        self
    }

    /// Finish the configuration, rejecting inconsistent setups.
    pub fn build(self) -> KitResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> KitResult<()> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.key == column.key) {
                return Err(KitError::InvalidConfig(format!(
                    "{}: duplicate column key '{}'",
                    self.slug, column.key
                )));
            }
            if column.sortable && column.sort_fields.is_empty() {
                return Err(KitError::InvalidConfig(format!(
                    "{}: sortable column '{}' has no sort fields",
                    self.slug, column.key
                )));
            }
        }
        if self.sortable_column(&self.default_sort_key).is_none() {
            return Err(KitError::InvalidConfig(format!(
                "{}: default sort key '{}' is not a sortable column",
                self.slug, self.default_sort_key
            )));
        }
        if self.export.fields.len() != self.export.headers.len() {
            return Err(KitError::InvalidConfig(format!(
                "{}: {} export fields but {} headers",
                self.slug,
                self.export.fields.len(),
                self.export.headers.len()
            )));
        }
        Ok(())
    }

    pub fn column_by_key(&self, key: &str) -> Option<&ColumnDef<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn sortable_column(&self, key: &str) -> Option<&ColumnDef<R>> {
        self.column_by_key(key).filter(|c| c.sortable)
    }

    pub fn filter_for(&self, param: FilterParam) -> impl Iterator<Item = &FilterDef<R>> {
        self.filters.iter().filter(move |f| f.param == param)
    }

    pub fn action_urls(&self, record: &R) -> ActionUrls {
        self.row_urls
            .as_ref()
            .map(|f| f(record))
            .unwrap_or_default()
    }

    pub fn allows_format(&self, format: ExportFormat) -> bool {
        self.export.enabled && self.export.formats.contains(&format)
    }
}

impl<R> std::fmt::Debug for ListingConfig<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingConfig")
            .field("slug", &self.slug)
            .field("page_size", &self.page_size)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("default_sort_key", &self.default_sort_key)
            .finish_non_exhaustive()
    }
}

/// Compare two records field by field, ids breaking ties.
pub fn compare_records<R: Record>(a: &R, b: &R, fields: &[String]) -> Ordering {
    fields
        .iter()
        .map(|f| a.field(f).cmp(&b.field(f)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.id().cmp(&b.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Person, people_listing, person};

    #[test]
    fn test_field_value_display_convention() {
        assert_eq!(FieldValue::Bool(true).display(), "Activo");
        assert_eq!(FieldValue::Bool(false).display(), "Inactivo");
        assert_eq!(FieldValue::Null.display(), "");
        let dt = DateTime::parse_from_rfc3339("2024-05-06T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(FieldValue::DateTime(dt).display(), "2024-05-06 07:08");
    }

    #[test]
    fn test_null_sorts_first() {
        let mut values = vec![
            FieldValue::Text("b".into()),
            FieldValue::Null,
            FieldValue::Text("a".into()),
        ];
        values.sort();
        assert_eq!(values[0], FieldValue::Null);
        assert_eq!(values[1], FieldValue::Text("a".into()));
    }

    #[test]
    fn test_cell_format_styles() {
        let p = person(1, "ana", "", true, "2024-01-02");
        assert_eq!(CellFormat::plain("name").display_value(&p).unwrap(), "ana");
        assert_eq!(CellFormat::dash_if_empty("email").display_value(&p).unwrap(), "-");
        assert_eq!(
            CellFormat::active_inactive("active").display_value(&p).unwrap(),
            "Activo"
        );
        assert_eq!(CellFormat::date("joined").display_value(&p).unwrap(), "2024-01-02");
    }

    #[test]
    fn test_cell_format_type_mismatch_is_an_error() {
        let p = person(1, "ana", "a@x.io", true, "2024-01-02");
        let err = CellFormat::date("name").display_value(&p).unwrap_err();
        assert!(matches!(err, KitError::Display { .. }));
    }

    #[test]
    fn test_exact_match_filter() {
        let rows = vec![
            person(1, "a", "", true, "2024-01-01"),
            person(2, "b", "", false, "2024-01-01"),
        ];
        let params = ParamSet::default();
        let ctx = FilterContext::new(&params);
        let refs: Vec<&Person> = rows.iter().collect();
        let kept = ExactMatch::new("status").apply(refs, "inactive", &ctx);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn test_date_range_filter_is_inclusive() {
        let rows = vec![
            person(1, "a", "", true, "2024-01-01"),
            person(2, "b", "", true, "2024-01-15"),
            person(3, "c", "", true, "2024-02-01"),
        ];
        let params = ParamSet::from_query_str("from=2024-01-01&to=2024-01-15");
        let ctx = FilterContext::new(&params);
        let kept = DateRange::new("joined").apply(rows.iter().collect(), "", &ctx);
        let ids: Vec<i64> = kept.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_build_rejects_duplicate_keys() {
        let listing = ListingConfig::<Person>::new("dup")
            .column(ColumnDef::new("name", "Name", CellFormat::plain("name")))
            .column(ColumnDef::new("name", "Again", CellFormat::plain("name")))
            .default_sort("name", SortDir::Asc)
            .build();
        assert!(matches!(listing, Err(KitError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_rejects_unknown_default_sort() {
        let listing = ListingConfig::<Person>::new("bad")
            .column(ColumnDef::new("name", "Name", CellFormat::plain("name")))
            .default_sort("missing", SortDir::Asc)
            .build();
        assert!(matches!(listing, Err(KitError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_rejects_header_mismatch() {
        let listing = ListingConfig::<Person>::new("bad")
            .column(ColumnDef::new("name", "Name", CellFormat::plain("name")))
            .default_sort("name", SortDir::Asc)
            .export(ExportSettings {
                enabled: true,
                fields: vec!["name".into(), "email".into()],
                headers: vec!["Name".into()],
                ..ExportSettings::default()
            })
            .build();
        assert!(matches!(listing, Err(KitError::InvalidConfig(_))));
    }

    #[test]
    fn test_allows_format_requires_enabled_export() {
        let listing = people_listing();
        assert!(listing.allows_format(ExportFormat::Csv));
        assert!(!listing.allows_format(ExportFormat::Pdf));

        let mut disabled = people_listing();
        disabled.export.enabled = false;
        assert!(!disabled.allows_format(ExportFormat::Csv));
    }

    #[test]
    fn test_modal_titles_substitute_pk() {
        let labels = ModalLabels {
            edit_title: "Editar usuario {pk}".into(),
            ..ModalLabels::default()
        };
        assert_eq!(labels.edit_title_for(7), "Editar usuario 7");
    }
}
