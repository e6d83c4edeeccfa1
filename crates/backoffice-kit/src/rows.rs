//! Presentation rows for a page of records.

use serde::Serialize;

use crate::paginate::Page;
use crate::params::ParamSet;
use crate::query::resolve_sort;
use crate::registry::{ListingConfig, Record};

/// Shown in place of a cell whose renderer failed.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionUrls {
    pub detail: Option<String>,
    pub edit: Option<String>,
    pub delete: Option<String>,
}

impl ActionUrls {
    fn with_query(self, query: &str) -> Self {
        let append = |url: Option<String>| url.map(|u| append_query(&u, query));
        Self {
            detail: append(self.detail),
            edit: append(self.edit),
            delete: append(self.delete),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRow {
    pub id: i64,
    pub cells: Vec<String>,
    pub urls: ActionUrls,
}

/// Column header view model, including the link that sorts by it.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnHeader {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub nowrap: bool,
    /// True when the listing is currently sorted by this column.
    pub active: bool,
    /// Current direction (`asc`/`desc`) when active.
    pub dir: Option<&'static str>,
    /// Query string that sorts by this column (toggling when active).
    pub sort_query: String,
}

fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}

/// Render one record into display cells. A failing renderer only blanks its
/// own cell.
pub fn project_cells<R: Record>(record: &R, listing: &ListingConfig<R>) -> Vec<String> {
    listing
        .columns
        .iter()
        .map(|column| match column.display_value(record) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    listing = %listing.slug,
                    column = %column.key,
                    record = record.id(),
                    error = %e,
                    "cell render failed"
                );
                PLACEHOLDER.to_string()
            }
        })
        .collect()
}

/// Project a page of records into rows.
///
/// Action URLs carry the current parameters (page included) so that a
/// row-level action can bring the user back to the same view.
pub fn project_rows<R: Record>(
    page: Page<&R>,
    params: &ParamSet,
    listing: &ListingConfig<R>,
) -> Page<ProjectedRow> {
    let query = params.to_query_string();
    page.map(|record| ProjectedRow {
        id: record.id(),
        cells: project_cells(record, listing),
        urls: listing.action_urls(record).with_query(&query),
    })
}

pub fn column_headers<R>(listing: &ListingConfig<R>, params: &ParamSet) -> Vec<ColumnHeader> {
    let sort = resolve_sort(params, listing);
    listing
        .columns
        .iter()
        .map(|column| {
            let active = column.sortable && column.key == sort.key;
            let next_dir = if active { sort.dir.toggled() } else { sort.dir };
            ColumnHeader {
                key: column.key.clone(),
                label: column.label.clone(),
                sortable: column.sortable,
                nowrap: column.nowrap,
                active,
                dir: active.then(|| sort.dir.as_str()),
                sort_query: if column.sortable {
                    params.with_sort(&column.key, next_dir).to_query_string()
                } else {
                    String::new()
                },
            }
        })
        .collect()
}
