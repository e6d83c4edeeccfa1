//! Listing kit: the storage-agnostic core behind every admin listing.
//!
//! ```text
//! raw query ──> params::ParamSet ──> query::build_view ──> paginate::paginate ──> rows::project_rows
//!                                             │
//!                                             └──> export::ExportPlan (CSV stream / XLSX / PDF)
//! ```
//!
//! Listings are described once with [`ListingConfig`]; every stage reads it
//! and none mutates it.

pub mod error;
pub mod export;
pub mod paginate;
pub mod params;
pub mod query;
pub mod registry;
pub mod rows;

pub use error::{KitError, KitResult};
pub use export::{CsvStream, ExportFile, ExportFormat, ExportPlan};
pub use paginate::{Page, PageLink, paginate};
pub use params::{ParamSet, SortDir};
pub use query::{ResolvedSort, build_view, resolve_sort, view_positions};
pub use registry::{
    CellFormat, CellRenderer, CellStyle, ColumnDef, ExportSettings, FieldValue, FilterContext,
    FilterDef, FilterParam, ListingConfig, ModalLabels, Permissions, Record, RecordFilter,
};
pub use rows::{ActionUrls, ColumnHeader, ProjectedRow, column_headers, project_rows};
