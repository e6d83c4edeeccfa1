//! Offline export command: `backoffice export <listing> <format>`.
//!
//! Runs the same filter and sort pipeline as the web listing, without
//! pagination, and writes the document to a file or stdout. The operator
//! running the CLI is trusted, so no permission check applies; listings with
//! export disabled still refuse.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use backoffice::admin::db::BackofficeDb;
use backoffice::admin::listings::{self, Listings, demo_services};
use backoffice::config::BackofficeToml;
use backoffice_kit::{
    ExportFormat, ExportPlan, FilterContext, ListingConfig, ParamSet, Record, build_view,
    export::write_csv,
};

pub struct ExportOptions {
    pub listing: String,
    pub format: String,
    pub query: Option<String>,
    pub output: Option<PathBuf>,
}

pub fn cmd_export(settings: &BackofficeToml, options: ExportOptions) -> Result<()> {
    let format = ExportFormat::parse(&options.format).ok_or_else(|| {
        anyhow!(
            "Unknown export format '{}' (valid: csv, xlsx, pdf)",
            options.format
        )
    })?;
    let params = ParamSet::from_query_str(options.query.as_deref().unwrap_or_default());
    let listings = Listings::build(settings)?;

    let output = options.output.as_deref();
    let rows = match options.listing.trim() {
        listings::USERS => {
            let db = open_db(settings)?;
            let users = db.list_users()?;
            export_listing(&listings.users, &users, format, &params, || open_output(output))?
        }
        listings::ITEMS => {
            let db = open_db(settings)?;
            let items = db.list_items()?;
            export_listing(&listings.items, &items, format, &params, || open_output(output))?
        }
        listings::DASHBOARD => export_listing(
            &listings.services,
            &demo_services(),
            format,
            &params,
            || open_output(output),
        )?,
        other => {
            return Err(anyhow!(
                "Unknown listing '{}' (known: {}, {}, {})",
                other,
                listings::USERS,
                listings::ITEMS,
                listings::DASHBOARD
            ));
        }
    };

    tracing::info!(listing = %options.listing, %format, rows, "export written");
    if let Some(path) = &options.output {
        println!("Exported {} rows to {}", rows, path.display());
    }
    Ok(())
}

fn open_db(settings: &BackofficeToml) -> Result<BackofficeDb> {
    let path = &settings.database.path;
    if !path.exists() {
        return Err(anyhow!(
            "Database {} not found. Run 'backoffice init' first.",
            path.display()
        ));
    }
    BackofficeDb::new(path)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(std::io::stdout().lock()),
    })
}

/// Write `records` filtered and ordered by `params`. Returns the row count.
///
/// `open` is only called once the export is authorized, so a refused or
/// failed export never leaves an empty output file behind.
fn export_listing<R: Record, W: Write>(
    listing: &ListingConfig<R>,
    records: &[R],
    format: ExportFormat,
    params: &ParamSet,
    open: impl FnOnce() -> Result<W>,
) -> Result<usize> {
    let plan = ExportPlan::authorize(listing, format, true)?;
    let view = build_view(records, listing, &FilterContext::new(params));

    let rows = if format == ExportFormat::Csv {
        let mut out = open()?;
        let rows = write_csv(&plan, listing, view, &mut out)?;
        out.flush().context("Failed to flush export output")?;
        rows
    } else {
        let file = plan.render(listing, &view)?;
        let mut out = open()?;
        out.write_all(&file.bytes)
            .context("Failed to write export output")?;
        out.flush().context("Failed to flush export output")?;
        view.len()
    };
    Ok(rows)
}
