//! Export of a filtered (unpaginated) view as CSV, XLSX or PDF.
//!
//! Exports are authorized up front through [`ExportPlan::authorize`], before
//! any records are loaded. CSV output is produced row by row through
//! [`CsvStream`]; XLSX and PDF documents are built in memory and are meant
//! for bounded exports.

use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::error::{KitError, KitResult};
use crate::registry::{ListingConfig, Record};
use crate::rows::PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Csv, Self::Xlsx, Self::Pdf];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// An authorized export: format plus the resolved field and header lists.
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub format: ExportFormat,
    pub fields: Vec<String>,
    pub headers: Vec<String>,
    pub filename_base: String,
    pub title: String,
}

impl ExportPlan {
    /// Check that `format` may be exported from `listing` by a caller whose
    /// export permission is `can_export`.
    ///
    /// When the listing declares no export fields, its columns are used.
    pub fn authorize<R>(
        listing: &ListingConfig<R>,
        format: ExportFormat,
        can_export: bool,
    ) -> KitResult<Self> {
        if !can_export {
            return Err(KitError::Forbidden);
        }
        if !listing.export.enabled {
            return Err(KitError::ExportDisabled);
        }
        if !listing.export.formats.contains(&format) {
            return Err(KitError::FormatNotSupported {
                format: format.extension().to_string(),
            });
        }

        let (fields, headers) = if listing.export.fields.is_empty() {
            listing
                .columns
                .iter()
                .map(|c| (c.key.clone(), c.label.clone()))
                .unzip()
        } else {
            (listing.export.fields.clone(), listing.export.headers.clone())
        };

        Ok(Self {
            format,
            fields,
            headers,
            filename_base: listing.export.filename_base.clone(),
            title: listing.export.title.clone(),
        })
    }

    pub fn filename(&self) -> String {
        format!("{}.{}", self.filename_base, self.format.extension())
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename())
    }

    /// Stream `records` as CSV in the order given by `positions` (indices
    /// into `records`, as produced by [`view_positions`]). The records are
    /// shared, never copied.
    ///
    /// [`view_positions`]: crate::query::view_positions
    pub fn csv_stream<R: Record>(
        &self,
        listing: Arc<ListingConfig<R>>,
        records: Arc<Vec<R>>,
        positions: Vec<usize>,
    ) -> CsvStream<R> {
        CsvStream {
            listing,
            fields: self.fields.clone(),
            header: Some(self.headers.clone()),
            records,
            positions: positions.into_iter(),
        }
    }

    /// Build the whole document in memory.
    pub fn render<R: Record>(
        &self,
        listing: &ListingConfig<R>,
        records: &[&R],
    ) -> KitResult<ExportFile> {
        let bytes = match self.format {
            ExportFormat::Csv => {
                let mut buf = Vec::new();
                write_csv(self, listing, records.iter().copied(), &mut buf)?;
                buf
            }
            ExportFormat::Xlsx => build_xlsx(self, listing, records)?,
            ExportFormat::Pdf => build_pdf(self, listing, records)?,
        };
        Ok(ExportFile {
            filename: self.filename(),
            content_type: self.format.content_type(),
            bytes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Value of one export field, rendered the way the listing shows it on
/// screen: through the column with the same key when there is one, through
/// the default field presentation otherwise.
pub fn export_value<R: Record>(listing: &ListingConfig<R>, record: &R, field: &str) -> String {
    match listing.column_by_key(field) {
        Some(column) => column.display_value(record).unwrap_or_else(|e| {
            tracing::warn!(listing = %listing.slug, field, error = %e, "export value failed");
            PLACEHOLDER.to_string()
        }),
        None => record.field(field).display(),
    }
}

// ── CSV ───────────────────────────────────────────────────────────────

/// Lazily encoded CSV: the header line first, then one chunk per record.
pub struct CsvStream<R> {
    listing: Arc<ListingConfig<R>>,
    fields: Vec<String>,
    header: Option<Vec<String>>,
    records: Arc<Vec<R>>,
    positions: std::vec::IntoIter<usize>,
}

impl<R: Record> Iterator for CsvStream<R> {
    type Item = KitResult<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(header) = self.header.take() {
            return Some(encode_csv_line(&header));
        }
        let record = loop {
            let position = self.positions.next()?;
            if let Some(record) = self.records.get(position) {
                break record;
            }
        };
        let values: Vec<String> = self
            .fields
            .iter()
            .map(|f| export_value(&self.listing, record, f))
            .collect();
        Some(encode_csv_line(&values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let extra = usize::from(self.header.is_some());
        // Out-of-range positions are skipped, so only the header is certain.
        let (_, high) = self.positions.size_hint();
        (extra, high.map(|h| h + extra))
    }
}

fn encode_csv_line(values: &[String]) -> KitResult<Bytes> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(values)?;
    let buf = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
    Ok(Bytes::from(buf))
}

/// Write a CSV export to any writer. Returns the number of data rows.
pub fn write_csv<'r, R, I, W>(
    plan: &ExportPlan,
    listing: &ListingConfig<R>,
    records: I,
    out: W,
) -> KitResult<usize>
where
    R: Record + 'r,
    I: IntoIterator<Item = &'r R>,
    W: Write,
{
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&plan.headers)?;
    let mut rows = 0;
    for record in records {
        let values: Vec<String> = plan
            .fields
            .iter()
            .map(|f| export_value(listing, record, f))
            .collect();
        writer.write_record(&values)?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

// ── XLSX ──────────────────────────────────────────────────────────────

const XLSX_COLUMN_WIDTH: f64 = 22.0;

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(31)
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

pub fn build_xlsx<R: Record>(
    plan: &ExportPlan,
    listing: &ListingConfig<R>,
    records: &[&R],
) -> KitResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(&plan.title))?;

    for (col, header) in plan.headers.iter().enumerate() {
        let col = column_number(col)?;
        worksheet.write_string_with_format(0, col, header.as_str(), &header_format)?;
        worksheet.set_column_width(col, XLSX_COLUMN_WIDTH)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| KitError::InvalidConfig("too many rows for a worksheet".into()))?;
        for (col, field) in plan.fields.iter().enumerate() {
            let value = export_value(listing, *record, field);
            worksheet.write_string(row, column_number(col)?, value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_number(col: usize) -> KitResult<u16> {
    u16::try_from(col).map_err(|_| KitError::InvalidConfig("too many export columns".into()))
}

// ── PDF ───────────────────────────────────────────────────────────────

// A4 landscape, in millimetres.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 6.0;
const TITLE_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 9.0;
const LAYER_NAME: &str = "table";

struct PdfFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(e: impl std::fmt::Debug) -> KitError {
    KitError::Pdf(format!("{e:?}"))
}

/// Clip a cell so it stays inside its column (Helvetica averages roughly
/// 0.5 em per glyph).
fn fit_cell(value: &str, column_width: f32) -> String {
    let max_chars = ((column_width / (BODY_SIZE * 0.3528 * 0.5)) as usize).max(4);
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut clipped: String = value.chars().take(max_chars - 3).collect();
        clipped.push_str("...");
        clipped
    }
}

fn draw_row(
    layer: &PdfLayerReference,
    values: &[String],
    y: f32,
    column_width: f32,
    font: &IndirectFontRef,
) {
    for (i, value) in values.iter().enumerate() {
        let x = MARGIN + column_width * i as f32;
        layer.use_text(fit_cell(value, column_width), BODY_SIZE, Mm(x), Mm(y), font);
    }
}

pub fn build_pdf<R: Record>(
    plan: &ExportPlan,
    listing: &ListingConfig<R>,
    records: &[&R],
) -> KitResult<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        plan.title.clone(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER_NAME,
    );
    let fonts = PdfFonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / plan.headers.len().max(1) as f32;
    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    layer.use_text(plan.title.clone(), TITLE_SIZE, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= LINE_HEIGHT * 2.0;
    draw_row(&layer, &plan.headers, y, column_width, &fonts.bold);
    y -= LINE_HEIGHT;

    for record in records {
        if y < MARGIN {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - MARGIN;
            draw_row(&layer, &plan.headers, y, column_width, &fonts.bold);
            y -= LINE_HEIGHT;
        }
        let values: Vec<String> = plan
            .fields
            .iter()
            .map(|f| export_value(listing, *record, f))
            .collect();
        draw_row(&layer, &values, y, column_width, &fonts.regular);
        y -= LINE_HEIGHT;
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamSet;
    use crate::query::build_view;
    use crate::registry::FilterContext;
    use crate::testing::{Person, people, people_listing};
    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

    fn plan(format: ExportFormat) -> ExportPlan {
        ExportPlan::authorize(&people_listing(), format, true).unwrap()
    }

    #[test]
    fn test_format_parse_and_metadata() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse(" pdf "), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("json"), None);
        assert_eq!(ExportFormat::Xlsx.extension(), "xlsx");
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
    }

    #[test]
    fn test_authorize_checks_permission_first() {
        let listing = people_listing();
        let err = ExportPlan::authorize(&listing, ExportFormat::Pdf, false).unwrap_err();
        assert!(matches!(err, KitError::Forbidden));
    }

    #[test]
    fn test_authorize_rejects_disabled_format() {
        let listing = people_listing();
        let err = ExportPlan::authorize(&listing, ExportFormat::Pdf, true).unwrap_err();
        assert!(matches!(err, KitError::FormatNotSupported { ref format } if format == "pdf"));
    }

    #[test]
    fn test_authorize_rejects_disabled_export() {
        let mut listing = people_listing();
        listing.export.enabled = false;
        let err = ExportPlan::authorize(&listing, ExportFormat::Csv, true).unwrap_err();
        assert!(matches!(err, KitError::ExportDisabled));
    }

    #[test]
    fn test_authorize_falls_back_to_columns() {
        let mut listing = people_listing();
        listing.export.fields.clear();
        listing.export.headers.clear();
        let plan = ExportPlan::authorize(&listing, ExportFormat::Csv, true).unwrap();
        assert_eq!(plan.fields.len(), listing.columns.len());
        assert_eq!(plan.headers[0], "Nombre");
    }

    #[test]
    fn test_filename_embeds_base() {
        let plan = plan(ExportFormat::Xlsx);
        assert_eq!(plan.filename(), "people.xlsx");
        assert_eq!(
            plan.content_disposition(),
            "attachment; filename=\"people.xlsx\""
        );
    }

    #[test]
    fn test_csv_stream_matches_screen_presentation() {
        let listing = Arc::new(people_listing());
        let records = Arc::new(people());
        let positions = (0..records.len()).collect();
        let chunks: Vec<Bytes> = plan(ExportFormat::Csv)
            .csv_stream(listing, records.clone(), positions)
            .collect::<KitResult<_>>()
            .unwrap();
        assert_eq!(chunks.len(), records.len() + 1);

        let body: Vec<u8> = chunks.concat();
        let mut reader = csv::Reader::from_reader(body.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Nombre", "Email", "Activo", "Alta"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][0], "ana");
        assert_eq!(&rows[0][2], "Activo");
        assert_eq!(&rows[0][3], "2024-01-10");
        assert_eq!(&rows[2][2], "Inactivo");
    }

    #[test]
    fn test_csv_stream_follows_positions() {
        let listing = Arc::new(people_listing());
        let records = Arc::new(people());
        let chunks: Vec<Bytes> = plan(ExportFormat::Csv)
            .csv_stream(listing, records, vec![2, 0, 99])
            .collect::<KitResult<_>>()
            .unwrap();
        // Header plus two rows; an out-of-range position is skipped.
        assert_eq!(chunks.len(), 3);
        assert!(chunks[1].starts_with(b"carla,"));
        assert!(chunks[2].starts_with(b"ana,"));
    }

    #[test]
    fn test_csv_quotes_separators() {
        let mut records = people();
        records[0].name = "Pérez, \"Ana\"".to_string();
        let listing = people_listing();
        let mut out = Vec::new();
        let refs: Vec<&Person> = records.iter().collect();
        let rows = write_csv(&plan(ExportFormat::Csv), &listing, refs, &mut out).unwrap();
        assert_eq!(rows, records.len());
        let mut reader = csv::Reader::from_reader(out.as_slice());
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(&first[0], "Pérez, \"Ana\"");
    }

    #[test]
    fn test_export_uses_filtered_view() {
        let listing = people_listing();
        let records = people();
        let params = ParamSet::from_query_str("status=inactive&sort=name");
        let view = build_view(&records, &listing, &FilterContext::new(&params));
        let file = plan(ExportFormat::Csv).render(&listing, &view).unwrap();
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("carla"));
        assert!(!text.contains("ana@x.io"));
    }

    #[test]
    fn test_xlsx_has_header_and_rows() {
        let listing = people_listing();
        let records = people();
        let refs: Vec<&Person> = records.iter().collect();
        let bytes = build_xlsx(&plan(ExportFormat::Xlsx), &listing, &refs).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(std::io::Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Personas").unwrap();
        assert_eq!(range.get_size(), (records.len() + 1, 4));
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Nombre".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::String("Activo".into())));
    }

    #[test]
    fn test_pdf_is_a_pdf_document() {
        let mut listing = people_listing();
        listing.export.formats.push(ExportFormat::Pdf);
        let plan = ExportPlan::authorize(&listing, ExportFormat::Pdf, true).unwrap();
        let records: Vec<Person> = (0..200).flat_map(|_| people()).collect();
        let refs: Vec<&Person> = records.iter().collect();
        let file = plan.render(&listing, &refs).unwrap();
        assert!(file.bytes.starts_with(b"%PDF"));
        assert_eq!(file.filename, "people.pdf");
    }

    #[test]
    fn test_sheet_name_is_sanitized() {
        assert_eq!(sheet_name("Usuarios"), "Usuarios");
        assert_eq!(sheet_name("a/b:c"), "abc");
        assert_eq!(sheet_name("???"), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_fit_cell_clips_long_values() {
        let clipped = fit_cell(&"y".repeat(500), 40.0);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() < 500);
        assert_eq!(fit_cell("short", 40.0), "short");
    }
}
