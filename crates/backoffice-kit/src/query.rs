//! Filtering and ordering of a record collection.

use crate::params::{ParamSet, SortDir};
use crate::registry::{FilterContext, FilterParam, ListingConfig, Record, compare_records};

/// The sort actually applied for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSort {
    pub key: String,
    pub fields: Vec<String>,
    pub dir: SortDir,
}

/// Resolve the requested sort key against the listing's sortable columns.
///
/// An empty, unknown or unsortable key falls back to the listing default,
/// including its default direction.
pub fn resolve_sort<R>(params: &ParamSet, listing: &ListingConfig<R>) -> ResolvedSort {
    if let Some(column) = listing.sortable_column(&params.sort) {
        return ResolvedSort {
            key: column.key.clone(),
            fields: column.sort_fields.clone(),
            dir: params.dir,
        };
    }
    let fields = listing
        .sortable_column(&listing.default_sort_key)
        .map(|c| c.sort_fields.clone())
        .unwrap_or_default();
    ResolvedSort {
        key: listing.default_sort_key.clone(),
        fields,
        dir: listing.default_dir,
    }
}

/// Apply search, filters and ordering. The source slice is left untouched.
pub fn build_view<'r, R: Record>(
    records: &'r [R],
    listing: &ListingConfig<R>,
    ctx: &FilterContext<'_>,
) -> Vec<&'r R> {
    let params = ctx.params;
    let mut view: Vec<&R> = records.iter().collect();

    if !params.query.is_empty() && !listing.search_fields.is_empty() {
        let needle = params.query.to_lowercase();
        view.retain(|r| {
            listing.search_fields.iter().any(|f| {
                r.field(f)
                    .search_text()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        });
    }

    if params.has_status_filter() {
        for filter in listing.filter_for(FilterParam::Status) {
            view = filter.apply_to(view, &params.status, ctx);
        }
    }

    if params.has_date_range() {
        for filter in listing.filter_for(FilterParam::DateRange) {
            view = filter.apply_to(view, "", ctx);
        }
    }

    let sort = resolve_sort(params, listing);
    view.sort_by(|a, b| {
        let ord = compare_records(*a, *b, &sort.fields);
        if sort.dir.is_desc() { ord.reverse() } else { ord }
    });
    view
}

/// Indices into `records` of the rows [`build_view`] keeps, in view order.
/// Lets a caller hand out the view without borrowing `records`.
pub fn view_positions<R: Record>(
    records: &[R],
    listing: &ListingConfig<R>,
    ctx: &FilterContext<'_>,
) -> Vec<usize> {
    let base = records.as_ptr() as usize;
    let size = std::mem::size_of::<R>().max(1);
    build_view(records, listing, ctx)
        .into_iter()
        .map(|r| (r as *const R as usize - base) / size)
        .collect()
}
