//! Page slicing and the numbered pagination-bar window.

use serde::Serialize;

/// One page of a filtered, ordered view.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number, always within `1..=max(total_pages, 1)`.
    pub number: u32,
    pub total_pages: u32,
    pub total_count: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Entry of a pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum PageLink {
    Number(u32),
    Gap,
}

/// Slice `view` into the requested page.
///
/// Requests past either end are clamped to the first or last page. A page
/// size of zero is treated as one.
pub fn paginate<T>(view: Vec<T>, page_size: usize, requested: u32) -> Page<T> {
    let page_size = page_size.max(1);
    let total_count = view.len();
    let total_pages = u32::try_from(total_count.div_ceil(page_size)).unwrap_or(u32::MAX);
    let number = requested.clamp(1, total_pages.max(1));
    let start = (number as usize - 1) * page_size;
    let items: Vec<T> = view.into_iter().skip(start).take(page_size).collect();

    Page {
        items,
        number,
        total_pages,
        total_count,
        page_size,
        has_next: number < total_pages,
        has_previous: number > 1,
    }
}

impl<T> Page<T> {
    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous.then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page, 0 when empty.
    pub fn start_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.number as usize - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on this page, 0 when empty.
    pub fn end_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.start_index() + self.items.len() - 1
        }
    }

    /// Page numbers around the current page with both ends kept and
    /// `Gap` markers where numbers were elided.
    pub fn page_window(&self, on_each_side: u32, on_ends: u32) -> Vec<PageLink> {
        let total = self.total_pages;
        if total == 0 {
            return Vec::new();
        }
        if total <= (on_each_side + on_ends) * 2 + 1 {
            return (1..=total).map(PageLink::Number).collect();
        }

        let mut links = Vec::new();
        let window_start = self.number.saturating_sub(on_each_side).max(1);
        let window_end = (self.number + on_each_side).min(total);

        if window_start > on_ends + 1 {
            links.extend((1..=on_ends).map(PageLink::Number));
            links.push(PageLink::Gap);
        } else {
            links.extend((1..window_start).map(PageLink::Number));
        }

        links.extend((window_start..=window_end).map(PageLink::Number));

        if window_end + on_ends < total {
            links.push(PageLink::Gap);
            links.extend((total - on_ends + 1..=total).map(PageLink::Number));
        } else {
            links.extend((window_end + 1..=total).map(PageLink::Number));
        }
        links
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            page_size: self.page_size,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
