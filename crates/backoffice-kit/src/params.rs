//! Request parameter normalization.
//!
//! Every listing request carries the same small set of query parameters
//! (`q`, `status`, `sort`, `dir`, `page`, `from`, `to`). [`ParamSet`] turns
//! whatever the client sent into a canonical record. Malformed input never
//! fails: each field degrades to its default instead.

use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Status values that mean "do not filter by status".
const STATUS_ANY: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Exact, case-sensitive match on `asc`/`desc`; anything else is `Asc`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn is_desc(&self) -> bool {
        matches!(self, Self::Desc)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSet {
    pub query: String,
    /// Empty means no status filter (`all` is folded into empty).
    pub status: String,
    pub sort: String,
    pub dir: SortDir,
    pub page: u32,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            query: String::new(),
            status: String::new(),
            sort: String::new(),
            dir: SortDir::Asc,
            page: 1,
            date_from: None,
            date_to: None,
        }
    }
}

impl ParamSet {
    /// Build from raw key/value pairs. For a repeated key the last value wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "q" => params.query = value.to_string(),
                "status" => params.status = normalize_status(value),
                "sort" => params.sort = value.to_string(),
                "dir" => params.dir = SortDir::parse(value),
                "page" => params.page = parse_page(value),
                "from" => params.date_from = parse_date(value),
                "to" => params.date_to = parse_date(value),
                _ => {}
            }
        }
        params
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
            Ok(pairs) => Self::from_pairs(pairs),
            Err(e) => {
                tracing::debug!(error = %e, "undecodable query string, using defaults");
                Self::default()
            }
        }
    }

    /// Parse the query component of a page URL (absolute or path-only).
    ///
    /// Returns `None` when the URL is empty or carries no query, so callers
    /// can fall back to another source.
    pub fn from_url(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = Url::parse("http://localhost/").ok()?;
                base.join(raw).ok()?
            }
            Err(_) => return None,
        };
        match url.query() {
            Some(q) if !q.is_empty() => Some(Self::from_pairs(url.query_pairs())),
            _ => None,
        }
    }

    /// Pick the freshest parameter source.
    ///
    /// The originating page URL reflects what the client currently shows
    /// after partial updates, so it wins over the request's own query string.
    pub fn resolve(current_url: Option<&str>, query: &str) -> Self {
        current_url
            .and_then(Self::from_url)
            .unwrap_or_else(|| Self::from_query_str(query))
    }

    pub fn has_status_filter(&self) -> bool {
        !self.status.is_empty()
    }

    pub fn has_date_range(&self) -> bool {
        self.date_from.is_some() || self.date_to.is_some()
    }

    pub fn has_filters(&self) -> bool {
        !self.query.is_empty() || self.has_status_filter() || self.has_date_range()
    }

    /// Same parameters pointing at another page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Same filters, sorted by `key` in `dir`, back on the first page.
    pub fn with_sort(&self, key: &str, dir: SortDir) -> Self {
        Self {
            sort: key.to_string(),
            dir,
            page: 1,
            ..self.clone()
        }
    }

    pub fn to_query_string(&self) -> String {
        self.encode(true)
    }

    /// Query string used to build pagination links (the page is appended by
    /// the link itself).
    pub fn to_query_string_without_page(&self) -> String {
        self.encode(false)
    }

    fn encode(&self, with_page: bool) -> String {
        let page = self.page.to_string();
        let from = self.date_from.map(|d| d.format(DATE_FORMAT).to_string());
        let to = self.date_to.map(|d| d.format(DATE_FORMAT).to_string());

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if !self.query.is_empty() {
            pairs.push(("q", &self.query));
        }
        if self.has_status_filter() {
            pairs.push(("status", &self.status));
        }
        if !self.sort.is_empty() {
            pairs.push(("sort", &self.sort));
        }
        if !self.sort.is_empty() || self.dir.is_desc() {
            pairs.push(("dir", self.dir.as_str()));
        }
        if with_page && self.page > 1 {
            pairs.push(("page", &page));
        }
        if let Some(from) = from.as_deref() {
            pairs.push(("from", from));
        }
        if let Some(to) = to.as_deref() {
            pairs.push(("to", to));
        }
        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }
}

fn normalize_status(value: &str) -> String {
    if value == STATUS_ANY {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_page(value: &str) -> u32 {
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
