//! Pagination utilities for service layer
//!
//! Query values arrive as raw strings and are coerced rather than rejected:
//! a missing, non-numeric or zero value falls back to the default, a negative
//! one to the minimum of 1.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub per_page: u64,
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, per_page: DEFAULT_PER_PAGE } }
}

impl Pagination {
    /// Build from raw `page` / `per_page` query values.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: coerce(page, DEFAULT_PAGE),
            per_page: coerce(per_page, DEFAULT_PER_PAGE),
        }
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page.max(1)).max(1)
    }
}

/// Sort direction for id-ordered listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// `asc` (any case) selects ascending; anything else, including nothing, is descending.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// One page of results plus the numbers needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Slice `items` according to `p`. Pages past the end are empty, not an error.
pub fn paginate<T>(items: Vec<T>, p: Pagination) -> Page<T> {
    let total = items.len() as u64;
    let start = usize::try_from(p.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(p.per_page).unwrap_or(usize::MAX);
    let data = items.into_iter().skip(start).take(take).collect();
    Page { data, page: p.page, per_page: p.per_page, total, total_pages: p.total_pages(total) }
}

/// Leading-integer parse (`"12abc"` → 12, `" -3"` → -3, `"abc"` → none).
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    // only digits remain, so the sole failure is overflow
    Some(digits[..end].parse::<i64>().unwrap_or(i64::MAX) * sign)
}

fn coerce(raw: Option<&str>, default: u64) -> u64 {
    match raw.and_then(leading_int) {
        None | Some(0) => default,
        Some(n) if n < 0 => 1,
        Some(n) => n.unsigned_abs(),
    }
}
