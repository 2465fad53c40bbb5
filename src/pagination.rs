//! Bounded page controls derived from a result count
use serde::Serialize;
use std::fmt;

/// Pages always shown at the start and the end of the control list.
const EDGE_PAGES: u32 = 3;

/// One entry of the pagination control list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageControl {
    Page { number: u32, is_current: bool },
    Ellipsis,
}

impl PageControl {
    pub fn page_number(&self) -> Option<u32> {
        match self {
            PageControl::Page { number, .. } => Some(*number),
            PageControl::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageControl::Page { number, .. } => write!(f, "{number}"),
            PageControl::Ellipsis => write!(f, "…"),
        }
    }
}

/// Derived pagination state; recomputed on every render, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub controls: Vec<PageControl>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub summary_text: String,
}

impl PaginationView {
    /// Nothing to render when everything fits on one page.
    pub fn is_hidden(&self) -> bool {
        self.controls.is_empty()
    }

    /// Page numbers of the controls, ellipsis excluded.
    pub fn page_numbers(&self) -> Vec<u32> {
        self.controls
            .iter()
            .filter_map(PageControl::page_number)
            .collect()
    }
}

/// Number of pages needed for `total` results, `ceil(total / page_size)`.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Project the control list for `current_page` of `total_pages`.
///
/// The first three and last three pages are listed; an ellipsis separates
/// them only when there are more than six pages, otherwise the two ranges
/// are merged without duplicates.
pub fn project(current_page: u32, total_pages: u32, page_size: u32, total: u64) -> PaginationView {
    let shown = u64::from(current_page)
        .saturating_mul(u64::from(page_size))
        .min(total);
    let summary_text = format!("Showing {shown} of {total} results");

    if total_pages <= 1 {
        return PaginationView {
            controls: Vec::new(),
            prev_enabled: current_page > 1,
            next_enabled: false,
            summary_text,
        };
    }

    let control = |number| PageControl::Page {
        number,
        is_current: number == current_page,
    };

    let head_end = EDGE_PAGES.min(total_pages);
    let mut controls: Vec<PageControl> = (1..=head_end).map(control).collect();

    if total_pages > 2 * EDGE_PAGES {
        controls.push(PageControl::Ellipsis);
    }

    let tail_start = (EDGE_PAGES + 1).max(total_pages.saturating_sub(EDGE_PAGES - 1));
    controls.extend((tail_start..=total_pages).map(control));

    PaginationView {
        controls,
        prev_enabled: current_page > 1,
        next_enabled: current_page < total_pages,
        summary_text,
    }
}
