//! Rendering of the derived search state
use crate::backend::ResourceSummary;
use crate::coordinator::ResultState;
use crate::error::SearchError;
use crate::facets::{visible_facets, FacetCategory};
use crate::pagination::{project, total_pages, PageControl, PaginationView};
use crate::query::QuerySnapshot;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

/// Everything a renderer needs, derived from the query and the last results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub query: QuerySnapshot,
    pub loading: bool,
    pub items: Vec<ResourceSummary>,
    pub total: u64,
    pub page_size: u32,
    pub error: Option<SearchError>,
    pub facets: Vec<FacetCategory>,
    pub pagination: PaginationView,
}

/// Which of the mutually exclusive bodies the view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Error,
    Loading,
    Empty,
    Results,
}

impl ViewModel {
    pub fn derive(query: &QuerySnapshot, state: &ResultState) -> Self {
        let pages = total_pages(state.total, state.page_size);
        // the query may point past the end after the total shrank
        let current = query.page().min(pages).max(1);

        Self {
            query: query.clone(),
            loading: state.loading,
            items: state.items.clone(),
            total: state.total,
            page_size: state.page_size,
            error: state.error.clone(),
            facets: visible_facets(&state.facets, query.facets()),
            pagination: project(current, pages, state.page_size, state.total),
        }
    }

    pub fn status(&self) -> ViewStatus {
        if self.error.is_some() {
            ViewStatus::Error
        } else if self.items.is_empty() && self.loading {
            ViewStatus::Loading
        } else if self.items.is_empty() {
            ViewStatus::Empty
        } else {
            ViewStatus::Results
        }
    }

    /// 1-based position of the first item on the shown page.
    fn first_position(&self) -> u64 {
        let page = u64::from(self.query.page().max(1));
        (page - 1) * u64::from(self.page_size) + 1
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_facets: bool,
    pub show_summary: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_facets: true,
            show_summary: true,
        }
    }
}

/// Render the view as terminal text.
pub fn render(view: &ViewModel, options: &RenderOptions) -> String {
    let mut out = String::new();

    if let Some(error) = &view.error {
        let _ = writeln!(out, "{}", error.user_message().red().bold());
        return out;
    }

    if view.loading {
        let _ = writeln!(out, "{}", "Loading…".dimmed());
    }

    match view.status() {
        ViewStatus::Loading | ViewStatus::Error => {}
        ViewStatus::Empty => {
            let _ = writeln!(out, "{}", "No results found.".yellow());
        }
        ViewStatus::Results => {
            render_items(&mut out, view);
        }
    }

    if options.show_facets && !view.facets.is_empty() {
        render_facets(&mut out, view);
    }

    if !view.pagination.is_hidden() {
        render_pagination(&mut out, &view.pagination, options.show_summary);
    }

    out
}

fn render_items(out: &mut String, view: &ViewModel) {
    let first = view.first_position();
    for (offset, item) in view.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}",
            first + offset as u64,
            item.title.bold()
        );

        let mut byline = item.authors.join(", ");
        if let Some(date) = &item.date {
            if !byline.is_empty() {
                byline.push_str(" · ");
            }
            byline.push_str(date);
        }
        if !byline.is_empty() {
            let _ = writeln!(out, "     {}", byline.dimmed());
        }
    }
}

fn render_facets(out: &mut String, view: &ViewModel) {
    let _ = writeln!(out, "\n{}", "Filters:".green().bold());
    for category in &view.facets {
        let _ = writeln!(out, "  {}", category.name.cyan());
        for option in &category.options {
            let mark = if view.query.facets().is_selected(&category.name, &option.value) {
                "[x]"
            } else {
                "[ ]"
            };
            let _ = writeln!(
                out,
                "    {mark} {} {}",
                option.label,
                format!("({})", option.count).dimmed()
            );
        }
    }
}

fn render_pagination(out: &mut String, pagination: &PaginationView, show_summary: bool) {
    let arrow = |glyph: &str, enabled: bool| {
        if enabled {
            glyph.normal()
        } else {
            glyph.dimmed()
        }
    };

    let pages: Vec<String> = pagination
        .controls
        .iter()
        .map(|control| match control {
            PageControl::Page {
                number,
                is_current: true,
            } => format!("[{number}]").green().bold().to_string(),
            other => other.to_string(),
        })
        .collect();

    let _ = writeln!(
        out,
        "\n{} {} {}",
        arrow("«", pagination.prev_enabled),
        pages.join(" "),
        arrow("»", pagination.next_enabled)
    );
    if show_summary {
        let _ = writeln!(out, "{}", pagination.summary_text.dimmed());
    }
}

/// Render the view as pretty JSON for scripting.
pub fn render_json(view: &ViewModel) -> serde_json::Result<String> {
    serde_json::to_string_pretty(view)
}
