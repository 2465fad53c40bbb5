use crate::error::QueryError;
use crate::facets::FacetSelections;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(long, value_parser, default_value_t = false, global = true)]
    pub verbose: bool,

    #[clap(long, value_parser, global = true)]
    pub log: Option<PathBuf>,

    /// Configuration file to use instead of the default locations.
    #[clap(long, value_parser, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the search API.
    #[clap(long, value_parser, global = true)]
    pub api_url: Option<String>,

    /// Search a local JSON catalog instead of the API.
    #[clap(long, value_parser, global = true)]
    pub catalog: Option<PathBuf>,

    #[clap(long, value_parser, global = true)]
    pub page_size: Option<u32>,

    #[clap(long, value_parser, default_value_t = false, global = true)]
    pub no_color: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one search and print the results.
    Search {
        #[clap(default_value = "")]
        query: String,

        #[clap(long, value_parser, default_value_t = 1)]
        page: u32,

        /// Facet filter as category=value; repeat for more values.
        #[clap(short, long = "facet", value_parser)]
        facets: Vec<String>,

        /// Start from a shared address instead of the arguments above.
        #[clap(long, value_parser, conflicts_with_all = ["query", "page", "facets"])]
        address: Option<String>,

        #[clap(long, value_parser, default_value_t = false)]
        json: bool,

        #[clap(long, value_parser, default_value_t = false)]
        copy_url: bool,
    },
    /// Browse results interactively.
    Interactive {
        /// Address to start from, e.g. "/search?query=water&page=2".
        #[clap(default_value = "/search")]
        address: String,
    },
    /// Build a shareable address, or decode one with --parse.
    Url {
        #[clap(default_value = "")]
        query: String,

        #[clap(long, value_parser, default_value_t = 1)]
        page: u32,

        #[clap(short, long = "facet", value_parser)]
        facets: Vec<String>,

        #[clap(long, value_parser, conflicts_with_all = ["query", "page", "facets"])]
        parse: Option<String>,
    },
    /// Print shell completions.
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}

/// Parse repeated `category=value` filters.
pub fn parse_facets(raw: &[String]) -> Result<FacetSelections, QueryError> {
    let mut selections = FacetSelections::new();
    for filter in raw {
        let (category, value) = filter
            .split_once('=')
            .map(|(c, v)| (c.trim(), v.trim()))
            .filter(|(c, v)| FacetSelections::is_selectable(c, v))
            .ok_or_else(|| QueryError::InvalidFacet(filter.clone()))?;
        selections.insert(category, value);
    }
    Ok(selections)
}
