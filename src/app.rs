//! Main application structure and command handling
use crate::address::{address_for, MemoryAddress};
use crate::backend::{HttpBackend, MemoryBackend, SearchBackend};
use crate::cli::{parse_facets, Cli, Commands};
use crate::clipboard::ClipboardManager;
use crate::config::Config;
use crate::error::{CatalogError, QueryError, Result};
use crate::interactive::InteractiveEngine;
use crate::metrics::Metrics;
use crate::query::QuerySnapshot;
use crate::session::SearchSession;
use crate::view::{render, render_json, RenderOptions};
use clap::CommandFactory;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Main application struct that coordinates all components
pub struct CatalogApp {
    config: Config,
    metrics: Arc<Metrics>,
}

impl CatalogApp {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            metrics: Arc::new(Metrics::new()?),
        })
    }

    /// Load the configuration and apply command line overrides.
    pub fn resolve_config(cli: &Cli) -> Result<Config> {
        let mut config = match &cli.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(api_url) = &cli.api_url {
            config.backend.api_url = api_url.clone();
        }
        if let Some(catalog) = &cli.catalog {
            config.backend.catalog = Some(catalog.clone());
        }
        if let Some(page_size) = cli.page_size {
            config.search.page_size = page_size;
        }
        if cli.no_color {
            config.display.color = false;
        }
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn build_backend(&self) -> Result<Arc<dyn SearchBackend>> {
        let backend: Arc<dyn SearchBackend> = match &self.config.backend.catalog {
            Some(path) => Arc::new(MemoryBackend::from_path(path)?),
            None => Arc::new(HttpBackend::new(
                &self.config.backend.api_url,
                self.config.backend.timeout(),
            )?),
        };
        info!("Using {} search backend", backend.name());
        Ok(backend)
    }

    fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_facets: self.config.display.show_facets,
            show_summary: self.config.display.show_summary,
        }
    }

    fn session_at(&self, address: String) -> Result<SearchSession> {
        let store = MemoryAddress::new(address).with_max_history(self.config.search.max_history);
        Ok(SearchSession::new(
            self.build_backend()?,
            Box::new(store),
            self.config.search.effective_page_size(),
            Arc::clone(&self.metrics),
        ))
    }

    /// Run the application with the given CLI arguments
    pub async fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Commands::Search {
                query,
                page,
                facets,
                address,
                json,
                copy_url,
            } => {
                let snapshot = match address {
                    Some(address) => QuerySnapshot::from_query_string(&address),
                    None => build_snapshot(&query, page, &facets)?,
                };
                self.handle_search(snapshot, json, copy_url).await
            }
            Commands::Interactive { address } => self.handle_interactive(address).await,
            Commands::Url {
                query,
                page,
                facets,
                parse,
            } => match parse {
                Some(address) => {
                    print_decoded(&QuerySnapshot::from_query_string(&address));
                    Ok(())
                }
                None => {
                    println!("{}", address_for(&build_snapshot(&query, page, &facets)?));
                    Ok(())
                }
            },
            Commands::Completions { shell } => {
                let mut cmd = Cli::command();
                clap_complete::generate(shell, &mut cmd, "catalog-search", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    async fn handle_search(&self, snapshot: QuerySnapshot, json: bool, copy_url: bool) -> Result<()> {
        let mut session = self.session_at(address_for(&snapshot))?;

        let pb = ProgressBar::new_spinner().with_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .map_err(|e| CatalogError::Other(e.to_string()))?
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message("Searching...");
        pb.enable_steady_tick(Duration::from_millis(80));

        session.start();
        session.settle().await;
        pb.finish_and_clear();

        let view = session.view();
        if json {
            println!("{}", render_json(&view)?);
        } else {
            print!("{}", render(&view, &self.render_options()));
        }

        if copy_url {
            ClipboardManager::new()?.copy_address(&session.address())?;
            println!("\n{}", "Address copied to clipboard!".green());
        }

        match view.error {
            Some(error) => Err(CatalogError::Search(error)),
            None => Ok(()),
        }
    }

    async fn handle_interactive(&self, address: String) -> Result<()> {
        let session = self.session_at(address)?;
        let mut engine = InteractiveEngine::new(
            session,
            Arc::clone(&self.metrics),
            self.render_options(),
            self.config.search.max_history,
        );
        engine.run().await
    }
}

fn build_snapshot(query: &str, page: u32, facets: &[String]) -> Result<QuerySnapshot> {
    if page == 0 {
        return Err(QueryError::InvalidPage(page).into());
    }
    Ok(QuerySnapshot::new(query, page, parse_facets(facets)?))
}

fn print_decoded(snapshot: &QuerySnapshot) {
    if snapshot.matches_all() {
        println!("{}: {}", "query".cyan(), "(everything)".dimmed());
    } else {
        println!("{}: {}", "query".cyan(), snapshot.text());
    }
    println!("{}: {}", "page".cyan(), snapshot.page());
    for (category, value) in snapshot.facets().pairs() {
        println!("{}: {category}={value}", "facet".cyan());
    }
}
