//! Interactive search loop
//!
//! Commands are read from stdin while requests are in flight; the view is
//! redrawn whenever a response is applied.
use crate::clipboard::ClipboardManager;
use crate::coordinator::Completion;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::session::{SearchSession, SessionEvent};
use crate::view::{render, RenderOptions};
use colored::Colorize;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct InteractiveEngine {
    session: SearchSession,
    metrics: Arc<Metrics>,
    render_options: RenderOptions,
    history: VecDeque<String>,
    max_history: usize,
}

/// Command processing result
#[derive(Debug, PartialEq, Eq)]
enum CommandResult {
    Continue,
    Quit,
    Event(SessionEvent),
}

impl InteractiveEngine {
    pub fn new(
        session: SearchSession,
        metrics: Arc<Metrics>,
        render_options: RenderOptions,
        max_history: usize,
    ) -> Self {
        Self {
            session,
            metrics,
            render_options,
            history: VecDeque::new(),
            max_history: max_history.max(1),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "Starting interactive search mode...".green().bold());
        println!("{}", "Type 'help' for commands, 'quit' to leave".dimmed());

        self.session.start();
        self.display_state();
        self.prompt()?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let input = line.trim();
                    if input.is_empty() {
                        self.prompt()?;
                        continue;
                    }
                    self.add_to_history(input.to_string());

                    match self.process_command(input) {
                        CommandResult::Quit => break,
                        CommandResult::Continue => {}
                        CommandResult::Event(event) => match self.session.dispatch(event) {
                            Ok(Some(_)) => self.display_state(),
                            Ok(None) => println!("{}", "Nothing changed".dimmed()),
                            Err(e) => println!("{}", e.to_string().red()),
                        },
                    }
                    self.prompt()?;
                }
                Some(completion) = self.session.next_completion() => {
                    if completion == Completion::Applied {
                        println!();
                        self.display_state();
                        self.prompt()?;
                    }
                }
            }
        }

        Ok(())
    }

    fn prompt(&self) -> Result<()> {
        print!("\n> ");
        io::stdout().flush()?;
        Ok(())
    }

    fn display_state(&self) {
        let query = self.session.query();
        println!("{}", "=".repeat(60).cyan());
        if query.matches_all() {
            println!("Query: {}", "(everything)".dimmed());
        } else {
            println!("Query: {}", query.text().yellow());
        }
        print!("{}", render(&self.session.view(), &self.render_options));
    }

    fn process_command(&mut self, input: &str) -> CommandResult {
        let (command, rest) = match input.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (input, ""),
        };

        match command {
            "q" | "quit" | "exit" => CommandResult::Quit,
            "h" | "help" => {
                self.show_help();
                CommandResult::Continue
            }
            "s" | "search" => CommandResult::Event(SessionEvent::SubmitText(rest.to_string())),
            "p" | "page" => match rest.parse::<u32>() {
                Ok(page) => CommandResult::Event(SessionEvent::GotoPage(page)),
                Err(_) => {
                    println!("Usage: page <number>");
                    CommandResult::Continue
                }
            },
            "n" | "next" => CommandResult::Event(SessionEvent::NextPage),
            "b" | "prev" | "previous" => CommandResult::Event(SessionEvent::PrevPage),
            "f" | "facet" => match parse_facet_argument(rest) {
                Some((category, value)) => CommandResult::Event(SessionEvent::ToggleFacet {
                    category: category.to_string(),
                    value: value.to_string(),
                }),
                None => {
                    println!("Usage: facet <category>=<value>");
                    CommandResult::Continue
                }
            },
            "c" | "clear" => CommandResult::Event(SessionEvent::ClearFacets),
            "o" | "open" => {
                if rest.is_empty() {
                    println!("Usage: open <address>");
                    CommandResult::Continue
                } else {
                    CommandResult::Event(SessionEvent::Navigate(rest.to_string()))
                }
            }
            "url" => {
                println!("{}", self.session.address().green());
                CommandResult::Continue
            }
            "copy" => {
                let address = self.session.address();
                match ClipboardManager::new().and_then(|mut c| c.copy_address(&address)) {
                    Ok(()) => println!("Address copied to clipboard: {}", address.green()),
                    Err(e) => println!("{}", e.to_string().red()),
                }
                CommandResult::Continue
            }
            "stats" => {
                println!("{}", self.metrics.gather());
                CommandResult::Continue
            }
            "history" => {
                self.show_history();
                CommandResult::Continue
            }
            _ => CommandResult::Event(SessionEvent::SubmitText(input.to_string())),
        }
    }

    fn show_help(&self) {
        println!("\n{}", "Available commands:".green().bold());
        println!("  {} - Search for text", "search <text>".yellow());
        println!("  {} - Go to a page", "page <number>".yellow());
        println!("  {} - Next page", "next".yellow());
        println!("  {} - Previous page", "prev".yellow());
        println!("  {} - Toggle a facet value", "facet <category>=<value>".yellow());
        println!("  {} - Clear all facets", "clear".yellow());
        println!("  {} - Load a shared address", "open <address>".yellow());
        println!("  {} - Show the shareable address", "url".yellow());
        println!("  {} - Copy the address to the clipboard", "copy".yellow());
        println!("  {} - Show request statistics", "stats".yellow());
        println!("  {} - Show command history", "history".yellow());
        println!("  {} - Show this help", "help".yellow());
        println!("  {} - Quit", "quit".yellow());
        println!("Anything else is searched for as text.");
    }

    fn add_to_history(&mut self, command: String) {
        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(command);
    }

    fn show_history(&self) {
        println!("\n{}", "Command History:".green().bold());
        for (i, cmd) in self.history.iter().enumerate() {
            println!("  {}: {}", i + 1, cmd);
        }
    }
}

/// Accepts `category=value` or `category value`.
fn parse_facet_argument(arg: &str) -> Option<(&str, &str)> {
    let (category, value) = arg
        .split_once('=')
        .or_else(|| arg.split_once(char::is_whitespace))?;
    let (category, value) = (category.trim(), value.trim());
    (!category.is_empty() && !value.is_empty()).then_some((category, value))
}
