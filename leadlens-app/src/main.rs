use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use leadlens_common::observability::init_logging;
use leadlens_llm::AgentOutcome;
use leadlens_web::sink::{render_listing_report, save_results};
use leadlens_web::{run_contact_flow, run_location_flow};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tether::{browser_fetcher, build_llm_client, load_config, location_search, log_config};
mod tether;

/// Find business contact details and local listings from rendered web pages.
#[derive(Debug, Parser)]
#[command(name = "leadlens", version)]
struct Cli {
    /// Configuration file. Without it, ./leadlens.yaml and the user config
    /// directory are tried, then built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run the browser without a window.
    #[arg(long, global = true, conflicts_with = "headed")]
    headless: bool,

    /// Show the browser window.
    #[arg(long, global = true)]
    headed: bool,

    /// Where to write the raw HTML (contact) or the listings JSON (locate).
    #[arg(long, global = true, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Let the chat model scrape one page and summarise its contact details.
    Contact {
        /// Page to analyse; prompted for when omitted.
        url: Option<String>,
    },
    /// Search listing sites for liquor stores near a location.
    Locate {
        /// Free-text location such as `Winston Salem, NC`; prompted for when omitted.
        location: Vec<String>,

        /// Drop businesses repeated across sources.
        #[arg(long)]
        dedupe: bool,
    },
}

impl Cli {
    fn headless_override(&self) -> Option<bool> {
        match (self.headless, self.headed) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn argument_or_prompt(given: Option<String>, question: &str) -> Result<String> {
    let value = match given {
        Some(value) => value.trim().to_string(),
        None => prompt(question)?,
    };
    if value.is_empty() {
        bail!("nothing entered");
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref())?;
    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log = %log_path.display(), version = ?cfg.version, "leadlens starting");

    let headless = cli.headless_override();
    match cli.command {
        Command::Contact { url } => {
            let url = argument_or_prompt(url, "Enter the URL to scrape: ")?;
            let html_path = cli.output.unwrap_or_else(|| cfg.output.html_path.clone());

            let client = build_llm_client(&cfg.llm).await?;
            let fetcher = browser_fetcher(&cfg.browser, headless);
            let summary = run_contact_flow(client.as_ref(), fetcher, &url, &html_path)
                .await
                .with_context(|| format!("contact flow for {url} failed"))?;

            for page in &summary.pages {
                println!(
                    "Function '{}' was called with the URL: {}",
                    leadlens_web::summarize::QUERY_WEB_SCRAPER,
                    page.url
                );
                println!(
                    "Raw HTML content has been written to {}",
                    page.html_path.display()
                );
            }
            match summary.outcome {
                AgentOutcome::Declined { reply } => {
                    println!("The model didn't use the function. Its response was:");
                    println!("{reply}");
                }
                AgentOutcome::Summary { text, .. } => println!("{text}"),
                AgentOutcome::NoData => println!(
                    "No data was scraped. Unable to proceed with creating a structured JSON response."
                ),
            }
        }
        Command::Locate { location, dedupe } => {
            let given = (!location.is_empty()).then(|| location.join(" "));
            let location =
                argument_or_prompt(given, "Enter location to search (city, state): ")?;
            let listings_path = cli
                .output
                .unwrap_or_else(|| cfg.output.listings_path.clone());

            let search = location_search(&cfg, dedupe)?;
            let fetcher = browser_fetcher(&cfg.browser, headless);
            let report = run_location_flow(&search, fetcher, &location).await;

            for failure in &report.failures {
                eprintln!("Error scraping {}: {}", failure.url, failure.error);
            }
            save_results(&listings_path, &report.businesses)
                .with_context(|| format!("failed to save {}", listings_path.display()))?;
            println!("Results saved to {}", listings_path.display());
            println!();
            print!("{}", render_listing_report(&report.businesses));
        }
    }
    Ok(())
}
