//! Command-line interface for market-update
//!
//! # Usage
//!
//! ```bash
//! export SLACK_BOT_TOKEN="xoxb-..."
//! export SLACK_CHANNEL="#stock-updates"
//!
//! market-update search '{"query": "NVS stock news", "time_period": "w"}'
//! market-update deliver output/NVS_report_20250227_080406.md
//! market-update publish --symbol NVS
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use market_update::report::{DEFAULT_SYMBOL, RunInputs};
use market_update::{
    MarketUpdateConfig, RawSearchInput, ReportMessenger, ReportPublisher, SearchOutput,
    default_registry, normalize,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "market-update")]
#[command(about = "Search market news and deliver reports to Slack", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a news search (plain text or JSON input)
    Search {
        /// Query text, or a JSON object with query/search_type/max_results/...
        input: String,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how an input is normalized without searching
    Normalize {
        /// Query text or JSON object
        input: String,
    },

    /// Deliver a report file to a channel
    Deliver {
        /// Report file
        file: PathBuf,

        /// Channel ID or #name (defaults to SLACK_CHANNEL)
        #[arg(short, long)]
        channel: Option<String>,

        /// Maximum characters per message part
        #[arg(long)]
        max_part_length: Option<usize>,
    },

    /// Print the path a new report for a symbol should be written to
    ReportPath {
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,
    },

    /// Deliver a finished report (the newest for the symbol unless --file is given)
    Publish {
        #[arg(short, long, default_value = DEFAULT_SYMBOL)]
        symbol: String,

        /// Specific report file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List the tools available to an orchestrator
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    market_utils::load_dotenv();
    market_utils::init_tracing();

    let args = Args::parse();
    let config = MarketUpdateConfig::from_env().context("Invalid configuration")?;

    info!("Starting market-update");

    match args.command {
        Command::Search { input, json } => {
            let registry = default_registry(&config)?;
            let params = serde_json::from_str::<Value>(&input)
                .ok()
                .filter(Value::is_object)
                .unwrap_or(Value::String(input));

            let output = registry.execute("duckduckgo_search", params).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_search_output(output);
            }
        }
        Command::Normalize { input } => {
            let request = normalize(&RawSearchInput::from(input));
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Deliver {
            file,
            channel,
            max_part_length,
        } => {
            let messenger = ReportMessenger::from_config(&config.messenger)?;
            let channel = channel.unwrap_or_else(|| config.messenger.channel.clone());
            let part_length = messenger.part_length(max_part_length);

            let summary = messenger
                .deliver_report(&channel, &file, max_part_length)
                .await?;
            if !summary.is_success() {
                bail!(
                    "{} of the messages to {channel} failed",
                    summary.failures.len()
                );
            }
            println!(
                "Delivered {} in {} part(s) of up to {part_length} characters to {channel}",
                file.display(),
                summary.parts_total
            );
        }
        Command::ReportPath { symbol } => {
            let inputs = RunInputs::new(symbol);
            println!("{}", inputs.report_path(&config.output_dir).display());
        }
        Command::Publish { symbol, file } => {
            let publisher = ReportPublisher::new(config);
            let sent = match file {
                Some(path) => publisher.publish(Some(&path)).await,
                None => publisher.publish_latest(&symbol).await,
            };
            if !sent {
                bail!("Report for {symbol} was not delivered");
            }
        }
        Command::Tools => {
            let registry = default_registry(&config)?;
            let mut table = Table::new();
            table
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Tool", "Description"]);
            for tool in registry.list_tools() {
                table.add_row(vec![tool.name(), tool.description()]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn print_search_output(output: Value) {
    match serde_json::from_value::<SearchOutput>(output.clone()) {
        Ok(SearchOutput::Records(hits)) => {
            let mut table = Table::new();
            table
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "Title", "Snippet", "Link"]);
            for (i, hit) in hits.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    hit.title.clone(),
                    hit.snippet.clone(),
                    hit.link.clone(),
                ]);
            }
            println!("{table}");
        }
        Ok(SearchOutput::Text(text)) => println!("{text}"),
        Err(_) => println!("{output}"),
    }
}
