#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for the road-accident cleaning pipeline.
//!
//! ```text
//! road_safety clean [--force] [--json]
//! road_safety load
//! road_safety labels
//! road_safety summary [--from 2022-01-01] [--to 2022-06-30] [--severity Tue]
//!                     [--zone "En agglomeration"] [--surface Mouillee]
//!                     [--lighting "Eclairage public"] [--json]
//! ```
//!
//! The data directory defaults to `data/` and can be moved with the
//! `ROAD_SAFETY_DATA_DIR` environment variable. Set `RUST_LOG=info` to see
//! pipeline progress.

mod report;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use road_safety_accident_models::LightingGroup;
use road_safety_analytics_models::{AccidentFilter, DateRange};
use road_safety_config::default_config;

#[derive(Parser)]
#[command(
    name = "road_safety",
    about = "Clean and summarize the annual road-accident files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the cleaned table from the raw files
    Clean {
        /// Ask the raw-data provider to re-acquire its files
        #[arg(long)]
        force: bool,
        /// Print the run counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load the cleaned table, building it if needed
    Load,
    /// List the label values accepted by the summary filters
    Labels,
    /// Print aggregates over a filtered view of the cleaned table
    Summary {
        /// First accident date included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last accident date included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Severity label to keep (repeatable)
        #[arg(long = "severity")]
        severities: Vec<String>,
        /// Agglomeration label to keep (repeatable)
        #[arg(long = "zone")]
        zones: Vec<String>,
        /// Road-surface label to keep (repeatable)
        #[arg(long = "surface")]
        surfaces: Vec<String>,
        /// Lighting group to keep (repeatable)
        #[arg(long = "lighting")]
        lighting: Vec<LightingGroup>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    (!values.is_empty()).then_some(values)
}

fn build_filter(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    severities: Vec<String>,
    zones: Vec<String>,
    surfaces: Vec<String>,
    lighting: Vec<LightingGroup>,
) -> AccidentFilter {
    AccidentFilter {
        date_range: (from.is_some() || to.is_some()).then_some(DateRange { from, to }),
        severities: non_empty(severities),
        agglomerations: non_empty(zones),
        surfaces: non_empty(surfaces),
        lighting_groups: non_empty(lighting),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = default_config();
    log::debug!(
        "Dataset {} ({}), data in {}",
        config.id,
        config.name,
        config.paths.data_dir.display()
    );

    match cli.command {
        Commands::Clean { force, json } => {
            let (_, stats) = road_safety_clean::clean_data_with_stats(force)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", report::format_stats(&stats, &config.cleaned_file()));
            }
        }
        Commands::Load => {
            let table = road_safety_clean::load_clean_data()?;
            let rows: Vec<_> = table.iter().collect();
            println!("{} accidents", table.len());
            if let Some(bounds) = road_safety_analytics::date_bounds(&rows) {
                println!("from {} to {}", bounds.min, bounds.max);
            }
        }
        Commands::Labels => {
            print!("{}", report::format_labels(config));
        }
        Commands::Summary {
            from,
            to,
            severities,
            zones,
            surfaces,
            lighting,
            json,
        } => {
            let filter = build_filter(from, to, severities, zones, surfaces, lighting);
            let table = road_safety_clean::load_clean_data()?;
            let summary = road_safety_analytics::summarize(&table, &filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", report::format_summary(&summary));
            }
        }
    }

    Ok(())
}
