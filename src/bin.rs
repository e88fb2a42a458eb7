// std imports
use std::fs::metadata;
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressStyle;
use polars::prelude::DataFrame;
use serde_json::Value as JsonValue;
use tracing::{error, info, Level};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

// internal imports
use hdxms_datasets::database::local::{load_dataset, submit_dataset, LocalDatabase, SubmitOptions};
use hdxms_datasets::database::remote::RemoteDatabase;
use hdxms_datasets::entities::configuration::Configuration;
use hdxms_datasets::formats::identify::identify_file_format;
use hdxms_datasets::io::{load_data, write_data};
use hdxms_datasets::process::aggregate::{aggregate, dynamx_cluster_to_state};
use hdxms_datasets::process::filters::{apply_filters, FilterValue, Filters};
use hdxms_datasets::process::ordering::{drop_null_columns, sort_columns, sort_rows};
use hdxms_datasets::tools::display::{bytes_to_human_readable, dataframe_preview};
use hdxms_datasets::tools::hash::{hash_files, truncate_hash};
use hdxms_datasets::verification::dataset::verify_dataset;
use hdxms_datasets::web::server::start as start_web_server;

/// Number of rows printed by `identify`
///
const PREVIEW_ROWS: usize = 10;

#[derive(Debug, Subcommand)]
enum Commands {
    /// Identifies the format of a peptide table
    Identify {
        /// CSV, HXMS or Parquet file
        file: PathBuf,
    },
    /// Converts a peptide table into the open HDX table
    Convert {
        /// CSV, HXMS or Parquet file
        file: PathBuf,
        /// Output CSV or Parquet file, chosen by extension
        out_file: PathBuf,
        /// Aggregate replicates, ignored for aggregated formats
        #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
        aggregate: bool,
        /// Only keep the rows of this state
        #[arg(long)]
        state: Option<String>,
    },
    /// Converts DynamX cluster data of a single state into DynamX state data
    ClusterToState {
        /// DynamX v3 cluster CSV
        file: PathBuf,
        /// Output CSV or Parquet file, chosen by extension
        out_file: PathBuf,
        /// State to convert
        #[arg(long)]
        state: String,
        /// Exposure (in minutes) of the non-deuterated control
        #[arg(long, default_value_t = 0.0)]
        nd_exposure: f64,
    },
    /// Computes the content hash of the given files
    Hash {
        /// Length of the printed hash, full length if not set
        #[arg(long)]
        length: Option<usize>,
        /// Files to hash
        #[arg(value_delimiter = ' ', num_args = 1..)]
        files: Vec<PathBuf>,
    },
    /// Verifies a dataset directory
    Verify {
        /// Dataset directory or dataset.json
        dataset: PathBuf,
    },
    /// Submits a dataset to a local database
    Submit {
        /// Dataset directory or dataset.json
        dataset: PathBuf,
        /// Database directory
        database_dir: PathBuf,
        /// Mint a new ID if the dataset's ID already exists
        #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
        allow_mint_new_id: bool,
        /// Skip the check for datasets with the same file hash
        #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
        skip_existing_check: bool,
        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Lists the datasets of a local database
    List {
        /// Database directory
        database_dir: PathBuf,
    },
    /// Fetches a dataset from the remote database
    Fetch {
        /// Dataset ID
        dataset_id: String,
        /// Local database directory
        database_dir: PathBuf,
        /// Remote database, defaults to the configured URL
        #[arg(long)]
        remote_url: Option<String>,
        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Starts the web API
    Web {
        /// Interface (IP) to bind the web server to
        interface: String,
        /// Port to bind the web server to
        port: u16,
        /// Configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Parser)]
#[command(name = "hdxms-datasets")]
struct Cli {
    /// Verbosity level
    /// 0 - Error
    /// 1 - Warn
    /// 2 - Info
    /// 3 - Debug
    /// > 3 - Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    match path {
        Some(path) => Configuration::from_file(path),
        None => Ok(Configuration::default()),
    }
}

fn state_filter(column: &str, state: &str) -> Filters {
    let mut filters = Filters::new();
    filters.insert(column.to_string(), FilterValue::Scalar(JsonValue::from(state)));
    filters
}

/// Converts a raw peptide table into the open HDX table
///
fn convert(file: &Path, state: Option<&str>, with_aggregation: bool) -> Result<DataFrame> {
    let raw = load_data(file)?;
    let descriptor = identify_file_format(file, &raw);
    info!("Identified {} in {}", descriptor.get_format(), file.display());
    let raw = match (state, descriptor.get_state_name()) {
        (Some(state), Some(column)) => apply_filters(&raw, &state_filter(column, state))?,
        (Some(_), None) => bail!(
            "Format {} has no state column",
            descriptor.get_format()
        ),
        (None, _) => raw,
    };
    let mut df = descriptor.get_format().convert(&raw)?;
    if with_aggregation && !descriptor.is_aggregated() {
        df = aggregate(&df)?;
    }
    let df = drop_null_columns(&df);
    Ok(sort_columns(&sort_rows(&df)?)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let verbosity = match args.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(verbosity.into())
        .add_directive("hyper=info".parse()?)
        .add_directive("reqwest=info".parse()?);

    let indicatif_layer = IndicatifLayer::new()
        .with_progress_style(ProgressStyle::with_template(
            "{spinner:.cyan} {span_child_prefix} {span_name} {span_fields} {wide_msg} {elapsed}",
        )?)
        .with_span_child_prefix_symbol("↳ ")
        .with_span_child_prefix_indent(" ");

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(filter)
        .init();

    match args.command {
        Commands::Identify { file } => {
            let df = load_data(&file)?;
            let descriptor = identify_file_format(&file, &df);
            println!("format: {}", descriptor.get_format());
            println!("aggregated: {}", descriptor.is_aggregated());
            println!("filter columns: {}", descriptor.get_filter_columns().join(", "));
            println!("{}", dataframe_preview(&df, PREVIEW_ROWS));
        }
        Commands::Convert {
            file,
            out_file,
            aggregate,
            state,
        } => {
            let mut df = convert(&file, state.as_deref(), aggregate)?;
            write_data(&out_file, &mut df)?;
            info!("Wrote {} peptides to {}", df.height(), out_file.display());
        }
        Commands::ClusterToState {
            file,
            out_file,
            state,
            nd_exposure,
        } => {
            let raw = apply_filters(&load_data(&file)?, &state_filter("State", &state))?;
            if raw.height() == 0 {
                bail!("No rows of state `{}` in {}", state, file.display());
            }
            let mut df = dynamx_cluster_to_state(&raw, nd_exposure)?;
            write_data(&out_file, &mut df)?;
            info!("Wrote {} state rows to {}", df.height(), out_file.display());
        }
        Commands::Hash { length, files } => {
            for file in files.iter() {
                println!(
                    "{}\t{}",
                    file.display(),
                    bytes_to_human_readable(metadata(file)?.len())
                );
            }
            let hash = hash_files(&files)?;
            match length {
                Some(length) => println!("{}", truncate_hash(&hash, length)),
                None => println!("{}", hash),
            }
        }
        Commands::Verify { dataset } => {
            let mut dataset = load_dataset(&dataset)?;
            if dataset.get_file_hash().is_some() {
                if !dataset.validate_file_integrity()? {
                    bail!("File hash does not match the data files");
                }
            } else {
                // unsubmitted datasets have no hash yet
                dataset.update_file_hash(Configuration::default().get_file_hash_length())?;
            }
            verify_dataset(&dataset)?;
            println!("Dataset is valid");
        }
        Commands::Submit {
            dataset,
            database_dir,
            allow_mint_new_id,
            skip_existing_check,
            config,
        } => {
            let configuration = load_configuration(config.as_deref())?;
            let options = SubmitOptions {
                allow_mint_new_id,
                check_existing: !skip_existing_check,
                verify: true,
                file_hash_length: configuration.get_file_hash_length(),
            };
            let dataset = load_dataset(&dataset)?;
            match submit_dataset(&dataset, &database_dir, options)? {
                (true, dataset_id) => println!("Submitted as {}", dataset_id),
                (false, reason) => {
                    error!("{}", reason);
                    bail!("Submission rejected");
                }
            }
        }
        Commands::List { database_dir } => {
            let database = LocalDatabase::new(database_dir)?;
            for dataset_id in database.get_datasets()? {
                println!("{}", dataset_id);
            }
        }
        Commands::Fetch {
            dataset_id,
            database_dir,
            remote_url,
            config,
        } => {
            let configuration = load_configuration(config.as_deref())?;
            let remote_url =
                remote_url.unwrap_or_else(|| configuration.get_remote_url().to_string());
            let database = RemoteDatabase::new(database_dir, remote_url).await?;
            match database.fetch_dataset(&dataset_id).await? {
                (true, _) => println!("Fetched {}", dataset_id),
                (false, reason) => {
                    error!("{}", reason);
                    bail!("Fetching {} failed", dataset_id);
                }
            }
        }
        Commands::Web {
            interface,
            port,
            config,
        } => {
            let configuration = load_configuration(config.as_deref())?;
            start_web_server(configuration, interface, port, None).await?;
        }
    }

    Ok(())
}
