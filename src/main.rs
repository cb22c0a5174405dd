use clap::{Args, Parser, Subcommand, builder::styling};
use eyre::Result;
use fhir_loader::cli::{self, LoadOptions};
use owo_colors::OwoColorize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

const DEFAULT_URL: &str = "http://localhost:8090/fhir";

/// FHIR Loader: extract resources from a FHIR server, or bulk load bundles and NDJSON files into one
#[derive(Parser)]
#[command(name = "fhirload", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: PathBuf,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query FHIR resources, write to .ndjson files
    #[command(subcommand)]
    Extract(ExtractCommands),

    /// Load files to a FHIR server
    #[command(subcommand)]
    Load(LoadCommands),
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Fetch a resource or bundle and fan it out into <resourceType>.ndjson files
    Resources {
        /// Where to store extracted data (ndjson)
        #[arg(long, alias = "extract_path", default_value = "data/output/resources")]
        extract_path: PathBuf,

        /// URL of the FHIR server [base]
        #[arg(long, alias = "url_base", default_value = DEFAULT_URL)]
        url_base: String,

        /// FHIR url path [type]/[id] {?_format=[mime-type]}
        #[arg(long, alias = "url_path", default_value = "metadata")]
        url_path: String,
    },
}

#[derive(Subcommand)]
enum LoadCommands {
    /// Load bundles (.json)
    Bundles {
        /// Where to find bundles to import
        #[arg(long, alias = "input_path", default_value = "data/input/bundles")]
        input_path: PathBuf,

        #[command(flatten)]
        target: LoadArgs,
    },

    /// Load resources (.ndjson)
    Resources {
        /// Where to find resource files to import
        #[arg(long, alias = "input_path", default_value = "data/input/resources")]
        input_path: PathBuf,

        #[command(flatten)]
        target: LoadArgs,
    },
}

#[derive(Args)]
struct LoadArgs {
    /// URL of the FHIR server
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Number of simultaneous loaders
    #[arg(long, alias = "chunk_size", default_value = "5")]
    chunk_size: NonZeroUsize,

    /// Stop after dispatching this many files
    #[arg(long)]
    limit: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl From<LoadArgs> for LoadOptions {
    fn from(args: LoadArgs) -> Self {
        Self {
            url: args.url,
            chunk_size: args.chunk_size,
            limit: args.limit,
            timeout: args.timeout.map(Duration::from_secs),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if cli.env.exists() {
        dotenvy::from_filename(&cli.env)?;
    } else {
        log::debug!("No dotenv file at {}", cli.env.display());
    }

    match cli.command {
        Commands::Extract(ExtractCommands::Resources {
            extract_path,
            url_base,
            url_path,
        }) => {
            log::info!(
                "Extracting {} into {}",
                url_path.bright_black(),
                extract_path.display().bright_black()
            );
            let count = cli::extract_resources(&extract_path, &url_base, &url_path).await?;
            log::info!("✓ Extracted {} resource(s)", count);
        }
        Commands::Load(LoadCommands::Bundles { input_path, target }) => {
            let summary = cli::load_bundles(&input_path, &target.into()).await?;
            cli::finish(&input_path, &summary)?;
        }
        Commands::Load(LoadCommands::Resources { input_path, target }) => {
            let summary = cli::load_resources(&input_path, &target.into()).await?;
            cli::finish(&input_path, &summary)?;
        }
    }

    Ok(())
}
