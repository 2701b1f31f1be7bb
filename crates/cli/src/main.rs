use anyhow::Result;
use clap::Parser;
use color_eyre::config::HookBuilder;
use r2catalog_core::SortOrder;
use std::path::PathBuf;

mod handlers;
mod menu;

use handlers::{Context, ExportOverrides};

/// r2catalog - Manage an R2 bucket and export its contents as a tree
#[derive(Parser, Debug)]
#[command(name = "r2catalog")]
#[command(version)]
#[command(about = "Create an R2 bucket, upload files, and export the bucket as a folder tree", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.config/r2catalog/config.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory the export file is written to
    #[arg(short, long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Action to run; without one, an interactive menu is shown
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List the bucket and export it as a JSON tree
    Export {
        /// List only keys under this prefix (repeatable, one request each)
        #[arg(short, long = "prefix")]
        prefixes: Vec<String>,
        /// Do not push the tree to the reporting API
        #[arg(long)]
        no_push: bool,
        /// Order of the top-level entries (number, insertion)
        #[arg(short, long)]
        sort: Option<SortOrder>,
    },

    /// Upload a single file
    Upload {
        /// Local file to upload
        file: String,
        /// R2 path prepended to the file name (e.g. "videos/unit 1/")
        #[arg(short, long, default_value = "")]
        dest: String,
    },

    /// Create the configured bucket
    CreateBucket,
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| fallback.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    if let Err(e) = HookBuilder::default().install() {
        eprintln!("Warning: Failed to install error handler: {}", e);
    }

    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        config_path: cli.config,
        output_dir: cli.output_dir,
    };

    // Execute command
    match cli.command {
        None => handlers::handle_menu(&ctx).await,
        Some(Commands::Export {
            prefixes,
            no_push,
            sort,
        }) => {
            let overrides = ExportOverrides {
                prefixes,
                no_push,
                sort,
            };
            handlers::handle_export(&ctx, overrides).await
        }
        Some(Commands::Upload { file, dest }) => handlers::handle_upload(&ctx, &dest, &file).await,
        Some(Commands::CreateBucket) => handlers::handle_create_bucket(&ctx).await,
    }
}
