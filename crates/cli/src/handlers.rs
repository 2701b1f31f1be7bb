//! Command handlers for r2catalog CLI

use crate::menu::{MenuAction, MenuSession};
use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use r2catalog_core::{
    ensure_bucket, export_catalog, load_config, upload_file, BucketStatus, Config, R2Client,
    ReportClient, SortOrder, TreeNode,
};
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::debug;

/// Settings shared by every handler
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Context {
    fn load_config(&self) -> Result<Config> {
        Ok(load_config(self.config_path.as_deref())?)
    }
}

/// Command-line overrides for the export action
#[derive(Debug, Clone, Default)]
pub struct ExportOverrides {
    pub prefixes: Vec<String>,
    pub no_push: bool,
    pub sort: Option<SortOrder>,
}

/// Run the interactive menu
pub async fn handle_menu(ctx: &Context) -> Result<()> {
    let mut session = MenuSession::open();

    let Some(action) = session.choose_action()? else {
        println!("Invalid option");
        return Ok(());
    };
    debug!(?action, "menu choice");

    match action {
        MenuAction::Export => handle_export(ctx, ExportOverrides::default()).await,
        MenuAction::Upload => {
            println!("{}", style("UPLOAD FILE").bold());
            let dest = session.ask("Enter R2 path:")?;
            let source = session.ask("Enter the full path of the file to upload:")?;
            handle_upload(ctx, &dest, &source).await
        }
        MenuAction::CreateBucket => handle_create_bucket(ctx).await,
    }
}

/// Handle the list/export action
pub async fn handle_export(ctx: &Context, overrides: ExportOverrides) -> Result<()> {
    let config = ctx.load_config()?;
    let public_base = config.public_url()?;

    let mut options = config.export.clone();
    if !overrides.prefixes.is_empty() {
        options.prefixes = overrides.prefixes;
    }
    if overrides.no_push {
        options.push = false;
    }
    if let Some(sort) = overrides.sort {
        options.sort = sort;
    }

    let report = match (&config.api, options.push) {
        (Some(api), true) => Some(ReportClient::from_config(api)),
        _ => None,
    };

    let r2_client = R2Client::from_config(&config.r2);
    debug!(?options, endpoint = %config.r2.endpoint, "export options");

    println!("Reading files from bucket {}...", config.r2.bucket);
    let pb = spinner("Listing objects...");
    let result = export_catalog(
        &r2_client,
        report.as_ref(),
        &options,
        public_base,
        &ctx.output_dir,
    )
    .await;
    pb.finish_and_clear();
    let summary = result?;

    if summary.tree.is_empty() {
        println!("  Empty bucket");
    } else {
        println!();
        println!("{}", Table::new(root_rows(&summary.tree)));
    }

    println!();
    println!("Files in bucket: {}", summary.object_count);
    if !summary.shadowed.is_empty() {
        println!(
            "  ⚠️  {} object(s) left out (key also used as a folder)",
            summary.shadowed.len()
        );
    }
    if summary.pushed {
        println!("  ✅ Upload to API success!");
    }
    println!("  ✅ Files list saved to {}", summary.path.display());

    Ok(())
}

/// Handle the upload action
pub async fn handle_upload(ctx: &Context, dest: &str, source: &str) -> Result<()> {
    let config = ctx.load_config()?;
    let public_base = config.public_url()?;
    let r2_client = R2Client::from_config(&config.r2);

    println!(
        "Uploading {} to bucket {}...",
        source.trim(),
        config.r2.bucket
    );
    let pb = spinner("Uploading...");
    let result = upload_file(&r2_client, dest, source, public_base).await;
    pb.finish_and_clear();
    let outcome = result?;

    println!("  ✅ Upload complete");
    println!("  Key: {}", outcome.key);
    println!("  Size: {}", format_bytes(outcome.size as u64));
    println!("  Content-Type: {}", outcome.content_type);
    println!();
    println!("[File URL]: {}", outcome.url);

    Ok(())
}

/// Handle the create bucket action
pub async fn handle_create_bucket(ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?;
    let r2_client = R2Client::from_config(&config.r2);

    println!("Creating bucket '{}'...", config.r2.bucket);

    match ensure_bucket(&r2_client).await? {
        BucketStatus::Created { location } => {
            println!("  ✅ Bucket created: {}", config.r2.bucket);
            if let Some(location) = location {
                println!("  Location: {}", location);
            }
        }
        BucketStatus::AlreadyOwned => {
            println!(
                "  Bucket {} already exists, skipping...",
                config.r2.bucket
            );
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct RootRow {
    key: String,
    kind: &'static str,
    files: usize,
}

fn root_rows(tree: &[TreeNode]) -> Vec<RootRow> {
    tree.iter()
        .map(|node| RootRow {
            key: node.key.clone(),
            kind: if node.is_folder() { "folder" } else { "file" },
            files: node.file_count(),
        })
        .collect()
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Format bytes to human-readable size
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
