//! Bucket actions: create, upload, list/export
//!
//! Each action runs its I/O strictly in sequence: every call is awaited before
//! the next one starts.

use crate::config::ExportOptions;
use crate::error::{Error, Result};
use crate::report::ReportClient;
use crate::store::ObjectStore;
use crate::tree::{CatalogEntry, TreeBuilder, TreeNode};
use crate::url::public_url;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a bucket creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketStatus {
    Created { location: Option<String> },
    AlreadyOwned,
}

/// Create the store's bucket, treating "already owned by you" as success
pub async fn ensure_bucket(store: &dyn ObjectStore) -> Result<BucketStatus> {
    info!(bucket = store.bucket(), "creating bucket");

    match store.create_bucket().await {
        Ok(location) => {
            info!(bucket = store.bucket(), ?location, "bucket created");
            Ok(BucketStatus::Created { location })
        }
        Err(Error::BucketAlreadyOwned(bucket)) => {
            info!(bucket = %bucket, "bucket already exists, skipping");
            Ok(BucketStatus::AlreadyOwned)
        }
        Err(err) => Err(err),
    }
}

/// A file uploaded to the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub key: String,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// Clean up a path typed or pasted at a prompt
///
/// On Windows backslashes become `/`. Elsewhere they are shell escapes
/// (`My\ Clip.mp4`) and are removed.
pub fn normalize_source_path(raw: &str) -> String {
    let raw = raw.trim();
    if cfg!(windows) {
        raw.replace('\\', "/")
    } else {
        raw.replace('\\', "")
    }
}

/// Everything after the last `/` of a normalized path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Upload the file at `source` under `dest_prefix + file name`
///
/// `dest_prefix` is concatenated as-is, so it should end with `/` for a folder.
pub async fn upload_file(
    store: &dyn ObjectStore,
    dest_prefix: &str,
    source: &str,
    public_base: &str,
) -> Result<UploadOutcome> {
    let path = normalize_source_path(source);
    let name = file_name(&path);
    if name.is_empty() {
        return Err(Error::InvalidInput(format!(
            "'{}' does not name a file",
            source
        )));
    }

    let body = tokio::fs::read(&path).await.map_err(|err| Error::ReadFile {
        path: PathBuf::from(&path),
        source: err,
    })?;

    let key = format!("{}{}", dest_prefix, name);
    let content_type = mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string();
    let size = body.len();

    info!(bucket = store.bucket(), key = %key, size, "uploading file");
    store.put_object(&key, body, &content_type).await?;

    let url = public_url(public_base, &key);
    Ok(UploadOutcome {
        key,
        url,
        content_type,
        size,
    })
}

/// List the bucket, one request per prefix, and pair records with public URLs
///
/// A prefix whose listing fails is logged and skipped.
pub async fn collect_entries(
    store: &dyn ObjectStore,
    prefixes: &[String],
    public_base: &str,
) -> Vec<CatalogEntry> {
    let requests: Vec<Option<&str>> = if prefixes.is_empty() {
        vec![None]
    } else {
        prefixes.iter().map(|p| Some(p.as_str())).collect()
    };

    let mut entries = Vec::new();
    for prefix in requests {
        match store.list_objects(prefix).await {
            Ok(records) => {
                info!(?prefix, count = records.len(), "listed objects");
                entries.extend(
                    records
                        .into_iter()
                        .map(|record| CatalogEntry::new(record, public_base)),
                );
            }
            Err(err) => {
                warn!(
                    bucket = store.bucket(),
                    ?prefix,
                    error = %err,
                    "failed to list objects, skipping prefix"
                );
            }
        }
    }

    entries
}

/// Name of the export file for `bucket`
pub fn export_file_name(bucket: &str) -> String {
    format!("{}-content.json", bucket)
}

/// Result of a list/export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub tree: Vec<TreeNode>,
    pub object_count: usize,
    pub shadowed: Vec<String>,
    pub pushed: bool,
}

/// List the bucket, build and sort the tree, push it, then write it to disk
///
/// The tree is pushed only when `report` is given; a failed push aborts before
/// the file is written.
pub async fn export_catalog(
    store: &dyn ObjectStore,
    report: Option<&ReportClient>,
    options: &ExportOptions,
    public_base: &str,
    output_dir: &Path,
) -> Result<ExportSummary> {
    info!(bucket = store.bucket(), "reading files from bucket");

    let entries = collect_entries(store, &options.prefixes, public_base).await;
    let object_count = entries.len();

    let mut builder = TreeBuilder::new();
    for entry in entries {
        builder.insert(entry);
    }
    let (mut tree, shadowed) = builder.finish_with_shadowed();
    for key in &shadowed {
        warn!(key = %key, "object shares its path with a folder and was left out");
    }

    options.sort.apply(&mut tree);
    info!(roots = tree.len(), objects = object_count, sort = %options.sort, "tree built");

    if let Some(report) = report {
        info!(url = report.url(), "uploading tree to API");
        report.push_tree(&tree).await?;
    }

    let path = output_dir.join(export_file_name(store.bucket()));
    let json = serde_json::to_string_pretty(&tree)?;
    tokio::fs::write(&path, json).await?;
    info!(path = %path.display(), "files list saved");

    Ok(ExportSummary {
        path,
        tree,
        object_count,
        shadowed,
        pushed: report.is_some(),
    })
}
