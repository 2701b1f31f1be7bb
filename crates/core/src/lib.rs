//! r2catalog-core - Core library for the r2catalog CLI
//!
//! Turns flat R2 object listings into a folder/file tree with public URLs, and
//! provides the bucket actions (create, upload, list/export) built on top of it.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod sort;
pub mod store;
pub mod tree;
pub mod url;

// Re-export commonly used types
pub use catalog::{
    collect_entries, ensure_bucket, export_catalog, export_file_name, upload_file, BucketStatus,
    ExportSummary, UploadOutcome,
};
pub use client::R2Client;
pub use config::{get_config_path, load_config, load_config_file, validate_config};
pub use config::{ApiConfig, Config, ConfigFile, ExportOptions, R2Config};
pub use error::{Error, Result};
pub use report::ReportClient;
pub use sort::{sort_by_number, SortOrder};
pub use store::ObjectStore;
pub use tree::{build_tree, CatalogEntry, ObjectRecord, TreeBuilder, TreeNode};
pub use url::{encode_whitespace, public_url};
