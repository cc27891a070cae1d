//! JSON export of stored posts.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Post;
use crate::storage::PostStore;

/// Snapshot header wrapping the exported posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    /// ISO 8601 timestamp of the export
    pub updated_at: DateTime<Utc>,
    /// Total post count
    pub count: usize,
    /// The posts, ordered by id
    pub posts: Vec<Post>,
}

impl ExportData {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: posts.len(),
            posts,
        }
    }
}

/// Write every stored post to `output` as pretty JSON.
///
/// The file is written to a temp path and renamed into place so a
/// failed export never truncates an existing snapshot.
pub async fn run_export(db_path: &Path, output: &Path) -> Result<usize> {
    let store = PostStore::open(db_path)?;
    let data = ExportData::new(store.load_all()?);
    let bytes = serde_json::to_vec_pretty(&data)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = output.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, output).await?;
    Ok(data.count)
}
