// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::FileStoreError;
use carbid_domain::{ADDITIONAL_STAGE_TITLE, MediaKind, OperatorId, StagePlan, stage_prefix};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Per-file size limit. Uploads over this are rejected before any write.
pub const MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

/// A file that has been written into a bid's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Full path of the stored file.
    pub path: PathBuf,
    /// The stored file name (prefix, timestamp, original name).
    pub file_name: String,
    /// Media kind inferred from the extension.
    pub kind: MediaKind,
}

/// File count for one stage bucket of a bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    /// The stage title the bucket belongs to.
    pub title: String,
    /// Number of files recorded in the bucket.
    pub file_count: usize,
}

/// Result of storing a batch of files.
///
/// Batches have no rollback: every file is attempted, successes stay on
/// disk even when siblings fail, and the caller reports both lists.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Files written successfully, in input order.
    pub stored: Vec<StoredFile>,
    /// Original names of files that failed, with the reason.
    pub failed: Vec<(String, FileStoreError)>,
}

/// Filesystem-backed media storage, bucketed by operator, bid, and stage.
///
/// Layout: `<root>/<operator_id>/<bid_id>/<stage_prefix>_<HHMMSS>_<name>`.
/// Stage membership is encoded only in the file name prefix, so listing
/// a stage is a prefix scan of the bid directory.
#[derive(Debug, Clone)]
pub struct StageStore {
    root: PathBuf,
}

impl StageStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory itself is created lazily on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding one bid's files.
    #[must_use]
    pub fn bid_dir(&self, operator_id: OperatorId, bid_id: i64) -> PathBuf {
        self.root
            .join(operator_id.to_string())
            .join(bid_id.to_string())
    }

    /// Stores one file into a stage bucket.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError::TooLarge` if the payload exceeds
    /// [`MAX_FILE_BYTES`], `FileStoreError::EmptyFileName` if nothing
    /// usable remains of the name, or `FileStoreError::Io` on write
    /// failure.
    pub async fn record(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        stage_title: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, FileStoreError> {
        self.record_inner(operator_id, bid_id, stage_title, original_name, bytes, None)
            .await
    }

    /// Stores a batch of files into one stage bucket concurrently.
    ///
    /// Every file is attempted regardless of sibling failures; the
    /// outcome lists both what landed and what did not.
    pub async fn record_batch(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        stage_title: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> BatchOutcome {
        let writes = files.iter().enumerate().map(|(index, (name, bytes))| {
            self.record_inner(operator_id, bid_id, stage_title, name, bytes, Some(index))
        });
        let results: Vec<Result<StoredFile, FileStoreError>> = join_all(writes).await;

        let mut outcome: BatchOutcome = BatchOutcome::default();
        for ((name, _), result) in files.iter().zip(results) {
            match result {
                Ok(stored) => outcome.stored.push(stored),
                Err(err) => outcome.failed.push((name.clone(), err)),
            }
        }
        outcome
    }

    /// Lists the files recorded for one stage of a bid.
    ///
    /// A missing bid directory is an empty stage, not an error.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError::Io` if the directory cannot be read.
    pub async fn list_stage(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        stage_title: &str,
    ) -> Result<Vec<StoredFile>, FileStoreError> {
        let wanted: String = format!("{}_", stage_prefix(stage_title));
        let mut files: Vec<StoredFile> = self.list_all(operator_id, bid_id).await?;
        files.retain(|f| f.file_name.starts_with(&wanted));
        Ok(files)
    }

    /// Number of files recorded for one stage of a bid.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError::Io` if the directory cannot be read.
    pub async fn count_in_stage(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        stage_title: &str,
    ) -> Result<usize, FileStoreError> {
        let files: Vec<StoredFile> = self.list_stage(operator_id, bid_id, stage_title).await?;
        Ok(files.len())
    }

    /// Lists every file recorded for a bid, sorted by file name.
    ///
    /// The timestamp sits inside the name, so name order is record order
    /// within a stage.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError::Io` if the directory cannot be read.
    pub async fn list_all(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
    ) -> Result<Vec<StoredFile>, FileStoreError> {
        let dir: PathBuf = self.bid_dir(operator_id, bid_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(FileStoreError::io(&dir, &err)),
        };

        let mut files: Vec<StoredFile> = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => return Err(FileStoreError::io(&dir, &err)),
            };
            let file_name: String = entry.file_name().to_string_lossy().into_owned();
            files.push(StoredFile {
                path: entry.path(),
                kind: MediaKind::from_file_name(&file_name),
                file_name,
            });
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    /// Counts the files in every plan stage plus the additional bucket.
    ///
    /// The additional bucket is always reported last, even when empty.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError::Io` if the directory cannot be read.
    pub async fn summarize(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        plan: &StagePlan,
    ) -> Result<Vec<StageSummary>, FileStoreError> {
        let files: Vec<StoredFile> = self.list_all(operator_id, bid_id).await?;

        let mut summaries: Vec<StageSummary> = Vec::with_capacity(plan.len() + 1);
        for stage in &plan.stages {
            let wanted: String = format!("{}_", stage_prefix(&stage.title));
            let file_count: usize = files
                .iter()
                .filter(|f| f.file_name.starts_with(&wanted))
                .count();
            summaries.push(StageSummary {
                title: stage.title.clone(),
                file_count,
            });
        }

        let wanted: String = format!("{}_", stage_prefix(ADDITIONAL_STAGE_TITLE));
        let file_count: usize = files
            .iter()
            .filter(|f| f.file_name.starts_with(&wanted))
            .count();
        summaries.push(StageSummary {
            title: String::from(ADDITIONAL_STAGE_TITLE),
            file_count,
        });
        Ok(summaries)
    }

    async fn record_inner(
        &self,
        operator_id: OperatorId,
        bid_id: i64,
        stage_title: &str,
        original_name: &str,
        bytes: &[u8],
        discriminator: Option<usize>,
    ) -> Result<StoredFile, FileStoreError> {
        if bytes.len() > MAX_FILE_BYTES {
            return Err(FileStoreError::TooLarge {
                name: original_name.to_string(),
                size: bytes.len(),
                max: MAX_FILE_BYTES,
            });
        }

        let safe_name: String = sanitize_file_name(original_name)?;
        let prefix: String = stage_prefix(stage_title);
        let stamp: String = clock_stamp(OffsetDateTime::now_utc());

        let dir: PathBuf = self.bid_dir(operator_id, bid_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|err| FileStoreError::io(&dir, &err))?;

        // Batch members carry their index so concurrent writes in the
        // same second cannot collide.
        let mut file_name: String = discriminator.map_or_else(
            || format!("{prefix}_{stamp}_{safe_name}"),
            |index| format!("{prefix}_{stamp}_{index}_{safe_name}"),
        );
        let mut attempt: usize = 0;
        let mut path: PathBuf = dir.join(&file_name);
        while tokio::fs::try_exists(&path)
            .await
            .map_err(|err| FileStoreError::io(&path, &err))?
        {
            attempt += 1;
            file_name = format!("{prefix}_{stamp}_r{attempt}_{safe_name}");
            path = dir.join(&file_name);
        }

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|err| FileStoreError::io(&path, &err))?;

        Ok(StoredFile {
            kind: MediaKind::from_file_name(&file_name),
            path,
            file_name,
        })
    }
}

fn sanitize_file_name(original: &str) -> Result<String, FileStoreError> {
    // Only the final path component survives; separators and control
    // characters are dropped.
    let base: &str = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '/' && *c != '\\')
        .collect();
    let trimmed: &str = cleaned.trim_matches(['.', ' ']);
    if trimmed.is_empty() {
        return Err(FileStoreError::EmptyFileName);
    }
    Ok(trimmed.to_string())
}

fn clock_stamp(now: OffsetDateTime) -> String {
    format!(
        "{:02}{:02}{:02}",
        now.hour(),
        now.minute(),
        now.second()
    )
}
