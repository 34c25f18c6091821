// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Title of the rework-only "additional materials" bucket.
///
/// Not part of the ordered stage plan: it is re-entrant and reachable
/// only through the rework branch.
pub const ADDITIONAL_STAGE_TITLE: &str = "Additional materials";

/// One step of the mandatory media-collection checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Human-facing stage title (may contain emoji; the storage prefix is
    /// derived from it via [`stage_prefix`]).
    pub title: String,
    /// Short instruction shown to the operator.
    #[serde(default)]
    pub description: String,
    /// Whether at least one file is required before advancing.
    pub required: bool,
}

/// The ordered list of mandatory photo/video stages.
///
/// This is configuration data, not code: deployments load it from a file
/// and the wizard walks it by index. The plan must never be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    /// Ordered stage descriptors.
    pub stages: Vec<StageDescriptor>,
}

impl StagePlan {
    /// Creates a plan from descriptors.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyStagePlan` if no stages are given.
    pub fn new(stages: Vec<StageDescriptor>) -> Result<Self, DomainError> {
        if stages.is_empty() {
            return Err(DomainError::EmptyStagePlan);
        }
        Ok(Self { stages })
    }

    /// The default single-stage plan used by the motors deployment.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            stages: vec![StageDescriptor {
                title: String::from("All vehicle photos and video"),
                description: String::from(
                    "Send all photos of the vehicle (an album is fine), plus a walkaround video",
                ),
                required: true,
            }],
        }
    }

    /// Number of stages in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns whether the plan has no stages.
    ///
    /// Always false for a validated plan; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Returns the stage at the given zero-based index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StageDescriptor> {
        self.stages.get(index)
    }

    /// Returns the stage whose title matches, if any.
    #[must_use]
    pub fn by_title(&self, title: &str) -> Option<&StageDescriptor> {
        self.stages.iter().find(|s| s.title == title)
    }

    /// Returns whether `index` is the last mandatory stage.
    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.stages.len()
    }
}

/// Declared media kind of an uploaded file.
///
/// Inferred from the file extension only, never from a declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
    /// Anything else (documents, archives, unknown extensions).
    Other,
}

impl MediaKind {
    /// Infers the media kind from a file name's extension.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        let ext: String = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" => Self::Photo,
            "mp4" | "mov" | "mkv" | "avi" | "webm" | "m4v" => Self::Video,
            _ => Self::Other,
        }
    }

    /// The stable storage name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Other => "other",
        }
    }
}

/// Canonicalizes a stage title into the filename prefix that encodes
/// stage membership in storage.
///
/// Exactly one scheme: non-alphanumeric characters (emoji, punctuation)
/// are dropped, whitespace runs collapse to a single underscore. Stage
/// membership is recoverable from a stored filename by matching
/// `<prefix>_` at the start.
#[must_use]
pub fn stage_prefix(stage_title: &str) -> String {
    let mut out: String = String::with_capacity(stage_title.len());
    let mut pending_sep: bool = false;
    for ch in stage_title.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        String::from("Unknown")
    } else {
        out
    }
}
