// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors produced by the stage file store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStoreError {
    /// An underlying filesystem operation failed.
    Io {
        /// The path the operation was targeting.
        path: String,
        /// The operating system error text.
        message: String,
    },
    /// The file exceeds the per-file size limit.
    TooLarge {
        /// The offending file name.
        name: String,
        /// Actual size in bytes.
        size: usize,
        /// The configured limit in bytes.
        max: usize,
    },
    /// The file name is empty after sanitization.
    EmptyFileName,
}

impl FileStoreError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for FileStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "filesystem error at {path}: {message}")
            }
            Self::TooLarge { name, size, max } => {
                write!(f, "file {name} is {size} bytes, limit is {max}")
            }
            Self::EmptyFileName => {
                write!(f, "file name is empty after sanitization")
            }
        }
    }
}

impl std::error::Error for FileStoreError {}
