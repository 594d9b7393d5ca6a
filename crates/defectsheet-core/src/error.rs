// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Defectsheet.

use thiserror::Error;

use crate::types::{EntryId, ImageId, PageRef};

/// Top-level error type for all Defectsheet operations.
#[derive(Debug, Error)]
pub enum ReportError {
    // -- Setup --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Planning --
    #[error("invalid report document: {0}")]
    InvalidDocument(String),

    // -- Composition --
    #[error("page {page_number} ({page}) failed to render: {reason}")]
    RenderFailure {
        page_number: usize,
        page: PageRef,
        reason: String,
    },

    #[error("generation cancelled after {rendered} of {total} pages")]
    Cancelled { rendered: usize, total: usize },

    #[error("generation timed out after {seconds}s")]
    TimedOut { seconds: u64 },

    // -- Rendering collaborators --
    #[error("no image payload for image {image} of entry {entry}")]
    MissingImage { entry: EntryId, image: ImageId },

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("page layout does not fit: {0}")]
    LayoutOverflow(String),

    #[error("font error: {0}")]
    FontError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReportError {
    /// Page identity carried by a render failure, if any.
    pub fn failed_page(&self) -> Option<PageRef> {
        match self {
            Self::RenderFailure { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReportError>;
