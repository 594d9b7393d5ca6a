// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page capacity and signing-block placement.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Images per overflow page when nothing else is configured.
pub const DEFAULT_OVERFLOW_BATCH_SIZE: usize = 4;

/// How many images fit on each kind of entry page.
///
/// The main page of an entry always holds exactly its first image, so the
/// entry text and its lead photo stay together. Every further image goes to
/// overflow pages in batches of `overflow_batch_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPolicy {
    overflow_batch_size: usize,
}

impl CapacityPolicy {
    /// Validate and build a policy. `overflow_batch_size` must be at least 1.
    pub fn new(overflow_batch_size: usize) -> Result<Self> {
        if overflow_batch_size == 0 {
            return Err(ReportError::Configuration(
                "overflow batch size must be at least 1".into(),
            ));
        }
        Ok(Self {
            overflow_batch_size,
        })
    }

    /// Images on an entry's main page. Always 1.
    pub fn main_page_image_capacity(&self) -> usize {
        1
    }

    pub fn overflow_batch_size(&self) -> usize {
        self.overflow_batch_size
    }

    /// Pages an entry with `image_count` images occupies.
    pub fn pages_for_entry(&self, image_count: usize) -> usize {
        let overflow = image_count.saturating_sub(self.main_page_image_capacity());
        1 + overflow.div_ceil(self.overflow_batch_size)
    }
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            overflow_batch_size: DEFAULT_OVERFLOW_BATCH_SIZE,
        }
    }
}

/// Which pages carry the reporter's signing block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePlacement {
    /// Info page and every entry main page; overflow pages stay image-only.
    #[default]
    InfoAndMainPages,
    /// Every page, overflow pages included.
    EveryPage,
    /// Only the info page.
    InfoPageOnly,
}

impl SignaturePlacement {
    pub fn on_info_page(&self) -> bool {
        true
    }

    pub fn on_main_pages(&self) -> bool {
        matches!(self, Self::InfoAndMainPages | Self::EveryPage)
    }

    pub fn on_overflow_pages(&self) -> bool {
        matches!(self, Self::EveryPage)
    }
}
