// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory photo payloads keyed by (entry, image).

use std::collections::HashMap;

use defectsheet_core::types::{EntryId, ImageId};

/// Encoded photo bytes plus their pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImagePayload {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Payloads for one generation run. Read-only while pages are rendered.
#[derive(Debug, Default)]
pub struct ImageStore {
    payloads: HashMap<(EntryId, ImageId), ImagePayload>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the payload for `(entry, image)`.
    pub fn insert(&mut self, entry: EntryId, image: ImageId, payload: ImagePayload) {
        self.payloads.insert((entry, image), payload);
    }

    pub fn get(&self, entry: EntryId, image: ImageId) -> Option<&ImagePayload> {
        self.payloads.get(&(entry, image))
    }

    pub fn contains(&self, entry: EntryId, image: ImageId) -> bool {
        self.payloads.contains_key(&(entry, image))
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Total encoded bytes held.
    pub fn total_bytes(&self) -> usize {
        self.payloads.values().map(|payload| payload.data.len()).sum()
    }
}
