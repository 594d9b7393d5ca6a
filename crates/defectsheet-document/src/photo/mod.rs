// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photo module — ingestion of uploaded photos and the per-run payload store.

pub mod ingest;
pub mod store;

pub use ingest::ImageIngestor;
pub use store::{ImagePayload, ImageStore};
