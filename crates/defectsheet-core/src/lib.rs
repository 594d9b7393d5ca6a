// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defectsheet — Report model, capacity policy and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod policy;
pub mod types;

pub use config::ReportConfig;
pub use error::ReportError;
pub use policy::{CapacityPolicy, SignaturePlacement};
pub use types::*;
