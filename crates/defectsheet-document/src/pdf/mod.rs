// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page canvas helpers and the report page renderer.

pub mod layout;
pub mod renderer;

pub use renderer::{PdfReportRenderer, parse_font};
