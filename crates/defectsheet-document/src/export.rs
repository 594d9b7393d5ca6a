// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export policy — output file naming and document fingerprinting.

use defectsheet_core::types::ReportHeader;
use sha2::{Digest, Sha256};

/// Name used when the header yields no usable filename component.
pub const FALLBACK_FILENAME: &str = "damage-report.pdf";

/// Derive the output file name: `<project>_<floor>_<room>.pdf`.
///
/// Each component is reduced to a filesystem-safe slug. Blank components
/// are skipped. The same header always yields the same name; names are not
/// unique across reports.
pub fn export_filename(header: &ReportHeader) -> String {
    let parts: Vec<String> = [
        header.project_name.as_str(),
        header.floor.as_str(),
        header.room_number.as_str(),
    ]
    .into_iter()
    .map(slug)
    .filter(|part| !part.is_empty())
    .collect();

    if parts.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    format!("{}.pdf", parts.join("_"))
}

/// Keep letters, digits and combining marks of any script; collapse runs of
/// whitespace, control characters and ASCII punctuation into a single `-`.
fn slug(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch.is_control() || ch.is_ascii_punctuation() {
            pending_dash = true;
        } else {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.push(ch);
        }
    }

    result
}

/// SHA-256 of `data` as a lowercase hex string.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
