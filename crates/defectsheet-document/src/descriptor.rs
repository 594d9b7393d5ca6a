// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page descriptors — planned, not-yet-rendered pages.
//
// Descriptors borrow from the `ReportDocument` they were planned from; they
// never own entry data or image payloads.

use chrono::NaiveDate;
use defectsheet_core::types::{Entry, EntryId, Image, PageRef, ReportHeader};
use serde::Serialize;

/// Running counters printed on every page ("page X of N"). Both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunningMetadata {
    pub page_number: usize,
    pub total_pages: usize,
}

/// Cover page: header fields, report date, signing block.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoPage<'a> {
    pub header: &'a ReportHeader,
    pub report_date: NaiveDate,
    pub signing_block: bool,
}

/// First page of an entry: all descriptive fields plus at most its first image.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMainPage<'a> {
    pub entry: &'a Entry,
    /// 0-based position of the entry in the document.
    pub entry_index: usize,
    pub entry_count: usize,
    pub lead_image: Option<&'a Image>,
    pub signing_block: bool,
}

/// Further images of an entry that did not fit on its main page.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryOverflowPage<'a> {
    pub entry: &'a Entry,
    pub entry_index: usize,
    pub entry_count: usize,
    /// Consecutive batch of the entry's images, never longer than the
    /// overflow batch size.
    pub images: &'a [Image],
    /// 1-based caption number of `images[0]`.
    pub first_image_number: usize,
    pub signing_block: bool,
}

/// One physical output page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageDescriptor<'a> {
    Info(InfoPage<'a>),
    EntryMain(EntryMainPage<'a>),
    EntryOverflow(EntryOverflowPage<'a>),
}

impl<'a> PageDescriptor<'a> {
    /// Identity of this page, as carried by render failures.
    pub fn page_ref(&self) -> PageRef {
        match self {
            Self::Info(_) => PageRef::Info,
            Self::EntryMain(page) => PageRef::EntryMain {
                entry: page.entry.id,
                entry_index: page.entry_index,
            },
            Self::EntryOverflow(page) => PageRef::EntryOverflow {
                entry: page.entry.id,
                entry_index: page.entry_index,
                first_image_number: page.first_image_number,
            },
        }
    }

    /// Owning entry, for entry pages.
    pub fn entry_id(&self) -> Option<EntryId> {
        match self {
            Self::Info(_) => None,
            Self::EntryMain(page) => Some(page.entry.id),
            Self::EntryOverflow(page) => Some(page.entry.id),
        }
    }

    pub fn signing_block(&self) -> bool {
        match self {
            Self::Info(page) => page.signing_block,
            Self::EntryMain(page) => page.signing_block,
            Self::EntryOverflow(page) => page.signing_block,
        }
    }

    /// Images placed on this page.
    pub fn images(&self) -> &'a [Image] {
        match self {
            Self::Info(_) => &[],
            Self::EntryMain(page) => page.lead_image.map(std::slice::from_ref).unwrap_or(&[]),
            Self::EntryOverflow(page) => page.images,
        }
    }

    /// Images on this page paired with their 1-based caption numbers.
    pub fn numbered_images(&self) -> impl Iterator<Item = (usize, &'a Image)> + use<'a> {
        let first = match self {
            Self::EntryOverflow(page) => page.first_image_number,
            _ => 1,
        };
        self.images()
            .iter()
            .enumerate()
            .map(move |(offset, image)| (first + offset, image))
    }

    /// Short tag used in plan listings and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::EntryMain(_) => "entry-main",
            Self::EntryOverflow(_) => "entry-overflow",
        }
    }
}
