// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page planner — lays a report out into page descriptors before anything is
// drawn, so the total page count is known up front.
//
// Capacity is evaluated from counts only, never from measured content, so
// one linear pass over the entries is enough.

use std::collections::HashSet;

use defectsheet_core::error::{ReportError, Result};
use defectsheet_core::policy::{CapacityPolicy, SignaturePlacement};
use defectsheet_core::types::{Entry, ReportDocument};
use tracing::{debug, instrument};

use crate::descriptor::{
    EntryMainPage, EntryOverflowPage, InfoPage, PageDescriptor, RunningMetadata,
};

/// The ordered pages of one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'a> {
    pages: Vec<PageDescriptor<'a>>,
}

impl<'a> Plan<'a> {
    pub fn pages(&self) -> &[PageDescriptor<'a>] {
        &self.pages
    }

    /// Always equal to `pages().len()`.
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Pages paired with their running counters, in output order.
    pub fn numbered(&self) -> impl Iterator<Item = (RunningMetadata, &PageDescriptor<'a>)> {
        let total_pages = self.total_pages();
        self.pages.iter().enumerate().map(move |(index, page)| {
            (
                RunningMetadata {
                    page_number: index + 1,
                    total_pages,
                },
                page,
            )
        })
    }
}

/// Plans pages under a fixed capacity policy and signing-block placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    policy: CapacityPolicy,
    signatures: SignaturePlacement,
}

impl Planner {
    pub fn new(policy: CapacityPolicy) -> Self {
        Self {
            policy,
            signatures: SignaturePlacement::default(),
        }
    }

    pub fn with_signatures(mut self, signatures: SignaturePlacement) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn policy(&self) -> &CapacityPolicy {
        &self.policy
    }

    pub fn signatures(&self) -> SignaturePlacement {
        self.signatures
    }

    /// Lay `document` out into pages.
    ///
    /// Fails with `InvalidDocument` before emitting anything if entry ids
    /// repeat or an entry's image ordinals do not run `0, 1, 2, ...`.
    #[instrument(skip_all, fields(entries = document.entries.len()))]
    pub fn plan<'a>(&self, document: &'a ReportDocument) -> Result<Plan<'a>> {
        validate(document)?;

        let entry_count = document.entries.len();
        let batch_size = self.policy.overflow_batch_size();
        let lead_capacity = self.policy.main_page_image_capacity();
        let expected = 1 + document
            .entries
            .iter()
            .map(|entry| self.policy.pages_for_entry(entry.images.len()))
            .sum::<usize>();

        let mut pages = Vec::with_capacity(expected);
        pages.push(PageDescriptor::Info(InfoPage {
            header: &document.header,
            report_date: document.report_date,
            signing_block: self.signatures.on_info_page(),
        }));

        for (entry_index, entry) in document.entries.iter().enumerate() {
            let (lead, remaining) = entry
                .images
                .split_at(entry.images.len().min(lead_capacity));

            pages.push(PageDescriptor::EntryMain(EntryMainPage {
                entry,
                entry_index,
                entry_count,
                lead_image: lead.first(),
                signing_block: self.signatures.on_main_pages(),
            }));

            for (batch_index, batch) in remaining.chunks(batch_size).enumerate() {
                pages.push(PageDescriptor::EntryOverflow(EntryOverflowPage {
                    entry,
                    entry_index,
                    entry_count,
                    images: batch,
                    first_image_number: lead_capacity + batch_index * batch_size + 1,
                    signing_block: self.signatures.on_overflow_pages(),
                }));
            }
        }

        debug_assert_eq!(pages.len(), expected);
        debug!(
            total_pages = pages.len(),
            images = document.image_count(),
            batch_size,
            "Report planned"
        );

        Ok(Plan { pages })
    }
}

/// Plan with the default signing-block placement.
pub fn plan<'a>(document: &'a ReportDocument, policy: &CapacityPolicy) -> Result<Plan<'a>> {
    Planner::new(*policy).plan(document)
}

// -- Structural checks ----------------------------------------------------------

fn validate(document: &ReportDocument) -> Result<()> {
    let mut seen_entries = HashSet::with_capacity(document.entries.len());
    for (index, entry) in document.entries.iter().enumerate() {
        if !seen_entries.insert(entry.id) {
            return Err(ReportError::InvalidDocument(format!(
                "entry {} at position {} reuses an earlier entry id",
                entry.id,
                index + 1
            )));
        }
        validate_images(entry)?;
    }
    Ok(())
}

fn validate_images(entry: &Entry) -> Result<()> {
    let mut seen_images = HashSet::with_capacity(entry.images.len());
    for (position, image) in entry.images.iter().enumerate() {
        if image.ordinal != position {
            return Err(ReportError::InvalidDocument(format!(
                "entry {}: image {} has ordinal {} at position {}",
                entry.id, image.id, image.ordinal, position
            )));
        }
        if !seen_images.insert(image.id) {
            return Err(ReportError::InvalidDocument(format!(
                "entry {}: image id {} appears more than once",
                entry.id, image.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use defectsheet_core::types::{
        DamageCategory, Image, ImageId, ReportHeader, ResidenceType,
    };

    fn header() -> ReportHeader {
        ReportHeader {
            project_name: "Rhythm".into(),
            room_number: "1204".into(),
            floor: "12".into(),
            resident_name: "Somchai Jaidee".into(),
            residence_type: ResidenceType::Owner,
            residence_other: None,
            phone_number: Some("081-234-5678".into()),
            email: None,
        }
    }

    fn entry_with_images(count: usize) -> Entry {
        let mut entry = Entry::new(DamageCategory::Water);
        for _ in 0..count {
            entry.push_image();
        }
        entry
    }

    fn document(image_counts: &[usize]) -> ReportDocument {
        let entries = image_counts.iter().map(|&n| entry_with_images(n)).collect();
        ReportDocument::new(header(), entries)
    }

    fn policy(batch: usize) -> CapacityPolicy {
        CapacityPolicy::new(batch).unwrap()
    }

    #[test]
    fn empty_document_is_single_info_page() {
        let doc = document(&[]);
        let plan = plan(&doc, &policy(4)).unwrap();
        assert_eq!(plan.total_pages(), 1);
        assert!(matches!(plan.pages()[0], PageDescriptor::Info(_)));
    }

    #[test]
    fn overflow_batches_follow_main_page() {
        // [A(0 images), B(5 images)] with batch 4.
        let doc = document(&[0, 5]);
        let plan = plan(&doc, &policy(4)).unwrap();

        let kinds: Vec<&str> = plan.pages().iter().map(PageDescriptor::kind).collect();
        assert_eq!(kinds, vec!["info", "entry-main", "entry-main", "entry-overflow"]);
        assert_eq!(plan.total_pages(), 4);

        match &plan.pages()[1] {
            PageDescriptor::EntryMain(page) => {
                assert_eq!(page.entry.id, doc.entries[0].id);
                assert!(page.lead_image.is_none());
            }
            other => panic!("expected A main page, got {other:?}"),
        }
        match &plan.pages()[3] {
            PageDescriptor::EntryOverflow(page) => {
                assert_eq!(page.entry.id, doc.entries[1].id);
                assert_eq!(page.images.len(), 4);
                assert_eq!(page.first_image_number, 2);
            }
            other => panic!("expected B overflow page, got {other:?}"),
        }
    }

    #[test]
    fn captions_are_contiguous_per_entry() {
        let doc = document(&[5]);
        let plan = plan(&doc, &policy(3)).unwrap();
        let images = &doc.entries[0].images;

        let per_page: Vec<Vec<(usize, ImageId)>> = plan.pages()[1..]
            .iter()
            .map(|page| page.numbered_images().map(|(n, img)| (n, img.id)).collect())
            .collect();

        assert_eq!(
            per_page,
            vec![
                vec![(1, images[0].id)],
                vec![(2, images[1].id), (3, images[2].id), (4, images[3].id)],
                vec![(5, images[4].id)],
            ]
        );
    }

    #[test]
    fn main_page_carries_first_image_only() {
        let doc = document(&[1]);
        let plan = plan(&doc, &policy(4)).unwrap();
        assert_eq!(plan.total_pages(), 2);
        assert_eq!(plan.pages()[1].images(), &doc.entries[0].images[..1]);
    }

    #[test]
    fn entry_position_is_recorded_on_every_page() {
        let doc = document(&[2, 6]);
        let plan = plan(&doc, &policy(2)).unwrap();
        let positions: Vec<(usize, usize)> = plan
            .pages()
            .iter()
            .filter_map(|page| match page {
                PageDescriptor::EntryMain(p) => Some((p.entry_index, p.entry_count)),
                PageDescriptor::EntryOverflow(p) => Some((p.entry_index, p.entry_count)),
                PageDescriptor::Info(_) => None,
            })
            .collect();
        assert_eq!(
            positions,
            vec![(0, 2), (0, 2), (1, 2), (1, 2), (1, 2), (1, 2)]
        );
    }

    #[test]
    fn duplicate_ordinal_is_rejected() {
        let mut entry = Entry::new(DamageCategory::Electric);
        for ordinal in [0, 0, 2] {
            entry.images.push(Image {
                id: ImageId::new(),
                ordinal,
            });
        }
        let doc = ReportDocument::new(header(), vec![entry]);
        let err = plan(&doc, &policy(3)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidDocument(_)));
    }

    #[test]
    fn gapped_ordinal_is_rejected() {
        let mut entry = Entry::new(DamageCategory::Other);
        for ordinal in [0, 2] {
            entry.images.push(Image {
                id: ImageId::new(),
                ordinal,
            });
        }
        let doc = ReportDocument::new(header(), vec![entry]);
        assert!(matches!(
            plan(&doc, &policy(3)),
            Err(ReportError::InvalidDocument(_))
        ));
    }

    #[test]
    fn repeated_image_id_is_rejected() {
        let mut entry = entry_with_images(2);
        entry.images[1].id = entry.images[0].id;
        let doc = ReportDocument::new(header(), vec![entry]);
        assert!(matches!(
            plan(&doc, &policy(3)),
            Err(ReportError::InvalidDocument(_))
        ));
    }

    #[test]
    fn duplicate_entry_id_is_rejected() {
        let first = entry_with_images(1);
        let mut second = entry_with_images(0);
        second.id = first.id;
        let doc = ReportDocument::new(header(), vec![first, second]);
        assert!(matches!(
            plan(&doc, &policy(3)),
            Err(ReportError::InvalidDocument(_))
        ));
    }

    #[test]
    fn signature_placement_is_applied() {
        let doc = document(&[3]);
        let default_plan = plan(&doc, &policy(1)).unwrap();
        let flags: Vec<bool> = default_plan.pages().iter().map(|p| p.signing_block()).collect();
        assert_eq!(flags, vec![true, true, false, false]);

        let every = Planner::new(policy(1))
            .with_signatures(SignaturePlacement::EveryPage)
            .plan(&doc)
            .unwrap();
        assert!(every.pages().iter().all(|p| p.signing_block()));

        let info_only = Planner::new(policy(1))
            .with_signatures(SignaturePlacement::InfoPageOnly)
            .plan(&doc)
            .unwrap();
        let flags: Vec<bool> = info_only.pages().iter().map(|p| p.signing_block()).collect();
        assert_eq!(flags, vec![true, false, false, false]);
    }

    #[test]
    fn numbered_pages_run_one_to_total() {
        let doc = document(&[0, 3, 9]);
        let plan = plan(&doc, &policy(4)).unwrap();
        let numbers: Vec<usize> = plan.numbered().map(|(meta, _)| meta.page_number).collect();
        assert_eq!(numbers, (1..=plan.total_pages()).collect::<Vec<_>>());
        assert!(plan.numbered().all(|(meta, _)| meta.total_pages == plan.total_pages()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use defectsheet_core::types::{DamageCategory, ReportHeader, ResidenceType};
    use proptest::prelude::*;

    fn document(image_counts: &[usize]) -> ReportDocument {
        let header = ReportHeader {
            project_name: "P".into(),
            room_number: "1".into(),
            floor: "1".into(),
            resident_name: "R".into(),
            residence_type: ResidenceType::Renter,
            residence_other: None,
            phone_number: None,
            email: None,
        };
        let entries = image_counts
            .iter()
            .map(|&count| {
                let mut entry = Entry::new(DamageCategory::Structural);
                for _ in 0..count {
                    entry.push_image();
                }
                entry
            })
            .collect();
        ReportDocument::new(header, entries)
    }

    proptest! {
        /// Property: total page count is one info page plus each entry's share.
        #[test]
        fn total_matches_per_entry_formula(
            counts in prop::collection::vec(0usize..20, 0..12),
            batch in 1usize..6,
        ) {
            let doc = document(&counts);
            let plan = plan(&doc, &CapacityPolicy::new(batch).unwrap()).unwrap();

            let expected: usize = 1 + counts
                .iter()
                .map(|&k| 1 + k.saturating_sub(1).div_ceil(batch))
                .sum::<usize>();
            prop_assert_eq!(plan.total_pages(), expected);
            prop_assert_eq!(plan.total_pages(), plan.pages().len());
        }

        /// Property: every image appears exactly once, in order, with its own number.
        #[test]
        fn every_image_placed_once_in_order(
            counts in prop::collection::vec(0usize..15, 1..8),
            batch in 1usize..5,
        ) {
            let doc = document(&counts);
            let plan = plan(&doc, &CapacityPolicy::new(batch).unwrap()).unwrap();

            for entry in &doc.entries {
                let placed: Vec<(usize, usize)> = plan
                    .pages()
                    .iter()
                    .filter(|page| page.entry_id() == Some(entry.id))
                    .flat_map(|page| page.numbered_images().map(|(n, img)| (n, img.ordinal)))
                    .collect();
                let expected: Vec<(usize, usize)> =
                    (0..entry.images.len()).map(|ordinal| (ordinal + 1, ordinal)).collect();
                prop_assert_eq!(placed, expected);
            }
            for page in plan.pages() {
                if let PageDescriptor::EntryOverflow(overflow) = page {
                    prop_assert!(!overflow.images.is_empty());
                    prop_assert!(overflow.images.len() <= batch);
                }
            }
        }

        /// Property: planning the same document twice gives identical plans.
        #[test]
        fn planning_is_idempotent(
            counts in prop::collection::vec(0usize..10, 0..6),
            batch in 1usize..5,
        ) {
            let doc = document(&counts);
            let policy = CapacityPolicy::new(batch).unwrap();
            let first = plan(&doc, &policy).unwrap();
            let second = plan(&doc, &policy).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
