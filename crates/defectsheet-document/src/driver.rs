// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Composition driver — plan once, then render page by page.
//
// The renderer is never invoked before the plan (and with it the total page
// count) exists. Pages are rendered strictly one after another, in plan
// order. Any failure aborts the whole run; no partial page list escapes.

use std::future::Future;
use std::time::Duration;

use defectsheet_core::error::{ReportError, Result};
use defectsheet_core::types::ReportDocument;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::descriptor::{PageDescriptor, RunningMetadata};
use crate::planner::Planner;

/// Draws one physical page from a planned descriptor.
///
/// Implementations may keep state across calls (fonts, embedded images,
/// the output document itself); the driver holds `&mut self` for the whole
/// run and never renders two pages at once.
pub trait PageRenderer {
    type Page;

    fn render(
        &mut self,
        descriptor: &PageDescriptor<'_>,
        running: RunningMetadata,
    ) -> impl Future<Output = Result<Self::Page>>;
}

/// Rendered pages of a completed run, in document order.
#[derive(Debug)]
pub struct Composition<P> {
    pub pages: Vec<P>,
    pub total_pages: usize,
}

/// Orchestrates planning and rendering for one report.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositionDriver {
    planner: Planner,
}

impl CompositionDriver {
    pub fn new(planner: Planner) -> Self {
        Self { planner }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Plan `document` and render every page through `renderer`.
    ///
    /// `cancel` is checked before each page; once it fires, the run stops
    /// with `ReportError::Cancelled` and the pages rendered so far are
    /// dropped.
    #[instrument(skip_all, fields(entries = document.entries.len()))]
    pub async fn compose<R: PageRenderer>(
        &self,
        document: &ReportDocument,
        renderer: &mut R,
        cancel: &CancellationToken,
    ) -> Result<Composition<R::Page>> {
        let plan = self.planner.plan(document)?;
        let total_pages = plan.total_pages();
        info!(total_pages, "Composing report");

        let mut pages = Vec::with_capacity(total_pages);
        for (running, descriptor) in plan.numbered() {
            if cancel.is_cancelled() {
                info!(rendered = pages.len(), total_pages, "Composition cancelled");
                return Err(ReportError::Cancelled {
                    rendered: pages.len(),
                    total: total_pages,
                });
            }

            let page = renderer
                .render(descriptor, running)
                .await
                .map_err(|err| {
                    warn!(
                        page_number = running.page_number,
                        page = %descriptor.page_ref(),
                        error = %err,
                        "Page render failed, aborting run"
                    );
                    ReportError::RenderFailure {
                        page_number: running.page_number,
                        page: descriptor.page_ref(),
                        reason: err.to_string(),
                    }
                })?;

            debug!(
                page_number = running.page_number,
                kind = descriptor.kind(),
                entry = ?descriptor.entry_id(),
                "Page rendered"
            );
            pages.push(page);
        }

        Ok(Composition { pages, total_pages })
    }

    /// `compose` bounded by a single timeout for the whole run.
    pub async fn compose_with_timeout<R: PageRenderer>(
        &self,
        document: &ReportDocument,
        renderer: &mut R,
        cancel: &CancellationToken,
        limit: Duration,
    ) -> Result<Composition<R::Page>> {
        match tokio::time::timeout(limit, self.compose(document, renderer, cancel)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(seconds = limit.as_secs(), "Composition timed out");
                Err(ReportError::TimedOut {
                    seconds: limit.as_secs(),
                })
            }
        }
    }
}
