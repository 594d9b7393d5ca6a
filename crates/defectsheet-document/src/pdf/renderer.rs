// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page renderer — draws planned pages into a printpdf document.
//
// Photos are embedded as they are reached; the document is serialised only
// by `finish`, so a run that stops early never produces a file.

use ::image::RgbImage;
use chrono::NaiveDate;
use defectsheet_core::ReportConfig;
use defectsheet_core::error::{ReportError, Result};
use defectsheet_core::types::{EntryId, Image, PaperSize, ReportHeader};
use printpdf::{
    FontId, Mm, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage,
    RawImageData, RawImageFormat, XObjectId,
};
use tracing::{debug, info, instrument, warn};

use super::layout::{Canvas, Face, Frame, Tint, chars_per_line, wrap_text};
use crate::descriptor::{
    EntryMainPage, EntryOverflowPage, InfoPage, PageDescriptor, RunningMetadata,
};
use crate::driver::PageRenderer;
use crate::photo::ImageStore;

const MARGIN: f32 = 40.0;
const BODY_SIZE: f32 = 11.0;
const ROW_HEIGHT: f32 = 18.0;
/// Horizontal offset of field values from the left margin.
const VALUE_OFFSET: f32 = 130.0;
const LEAD_IMAGE_HEIGHT: f32 = 220.0;
const MIN_LEAD_IMAGE_HEIGHT: f32 = 90.0;
/// Gap above the lead image plus its caption.
const LEAD_IMAGE_CHROME: f32 = 30.0;
/// Banner and title above the field rows of a main page.
const MAIN_HEADING: f32 = 72.0;
/// Field rows a main page may need: four fields, description, spacing.
const MAIN_ROWS: f32 = 6.0;
/// Description font sizes tried in order until the text fits.
const DESCRIPTION_SIZES: [f32; 5] = [11.0, 10.0, 9.0, 8.0, 7.0];
const OVERFLOW_IMAGE_MAX_HEIGHT: f32 = 260.0;
const MIN_OVERFLOW_IMAGE_HEIGHT: f32 = 60.0;
/// Banner and entry line above the images of an overflow page.
const OVERFLOW_HEADING: f32 = 50.0;
const CAPTION_GAP: f32 = 14.0;
/// Vertical space reserved above the bottom margin for the signing block.
const SIGNING_BLOCK_HEIGHT: f32 = 80.0;
/// Vertical space reserved above the bottom margin for the page counter.
const FOOTER_HEIGHT: f32 = 24.0;

/// Renders report pages with an embedded font, or builtin Helvetica when
/// none is given.
pub struct PdfReportRenderer<'s> {
    doc: PdfDocument,
    header: ReportHeader,
    images: &'s ImageStore,
    paper_size: PaperSize,
    watermark: bool,
    font: Option<FontId>,
}

impl<'s> PdfReportRenderer<'s> {
    pub fn new(header: &ReportHeader, images: &'s ImageStore, paper_size: PaperSize) -> Self {
        let title = format!("Damage report {} {}", header.project_name, header.room_number);
        Self {
            doc: PdfDocument::new(title.trim()),
            header: header.clone(),
            images,
            paper_size,
            watermark: true,
            font: None,
        }
    }

    pub fn from_config(header: &ReportHeader, images: &'s ImageStore, config: &ReportConfig) -> Self {
        Self::new(header, images, config.paper_size).with_watermark(config.watermark)
    }

    pub fn with_watermark(mut self, enabled: bool) -> Self {
        self.watermark = enabled;
        self
    }

    /// Embed a TrueType/OpenType font and write all page text with it.
    pub fn with_font(mut self, bytes: &[u8]) -> Result<Self> {
        let parsed = parse_font(bytes)?;
        self.font = Some(self.doc.add_font(&parsed));
        Ok(self)
    }

    /// Reject paper sizes too short for the pages `config` will produce.
    ///
    /// A main page must hold its heading, every field row and a lead image
    /// of at least the minimum height; an overflow page must hold a full
    /// batch of minimum-height images.
    pub fn check_layout(config: &ReportConfig) -> Result<()> {
        let (_, height_mm) = config.paper_size.dimensions_mm();
        let height = Mm(height_mm as f32).into_pt().0;
        let signatures = config.signature_placement;

        let main = MAIN_HEADING
            + MAIN_ROWS * ROW_HEIGHT
            + MIN_LEAD_IMAGE_HEIGHT
            + LEAD_IMAGE_CHROME
            + body_floor(signatures.on_main_pages());
        let overflow = OVERFLOW_HEADING
            + config.overflow_batch_size as f32 * overflow_slot_minimum()
            + body_floor(signatures.on_overflow_pages());
        let required = MARGIN + main.max(overflow);

        if height < required {
            return Err(ReportError::Configuration(format!(
                "page height {}mm is below the {:.0}mm needed for a lead image and \
                 {} images per overflow page",
                height_mm,
                required * 25.4 / 72.0,
                config.overflow_batch_size
            )));
        }
        Ok(())
    }

    /// Assemble the rendered pages and serialise the document.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn finish(mut self, pages: Vec<PdfPage>) -> Vec<u8> {
        self.doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }
        info!(bytes = output.len(), "Report PDF serialised");
        output
    }

    fn page_size_pt(&self) -> (f32, f32) {
        let (w, h) = self.paper_size.dimensions_mm();
        (Mm(w as f32).into_pt().0, Mm(h as f32).into_pt().0)
    }

    // -- Shared furniture -----------------------------------------------------

    fn draw_watermark(&self, canvas: &mut Canvas, page_height: f32) {
        if !self.watermark {
            return;
        }
        let middle = page_height / 2.0;
        canvas.set_color(Tint::WATERMARK);
        canvas.text_centered(middle + 40.0, 44.0, Face::Bold, &self.header.project_name);
        canvas.text_centered(middle - 10.0, 36.0, Face::Bold, &self.header.room_number);
        canvas.text_centered(
            middle - 50.0,
            12.0,
            Face::Regular,
            &format!(
                "For damage reporting of {} room {} only",
                self.header.project_name, self.header.room_number
            ),
        );
        canvas.set_color(Tint::BLACK);
    }

    fn draw_footer(&self, canvas: &mut Canvas, running: RunningMetadata, signing_block: bool) {
        canvas.set_color(Tint::GREY);
        canvas.text(
            MARGIN,
            MARGIN,
            10.0,
            Face::Regular,
            &format!("Page {} / {}", running.page_number, running.total_pages),
        );
        canvas.set_color(Tint::BLACK);

        if signing_block {
            let right = canvas.width() - MARGIN;
            let mut y = MARGIN + SIGNING_BLOCK_HEIGHT - 12.0;
            for (face, text) in [
                (Face::Bold, "Signed"),
                (Face::Regular, "______________________________"),
                (Face::Regular, "(resident)"),
                (Face::Regular, "Damage reporter"),
            ] {
                canvas.text_right(right, y, BODY_SIZE, face, text);
                y -= 16.0;
            }
        }
    }

    /// "Room X" on the left, `right_text` on the right.
    fn draw_banner(&self, canvas: &mut Canvas, y: f32, right_text: &str) {
        canvas.set_color(Tint::ACCENT);
        canvas.text(
            MARGIN,
            y,
            12.0,
            Face::Bold,
            &format!("Room {}", self.header.room_number),
        );
        canvas.text_right(canvas.width() - MARGIN, y, 12.0, Face::Bold, right_text);
        canvas.set_color(Tint::BLACK);
    }

    fn draw_row(canvas: &mut Canvas, y: f32, label: &str, value: &str) {
        canvas.text(MARGIN, y, BODY_SIZE, Face::Bold, label);
        canvas.text(MARGIN + VALUE_OFFSET, y, BODY_SIZE, Face::Regular, value);
    }

    // -- Photos ---------------------------------------------------------------

    /// Decode the stored payload for `image`.
    fn decode(&self, entry: EntryId, image: &Image) -> Result<RgbImage> {
        let payload = self
            .images
            .get(entry, image.id)
            .ok_or(ReportError::MissingImage {
                entry,
                image: image.id,
            })?;

        let decoded = ::image::load_from_memory(payload.data()).map_err(|err| {
            ReportError::ImageError(format!(
                "failed to decode image {} of {}: {}",
                image.ordinal + 1,
                entry,
                err
            ))
        })?;
        Ok(decoded.to_rgb8())
    }

    /// Decode `image` and add it to the document.
    fn embed(&mut self, entry: EntryId, image: &Image) -> Result<(XObjectId, u32, u32)> {
        let rgb = self.decode(entry, image)?;
        let (width, height) = rgb.dimensions();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let id = self.doc.add_image(&raw);
        debug!(width, height, ordinal = image.ordinal, "Image embedded");
        Ok((id, width, height))
    }

    /// Place `image` inside `frame` with its caption underneath.
    fn draw_photo(
        &mut self,
        canvas: &mut Canvas,
        entry: EntryId,
        image: &Image,
        number: usize,
        frame: Frame,
    ) -> Result<()> {
        let (id, width, height) = self.embed(entry, image)?;
        let placed = canvas.image(id, width, height, frame);
        canvas.set_color(Tint::GREY);
        canvas.text_centered(
            placed.y - CAPTION_GAP,
            10.0,
            Face::Regular,
            &format!("Image {number}"),
        );
        canvas.set_color(Tint::BLACK);
        Ok(())
    }

    // -- Page kinds -----------------------------------------------------------

    fn draw_info(&self, canvas: &mut Canvas, page: &InfoPage<'_>, top: f32) {
        let header = page.header;
        let mut y = top - 24.0;

        canvas.set_color(Tint::ACCENT);
        canvas.text_centered(y, 24.0, Face::Bold, &header.project_name);
        canvas.set_color(Tint::BLACK);
        y -= 34.0;
        canvas.text_centered(
            y,
            18.0,
            Face::Bold,
            &format!("No. {}   Floor {}", header.room_number, header.floor),
        );
        y -= 44.0;

        let mut rows = vec![
            ("Resident", header.resident_name.clone()),
            ("Residence", header.residence_label()),
        ];
        if let Some(phone) = non_blank(header.phone_number.as_deref()) {
            rows.push(("Phone", phone.to_owned()));
        }
        if let Some(email) = non_blank(header.email.as_deref()) {
            rows.push(("Email", email.to_owned()));
        }
        for (label, value) in &rows {
            Self::draw_row(canvas, y, label, value);
            y -= ROW_HEIGHT;
        }

        y -= 24.0;
        canvas.text_centered(y, 16.0, Face::Bold, "Damage list");
        y -= ROW_HEIGHT + 6.0;
        canvas.text_right(
            canvas.width() - MARGIN,
            y,
            BODY_SIZE,
            Face::Regular,
            &format!("Report date: {}", format_date(page.report_date)),
        );
    }

    fn draw_entry_main(
        &mut self,
        canvas: &mut Canvas,
        page: &EntryMainPage<'_>,
        top: f32,
    ) -> Result<()> {
        let entry = page.entry;
        let number = page.entry_index + 1;
        let mut y = top - 12.0;

        self.draw_banner(
            canvas,
            y,
            &format!("Point {} of {}", number, page.entry_count),
        );
        y -= 32.0;

        canvas.text(
            MARGIN,
            y,
            18.0,
            Face::Bold,
            &format!("{}. {}", number, entry.category.label()),
        );
        y -= 28.0;

        if let Some(room) = entry.room_label() {
            Self::draw_row(canvas, y, "Room", &room);
            y -= ROW_HEIGHT;
        }
        Self::draw_row(canvas, y, "Damage type", entry.category.detail_label());
        y -= ROW_HEIGHT;
        if let Some(area) = entry.structural_area_label() {
            Self::draw_row(canvas, y, "Structural area", &area);
            y -= ROW_HEIGHT;
        }
        if let Some(location) = non_blank(Some(entry.location.as_str())) {
            Self::draw_row(canvas, y, "Location", location);
            y -= ROW_HEIGHT;
        }

        let floor = body_floor(page.signing_block);
        // Smallest lead image kept before the description font shrinks.
        let image_reserve = if page.lead_image.is_some() {
            MIN_LEAD_IMAGE_HEIGHT + LEAD_IMAGE_CHROME + ROW_HEIGHT
        } else {
            0.0
        };

        if let Some(description) = entry.description_text() {
            canvas.text(MARGIN, y, BODY_SIZE, Face::Bold, "Description");
            let width = canvas.width() - 2.0 * MARGIN - VALUE_OFFSET;
            let block = fit_description(description, width, y - floor - image_reserve);
            if block.clipped {
                warn!(
                    entry = %entry.id,
                    lines = block.lines.len(),
                    "Description exceeds the page even at the smallest size"
                );
            }
            for line in &block.lines {
                canvas.text(MARGIN + VALUE_OFFSET, y, block.size, Face::Regular, line);
                y -= block.line_height;
            }
            y -= ROW_HEIGHT - block.line_height;
        }

        if let Some(image) = page.lead_image {
            let height = LEAD_IMAGE_HEIGHT.min(y - LEAD_IMAGE_CHROME - floor);
            if height < MIN_LEAD_IMAGE_HEIGHT {
                return Err(ReportError::LayoutOverflow(format!(
                    "lead image of point {} needs {:.0}pt, {:.0}pt left",
                    number,
                    MIN_LEAD_IMAGE_HEIGHT,
                    height.max(0.0)
                )));
            }
            let frame = Frame {
                x: MARGIN,
                y: y - 10.0 - height,
                width: canvas.width() - 2.0 * MARGIN,
                height,
            };
            self.draw_photo(canvas, entry.id, image, 1, frame)?;
        }

        Ok(())
    }

    fn draw_entry_overflow(
        &mut self,
        canvas: &mut Canvas,
        page: &EntryOverflowPage<'_>,
        top: f32,
    ) -> Result<()> {
        let number = page.entry_index + 1;
        let mut y = top - 12.0;

        self.draw_banner(canvas, y, "Additional images");
        y -= 22.0;
        canvas.text(
            MARGIN,
            y,
            BODY_SIZE,
            Face::Regular,
            &format!(
                "{}. {} (point {} of {})",
                number,
                page.entry.category.label(),
                number,
                page.entry_count
            ),
        );
        y -= 16.0;

        let floor = body_floor(page.signing_block);
        let slots = page.images.len().max(1) as f32;
        let slot_height = (y - floor) / slots;
        let image_height = (slot_height - CAPTION_GAP - 10.0).min(OVERFLOW_IMAGE_MAX_HEIGHT);
        if image_height < MIN_OVERFLOW_IMAGE_HEIGHT {
            return Err(ReportError::LayoutOverflow(format!(
                "{} images of point {} need {:.0}pt each, {:.0}pt left",
                page.images.len(),
                number,
                MIN_OVERFLOW_IMAGE_HEIGHT,
                image_height.max(0.0)
            )));
        }

        for (offset, image) in page.images.iter().enumerate() {
            let slot_top = y - offset as f32 * slot_height;
            let frame = Frame {
                x: MARGIN,
                y: slot_top - 4.0 - image_height,
                width: canvas.width() - 2.0 * MARGIN,
                height: image_height,
            };
            self.draw_photo(
                canvas,
                page.entry.id,
                image,
                page.first_image_number + offset,
                frame,
            )?;
        }

        Ok(())
    }
}

impl PageRenderer for PdfReportRenderer<'_> {
    type Page = PdfPage;

    async fn render(
        &mut self,
        descriptor: &PageDescriptor<'_>,
        running: RunningMetadata,
    ) -> Result<PdfPage> {
        let (width, height) = self.page_size_pt();
        let mut canvas = Canvas::new(width, self.font.clone());
        let top = height - MARGIN;

        self.draw_watermark(&mut canvas, height);
        match descriptor {
            PageDescriptor::Info(page) => self.draw_info(&mut canvas, page, top),
            PageDescriptor::EntryMain(page) => self.draw_entry_main(&mut canvas, page, top)?,
            PageDescriptor::EntryOverflow(page) => {
                self.draw_entry_overflow(&mut canvas, page, top)?
            }
        }
        self.draw_footer(&mut canvas, running, descriptor.signing_block());

        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        Ok(PdfPage::new(
            Mm(w_mm as f32),
            Mm(h_mm as f32),
            canvas.into_ops(),
        ))
    }
}

/// Lowest y the page body may reach.
fn body_floor(signing_block: bool) -> f32 {
    MARGIN
        + if signing_block {
            SIGNING_BLOCK_HEIGHT
        } else {
            FOOTER_HEIGHT
        }
}

/// Vertical space one overflow image needs at its minimum size.
fn overflow_slot_minimum() -> f32 {
    MIN_OVERFLOW_IMAGE_HEIGHT + CAPTION_GAP + 10.0
}

/// Parse font bytes; font index 0 of collections.
pub fn parse_font(bytes: &[u8]) -> Result<ParsedFont> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings)
        .ok_or_else(|| ReportError::FontError("not a usable TrueType/OpenType font".into()))?;
    if !warnings.is_empty() {
        debug!(warnings = warnings.len(), "Font parsed with warnings");
    }
    Ok(parsed)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// Wrapped description at the largest size that fits `height`.
struct DescriptionBlock {
    lines: Vec<String>,
    size: f32,
    line_height: f32,
    clipped: bool,
}

/// Shrink the font until every line fits; clip only at the smallest size.
fn fit_description(text: &str, width: f32, height: f32) -> DescriptionBlock {
    let mut block = DescriptionBlock {
        lines: Vec::new(),
        size: BODY_SIZE,
        line_height: BODY_SIZE * 1.35,
        clipped: false,
    };
    for size in DESCRIPTION_SIZES {
        let line_height = size * 1.35;
        let lines = wrap_text(text, chars_per_line(width, size));
        let fits = lines.len() as f32 * line_height <= height;
        block = DescriptionBlock {
            lines,
            size,
            line_height,
            clipped: false,
        };
        if fits {
            return block;
        }
    }

    let capacity = (height / block.line_height).floor().max(1.0) as usize;
    if block.lines.len() > capacity {
        block.lines.truncate(capacity);
        if let Some(last) = block.lines.last_mut() {
            last.push_str("...");
        }
        block.clipped = true;
    }
    block
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
