// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Defectsheet damage reports.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an inspection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an image within its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub Uuid);

impl ImageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ImageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship of the reporting resident to the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResidenceType {
    Owner,
    Renter,
    /// Free-text classification lives in `ReportHeader::residence_other`.
    Other,
}

impl ResidenceType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Renter => "Renter",
            Self::Other => "Other",
        }
    }
}

/// What kind of damage an entry records.
///
/// Adding a category is a compile-time checked change: every label table
/// below is an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DamageCategory {
    Water,
    Electric,
    Structural,
    Other,
}

impl DamageCategory {
    /// Heading shown in the entry title ("1. Water system").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Water => "Water system",
            Self::Electric => "Electrical system",
            Self::Structural => "Structural damage",
            Self::Other => "Other",
        }
    }

    /// Value shown in the "Damage type" field.
    pub fn detail_label(&self) -> &'static str {
        match self {
            Self::Water => "Plumbing",
            Self::Electric => "Electrical system",
            Self::Structural => "Structural damage",
            Self::Other => "Other",
        }
    }

    /// Whether entries of this category show the structural-area field.
    pub fn shows_structural_area(&self) -> bool {
        matches!(self, Self::Structural)
    }
}

/// Room classification for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomType {
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
    Storage,
    Balcony,
    Other,
}

impl RoomType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LivingRoom => "Living room",
            Self::Bedroom => "Bedroom",
            Self::Kitchen => "Kitchen",
            Self::Bathroom => "Bathroom",
            Self::Storage => "Storage room",
            Self::Balcony => "Balcony",
            Self::Other => "Other",
        }
    }
}

/// Part of the structure affected by structural damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructuralArea {
    Ceiling,
    Wall,
    Floor,
    Baseboard,
    Door,
    DoorFrame,
    Other,
}

impl StructuralArea {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ceiling => "Ceiling",
            Self::Wall => "Wall",
            Self::Floor => "Floor",
            Self::Baseboard => "Baseboard",
            Self::Door => "Door",
            Self::DoorFrame => "Door frame",
            Self::Other => "Other",
        }
    }
}

/// Resolve an enum label against its free-text override.
///
/// The override only applies to the `Other` variant and only when non-blank.
fn label_with_override(label: &'static str, is_other: bool, other: Option<&str>) -> String {
    match other.map(str::trim) {
        Some(text) if is_other && !text.is_empty() => text.to_owned(),
        _ => label.to_owned(),
    }
}

/// Display fields printed on the info page and watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub project_name: String,
    pub room_number: String,
    pub floor: String,
    pub resident_name: String,
    pub residence_type: ResidenceType,
    #[serde(default)]
    pub residence_other: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ReportHeader {
    /// Residence classification with the "other" override applied.
    pub fn residence_label(&self) -> String {
        label_with_override(
            self.residence_type.label(),
            self.residence_type == ResidenceType::Other,
            self.residence_other.as_deref(),
        )
    }
}

/// Reference to one photo of an entry. The encoded bytes live in the
/// image store, keyed by `(EntryId, ImageId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    /// 0-based position within the owning entry.
    pub ordinal: usize,
}

/// One inspection finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub category: DamageCategory,
    #[serde(default)]
    pub room: Option<RoomType>,
    #[serde(default)]
    pub other_room: Option<String>,
    #[serde(default)]
    pub structural_area: Option<StructuralArea>,
    #[serde(default)]
    pub other_structural_area: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Entry {
    /// Create an entry with a fresh id and no images.
    pub fn new(category: DamageCategory) -> Self {
        Self {
            id: EntryId::new(),
            category,
            room: None,
            other_room: None,
            structural_area: None,
            other_structural_area: None,
            location: String::new(),
            description: None,
            images: Vec::new(),
        }
    }

    /// Append an image reference at the next ordinal and return its id.
    pub fn push_image(&mut self) -> ImageId {
        let id = ImageId::new();
        self.images.push(Image {
            id,
            ordinal: self.images.len(),
        });
        id
    }

    /// Room label, or `None` when no room was recorded.
    pub fn room_label(&self) -> Option<String> {
        self.room.map(|room| {
            label_with_override(
                room.label(),
                room == RoomType::Other,
                self.other_room.as_deref(),
            )
        })
    }

    /// Structural-area label. Only structural entries show this field.
    pub fn structural_area_label(&self) -> Option<String> {
        if !self.category.shows_structural_area() {
            return None;
        }
        self.structural_area.map(|area| {
            label_with_override(
                area.label(),
                area == StructuralArea::Other,
                self.other_structural_area.as_deref(),
            )
        })
    }

    /// Description text when present and non-blank.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A complete report: header, ordered entries, and the date stamped on the
/// info page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub entries: Vec<Entry>,
    #[serde(default = "today")]
    pub report_date: NaiveDate,
}

impl ReportDocument {
    /// Build a document dated today (local time).
    pub fn new(header: ReportHeader, entries: Vec<Entry>) -> Self {
        Self {
            header,
            entries,
            report_date: today(),
        }
    }

    /// Override the report date.
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = date;
        self
    }

    /// Total number of image references across all entries.
    pub fn image_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.images.len()).sum()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Identity of one planned page, used to report which page failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageRef {
    Info,
    EntryMain {
        entry: EntryId,
        /// 0-based position of the entry in the document.
        entry_index: usize,
    },
    EntryOverflow {
        entry: EntryId,
        entry_index: usize,
        /// 1-based caption number of the first image on the page.
        first_image_number: usize,
    },
}

impl std::fmt::Display for PageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info page"),
            Self::EntryMain { entry, entry_index } => {
                write!(f, "main page of point {} ({entry})", entry_index + 1)
            }
            Self::EntryOverflow {
                entry,
                entry_index,
                first_image_number,
            } => write!(
                f,
                "overflow page of point {} from image {first_image_number} ({entry})",
                entry_index + 1
            ),
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}
