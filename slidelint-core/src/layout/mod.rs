//! Layout reconstruction
//!
//! Rebuilds reading structure from positioned characters. Each stage is a
//! trait with a single default implementation so the processor can be
//! assembled from alternatives in tests.
//!
//! ## Architecture
//!
//! ```text
//! RawPage.chars
//!     ↓
//! [RunNormalizer]          font cleanup, whitespace filtering, reading order
//!     ↓
//! [LineGrouper]            vertical-center proximity
//!     ↓
//! [ParagraphGrouper]       vertical gap / indent change
//!     ↓
//! [ListStructureDetector]  markers, nesting level, ordinal
//!     ↓
//! Slide.blocks
//!
//! all slides ──► [PageNumberDetector]  labels + sequence continuity
//! ```

pub mod lines;
pub mod lists;
pub mod normalization;
pub mod page_numbers;
pub mod paragraphs;

pub use lines::{LineGrouper, ProximityLineGrouper};
pub use lists::{ListMarker, ListStructureDetector, MarkerListDetector};
pub use normalization::{clean_font_name, FontNameNormalizer, FontStyle, RunNormalizer};
pub use page_numbers::{
    PageNumberCandidate, PageNumberDetector, PageNumberFormat, PageNumberStatistics,
    ZonePageNumberDetector,
};
pub use paragraphs::{GapIndentParagraphGrouper, ParagraphGrouper};
