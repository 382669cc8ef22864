//! Snapshot serialization and terminal previews

pub mod preview;
pub mod snapshot;

pub use preview::{cell_glyph, text_preview};
pub use snapshot::MapSnapshot;
