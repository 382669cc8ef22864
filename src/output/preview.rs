//! Plain-text grid dump for terminals

use crate::simulation::cells::CellMap;
use crate::spatial::classify::{CellKind, KindGrid};

/// Glyph for a single cell
///
/// Center `#`, Interior `o` (vacant) or `O` (occupied), Empty `.` or its
/// token count.
pub fn cell_glyph(kind: CellKind, tokens: usize) -> char {
    match (kind, tokens) {
        (CellKind::Center, _) => '#',
        (CellKind::Interior, 0) => 'o',
        (CellKind::Interior, _) => 'O',
        (CellKind::Empty, 0) => '.',
        (CellKind::Empty, n) => char::from_digit(n.min(9) as u32, 10).unwrap_or('+'),
    }
}

/// One line per grid row
pub fn text_preview(kinds: &KindGrid, cells: &CellMap) -> String {
    let mut out = String::with_capacity((kinds.width() + 1) * kinds.height());
    for y in 0..kinds.height() as i32 {
        for x in 0..kinds.width() as i32 {
            let kind = kinds.kind(x, y).unwrap_or_default();
            out.push(cell_glyph(kind, cells.count(x, y)));
        }
        out.push('\n');
    }
    out
}
