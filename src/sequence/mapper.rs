use super::{Intensity, PitchLabel};
use crate::grid::{ColorColumn, ColorGrid};
use serde::Serialize;

/// Logical ticks between two consecutive weeks.
pub const STEP: u64 = 10;

/// Pitches sounding together at `offset` ticks from the start of the sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChordEvent {
    pub offset: u64,
    pub pitches: Vec<PitchLabel>,
}

/// Pitches of a week in cell order, suffixed with their own position. A day
/// without a color sounds like an empty day; days missing from a short week
/// add nothing.
pub fn map_column(column: &ColorColumn) -> Vec<PitchLabel> {
    column
        .cells()
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let position = (index + 1) as u8;
            match cell {
                Some(cell) => PitchLabel::from_color(cell.as_str(), position),
                None => PitchLabel::new(Intensity::Empty.pitch_class(), position),
            }
        })
        .collect()
}

/// One chord per week, `STEP` ticks apart, in grid order.
pub fn map_to_sequence(grid: &ColorGrid) -> Vec<ChordEvent> {
    grid.iter()
        .enumerate()
        .map(|(index, column)| ChordEvent {
            offset: index as u64 * STEP,
            pitches: map_column(column),
        })
        .collect()
}
