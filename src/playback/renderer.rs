use super::scheduler::RenderSurface;
use crate::grid::COLUMN_LEN;
use crate::sequence::{ChordEvent, Intensity, PitchLabel};

/// One drawn cell. The label is only a display class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedCell {
    pub label: PitchLabel,
}

impl RenderedCell {
    pub fn class_name(&self) -> String {
        self.label.to_string()
    }

    fn glyph(&self) -> char {
        match self.label.class.intensity() {
            Intensity::Darkest => '█',
            Intensity::Dark => '▓',
            Intensity::Medium => '▒',
            Intensity::Light => '░',
            Intensity::Empty => '·',
        }
    }
}

/// Seven slots, one per day, indexed by label position.
pub type RenderedRow = [Option<RenderedCell>; COLUMN_LEN];

const BLANK_GLYPH: char = ' ';

/// In-memory contribution graph, one row per played week.
#[derive(Debug, Default)]
pub struct GraphRenderer {
    rows: Vec<RenderedRow>,
    resets: usize,
}

impl GraphRenderer {
    pub fn new() -> GraphRenderer {
        GraphRenderer::default()
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// How many times the surface was wiped.
    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn row_to_text(row: &[Option<RenderedCell>]) -> String {
        row.iter()
            .map(|cell| cell.as_ref().map_or(BLANK_GLYPH, RenderedCell::glyph))
            .collect()
    }

    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| GraphRenderer::row_to_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl RenderSurface for GraphRenderer {
    fn render_row(&mut self, event: &ChordEvent) {
        let mut row: RenderedRow = Default::default();
        for label in &event.pitches {
            let slot = (label.position as usize)
                .checked_sub(1)
                .and_then(|index| row.get_mut(index));
            if let Some(slot) = slot {
                *slot = Some(RenderedCell { label: *label });
            }
        }
        self.rows.push(row);
    }

    fn reset_surface(&mut self) {
        self.rows.clear();
        self.resets += 1;
    }
}
