//! Extraction of the contribution calendar from a profile page.
//!
//! The page is HTML, which is not well-formed XML, so only the `<svg>` fragments
//! are handed to the XML reader. A fragment runs from an `<svg` tag to the end
//! tag closing it, nested `svg` elements included. Inside them every `g` element
//! nested in another `g` is one week: its direct children are the days, top to
//! bottom, and their `fill` attribute is the color of the day.

use super::{ColorColumn, ColorGrid};
use crate::error::ParseError;
use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tracing::{debug, warn};

lazy_static! {
    static ref SVG_START_REGEX: Regex =
        Regex::new(r"(?i)<svg\b").expect("Invalid Regex, this should be fixed at runtime.");
}

const GROUP_TAG: &[u8] = b"g";
const FILL_ATTRIBUTE: &[u8] = b"fill";

type Week = Vec<Option<String>>;

struct OpenElement {
    is_group: bool,
    /// Index of the column collecting this element's children, when it is a week.
    column: Option<usize>,
}

/// Parses the document into a grid.
///
/// A document without any svg fragment is not an error, it simply has no weeks.
/// A malformed fragment is skipped unless it holds weeks, then it is an error.
pub fn extract(document: &str) -> Result<ColorGrid, ParseError> {
    let mut weeks: Vec<Week> = vec![];
    let mut from = 0;

    while let Some(found) = SVG_START_REGEX.find_at(document, from) {
        let start = found.start();
        let mut fragment_weeks: Vec<Week> = vec![];

        match read_fragment(&document[start..], &mut fragment_weeks) {
            Ok(length) => {
                weeks.append(&mut fragment_weeks);
                from = start + length;
            }
            Err(err) if fragment_weeks.is_empty() => {
                warn!(
                    "Skipping malformed svg at byte {}: {}",
                    start + err.position,
                    err.message
                );
                from = found.end();
            }
            Err(err) => return Err(ParseError::new(start + err.position, err.message)),
        }
    }

    Ok(ColorGrid::new(
        weeks.into_iter().map(ColorColumn::from_tokens).collect(),
    ))
}

/// Same as [`extract`], but a malformed document is logged and yields an empty grid.
pub fn extract_or_empty(document: &str) -> ColorGrid {
    match extract(document) {
        Ok(grid) => {
            debug!("Extracted {} weeks from document", grid.len());
            grid
        }
        Err(err) => {
            warn!("Could not extract contribution grid: {}", err);
            ColorGrid::default()
        }
    }
}

fn fill_of(element: &BytesStart, position: usize) -> Result<Option<String>, ParseError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|err| ParseError::new(position, err.to_string()))?;
        if attribute.key.as_ref() == FILL_ATTRIBUTE {
            let value = attribute
                .unescape_value()
                .map_err(|err| ParseError::new(position, err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Reads one fragment starting at its `<svg` tag, collecting its weeks.
/// Returns the length of the fragment, up to the end tag closing the svg.
fn read_fragment(fragment: &str, weeks: &mut Vec<Week>) -> Result<usize, ParseError> {
    let mut reader = Reader::from_str(fragment);
    reader.check_end_names(true);

    let mut open: Vec<OpenElement> = vec![];
    let mut open_groups = 0usize;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|err| ParseError::new(position, err.to_string()))?;

        match event {
            Event::Start(ref element) | Event::Empty(ref element) => {
                if let Some(column) = open.last().and_then(|parent| parent.column) {
                    weeks[column].push(fill_of(element, position)?);
                }

                if matches!(event, Event::Start(_)) {
                    let is_group = element.local_name().as_ref() == GROUP_TAG;
                    let column = if is_group && open_groups > 0 {
                        weeks.push(vec![]);
                        Some(weeks.len() - 1)
                    } else {
                        None
                    };
                    if is_group {
                        open_groups += 1;
                    }
                    open.push(OpenElement { is_group, column });
                }
            }
            Event::End(_) => {
                if let Some(closed) = open.pop() {
                    if closed.is_group {
                        open_groups -= 1;
                    }
                }
            }
            Event::Eof => {
                return Err(ParseError::new(
                    reader.buffer_position(),
                    format!("{} unclosed elements", open.len()),
                ))
            }
            _ => {}
        }

        // The outermost svg is closed, or was self-closing.
        if open.is_empty() {
            return Ok(reader.buffer_position());
        }
    }
}
