use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Number of cells in a column, one per day of the week.
pub const COLUMN_LEN: usize = 7;

/// Color of a day without any activity.
pub const EMPTY_COLOR: &str = "#ebedf0";

const COLUMN_KEY_PREFIX: &str = "w";

/// Opaque color token as found in the source document, e.g. `#196127`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorCell(pub String);

impl ColorCell {
    pub fn new<S: Into<String>>(token: S) -> ColorCell {
        ColorCell(token.into())
    }

    pub fn empty() -> ColorCell {
        ColorCell(EMPTY_COLOR.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One week of the calendar, at most [`COLUMN_LEN`] slots in source order.
///
/// A slot is `None` when the source listed a day without a color. Days the
/// source did not list at all are simply absent: `len` can be below seven.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorColumn {
    cells: Vec<Option<ColorCell>>,
}

impl ColorColumn {
    /// Fills the slots positionally. Tokens past the seventh are dropped.
    pub fn from_tokens<I, S>(tokens: I) -> ColorColumn
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        ColorColumn {
            cells: tokens
                .into_iter()
                .take(COLUMN_LEN)
                .map(|token| token.map(ColorCell::new))
                .collect(),
        }
    }

    pub fn cells(&self) -> &[Option<ColorCell>] {
        &self.cells
    }

    /// Number of days listed by the source, colored or not.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&ColorCell> {
        position
            .checked_sub(1)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
    }

    pub fn set_cells_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Columns in chronological order.
///
/// On the wire a grid is a JSON object keyed `w0`, `w1`, ... Keys are written in
/// column order, but readers must not rely on object key order: the order is
/// re-derived from the numeric part of the key when deserializing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorGrid {
    columns: Vec<ColorColumn>,
}

impl ColorGrid {
    pub fn new(columns: Vec<ColorColumn>) -> ColorGrid {
        ColorGrid { columns }
    }

    pub fn push(&mut self, column: ColorColumn) {
        self.columns.push(column);
    }

    pub fn columns(&self) -> &[ColorColumn] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn parse_column_key(key: &str) -> Option<usize> {
    key.strip_prefix(COLUMN_KEY_PREFIX)?.parse().ok()
}

impl Serialize for ColorGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (index, column) in self.columns.iter().enumerate() {
            map.serialize_entry(&format!("{}{}", COLUMN_KEY_PREFIX, index), column)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColorGrid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, serde_json::Value> = HashMap::deserialize(deserializer)?;

        let mut indexed = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            let Some(index) = parse_column_key(&key) else {
                continue;
            };
            let tokens: Vec<Option<String>> =
                serde_json::from_value(value).map_err(D::Error::custom)?;
            indexed.push((index, ColorColumn::from_tokens(tokens)));
        }
        indexed.sort_by_key(|(index, _)| *index);

        Ok(ColorGrid::new(
            indexed.into_iter().map(|(_, column)| column).collect(),
        ))
    }
}
