use serde::{Serialize, Serializer};
use std::fmt;

/// Activity level of a calendar cell, darkest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intensity {
    Darkest,
    Dark,
    Medium,
    Light,
    Empty,
}

/// Calendar palette, darkest to lightest.
const PALETTE: [(&str, Intensity); 5] = [
    ("#196127", Intensity::Darkest),
    ("#239a3b", Intensity::Dark),
    ("#7bc96f", Intensity::Medium),
    ("#c6e48b", Intensity::Light),
    ("#ebedf0", Intensity::Empty),
];

impl Intensity {
    /// Total: tokens outside the palette count as [`Intensity::Empty`].
    pub fn from_color(color: &str) -> Intensity {
        let color = color.trim();
        PALETTE
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(color))
            .map(|(_, intensity)| *intensity)
            .unwrap_or(Intensity::Empty)
    }

    pub fn pitch_class(self) -> PitchClass {
        match self {
            Intensity::Darkest => PitchClass::E,
            Intensity::Dark => PitchClass::D,
            Intensity::Medium => PitchClass::B,
            Intensity::Light => PitchClass::A,
            Intensity::Empty => PitchClass::G,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PitchClass {
    E,
    D,
    B,
    A,
    G,
}

impl PitchClass {
    pub fn intensity(self) -> Intensity {
        match self {
            PitchClass::E => Intensity::Darkest,
            PitchClass::D => Intensity::Dark,
            PitchClass::B => Intensity::Medium,
            PitchClass::A => Intensity::Light,
            PitchClass::G => Intensity::Empty,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A pitch class tagged with the 1-based position of its cell in the week.
///
/// The position doubles as the octave when handed to a sound engine, so the
/// same day of the week always sounds in the same register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PitchLabel {
    pub class: PitchClass,
    pub position: u8,
}

impl PitchLabel {
    pub fn new(class: PitchClass, position: u8) -> PitchLabel {
        PitchLabel { class, position }
    }

    pub fn from_color(color: &str, position: u8) -> PitchLabel {
        PitchLabel::new(Intensity::from_color(color).pitch_class(), position)
    }
}

impl fmt::Display for PitchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.position)
    }
}

impl Serialize for PitchLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
