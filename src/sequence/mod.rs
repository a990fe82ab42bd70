mod mapper;
mod pitch;

pub use mapper::{map_column, map_to_sequence, ChordEvent, STEP};
pub use pitch::{Intensity, PitchClass, PitchLabel};
