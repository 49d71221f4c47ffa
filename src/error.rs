use thiserror::Error;

/// Everything that can stop the board from being set up. None of these can
/// happen once the app is running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("pin grid needs at least one row")]
    EmptyGrid,
    #[error("scale with {0} degrees is too short to stack triads on")]
    ScaleTooShort(usize),
    #[error("pitch {0} is outside of the MIDI range")]
    PitchOutOfRange(i16),
    #[error("tempo must be positive, got {0} bpm")]
    Tempo(f32),
    #[error("play field of size {field} can not fit a ball of radius {ball}")]
    FieldSize { field: f32, ball: f32 },
}
