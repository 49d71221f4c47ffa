use crate::error::SetupError;
use bevy::prelude::*;
use derive_more::From;
use std::ops::Index;

/// MIDI note number.
pub type Pitch = u8;

/// Position of a note inside a stacked triad. Every voice owns one synth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Root,
    Third,
    Fifth,
}

impl Voice {
    pub const ALL: [Voice; 3] = [Voice::Root, Voice::Third, Voice::Fifth];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Component)]
pub struct Chord(pub [Pitch; 3]);

impl Chord {
    pub fn notes(&self) -> impl '_ + Iterator<Item = (Voice, Pitch)> {
        Voice::ALL.into_iter().zip(self.0)
    }
}

impl Index<Voice> for Chord {
    type Output = Pitch;

    fn index(&self, voice: Voice) -> &Pitch {
        &self.0[voice.index()]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    #[default]
    Major,
    Minor,
    MajorPentatonic,
    Locrian,
}

impl ScaleKind {
    /// Semitone offsets of one octave, closed by the octave itself.
    pub fn degrees(self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11, 12],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10, 12],
            Self::MajorPentatonic => &[0, 2, 4, 7, 9, 12],
            Self::Locrian => &[0, 1, 3, 5, 6, 8, 10, 12],
        }
    }
}

/// A base scale spread over two octaves and moved onto its root.
#[derive(Debug, Clone, PartialEq, Eq, Resource)]
pub struct Scale {
    pitches: Vec<Pitch>,
    degrees_per_octave: usize,
}

impl std::ops::Deref for Scale {
    type Target = [Pitch];

    fn deref(&self) -> &[Pitch] {
        &self.pitches
    }
}

impl Scale {
    pub fn degrees_per_octave(&self) -> usize {
        self.degrees_per_octave
    }

    /// Triad stacked in thirds on the given degree.
    pub fn triad(&self, degree: usize) -> Option<Chord> {
        Some(Chord([
            *self.pitches.get(degree)?,
            *self.pitches.get(degree + 2)?,
            *self.pitches.get(degree + 4)?,
        ]))
    }
}

/// `base` must start on the tonic and end on the octave, eg `[0, 2, 4, 5, 7, 9, 11, 12]`.
pub fn build_extended_scale(base: &[u8], root: Pitch, octave: i8) -> Result<Scale, SetupError> {
    // Triads on the top degree of the first octave still need to reach r + 4.
    if base.len() < 4 {
        return Err(SetupError::ScaleTooShort(base.len()));
    }

    let span = base[base.len() - 1] as i16;
    let shift = root as i16 + octave as i16 * 12;

    let pitches = base
        .iter()
        .map(|degree| *degree as i16)
        .chain(base[1..].iter().map(|degree| *degree as i16 + span))
        .map(|offset| offset + shift)
        .map(|pitch| {
            (0..=127)
                .contains(&pitch)
                .then_some(pitch as Pitch)
                .ok_or(SetupError::PitchOutOfRange(pitch))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scale {
        pitches,
        degrees_per_octave: base.len() - 1,
    })
}

pub fn midi_to_hz(pitch: Pitch) -> f32 {
    440. * 2f32.powf((pitch as f32 - 69.) / 12.)
}
