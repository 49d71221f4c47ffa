use crate::{
    error::SetupError,
    field::PlayField,
    music::{build_extended_scale, Pitch, Scale, ScaleKind},
    utils::*,
};
use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

/// What a replay does to tracks of a replay that is still running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOverlap {
    /// New tracks are layered over the running ones.
    #[default]
    Stack,
    /// Running tracks are dropped first.
    Restart,
}

#[derive(Debug, Clone, Resource)]
pub struct BoardSettings {
    /// Pins in the widest row.
    pub rows: usize,
    /// Side length of the square play field.
    pub field_size: f32,
    pub pin_radius: f32,
    pub ball_radius: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Downward acceleration in field units per second squared.
    pub gravity: f32,
    /// Distance from the top of the field at which balls are dropped.
    pub drop_height: f32,
    pub scale: ScaleKind,
    pub root: Pitch,
    pub octave: i8,
    /// Length of notes played when a ball strikes a pin.
    pub live_note: P32,
    /// Length of notes played by a replay.
    pub replay_note: P32,
    /// Beats per minute, one replay step per beat.
    pub tempo: P32,
    pub overlap: ReplayOverlap,
    /// Fixes chord assignment when set.
    pub seed: Option<u64>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rows: 6,
            field_size: 640.,
            pin_radius: 5.,
            ball_radius: 18.,
            restitution: 0.7,
            friction: 0.3,
            gravity: 980.,
            drop_height: 50.,
            scale: ScaleKind::Major,
            root: 48,
            octave: 0,
            live_note: p32(0.4),
            replay_note: p32(0.6),
            tempo: p32(120.),
            overlap: ReplayOverlap::Stack,
            seed: None,
        }
    }
}

impl BoardSettings {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.rows < 1 {
            return Err(SetupError::EmptyGrid);
        }
        if self.tempo.raw() <= 0. {
            return Err(SetupError::Tempo(self.tempo.raw()));
        }
        if !(self.field_size.is_finite() && self.ball_radius * 2. < self.field_size) {
            return Err(SetupError::FieldSize {
                field: self.field_size,
                ball: self.ball_radius,
            });
        }
        Ok(())
    }

    pub fn extended_scale(&self) -> Result<Scale, SetupError> {
        build_extended_scale(self.scale.degrees(), self.root, self.octave)
    }

    /// Time between two replay steps.
    pub fn beat(&self) -> R64 {
        r64(60. / self.tempo.raw() as f64)
    }

    pub fn play_field(&self) -> PlayField {
        PlayField::square(self.field_size)
    }

    pub fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}
