use crate::{
    error::SetupError,
    field::PlayField,
    music::{Chord, Scale},
    physics::pin_body,
    settings::BoardSettings,
};
use bevy::prelude::*;
use itertools::Itertools;
use rand::Rng;

/// Row and column of a pin, counted from the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Component)]
pub struct PinId {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: PinId,
    /// Field coordinates.
    pub position: Vec2,
    pub radius: f32,
    pub chord: Chord,
}

/// Number of pins in each row of a diamond whose widest row holds `rows` pins.
pub fn row_lengths(rows: usize) -> impl Iterator<Item = usize> {
    (1..=rows).chain((1..rows).rev())
}

#[derive(Debug, Clone, Deref, Resource)]
pub struct PinGrid(Vec<Pin>);

impl PinGrid {
    /// Lays out the diamond and hands every pin a random triad of `scale`.
    pub fn build(
        settings: &BoardSettings,
        scale: &Scale,
        rng: &mut impl Rng,
    ) -> Result<Self, SetupError> {
        let rows = settings.rows;
        if rows < 1 {
            return Err(SetupError::EmptyGrid);
        }

        let field = settings.play_field();
        let grid_width = 0.6 * field.width;
        let grid_height = 0.6 * field.height;
        let margin = (field.width - grid_width) / 2.;
        let gaps = (rows - 1).max(1) as f32;
        let (across, down) = match rows {
            1 => (0., 0.),
            _ => (grid_width / gaps, grid_height / gaps / 2.),
        };

        let pins = row_lengths(rows)
            .enumerate()
            .flat_map(|(row, count)| {
                let first = margin + grid_width / 2. - (count - 1) as f32 * across / 2.;
                (0..count).map(move |column| (row, column, first + column as f32 * across))
            })
            .map(|(row, column, x)| -> Result<Pin, SetupError> {
                let degree = rng.gen_range(0..scale.degrees_per_octave());
                Ok(Pin {
                    id: PinId { row, column },
                    position: Vec2::new(x, margin + row as f32 * down),
                    radius: settings.pin_radius,
                    chord: scale
                        .triad(degree)
                        .ok_or(SetupError::ScaleTooShort(scale.len()))?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(pins))
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.iter().find(|pin| pin.id == id)
    }
}

pub fn spawn_pins(
    mut commands: Commands,
    grid: Res<PinGrid>,
    field: Res<PlayField>,
    settings: Res<BoardSettings>,
) {
    grid.iter().for_each(|pin| {
        commands.spawn((
            pin.id,
            pin.chord,
            pin_body(field.to_world(pin.position), &settings),
        ));
    });
    info!("placed {} pins", grid.len());
}

pub struct PinPlugin;

impl Plugin for PinPlugin {
    fn build(&self, game: &mut App) {
        game.add_startup_system(spawn_pins);
    }
}
