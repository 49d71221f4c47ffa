pub mod audio;
pub mod balls;
pub mod error;
pub mod field;
pub mod music;
pub mod physics;
pub mod pins;
pub mod playback;
pub mod router;
pub mod settings;
pub mod ui;
pub mod utils;

use audio::VoicePlugin;
use balls::BallPlugin;
use bevy::prelude::*;
use error::SetupError;
use music::Scale;
use physics::PhysicsPlugin;
use pins::{PinGrid, PinPlugin};
use playback::PlaybackPlugin;
use router::RouterPlugin;
use settings::BoardSettings;
use ui::InterfacePlugin;

/// Stages of a frame, run in declaration order.
///
/// Contacts are routed before balls are retired so a ball that strikes a pin on its
/// way out still keeps that chord.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoardSet {
    Input,
    Collisions,
    Routing,
    Lifecycle,
    Playback,
    Voices,
}

pub struct ChordBoardPlugin {
    settings: BoardSettings,
    scale: Scale,
    grid: PinGrid,
}

impl ChordBoardPlugin {
    /// Checks the settings and lays out the pins. Nothing is spawned yet.
    pub fn new(settings: BoardSettings) -> Result<Self, SetupError> {
        settings.validate()?;
        let scale = settings.extended_scale()?;
        let grid = PinGrid::build(&settings, &scale, &mut settings.rng())?;

        Ok(Self {
            settings,
            scale,
            grid,
        })
    }
}

#[rustfmt::skip]
impl Plugin for ChordBoardPlugin {
    fn build(&self, game: &mut App) {
        game.insert_resource(self.settings.play_field())
            .insert_resource(self.settings.clone())
            .insert_resource(self.scale.clone())
            .insert_resource(self.grid.clone())
            .configure_sets((
                BoardSet::Input,
                BoardSet::Collisions,
                BoardSet::Routing,
                BoardSet::Lifecycle,
                BoardSet::Playback,
                BoardSet::Voices,
            ).chain())
            .add_plugin(PhysicsPlugin)
            .add_plugin(PinPlugin)
            .add_plugin(BallPlugin)
            .add_plugin(RouterPlugin)
            .add_plugin(PlaybackPlugin)
            .add_plugin(VoicePlugin)
            .add_plugin(InterfacePlugin);
    }
}
