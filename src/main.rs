use bevy::{prelude::*, window::WindowResolution};
use bevy_screen_diagnostics::{ScreenDiagnosticsPlugin, ScreenFrameDiagnosticsPlugin};
use chord_board::{error::SetupError, settings::BoardSettings, ChordBoardPlugin};

fn main() -> Result<(), SetupError> {
    let settings = BoardSettings::default();
    // Room around the field for the control panel.
    let side = settings.field_size / 0.8;
    let board = ChordBoardPlugin::new(settings)?;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Chord Board".into(),
                resolution: WindowResolution::new(side, side),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugin(ScreenDiagnosticsPlugin::default())
        .add_plugin(ScreenFrameDiagnosticsPlugin)
        .add_plugin(board)
        .run();

    Ok(())
}
