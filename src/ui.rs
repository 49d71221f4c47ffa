use crate::{
    balls::{DropBall, LastSequence},
    field::PlayField,
    music::Chord,
    physics::Body,
    pins::PinGrid,
    playback::{PlayerState, ReplayRequest},
    settings::BoardSettings,
    BoardSet,
};
use bevy::{prelude::*, sprite::Mesh2dHandle, window::PrimaryWindow};
use bevy_egui::{egui, EguiContexts, EguiPlugin};
use itertools::Itertools;

/// Gap between a pin and its chord label.
const LABEL_OFFSET: f32 = 12.;
const LABEL_SIZE: f32 = 9.;

#[derive(Resource)]
struct Palette {
    pin: Mesh2dHandle,
    ball: Mesh2dHandle,
    ink: Handle<ColorMaterial>,
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

fn prepare_palette(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    settings: Res<BoardSettings>,
) {
    let mut circle = |radius| Mesh2dHandle(meshes.add(shape::Circle::new(radius).into()));
    commands.insert_resource(Palette {
        pin: circle(settings.pin_radius),
        ball: circle(settings.ball_radius),
        ink: materials.add(ColorMaterial::from(Color::BLACK)),
    });
}

fn dress_bodies(
    mut commands: Commands,
    bodies: Query<(Entity, &Body), Added<Body>>,
    palette: Res<Palette>,
) {
    bodies.iter().for_each(|(entity, body)| {
        let mesh = match body {
            Body::Ball => palette.ball.clone(),
            Body::Pin => palette.pin.clone(),
        };
        commands
            .entity(entity)
            .insert((mesh, palette.ink.clone(), VisibilityBundle::default()));
    });
}

fn theme(mut contexts: EguiContexts) {
    catppuccin_egui::set_theme(contexts.ctx_mut(), catppuccin_egui::MACCHIATO);
}

fn controls(
    mut contexts: EguiContexts,
    mut replays: EventWriter<ReplayRequest>,
    last: Res<LastSequence>,
    state: Res<PlayerState>,
) {
    egui::TopBottomPanel::bottom("controls")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.horizontal(|ui| {
                if ui.button("Play last").clicked() {
                    replays.send(ReplayRequest);
                }
                let kept = last.chords().map_or(0, <[_]>::len);
                ui.label(format!("{kept} chords kept"));
                if let PlayerState::Playing = *state {
                    ui.label("playing");
                }
            });
        });
}

/// Top left corner of the field inside a window of `window` logical size.
pub fn field_origin(window: Vec2, field: &PlayField) -> Vec2 {
    (window - Vec2::new(field.width, field.height)) / 2.
}

/// Pitches of the chord as written next to its pin, eg `60,64,67`.
pub fn chord_label(chord: &Chord) -> String {
    chord.0.iter().join(",")
}

fn to_pos(at: Vec2) -> egui::Pos2 {
    egui::pos2(at.x, at.y)
}

/// Chord names beside the pins and a ring where the next ball would drop.
fn overlay(
    mut contexts: EguiContexts,
    windows: Query<&Window, With<PrimaryWindow>>,
    grid: Res<PinGrid>,
    field: Res<PlayField>,
    settings: Res<BoardSettings>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let origin = field_origin(Vec2::new(window.width(), window.height()), &field);
    let ctx = contexts.ctx_mut();
    let painter = ctx.layer_painter(egui::LayerId::background());

    grid.iter().for_each(|pin| {
        painter.text(
            to_pos(origin + pin.position + Vec2::X * LABEL_OFFSET),
            egui::Align2::LEFT_CENTER,
            chord_label(&pin.chord),
            egui::FontId::proportional(LABEL_SIZE),
            egui::Color32::from_gray(0xbb),
        );
    });

    if ctx.wants_pointer_input() {
        return;
    }
    if let Some(pointer) = ctx.pointer_hover_pos() {
        painter.circle_stroke(
            egui::pos2(pointer.x, origin.y + settings.drop_height),
            settings.ball_radius,
            egui::Stroke::new(1., egui::Color32::BLACK),
        );
    }
}

/// Balls drop from a fixed height straight below the pointer.
fn drop_on_click(
    mut contexts: EguiContexts,
    mut drops: EventWriter<DropBall>,
    buttons: Res<Input<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    field: Res<PlayField>,
    settings: Res<BoardSettings>,
) {
    if !buttons.just_pressed(MouseButton::Left) || contexts.ctx_mut().wants_pointer_input() {
        return;
    }

    let Some((window, cursor)) = windows
        .get_single()
        .ok()
        .and_then(|window| Some((window, window.cursor_position()?)))
    else {
        return;
    };

    let origin = field_origin(Vec2::new(window.width(), window.height()), &field);
    drops.send(DropBall(Vec2::new(cursor.x - origin.x, settings.drop_height)));
}

pub struct InterfacePlugin;

impl Plugin for InterfacePlugin {
    fn build(&self, game: &mut App) {
        game.add_plugin(EguiPlugin)
            .insert_resource(ClearColor(Color::WHITE))
            .add_startup_system(setup_camera)
            .add_startup_system(prepare_palette)
            .add_systems(
                (theme, controls, overlay, drop_on_click)
                    .chain()
                    .in_set(BoardSet::Input),
            )
            .add_system(dress_bodies);
    }
}
