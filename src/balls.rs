use crate::{
    field::PlayField, music::Chord, physics::ball_body, settings::BoardSettings, BoardSet,
};
use bevy::prelude::*;
use derive_more::From;

/// Ask for a ball at a field position.
#[derive(Debug, Clone, Copy, PartialEq, From)]
pub struct DropBall(pub Vec2);

#[derive(Debug, Component)]
pub struct Ball {
    /// Creation order.
    pub serial: u64,
    /// Chords struck so far, oldest first.
    pub phrase: Vec<Chord>,
}

#[derive(Default, Resource)]
pub struct BallSerial(u64);

impl BallSerial {
    fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

/// Phrase of the last ball that left the field having struck anything.
///
/// Written only when balls are retired, read only by replays.
#[derive(Debug, Default, Clone, PartialEq, Resource)]
pub struct LastSequence(Option<Vec<Chord>>);

impl LastSequence {
    /// Keeps `phrase` unless it is empty. Empty phrases never clear a kept one.
    pub fn retain(&mut self, phrase: Vec<Chord>) -> bool {
        let keep = !phrase.is_empty();
        if keep {
            self.0 = Some(phrase);
        }
        keep
    }

    pub fn chords(&self) -> Option<&[Chord]> {
        self.0.as_deref().filter(|chords| !chords.is_empty())
    }
}

pub fn spawn_balls(
    mut commands: Commands,
    mut drops: EventReader<DropBall>,
    mut serials: ResMut<BallSerial>,
    field: Res<PlayField>,
    settings: Res<BoardSettings>,
) {
    drops.iter().for_each(|DropBall(at)| {
        let serial = serials.next();
        let ball = commands
            .spawn((
                Ball {
                    serial,
                    phrase: vec![],
                },
                ball_body(field.to_world(*at), &settings),
            ))
            .id();
        debug!("dropped ball #{serial} as {ball:?} at {at}");
    });
}

pub fn retire_balls(
    mut commands: Commands,
    mut balls: Query<(Entity, &mut Ball, &Transform)>,
    mut last: ResMut<LastSequence>,
    field: Res<PlayField>,
) {
    balls
        .iter_mut()
        .filter(|(.., transform)| {
            field.is_out_of_bounds(field.to_field(transform.translation.truncate()))
        })
        .for_each(|(entity, mut ball, _)| {
            let phrase = std::mem::take(&mut ball.phrase);
            let length = phrase.len();

            if last.retain(phrase) {
                info!("ball #{} left the field, kept its {length} chords", ball.serial);
            } else {
                debug!("ball #{} left the field without striking a pin", ball.serial);
            }

            commands.entity(entity).despawn_recursive();
        });
}

pub struct BallPlugin;

impl Plugin for BallPlugin {
    fn build(&self, game: &mut App) {
        game.init_resource::<BallSerial>()
            .init_resource::<LastSequence>()
            .add_event::<DropBall>()
            .add_system(spawn_balls.in_set(BoardSet::Input))
            .add_system(retire_balls.in_set(BoardSet::Lifecycle));
    }
}
