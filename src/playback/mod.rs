pub mod transport;

use crate::{
    audio::{trigger, NoteOn},
    balls::LastSequence,
    music::{Chord, Pitch, Voice},
    settings::{BoardSettings, ReplayOverlap},
    BoardSet,
};
use bevy::prelude::*;
use tap::Tap;
pub use transport::*;

/// The user asked to hear the last kept phrase again.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayRequest;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Resource)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing,
}

/// Splits a chord sequence into one line of pitches per voice.
pub fn voice_lines(chords: &[Chord]) -> [Vec<Pitch>; 3] {
    Voice::ALL.map(|voice| chords.iter().map(|chord| chord[voice]).collect())
}

pub fn play_last(
    mut commands: Commands,
    mut requests: EventReader<ReplayRequest>,
    mut transport: ResMut<Transport>,
    running: Query<Entity, With<Track>>,
    last: Res<LastSequence>,
    settings: Res<BoardSettings>,
) {
    requests.iter().for_each(|_| {
        let Some(chords) = last.chords() else {
            return;
        };

        if let ReplayOverlap::Restart = settings.overlap {
            running
                .iter()
                .for_each(|track| commands.entity(track).despawn());
        }

        transport.start();
        let origin = transport.position();

        Voice::ALL
            .into_iter()
            .zip(voice_lines(chords))
            .map(|(voice, notes)| {
                Track::new(voice, notes, settings.beat(), false).tap_mut(|track| track.start(origin))
            })
            .for_each(|track| {
                commands.spawn(track);
            });

        info!("replaying {} chords", chords.len());
    });
}

pub fn step_tracks(
    mut commands: Commands,
    mut tracks: Query<(Entity, &mut Track)>,
    mut notes: EventWriter<NoteOn>,
    mut state: ResMut<PlayerState>,
    transport: Res<Transport>,
    settings: Res<BoardSettings>,
) {
    let now = transport.position();
    let mut playing = false;

    tracks.iter_mut().for_each(|(entity, mut track)| {
        // Voices are monophonic, so of several steps due at once only the last is heard.
        let due = std::iter::from_fn(|| track.poll(now)).collect::<Vec<_>>();
        if let Some((pitch, skipped)) = due.split_last() {
            if !skipped.is_empty() {
                debug!("{:?} skipped {} late steps", track.voice, skipped.len());
            }
            trigger(&mut notes, track.voice, *pitch, settings.replay_note);
        }

        match (track.is_finished(), track.is_started()) {
            (true, _) => commands.entity(entity).despawn(),
            (false, true) => playing = true,
            (false, false) => {}
        }
    });

    let next = match playing {
        true => PlayerState::Playing,
        false => PlayerState::Idle,
    };
    if *state != next {
        debug!("player is now {next:?}");
        *state = next;
    }
}

pub struct PlaybackPlugin;

impl Plugin for PlaybackPlugin {
    fn build(&self, game: &mut App) {
        game.init_resource::<Transport>()
            .init_resource::<PlayerState>()
            .add_event::<ReplayRequest>()
            .add_systems(
                (advance_transport, play_last, apply_system_buffers, step_tracks)
                    .chain()
                    .in_set(BoardSet::Playback),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::*;
    use pretty_assertions::assert_eq;

    const C_MAJOR: Chord = Chord([60, 64, 67]);
    const D_MINOR: Chord = Chord([62, 65, 69]);

    fn player(settings: BoardSettings) -> App {
        let mut game = App::new();
        game.insert_resource(settings)
            .init_resource::<LastSequence>()
            .init_resource::<Transport>()
            .init_resource::<PlayerState>()
            .add_event::<ReplayRequest>()
            .add_event::<NoteOn>()
            .add_systems((play_last, apply_system_buffers, step_tracks).chain());
        game
    }

    fn notes(game: &mut App) -> Vec<(Voice, Pitch)> {
        game.world
            .resource_mut::<Events<NoteOn>>()
            .drain()
            .map(|note| (note.voice, note.pitch))
            .collect()
    }

    fn tracks(game: &mut App) -> usize {
        game.world.query::<&Track>().iter(&game.world).count()
    }

    #[test]
    fn voice_lines_keep_chord_order() {
        assert_eq!(
            voice_lines(&[C_MAJOR, D_MINOR]),
            [vec![60, 62], vec![64, 65], vec![67, 69]]
        );
    }

    #[test]
    fn replay_without_phrase_does_nothing() {
        let mut game = player(default());
        game.world.send_event(ReplayRequest);
        game.update();

        assert_eq!(tracks(&mut game), 0);
        assert_eq!(notes(&mut game), vec![]);
        assert!(!game.world.resource::<Transport>().is_running());
        assert_eq!(*game.world.resource::<PlayerState>(), PlayerState::Idle);
    }

    #[test]
    fn replay_schedules_one_note_per_chord_and_voice() {
        let mut game = player(default());
        let phrase = vec![C_MAJOR, D_MINOR, C_MAJOR];
        game.world.resource_mut::<LastSequence>().retain(phrase.clone());
        game.world.send_event(ReplayRequest);
        game.update();

        let mut scheduled = game
            .world
            .query::<&Track>()
            .iter(&game.world)
            .map(|track| (track.voice.index(), track.notes.clone(), track.looping))
            .collect::<Vec<_>>();
        scheduled.sort_by_key(|(voice, ..)| *voice);

        assert_eq!(
            scheduled,
            Voice::ALL
                .map(|voice| {
                    let line = phrase.iter().map(|chord| chord[voice]).collect::<Vec<_>>();
                    (voice.index(), line, false)
                })
                .to_vec()
        );
        assert!(game.world.resource::<Transport>().is_running());
    }

    #[test]
    fn tracks_run_to_completion_then_player_idles() {
        let mut game = player(default());
        game.world.resource_mut::<LastSequence>().retain(vec![C_MAJOR, D_MINOR]);
        game.world.send_event(ReplayRequest);

        game.update();
        assert_eq!(notes(&mut game).len(), 3);
        assert_eq!(*game.world.resource::<PlayerState>(), PlayerState::Playing);

        game.world.resource_mut::<Transport>().advance(r64(0.5));
        game.update();
        assert_eq!(notes(&mut game).len(), 3);
        assert_eq!(*game.world.resource::<PlayerState>(), PlayerState::Idle);

        game.update();
        assert_eq!(tracks(&mut game), 0);
    }

    #[test]
    fn late_frame_sounds_only_the_latest_due_step() {
        let mut game = player(default());
        game.world
            .resource_mut::<LastSequence>()
            .retain(vec![C_MAJOR, D_MINOR, C_MAJOR, D_MINOR]);
        game.world.send_event(ReplayRequest);
        game.update();
        notes(&mut game);

        game.world.resource_mut::<Transport>().advance(r64(1.5));
        game.update();

        let mut heard = notes(&mut game);
        heard.sort_by_key(|(voice, _)| voice.index());
        assert_eq!(heard, vec![(Voice::Root, 62), (Voice::Third, 65), (Voice::Fifth, 69)]);
        assert_eq!(*game.world.resource::<PlayerState>(), PlayerState::Idle);
    }

    #[test]
    fn scheduled_but_unstarted_tracks_wait_without_playing() {
        let mut game = player(default());
        game.world
            .spawn(Track::new(Voice::Root, vec![60, 62], r64(0.5), false));
        game.world.resource_mut::<Transport>().start();
        game.world.resource_mut::<Transport>().advance(r64(2.));
        game.update();

        assert_eq!(notes(&mut game), vec![]);
        assert_eq!(tracks(&mut game), 1);
        assert_eq!(*game.world.resource::<PlayerState>(), PlayerState::Idle);
    }

    #[test]
    fn replays_stack_by_default() {
        let mut game = player(default());
        game.world.resource_mut::<LastSequence>().retain(vec![C_MAJOR, D_MINOR]);

        game.world.send_event(ReplayRequest);
        game.update();
        game.world.resource_mut::<Transport>().advance(r64(0.25));
        game.world.send_event(ReplayRequest);
        game.update();

        assert_eq!(tracks(&mut game), 6);
    }

    #[test]
    fn restart_policy_replaces_running_tracks() {
        let mut game = player(BoardSettings {
            overlap: ReplayOverlap::Restart,
            ..default()
        });
        game.world.resource_mut::<LastSequence>().retain(vec![C_MAJOR, D_MINOR]);

        game.world.send_event(ReplayRequest);
        game.update();
        game.world.resource_mut::<Transport>().advance(r64(0.25));
        game.world.send_event(ReplayRequest);
        game.update();

        assert_eq!(tracks(&mut game), 3);
    }
}
