pub mod tone;

use crate::{
    music::{Chord, Pitch, Scale, Voice},
    settings::BoardSettings,
    utils::*,
    BoardSet,
};
use bevy::{prelude::*, utils::HashMap};
pub use bevy_kira_audio::prelude::{AudioPlugin as KiraPlugin, AudioSource as KiraSource, *};

/// A note for one of the three voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOn {
    pub voice: Voice,
    pub pitch: Pitch,
    pub duration: P32,
}

/// Queues a note on the voice bank. `sound_voices` plays it later in the frame.
pub fn trigger(notes: &mut EventWriter<NoteOn>, voice: Voice, pitch: Pitch, duration: P32) {
    notes.send(NoteOn {
        voice,
        pitch,
        duration,
    });
}

/// Every note of the chord on its own voice, in voice order.
pub fn strike(notes: &mut EventWriter<NoteOn>, chord: &Chord, duration: P32) {
    chord
        .notes()
        .for_each(|(voice, pitch)| trigger(notes, voice, pitch, duration));
}

#[derive(Resource, Default)]
pub struct RootChannel;

#[derive(Resource, Default)]
pub struct ThirdChannel;

#[derive(Resource, Default)]
pub struct FifthChannel;

/// Tones rendered ahead of time, keyed by pitch and milliseconds held.
#[derive(Resource, Default, Debug)]
pub struct ToneBank(HashMap<(Pitch, u32), Handle<KiraSource>>);

impl ToneBank {
    pub fn get(&self, pitch: Pitch, duration: P32) -> Option<&Handle<KiraSource>> {
        self.0.get(&(pitch, millis(duration)))
    }
}

fn prepare_tones(
    scale: Res<Scale>,
    settings: Res<BoardSettings>,
    mut sources: ResMut<Assets<KiraSource>>,
    mut bank: ResMut<ToneBank>,
) {
    scale
        .iter()
        .flat_map(|pitch| [settings.live_note, settings.replay_note].map(|held| (*pitch, held)))
        .for_each(|(pitch, held)| {
            bank.0
                .entry((pitch, millis(held)))
                .or_insert_with(|| sources.add(tone::tone(pitch, held.raw())));
        });
    info!("prepared {} tones", bank.0.len());
}

/// Voices are monophonic, a new note cuts off whatever the channel was playing.
fn play_on<T: Resource>(channel: &AudioChannel<T>, tone: &Handle<KiraSource>) {
    channel.stop();
    channel.play(tone.clone());
}

fn sound_voices(
    mut notes: EventReader<NoteOn>,
    bank: Res<ToneBank>,
    root: Res<AudioChannel<RootChannel>>,
    third: Res<AudioChannel<ThirdChannel>>,
    fifth: Res<AudioChannel<FifthChannel>>,
) {
    notes.iter().for_each(|note| {
        let Some(tone) = bank.get(note.pitch, note.duration) else {
            warn!("no tone prepared for {note:?}");
            return;
        };

        match note.voice {
            Voice::Root => play_on(&root, tone),
            Voice::Third => play_on(&third, tone),
            Voice::Fifth => play_on(&fifth, tone),
        }
    });
}

pub struct VoicePlugin;

impl Plugin for VoicePlugin {
    fn build(&self, game: &mut App) {
        game.add_plugin(KiraPlugin)
            .add_audio_channel::<RootChannel>()
            .add_audio_channel::<ThirdChannel>()
            .add_audio_channel::<FifthChannel>()
            .init_resource::<ToneBank>()
            .add_event::<NoteOn>()
            .add_startup_system(prepare_tones)
            .add_system(sound_voices.in_set(BoardSet::Voices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strike_c_major(mut notes: EventWriter<NoteOn>) {
        strike(&mut notes, &Chord([60, 64, 67]), p32(0.4));
    }

    #[test]
    fn striking_sends_one_note_per_voice() {
        let mut game = App::new();
        game.add_event::<NoteOn>().add_system(strike_c_major);
        game.update();

        let notes = game
            .world
            .resource_mut::<Events<NoteOn>>()
            .drain()
            .map(|note| (note.voice, note.pitch, note.duration))
            .collect::<Vec<_>>();

        assert_eq!(
            notes,
            vec![
                (Voice::Root, 60, p32(0.4)),
                (Voice::Third, 64, p32(0.4)),
                (Voice::Fifth, 67, p32(0.4)),
            ]
        );
    }

    #[test]
    fn every_scale_pitch_is_prepared_at_both_lengths() {
        let settings = BoardSettings::default();
        let scale = settings.extended_scale().unwrap();
        let mut game = App::new();
        game.add_plugins(MinimalPlugins)
            .add_plugin(AssetPlugin::default())
            .add_asset::<KiraSource>()
            .insert_resource(scale.clone())
            .insert_resource(settings.clone())
            .init_resource::<ToneBank>()
            .add_startup_system(prepare_tones);
        game.update();

        let bank = game.world.resource::<ToneBank>();
        let sources = game.world.resource::<Assets<KiraSource>>();
        assert_eq!(bank.0.len(), scale.len() * 2);
        scale.iter().for_each(|pitch| {
            [settings.live_note, settings.replay_note]
                .into_iter()
                .for_each(|held| {
                    let tone = bank.get(*pitch, held);
                    assert!(tone.and_then(|tone| sources.get(tone)).is_some());
                });
        });
    }

    #[test]
    fn notes_without_a_tone_are_skipped() {
        let mut bank = ToneBank::default();
        bank.0.insert((64, 400), Handle::default());

        let mut game = App::new();
        game.insert_resource(bank)
            .init_resource::<AudioChannel<RootChannel>>()
            .init_resource::<AudioChannel<ThirdChannel>>()
            .init_resource::<AudioChannel<FifthChannel>>()
            .add_event::<NoteOn>()
            .add_system(sound_voices);

        game.world.resource_mut::<Events<NoteOn>>().extend([
            NoteOn { voice: Voice::Root, pitch: 61, duration: p32(0.4) },
            NoteOn { voice: Voice::Third, pitch: 64, duration: p32(0.4) },
            NoteOn { voice: Voice::Fifth, pitch: 64, duration: p32(0.5) },
        ]);
        game.update();

        assert_eq!(game.world.resource::<Events<NoteOn>>().len(), 3);
    }

    #[test]
    fn tones_are_looked_up_by_held_milliseconds() {
        let mut bank = ToneBank::default();
        bank.0.insert((60, 400), Handle::default());

        assert!(bank.get(60, p32(0.4)).is_some());
        assert!(bank.get(60, p32(0.6)).is_none());
        assert!(bank.get(62, p32(0.4)).is_none());
    }
}
