use crate::music::{midi_to_hz, Pitch};
use bevy_kira_audio::prelude::AudioSource as KiraSource;
use kira::{
    dsp::Frame,
    sound::static_sound::{StaticSoundData, StaticSoundSettings},
};

pub const SAMPLE_RATE: u32 = 44_100;

const ATTACK: f32 = 0.005;
const DECAY: f32 = 0.1;
const SUSTAIN: f32 = 0.3;
const RELEASE: f32 = 0.5;
const GAIN: f32 = 0.25;

/// Level of the envelope `t` seconds after the note starts, released at `held`.
fn envelope(t: f32, held: f32) -> f32 {
    let before_release = match t {
        t if t < ATTACK => t / ATTACK,
        t if t < ATTACK + DECAY => 1. - (1. - SUSTAIN) * (t - ATTACK) / DECAY,
        _ => SUSTAIN,
    };

    match t - held {
        since if since <= 0. => before_release,
        since => envelope(held, held) * (1. - since / RELEASE).max(0.),
    }
}

fn triangle(phase: f32) -> f32 {
    4. * (phase - (phase + 0.5).floor()).abs() - 1.
}

/// Mono samples of a triangle voice held for `held` seconds followed by its release.
pub fn samples(pitch: Pitch, held: f32, sample_rate: u32) -> Vec<f32> {
    let frequency = midi_to_hz(pitch);
    let length = ((held + RELEASE) * sample_rate as f32).ceil() as usize;

    (0..length)
        .map(|index| index as f32 / sample_rate as f32)
        .map(|t| GAIN * envelope(t, held) * triangle(t * frequency))
        .collect()
}

pub fn tone(pitch: Pitch, held: f32) -> KiraSource {
    KiraSource {
        sound: StaticSoundData {
            sample_rate: SAMPLE_RATE,
            frames: samples(pitch, held, SAMPLE_RATE)
                .into_iter()
                .map(Frame::from_mono)
                .collect::<Vec<_>>()
                .into(),
            settings: StaticSoundSettings::default(),
        },
    }
}
