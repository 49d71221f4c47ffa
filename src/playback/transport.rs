use crate::{
    music::{Pitch, Voice},
    utils::*,
};
use bevy::prelude::*;

/// Shared clock of every track. Once started it keeps running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Resource)]
pub struct Transport {
    running: bool,
    position: R64,
}

impl Transport {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds since the transport was first started.
    pub fn position(&self) -> R64 {
        self.position
    }

    pub fn advance(&mut self, delta: R64) {
        if self.running {
            self.position += delta;
        }
    }
}

/// Notes of one voice stepped through at a fixed interval of the transport.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Track {
    pub voice: Voice,
    pub notes: Vec<Pitch>,
    pub interval: R64,
    pub looping: bool,
    origin: Option<R64>,
    cursor: usize,
}

impl Track {
    pub fn new(voice: Voice, notes: Vec<Pitch>, interval: R64, looping: bool) -> Self {
        Self {
            voice,
            notes,
            interval,
            looping,
            origin: None,
            cursor: 0,
        }
    }

    /// Step zero is due at `at`.
    pub fn start(&mut self, at: R64) {
        self.origin = Some(at);
        self.cursor = 0;
    }

    pub fn is_started(&self) -> bool {
        self.origin.is_some()
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.cursor >= self.notes.len()
    }

    /// The next note due at `now`, advancing past it.
    #[rustfmt::skip]
    pub fn poll(&mut self, now: R64) -> Option<Pitch> {
        let origin = self.origin.as_mut()?;

        if self.looping && !self.notes.is_empty() && self.cursor == self.notes.len() {
            *origin += self.interval * r64(self.notes.len() as f64);
            self.cursor = 0;
        }

        let note = self.notes.get(self.cursor).copied()?;
        (*origin + self.interval * r64(self.cursor as f64) <= now).then(|| {
            self.cursor += 1;
            note
        })
    }
}

pub fn advance_transport(time: Res<Time>, mut transport: ResMut<Transport>) {
    transport.advance(r64(time.delta_seconds_f64()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn due(track: &mut Track, now: f64) -> Vec<Pitch> {
        std::iter::from_fn(|| track.poll(r64(now))).collect()
    }

    #[test]
    fn transport_only_moves_once_started() {
        let mut transport = Transport::default();
        transport.advance(r64(1.));
        assert_eq!(transport.position(), r64(0.));

        transport.start();
        transport.advance(r64(0.25));
        transport.start();
        transport.advance(r64(0.25));
        assert_eq!(transport.position(), r64(0.5));
    }

    #[test]
    fn unstarted_tracks_stay_silent() {
        let mut track = Track::new(Voice::Root, vec![60, 62], r64(0.5), false);
        assert_eq!(due(&mut track, 10.), vec![]);
        assert!(!track.is_started());
    }

    #[rustfmt::skip]
    #[test_case(1.,   vec![60];         "first step at origin")]
    #[test_case(1.49, vec![60];         "second step not yet due")]
    #[test_case(1.5,  vec![60, 62];     "second step on the beat")]
    #[test_case(9.,   vec![60, 62, 64]; "late poll catches up")]
    fn steps_fall_on_the_interval_grid(now: f64, expected: Vec<Pitch>) {
        let mut track = Track::new(Voice::Root, vec![60, 62, 64], r64(0.5), false);
        track.start(r64(1.));
        assert_eq!(due(&mut track, now), expected);
    }

    #[test]
    fn one_shot_tracks_finish() {
        let mut track = Track::new(Voice::Third, vec![64, 65], r64(0.5), false);
        track.start(r64(0.));
        assert_eq!(due(&mut track, 0.5), vec![64, 65]);
        assert!(track.is_finished());
        assert_eq!(due(&mut track, 100.), vec![]);
    }

    #[test]
    fn looping_tracks_wrap() {
        let mut track = Track::new(Voice::Fifth, vec![67, 69], r64(0.5), true);
        track.start(r64(0.));
        assert_eq!(due(&mut track, 0.5), vec![67, 69]);
        assert_eq!(due(&mut track, 0.9), vec![]);
        assert_eq!(due(&mut track, 1.), vec![67]);
        assert_eq!(due(&mut track, 1.5), vec![69]);
        assert!(!track.is_finished());
    }
}
