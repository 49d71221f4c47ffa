use crate::{
    audio::{strike, NoteOn},
    balls::Ball,
    music::Chord,
    physics::Contact,
    pins::PinId,
    settings::BoardSettings,
    BoardSet,
};
use bevy::prelude::*;

/// Sounds the chord of every struck pin and appends it to the striking ball.
pub fn route_contacts(
    mut contacts: EventReader<Contact>,
    mut notes: EventWriter<NoteOn>,
    mut balls: Query<&mut Ball>,
    pins: Query<(&PinId, &Chord)>,
    settings: Res<BoardSettings>,
) {
    contacts.iter().for_each(|Contact { ball, pin }| {
        let Ok((id, chord)) = pins.get(*pin) else {
            warn!("{pin:?} is not a pin");
            return;
        };
        let Ok(mut ball) = balls.get_mut(*ball) else {
            debug!("pin {id:?} struck by a retired ball");
            return;
        };

        strike(&mut notes, chord, settings.live_note);
        ball.phrase.push(*chord);
        trace!("ball #{} struck pin {id:?} {chord:?}", ball.serial);
    });
}

pub struct RouterPlugin;

impl Plugin for RouterPlugin {
    fn build(&self, game: &mut App) {
        game.add_system(route_contacts.in_set(BoardSet::Routing));
    }
}
