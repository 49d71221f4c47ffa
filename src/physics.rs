use crate::{settings::BoardSettings, BoardSet};
use bevy::prelude::*;
use bevy_rapier2d::prelude::{
    ActiveEvents, Ccd, Collider, CollisionEvent, Friction, NoUserData, RapierConfiguration,
    RapierPhysicsPlugin, Restitution, RigidBody,
};

/// The role a physics body plays on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub enum Body {
    Ball,
    Pin,
}

/// A ball touched a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub ball: Entity,
    pub pin: Entity,
}

impl Contact {
    /// Orders an unordered pair of bodies. Anything but a ball and a pin is not a contact.
    pub fn resolve(a: (Entity, Body), b: (Entity, Body)) -> Option<Self> {
        match (a, b) {
            ((ball, Body::Ball), (pin, Body::Pin)) | ((pin, Body::Pin), (ball, Body::Ball)) => {
                Some(Self { ball, pin })
            }
            _ => None,
        }
    }
}

fn circle_body(
    body: Body,
    position: Vec2,
    radius: f32,
    settings: &BoardSettings,
) -> impl Bundle {
    (
        body,
        Collider::ball(radius),
        Restitution::coefficient(settings.restitution),
        Friction::coefficient(settings.friction),
        ActiveEvents::COLLISION_EVENTS,
        TransformBundle::from_transform(Transform::from_translation(position.extend(0.))),
    )
}

/// Falling body at a world position.
pub fn ball_body(position: Vec2, settings: &BoardSettings) -> impl Bundle {
    (
        circle_body(Body::Ball, position, settings.ball_radius, settings),
        RigidBody::Dynamic,
        Ccd::enabled(),
    )
}

/// Static body at a world position.
pub fn pin_body(position: Vec2, settings: &BoardSettings) -> impl Bundle {
    (
        circle_body(Body::Pin, position, settings.pin_radius, settings),
        RigidBody::Fixed,
    )
}

pub fn forward_collisions(
    mut collisions: EventReader<CollisionEvent>,
    mut contacts: EventWriter<Contact>,
    bodies: Query<&Body>,
) {
    collisions
        .iter()
        .filter_map(|collision| match collision {
            CollisionEvent::Started(a, b, _) => Some((*a, *b)),
            CollisionEvent::Stopped(..) => None,
        })
        .for_each(|(a, b)| {
            let (Ok(role_a), Ok(role_b)) = (bodies.get(a), bodies.get(b)) else {
                debug!("collision between {a:?} and {b:?} involves a removed body");
                return;
            };

            match Contact::resolve((a, *role_a), (b, *role_b)) {
                Some(contact) => contacts.send(contact),
                None => debug!("ignoring {role_a:?} against {role_b:?}"),
            }
        });
}

fn configure_gravity(mut rapier: ResMut<RapierConfiguration>, settings: Res<BoardSettings>) {
    rapier.gravity = Vec2::NEG_Y * settings.gravity;
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, game: &mut App) {
        game.add_plugin(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(100.))
            .add_event::<Contact>()
            .add_startup_system(configure_gravity)
            .add_system(forward_collisions.in_set(BoardSet::Collisions));
    }
}
