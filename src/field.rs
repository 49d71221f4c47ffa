use bevy::prelude::*;

/// The square the balls play in.
///
/// Field coordinates start in the top left corner with y growing downwards.
/// World coordinates are centred on the field with y growing upwards.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
}

impl PlayField {
    pub fn square(size: f32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// Edges count as outside. There is no top edge, balls may bounce above the field.
    pub fn is_out_of_bounds(&self, point: Vec2) -> bool {
        point.x <= 0. || self.width <= point.x || self.height <= point.y
    }

    pub fn to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x - self.width / 2., self.height / 2. - point.y)
    }

    pub fn to_field(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x + self.width / 2., self.height / 2. - point.y)
    }
}
