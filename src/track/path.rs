use crate::engine::{Rect, Surface};
use crate::player::Player;

/// One rectangular tile of the track
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    rect: Rect,
    color: String,
}

impl Path {
    pub fn new(rect: Rect, color: impl Into<String>) -> Self {
        Path {
            rect,
            color: color.into(),
        }
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    pub fn draw(&self, surface: &impl Surface) {
        surface.set_fill_style(&self.color);
        surface.fill_rect(&self.rect);
    }

    /// The whole disk has to be inside, so the centre is tested against the
    /// tile shrunk by the radius
    pub fn is_player_contained(&self, player: &Player) -> bool {
        self.rect.inset(player.radius()).contains(player.position())
    }
}
