use crate::engine::{Point, Surface};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Axis the player currently travels along
/// ┌──────── Direction ────────┐
/// │  AlongX  ⇄  AlongY        │
/// │  (one toggle per press)   │
/// └───────────────────────────┘
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AlongX,
    AlongY,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::AlongX => Direction::AlongY,
            Direction::AlongY => Direction::AlongX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    radius: f64,
    position: Point,
    speed: f64,
    direction: Direction,
    color: String,
}

impl Player {
    pub fn new(radius: f64, position: Point, speed: f64, direction: Direction) -> Self {
        Player {
            radius,
            position,
            speed,
            direction,
            color: crate::config::defaults::PLAYER_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Constant speed along the active axis, the other axis is left alone
    pub fn update(&mut self, delta_time: f64) {
        let distance = self.speed * delta_time;
        match self.direction {
            Direction::AlongX => self.position.x += distance,
            Direction::AlongY => self.position.y += distance,
        }
    }

    /// Applies from the next `update` on
    pub fn change_direction(&mut self) {
        self.direction = self.direction.toggled();
    }

    pub fn draw(&self, surface: &impl Surface) -> Result<()> {
        surface.set_fill_style(&self.color);
        surface.fill_circle(self.position, self.radius)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{DrawCall, RecordingSurface};
    use approx::assert_relative_eq;

    fn player(direction: Direction) -> Player {
        Player::new(30.0, Point { x: 75.0, y: 75.0 }, 150.0, direction)
    }

    #[test]
    fn update_along_x_leaves_y_alone() {
        let mut player = player(Direction::AlongX);
        player.update(1.0);

        assert_relative_eq!(player.position().x, 225.0);
        assert_relative_eq!(player.position().y, 75.0);
    }

    #[test]
    fn update_along_y_leaves_x_alone() {
        let mut player = player(Direction::AlongY);
        player.update(0.5);
        player.update(0.5);

        assert_relative_eq!(player.position().x, 75.0);
        assert_relative_eq!(player.position().y, 225.0);
    }

    #[test]
    fn toggling_twice_restores_the_direction() {
        for direction in [Direction::AlongX, Direction::AlongY] {
            assert_eq!(direction.toggled().toggled(), direction);
            assert_ne!(direction.toggled(), direction);
        }
    }

    #[test]
    fn change_direction_applies_to_the_next_update_only() {
        let mut player = player(Direction::AlongX);
        player.update(1.0);
        player.change_direction();

        assert_relative_eq!(player.position().x, 225.0);
        assert_relative_eq!(player.position().y, 75.0);

        player.update(1.0);
        assert_relative_eq!(player.position().x, 225.0);
        assert_relative_eq!(player.position().y, 225.0);
    }

    #[test]
    fn draw_fills_a_circle_at_the_position() {
        let surface = RecordingSurface::default();
        player(Direction::AlongX).with_color("white").draw(&surface).unwrap();

        assert_eq!(
            surface.calls(),
            vec![
                DrawCall::FillStyle("white".to_string()),
                DrawCall::FillCircle(Point { x: 75.0, y: 75.0 }, 30.0),
            ]
        );
    }
}
