// TABLE:
// ┌──────────────────────────── Track Window ───────────────────────────────┐
// │                                                                         │
// │   front (oldest, behind the player)            back (newest, ahead)     │
// │   ┌──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬──────┬───┐  │
// │   │  0   │  1   │  2   │  3   │  4   │  5   │  6   │  7   │  8   │ 9 │  │
// │   └──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴──────┴───┘  │
// │   ◄──────── leading half ──────►◄─────── trailing half ─────────────►   │
// │                                                                         │
// │   player located in the trailing half => scroll():                      │
// │     push_next_path() at the back, pop the front                         │
// └─────────────────────────────────────────────────────────────────────────┘
// ┌──────────────────────────── Zig-zag ────────────────────────────────────┐
// │  even index : long side horizontal, cursor.x += long - short            │
// │  odd index  : long side vertical,   cursor.y += long - short            │
// │                                                                         │
// │   (0,0) ┌───────────┬────┐                                              │
// │         │  tile 0   │    │                                              │
// │         └───────────┤ t1 │                                              │
// │                     │    ├───────────┬────┐                             │
// │                     └────┤  tile 2   │ t3 │                             │
// │                          └───────────┤    │                             │
// │                                      ...                                │
// │  consecutive tiles share exactly one short x short square               │
// └─────────────────────────────────────────────────────────────────────────┘
pub mod path;

use self::path::Path;
use crate::config::{defaults, TrackConfig};
use crate::engine::{Point, Rect, Size, Surface};
use crate::player::Player;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Track {
    path_count: usize,
    long_side: f64,
    short_side: f64,
    color: String,
    paths: VecDeque<Path>,
    // origin of the next tile
    cursor: Point,
    // parity decides the next tile orientation
    index: usize,
}

impl Track {
    pub fn new(path_count: usize, long_side: f64, short_side: f64) -> Self {
        Track::with_color(path_count, long_side, short_side, defaults::PATH_COLOR)
    }

    pub fn with_color(
        path_count: usize,
        long_side: f64,
        short_side: f64,
        color: impl Into<String>,
    ) -> Self {
        let mut track = Track {
            path_count,
            long_side,
            short_side,
            color: color.into(),
            paths: VecDeque::with_capacity(path_count + 1),
            cursor: Point::default(),
            index: 0,
        };
        for _ in 0..path_count {
            track.push_next_path();
        }
        track
    }

    pub fn from_config(config: &TrackConfig) -> Self {
        Track::with_color(
            config.path_count,
            config.long_side,
            config.short_side,
            config.color.clone(),
        )
    }

    /// Appends the next tile of the zig-zag at the cursor and moves the
    /// cursor to where the following tile starts
    pub fn push_next_path(&mut self) {
        let step = self.long_side - self.short_side;
        let horizontal = self.index % 2 == 0;
        let size = if horizontal {
            Size { width: self.long_side, height: self.short_side }
        } else {
            Size { width: self.short_side, height: self.long_side }
        };
        let path = Path::new(Rect::new(self.cursor, size), self.color.clone());
        if horizontal {
            self.cursor.x += step;
        } else {
            self.cursor.y += step;
        }
        self.paths.push_back(path);
        self.index += 1;
    }

    /// New tile at the back, oldest tile out of the front
    pub fn scroll(&mut self) {
        self.push_next_path();
        self.paths.pop_front();
    }

    /// Scrolls once when the player's tile is in the trailing half of the
    /// window, i.e. `current_path_index > floor(len / 2) - 1`
    pub fn update(&mut self, current_path_index: usize) {
        if !self.paths.is_empty() && self.is_in_trailing_half(current_path_index) {
            self.scroll();
        }
    }

    fn is_in_trailing_half(&self, index: usize) -> bool {
        index >= self.paths.len() / 2
    }

    /// Index of the front-most tile containing the player
    pub fn locate_player(&self, player: &Player) -> Option<usize> {
        self.paths
            .iter()
            .position(|path| path.is_player_contained(player))
    }

    /// Window order, so newer tiles paint over older ones at the seams
    pub fn draw(&self, surface: &impl Surface) {
        for path in &self.paths {
            path.draw(surface);
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter()
    }

    pub fn front(&self) -> Option<&Path> {
        self.paths.front()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.path_count
    }

    pub fn short_side(&self) -> f64 {
        self.short_side
    }

    pub fn long_side(&self) -> f64 {
        self.long_side
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{DrawCall, RecordingSurface};
    use crate::player::Direction;
    use approx::assert_relative_eq;

    fn classic() -> Track {
        Track::new(10, 300.0, 150.0)
    }

    fn rects(track: &Track) -> Vec<Rect> {
        track.paths().map(|path| *path.rect()).collect()
    }

    fn player_at(x: f64, y: f64) -> Player {
        Player::new(30.0, Point { x, y }, 150.0, Direction::AlongX)
    }

    fn centre(rect: &Rect) -> (f64, f64) {
        (rect.x() + rect.width() * 0.5, rect.y() + rect.height() * 0.5)
    }

    #[test]
    fn builds_the_full_window() {
        let track = classic();
        assert_eq!(track.len(), 10);
        assert_eq!(track.path_count(), 10);
    }

    #[test]
    fn first_tiles_start_at_the_origin_and_zig_zag() {
        let rects = rects(&classic());

        assert_eq!(rects[0], Rect::new_from_x_y(0.0, 0.0, 300.0, 150.0));
        assert_eq!(rects[1], Rect::new_from_x_y(150.0, 0.0, 150.0, 300.0));
        assert_eq!(rects[2], Rect::new_from_x_y(150.0, 150.0, 300.0, 150.0));
        assert_eq!(rects[3], Rect::new_from_x_y(300.0, 150.0, 150.0, 300.0));
    }

    #[test]
    fn consecutive_tiles_alternate_and_share_one_corridor_square() {
        let mut track = classic();
        // run a few scrolls so the check also covers regenerated tiles
        for _ in 0..7 {
            track.scroll();
        }
        let rects = rects(&track);

        for pair in rects.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            let current_horizontal = current.width() > current.height();
            let next_horizontal = next.width() > next.height();
            assert_ne!(current_horizontal, next_horizontal);

            let shared = current
                .intersection(&next)
                .expect("consecutive tiles must overlap");
            assert_relative_eq!(shared.width(), 150.0);
            assert_relative_eq!(shared.height(), 150.0);
        }
    }

    #[test]
    fn tile_origins_advance_monotonically() {
        let rects = rects(&classic());
        for pair in rects.windows(2) {
            assert!(pair[1].x() >= pair[0].x());
            assert!(pair[1].y() >= pair[0].y());
            assert!(pair[1].position != pair[0].position);
        }
    }

    #[test]
    fn scroll_keeps_the_window_size_and_evicts_the_oldest() {
        let mut track = classic();
        let before = rects(&track);

        track.scroll();
        let after = rects(&track);

        assert_eq!(after.len(), before.len());
        assert_eq!(after[..9], before[1..]);
        // continues the zig-zag: index 10 is even, so it is horizontal
        let newest = after[9];
        assert!(newest.width() > newest.height());
        assert_eq!(newest.position, Point { x: 750.0, y: 750.0 });
    }

    #[test]
    fn locate_player_finds_the_first_tile() {
        assert_eq!(classic().locate_player(&player_at(75.0, 75.0)), Some(0));
    }

    #[test]
    fn locate_player_prefers_the_front_most_tile_at_a_seam() {
        // inside both tile 0 and tile 1
        assert_eq!(classic().locate_player(&player_at(225.0, 75.0)), Some(0));
    }

    #[test]
    fn locate_player_reports_tiles_further_along() {
        let track = classic();
        let (x, y) = centre(&rects(&track)[5]);
        assert_eq!(track.locate_player(&player_at(x, y)), Some(5));
    }

    #[test]
    fn locate_player_misses_outside_every_tile() {
        assert_eq!(classic().locate_player(&player_at(-100.0, 75.0)), None);
        // past the inset of both tile 0 and tile 1
        assert_eq!(classic().locate_player(&player_at(285.0, 75.0)), None);
    }

    #[test]
    fn update_scrolls_only_from_the_trailing_half() {
        let mut track = classic();
        let front = *track.front().unwrap().rect();

        track.update(4);
        assert_eq!(*track.front().unwrap().rect(), front);

        track.update(5);
        assert_eq!(track.len(), 10);
        assert_eq!(
            *track.front().unwrap().rect(),
            Rect::new_from_x_y(150.0, 0.0, 150.0, 300.0)
        );
    }

    #[test]
    fn update_on_a_single_tile_window_always_scrolls() {
        let mut track = Track::new(1, 300.0, 150.0);
        track.update(0);

        assert_eq!(track.len(), 1);
        assert_eq!(
            *track.front().unwrap().rect(),
            Rect::new_from_x_y(150.0, 0.0, 150.0, 300.0)
        );
    }

    #[test]
    fn draw_paints_tiles_in_window_order() {
        let track = Track::with_color(3, 300.0, 150.0, "navy");
        let surface = RecordingSurface::default();
        track.draw(&surface);

        let painted: Vec<Rect> = surface
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                DrawCall::FillRect(rect) => Some(rect),
                _ => None,
            })
            .collect();
        assert_eq!(painted, rects(&track));
        assert_eq!(surface.calls()[0], DrawCall::FillStyle("navy".to_string()));
    }
}
