use crate::browser;
use crate::config::GameConfig;
use crate::engine::input::PointerState;
use crate::engine::{Game, Point, Rect, Renderer, Size, Surface};
use crate::player::Player;
use crate::track::Track;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::f64::consts::PI;

/// TABLE
/// ┌───────────────────── Game Architecture Overview ────────────────────────┐
/// │                                                                         │
/// │    ┌─────────────┐          ┌─────────────┐          ┌─────────────┐    │
/// │    │  engine.rs  │  update  │   game.rs   │  update  │  player.rs  │    │
/// │    │  GameLoop   ├─────────►│   ZigZag    ├─────────►│  Player     │    │
/// │    │             │          │   Run       │          └─────────────┘    │
/// │    └──────┬──────┘          └──────┬──────┘                             │
/// │           │                        │ locate_player / update             │
/// │    ┌──────┴──────┐          ┌──────┴──────┐                             │
/// │    │ PointerState│          │  track/     │                             │
/// │    │ presses     │          │  Track      │                             │
/// │    └─────────────┘          │  Path       │                             │
/// │                             └─────────────┘                             │
/// ├──────────────────────── Run States ─────────────────────────────────────┤
/// │  Running  →  player outside every tile  →  Over (terminal)              │
/// │  Running  →  player in trailing half    →  Running (track scrolls)      │
/// └─────────────────────────────────────────────────────────────────────────┘
pub enum ZigZag {
    /// Waiting for `config.json`
    Loading,

    /// Track and player built, frames are flowing
    Loaded(Run),
}

impl ZigZag {
    pub fn new() -> Self {
        ZigZag::Loading
    }

    /// A missing or broken config is not fatal, the defaults are playable
    async fn load_config() -> GameConfig {
        let loaded = browser::fetch_json::<GameConfig>(GameConfig::PATH)
            .await
            .with_context(|| format!("Failed to load game config from : {}", GameConfig::PATH))
            .and_then(|config| config.validate().map(|_| config));

        match loaded {
            Ok(config) => config,
            Err(err) => {
                log!("Using default game config : {:#}", err);
                GameConfig::default()
            }
        }
    }
}

impl Default for ZigZag {
    fn default() -> Self {
        ZigZag::new()
    }
}

#[async_trait(?Send)]
impl Game for ZigZag {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            ZigZag::Loading => {
                let config = Self::load_config().await;
                Ok(Box::new(ZigZag::Loaded(Run::from_config(&config))))
            }
            ZigZag::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, delta_time: f64, pointer: &PointerState) {
        if let ZigZag::Loaded(run) = self {
            // every press is one toggle, applied before the move
            for _ in 0..pointer.presses() {
                run.change_direction();
            }
            run.update(delta_time);
        }
    }

    fn draw(&self, renderer: &Renderer) -> Result<()> {
        match self {
            ZigZag::Loaded(run) => run.draw(renderer, renderer.viewport()),
            ZigZag::Loading => Ok(()),
        }
    }

    fn is_over(&self) -> bool {
        matches!(self, ZigZag::Loaded(run) if run.is_game_over())
    }
}

/// World is turned so the zig-zag runs up the screen
const CAMERA_ROTATION: f64 = -3.0 * PI / 4.0;

pub struct Run {
    player: Player,
    track: Track,
    background: String,
    is_game_over: bool,
}

impl Run {
    pub fn new(track: Track, player: Player) -> Self {
        Run {
            player,
            track,
            background: crate::config::defaults::BACKGROUND_COLOR.to_string(),
            is_game_over: false,
        }
    }

    /// Player starts centred in the first tile's leading square
    pub fn from_config(config: &GameConfig) -> Self {
        let track = Track::from_config(&config.track);
        let start = config.player_start();
        let player = Player::new(
            config.player_radius(),
            Point { x: start, y: start },
            config.player.speed,
            config.player.direction,
        )
        .with_color(config.player.color.clone());

        Run {
            background: config.background_color.clone(),
            ..Run::new(track, player)
        }
    }

    /// Moves the player, then either latches game over or lets the track
    /// scroll. Nothing changes once the run is over.
    pub fn update(&mut self, delta_time: f64) {
        if self.is_game_over {
            return;
        }

        self.player.update(delta_time);
        match self.track.locate_player(&self.player) {
            None => self.is_game_over = true,
            Some(path_index) => self.track.update(path_index),
        }
    }

    pub fn change_direction(&mut self) {
        self.player.change_direction();
    }

    /// Camera: centre of the viewport, rotated, following the player
    /// - draw order matters : background -> track -> player
    pub fn draw(&self, surface: &impl Surface, viewport: Size) -> Result<()> {
        surface.set_fill_style(&self.background);
        surface.fill_rect(&Rect::new(Point::default(), viewport));

        surface.save();
        let drawn = self.draw_world(surface, viewport);
        surface.restore();
        drawn
    }

    fn draw_world(&self, surface: &impl Surface, viewport: Size) -> Result<()> {
        surface.translate(viewport.width / 2.0, viewport.height / 2.0)?;
        surface.rotate(CAMERA_ROTATION)?;
        let position = self.player.position();
        surface.translate(-position.x, -position.y)?;
        self.track.draw(surface);
        self.player.draw(surface)
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn track(&self) -> &Track {
        &self.track
    }
}
