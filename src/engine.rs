use crate::browser;
use anyhow::{anyhow, Result};
// wasm is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use self::input::{PointerInput, PointerState, Viewport};

/// TABLE
/// ┌──────────────────────── Frame Flow ─────────────────────────────┐
/// │                                                                 │
/// │   requestAnimationFrame(perf)                                   │
/// │        │                                                        │
/// │        ├─► FrameClock::tick(perf)     -> delta_time (seconds)   │
/// │        ├─► PointerInput::drain()      -> PointerState           │
/// │        ├─► Game::update(delta_time, &PointerState)              │
/// │        ├─► Game::draw(&Renderer)                                │
/// │        └─► Game::is_over() ? dispose listeners, stop            │
/// │                             : request next frame                │
/// └─────────────────────────────────────────────────────────────────┘
#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, delta_time: f64, pointer: &PointerState);
    fn draw(&self, renderer: &Renderer) -> Result<()>;
    fn is_over(&self) -> bool;
}

/// Turns the monotonically increasing animation frame timestamps (ms) into
/// per frame deltas (seconds)
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last_frame: f64,
}

impl FrameClock {
    pub fn new(start: f64) -> Self {
        FrameClock { last_frame: start }
    }

    pub fn tick(&mut self, now: f64) -> f64 {
        let delta_time = (now - self.last_frame) * 0.001;
        self.last_frame = now;
        delta_time
    }
}

pub struct GameLoop;

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

/// Everything the loop subscribes to, released together once the game is over
struct Listeners {
    pointer: PointerInput,
    viewport: Viewport,
}

impl Listeners {
    fn dispose(self) -> Result<()> {
        let pointer = self.pointer.dispose();
        let viewport = self.viewport.dispose();
        pointer.and(viewport)
    }
}

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut game = game.initialize().await?;
        let canvas = browser::canvas()?;
        let mut listeners = Some(Listeners {
            pointer: PointerInput::attach(canvas.clone())?,
            viewport: Viewport::attach(browser::window()?, canvas.clone())?,
        });
        let renderer = Renderer::new(browser::context_of(&canvas)?, canvas);
        let mut clock = FrameClock::new(browser::now()?);

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            let delta_time = clock.tick(perf);
            let pointer = listeners
                .as_mut()
                .map(|listeners| listeners.pointer.drain())
                .unwrap_or_default();

            game.update(delta_time, &pointer);
            if let Err(err) = game.draw(&renderer) {
                error!("GameLoop: draw failed : {:#?}", err);
            }

            if game.is_over() {
                log!("Game over");
                if let Some(listeners) = listeners.take() {
                    if let Err(err) = listeners.dispose() {
                        error!("GameLoop: could not dispose listeners : {:#?}", err);
                    }
                }
                // no further frame is requested, the loop ends here
                return;
            }

            if let Some(next_frame) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next_frame) {
                    error!("GameLoop: {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Axis aligned rectangle positioned by its top left corner
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub const fn new_from_x_y(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn right(&self) -> f64 {
        self.x() + self.width()
    }

    pub fn bottom(&self) -> f64 {
        self.y() + self.height()
    }

    /// Shrinks every edge by `amount`
    pub fn inset(&self, amount: f64) -> Rect {
        Rect::new_from_x_y(
            self.x() + amount,
            self.y() + amount,
            self.width() - 2.0 * amount,
            self.height() - 2.0 * amount,
        )
    }

    /// Inclusive on all four edges
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x()
            && point.x <= self.right()
            && point.y >= self.y()
            && point.y <= self.bottom()
    }

    /// Shared area of two rectangles, `None` when they only touch or are apart
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x().max(other.x());
        let top = self.y().max(other.y());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new_from_x_y(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

// ==================== Rendering ====================
/// The only drawing operations the game issues
/// - Renderer forwards them to a CanvasRenderingContext2d
/// - tests record them instead
pub trait Surface {
    fn set_fill_style(&self, color: &str);
    fn fill_rect(&self, rect: &Rect);
    fn fill_circle(&self, center: Point, radius: f64) -> Result<()>;
    fn save(&self);
    fn restore(&self);
    fn translate(&self, x: f64, y: f64) -> Result<()>;
    fn rotate(&self, angle: f64) -> Result<()>;
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d, canvas: HtmlCanvasElement) -> Self {
        Renderer { context, canvas }
    }

    /// Current canvas size, follows the window through `input::Viewport`
    pub fn viewport(&self) -> Size {
        Size {
            width: self.canvas.width().into(),
            height: self.canvas.height().into(),
        }
    }
}

impl Surface for Renderer {
    fn set_fill_style(&self, color: &str) {
        self.context.set_fill_style_str(color);
    }

    fn fill_rect(&self, rect: &Rect) {
        self.context
            .fill_rect(rect.x(), rect.y(), rect.width(), rect.height());
    }

    fn fill_circle(&self, center: Point, radius: f64) -> Result<()> {
        self.context.begin_path();
        self.context
            .arc(center.x, center.y, radius, 0.0, TAU)
            .map_err(|err| anyhow!("Could not draw arc : {:#?}", err))?;
        self.context.fill();
        Ok(())
    }

    fn save(&self) {
        self.context.save();
    }

    fn restore(&self) {
        self.context.restore();
    }

    fn translate(&self, x: f64, y: f64) -> Result<()> {
        self.context
            .translate(x, y)
            .map_err(|err| anyhow!("Could not translate context : {:#?}", err))
    }

    fn rotate(&self, angle: f64) -> Result<()> {
        self.context
            .rotate(angle)
            .map_err(|err| anyhow!("Could not rotate context : {:#?}", err))
    }
}

// ==================== Input ====================
pub mod input {
    use crate::browser;
    use anyhow::{anyhow, Result};
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{Event, HtmlCanvasElement, Window};

    const POINTER_DOWN: &str = "pointerdown";
    const RESIZE: &str = "resize";

    /// One pointer down on the canvas
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PointerPress;

    /// Pointer presses collected since the previous frame
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct PointerState {
        presses: u32,
    }

    impl PointerState {
        pub fn presses(&self) -> u32 {
            self.presses
        }

        pub fn record_press(&mut self) {
            self.presses += 1;
        }
    }

    /// Empties the channel without waiting
    /// - Ok(Some) : a press is queued
    /// - Ok(None) : sender dropped
    /// - Err      : nothing queued yet
    pub fn drain_presses(receiver: &mut UnboundedReceiver<PointerPress>) -> PointerState {
        let mut state = PointerState::default();
        while let Ok(Some(PointerPress)) = receiver.try_next() {
            state.record_press();
        }
        state
    }

    /// `pointerdown` listener on the canvas
    /// - attach() subscribes
    /// - dispose() unsubscribes and drops the closure
    pub struct PointerInput {
        target: HtmlCanvasElement,
        on_pointer_down: Closure<dyn FnMut(Event)>,
        receiver: UnboundedReceiver<PointerPress>,
    }

    impl PointerInput {
        pub fn attach(target: HtmlCanvasElement) -> Result<Self> {
            let (sender, receiver) = unbounded();
            let on_pointer_down = browser::closure_wrap(Box::new(move |_event: Event| {
                // receiver only goes away together with this closure
                let _ = sender.unbounded_send(PointerPress);
            }) as Box<dyn FnMut(Event)>);

            target
                .add_event_listener_with_callback(
                    POINTER_DOWN,
                    on_pointer_down.as_ref().unchecked_ref(),
                )
                .map_err(|err| anyhow!("Could not listen for {} : {:#?}", POINTER_DOWN, err))?;

            Ok(PointerInput {
                target,
                on_pointer_down,
                receiver,
            })
        }

        pub fn drain(&mut self) -> PointerState {
            drain_presses(&mut self.receiver)
        }

        pub fn dispose(self) -> Result<()> {
            self.target
                .remove_event_listener_with_callback(
                    POINTER_DOWN,
                    self.on_pointer_down.as_ref().unchecked_ref(),
                )
                .map_err(|err| anyhow!("Could not remove {} listener : {:#?}", POINTER_DOWN, err))
        }
    }

    /// Keeps the canvas the size of the window
    pub struct Viewport {
        window: Window,
        on_resize: Closure<dyn FnMut(Event)>,
    }

    impl Viewport {
        pub fn attach(window: Window, canvas: HtmlCanvasElement) -> Result<Self> {
            fit_to_window(&canvas)?;
            let on_resize = browser::closure_wrap(Box::new(move |_event: Event| {
                if let Err(err) = fit_to_window(&canvas) {
                    error!("Viewport: {:#?}", err);
                }
            }) as Box<dyn FnMut(Event)>);

            window
                .add_event_listener_with_callback(RESIZE, on_resize.as_ref().unchecked_ref())
                .map_err(|err| anyhow!("Could not listen for {} : {:#?}", RESIZE, err))?;

            Ok(Viewport { window, on_resize })
        }

        pub fn dispose(self) -> Result<()> {
            self.window
                .remove_event_listener_with_callback(RESIZE, self.on_resize.as_ref().unchecked_ref())
                .map_err(|err| anyhow!("Could not remove {} listener : {:#?}", RESIZE, err))
        }
    }

    fn fit_to_window(canvas: &HtmlCanvasElement) -> Result<()> {
        let (width, height) = browser::inner_size()?;
        canvas.set_width(width);
        canvas.set_height(height);
        Ok(())
    }

}

// ==================== Test support ====================
#[cfg(test)]
pub mod testing {
    use super::{Point, Rect, Surface};
    use anyhow::Result;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        FillStyle(String),
        FillRect(Rect),
        FillCircle(Point, f64),
        Save,
        Restore,
        Translate(f64, f64),
        Rotate(f64),
    }

    /// Surface that remembers every call in order
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        calls: RefCell<Vec<DrawCall>>,
    }

    impl RecordingSurface {
        pub fn calls(&self) -> Vec<DrawCall> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: DrawCall) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Surface for RecordingSurface {
        fn set_fill_style(&self, color: &str) {
            self.record(DrawCall::FillStyle(color.to_string()));
        }

        fn fill_rect(&self, rect: &Rect) {
            self.record(DrawCall::FillRect(*rect));
        }

        fn fill_circle(&self, center: Point, radius: f64) -> Result<()> {
            self.record(DrawCall::FillCircle(center, radius));
            Ok(())
        }

        fn save(&self) {
            self.record(DrawCall::Save);
        }

        fn restore(&self) {
            self.record(DrawCall::Restore);
        }

        fn translate(&self, x: f64, y: f64) -> Result<()> {
            self.record(DrawCall::Translate(x, y));
            Ok(())
        }

        fn rotate(&self, angle: f64) -> Result<()> {
            self.record(DrawCall::Rotate(angle));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_clock_reports_seconds_between_ticks() {
        let mut clock = FrameClock::new(1000.0);
        assert_relative_eq!(clock.tick(1000.0), 0.0);
        assert_relative_eq!(clock.tick(1016.0), 0.016, epsilon = 1e-12);
        assert_relative_eq!(clock.tick(2016.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn inset_contains_is_inclusive_on_every_edge() {
        let inner = Rect::new_from_x_y(0.0, 0.0, 300.0, 150.0).inset(30.0);

        assert!(inner.contains(Point { x: 30.0, y: 30.0 }));
        assert!(inner.contains(Point { x: 270.0, y: 120.0 }));
        assert!(!inner.contains(Point { x: 29.9, y: 75.0 }));
        assert!(!inner.contains(Point { x: 75.0, y: 120.1 }));
    }

    #[test]
    fn intersection_ignores_touching_edges() {
        let a = Rect::new_from_x_y(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new_from_x_y(10.0, 0.0, 10.0, 10.0);
        let overlapping = Rect::new_from_x_y(5.0, 5.0, 10.0, 10.0);

        assert_eq!(a.intersection(&touching), None);
        assert_eq!(
            a.intersection(&overlapping),
            Some(Rect::new_from_x_y(5.0, 5.0, 5.0, 5.0))
        );
    }
}
