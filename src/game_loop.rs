//! Game loop thread: ticks the session and renders at ~60 Hz.
//!
//! The session lives behind one `Mutex` shared by the loop thread and the
//! input side ([`GameHandle`]), so a player move never interleaves with an
//! update. The renderer and the end-of-session collaborators are moved into
//! the loop thread and handed back when it is joined, so they survive any
//! number of pause/resume cycles.
//!
//! `pause` clears the running flag, wakes the thread and joins it: it never
//! returns while the loop can still touch the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::consts::FRAME_INTERVAL_MS;
use crate::error::GameError;
use crate::highscores::ScoreSink;
use crate::renderer::Renderer;
use crate::sim::{Direction, GameEvent, GameState, move_player, tick};

/// End-of-session notifications, delivered on the loop thread
pub trait SessionObserver: Send {
    /// Player reached the exit. Fired once per session.
    fn on_victory(&mut self, _score: u32) {}
    /// Player lost the last heart. Fired once per session.
    fn on_defeat(&mut self, _score: u32) {}
    /// Player lost a heart but play continues from the start tile
    fn on_caught(&mut self, _health: u8) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// Collaborators owned by whichever thread is driving the session
pub struct LoopParts {
    pub renderer: Box<dyn Renderer>,
    pub scores: Box<dyn ScoreSink>,
    pub observer: Box<dyn SessionObserver>,
}

impl LoopParts {
    pub fn new(
        renderer: impl Renderer + 'static,
        scores: impl ScoreSink + 'static,
        observer: impl SessionObserver + 'static,
    ) -> Self {
        Self {
            renderer: Box::new(renderer),
            scores: Box::new(scores),
            observer: Box::new(observer),
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Caught { health } => self.observer.on_caught(health),
            GameEvent::Victory { score } => {
                self.scores.report_score(score);
                self.observer.on_victory(score);
            }
            GameEvent::Defeat { score } => {
                self.scores.report_score(score);
                self.observer.on_defeat(score);
            }
        }
    }
}

/// Cloneable input-side access to the shared session
#[derive(Debug, Clone)]
pub struct GameHandle {
    state: Arc<Mutex<GameState>>,
}

impl GameHandle {
    fn new(state: GameState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Lock the session. A panic elsewhere never leaves it half-updated
    /// (tick and moves commit whole values), so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a player move immediately; see [`move_player`]
    pub fn move_player(&self, d_row: i32, d_col: i32) -> bool {
        move_player(&mut self.lock(), d_row, d_col)
    }

    pub fn move_direction(&self, direction: Direction) -> bool {
        let (d_row, d_col) = direction.delta();
        self.move_player(d_row, d_col)
    }

    /// Read the session under the lock
    pub fn with_state<T>(&self, f: impl FnOnce(&GameState) -> T) -> T {
        f(&self.lock())
    }
}

/// Drives `tick` and the renderer on a dedicated thread
pub struct GameLoop {
    handle: GameHandle,
    running: Arc<AtomicBool>,
    frame_interval: Duration,
    /// Collaborators while no thread holds them
    parts: Option<LoopParts>,
    thread: Option<JoinHandle<LoopParts>>,
}

impl GameLoop {
    /// Create a paused loop; call [`GameLoop::resume`] to start it
    pub fn new(state: GameState, parts: LoopParts) -> Self {
        Self {
            handle: GameHandle::new(state),
            running: Arc::new(AtomicBool::new(false)),
            frame_interval: Duration::from_millis(FRAME_INTERVAL_MS),
            parts: Some(parts),
            thread: None,
        }
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn handle(&self) -> GameHandle {
        self.handle.clone()
    }

    /// True while the loop thread is ticking
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn move_player(&self, d_row: i32, d_col: i32) -> bool {
        self.handle.move_player(d_row, d_col)
    }

    /// Start (or restart after pause) the loop thread. No-op while running.
    pub fn resume(&mut self) -> Result<(), GameError> {
        if self.thread.is_some() {
            if self.is_running() {
                return Ok(());
            }
            // Loop finished on its own (session ended); reclaim its parts
            self.join()?;
        }

        let parts = self.parts.take().ok_or(GameError::LoopParts)?;
        self.running.store(true, Ordering::Release);

        let ctx = LoopContext {
            handle: self.handle.clone(),
            running: Arc::clone(&self.running),
            frame_interval: self.frame_interval,
        };
        let spawned = thread::Builder::new()
            .name("grid-chase-loop".into())
            .spawn(move || run_loop(ctx, parts));

        match spawned {
            Ok(thread) => {
                self.thread = Some(thread);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(GameError::Spawn(e))
            }
        }
    }

    /// Stop the loop and wait for the thread to exit. No-op when stopped.
    pub fn pause(&mut self) -> Result<(), GameError> {
        self.running.store(false, Ordering::Release);
        self.join()
    }

    /// Stop the loop, reset the session to its starting state, start again
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.pause()?;
        self.handle.lock().restart();
        self.resume()
    }

    fn join(&mut self) -> Result<(), GameError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread.thread().unpark();
        match thread.join() {
            Ok(parts) => {
                self.parts = Some(parts);
                Ok(())
            }
            Err(_) => {
                log::error!("Game loop thread panicked");
                Err(GameError::LoopPanicked)
            }
        }
    }
}

impl Drop for GameLoop {
    fn drop(&mut self) {
        if let Err(e) = self.pause() {
            log::warn!("Game loop did not stop cleanly: {}", e);
        }
    }
}

struct LoopContext {
    handle: GameHandle,
    running: Arc<AtomicBool>,
    frame_interval: Duration,
}

/// The loop. Runs until the running flag clears or the session ends.
fn run_loop(ctx: LoopContext, mut parts: LoopParts) -> LoopParts {
    log::info!("Game loop started");

    while ctx.running.load(Ordering::Acquire) {
        let frame_start = Instant::now();

        // 1. Update and draw under the session lock
        let (event, finished) = {
            let mut state = ctx.handle.lock();
            let event = tick(&mut state, frame_start);
            parts.renderer.render(&state.frame());
            (event, state.phase.is_terminal())
        };

        // 2. Notify collaborators outside the lock
        if let Some(event) = event {
            parts.dispatch(event);
        }

        // 3. A finished session processes no further ticks
        if finished {
            ctx.running.store(false, Ordering::Release);
            break;
        }

        // 4. Sleep out the rest of the frame budget
        wait_until(frame_start + ctx.frame_interval, &ctx.running);
    }

    log::info!("Game loop stopped");
    parts
}

/// Park until `deadline` or until the running flag clears.
fn wait_until(deadline: Instant, running: &AtomicBool) {
    loop {
        if !running.load(Ordering::Acquire) {
            return;
        }
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::park_timeout(deadline - now);
        if Instant::now() < deadline && running.load(Ordering::Acquire) {
            log::trace!("Loop wait interrupted early, continuing");
        }
    }
}
