//! Host Context
//!
//! What a plugin receives at construction: the event bus, the frame clock,
//! the current day phase and a queue for deferred plugin toggles. The context is a bundle of `Rc`
//! handles, so cloning it is cheap and every clone sees the same state.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::events::{DayPhase, EventBus};

/// Target of `on_render`.
///
/// Drawing proper lives outside this crate; the host hands plugins whatever
/// surface it renders to.
pub trait RenderSurface {
    /// Draw a line of text at the given position
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
}

/// A surface that records text draws, used by the headless host
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextSurface {
    lines: Vec<(i32, i32, String)>,
}

impl TextSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything drawn so far
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Draw calls in order: `(x, y, text)`
    pub fn lines(&self) -> &[(i32, i32, String)] {
        &self.lines
    }

    /// Drawn text sorted top to bottom, then left to right
    pub fn text(&self) -> Vec<String> {
        let mut lines = self.lines.clone();
        lines.sort_by_key(|(x, y, _)| (*y, *x));
        lines.into_iter().map(|(_, _, text)| text).collect()
    }
}

impl RenderSurface for TextSurface {
    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.lines.push((x, y, text.to_string()));
    }
}

/// Frame counter and measured frame rate, shared with plugins
#[derive(Debug, Default)]
pub struct HostClock {
    frame: Cell<u64>,
    elapsed: Cell<f64>,
    fps: Cell<f64>,
}

impl HostClock {
    /// Advance by one frame of `dt` seconds
    pub fn tick(&self, dt: f64) {
        self.frame.set(self.frame.get() + 1);
        self.elapsed.set(self.elapsed.get() + dt);
        if dt > 0.0 {
            self.fps.set(1.0 / dt);
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame.get()
    }

    /// Seconds of simulated time since start
    pub fn elapsed(&self) -> f64 {
        self.elapsed.get()
    }

    /// Frame rate derived from the last tick
    pub fn fps(&self) -> f64 {
        self.fps.get()
    }
}

/// A toggle requested from inside a hook, applied after the current dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginCommand {
    Enable(String),
    Disable(String),
}

/// Handle to host services given to each plugin
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    events: Rc<EventBus>,
    clock: Rc<HostClock>,
    day_phase: Rc<Cell<Option<DayPhase>>>,
    commands: Rc<RefCell<VecDeque<PluginCommand>>>,
}

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn clock(&self) -> &HostClock {
        &self.clock
    }

    /// Phase published by the daytime cycle, if one is running
    pub fn day_phase(&self) -> Option<DayPhase> {
        self.day_phase.get()
    }

    pub fn set_day_phase(&self, phase: Option<DayPhase>) {
        self.day_phase.set(phase);
    }

    /// Ask the manager to enable `name` once the current dispatch completes
    pub fn request_enable<S: Into<String>>(&self, name: S) {
        self.commands.borrow_mut().push_back(PluginCommand::Enable(name.into()));
    }

    /// Ask the manager to disable `name` once the current dispatch completes
    pub fn request_disable<S: Into<String>>(&self, name: S) {
        self.commands.borrow_mut().push_back(PluginCommand::Disable(name.into()));
    }

    /// Take every queued command, oldest first
    pub fn drain_commands(&self) -> Vec<PluginCommand> {
        self.commands.borrow_mut().drain(..).collect()
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let context = HostContext::new();
        let clone = context.clone();

        clone.clock().tick(0.5);
        clone.request_disable("calendar");

        assert_eq!(context.clock().frame(), 1);
        assert_eq!(context.clock().fps(), 2.0);
        assert_eq!(context.pending_commands(), 1);
        assert_eq!(context.drain_commands(), vec![PluginCommand::Disable("calendar".into())]);
        assert_eq!(clone.pending_commands(), 0);

        assert_eq!(context.day_phase(), None);
        clone.set_day_phase(Some(DayPhase::Night));
        assert_eq!(context.day_phase(), Some(DayPhase::Night));
    }

    #[test]
    fn test_text_surface_orders_by_position() {
        let mut surface = TextSurface::new();
        surface.draw_text(150, 200, "Weekday: Monday");
        surface.draw_text(10, 10, "FPS: 60");
        surface.draw_text(150, 150, "Day: 1");

        assert_eq!(surface.text(), vec!["FPS: 60", "Day: 1", "Weekday: Monday"]);
        surface.clear();
        assert!(surface.lines().is_empty());
    }
}
