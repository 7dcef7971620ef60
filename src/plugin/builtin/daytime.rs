//! Daytime Cycle Plugin
//!
//! Cycles through the phases of the day on a fixed interval of simulated
//! time and announces every change on the event bus.

use log::{info, warn};

use crate::events::{DayPhase, Event};
use crate::plugin::context::{HostContext, RenderSurface};
use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;

/// Seconds of simulated time per phase
pub const DEFAULT_CHANGE_INTERVAL: f64 = 2.0;

/// Button that skips straight to morning
pub const SLEEP_BUTTON: &str = "sleep";

/// Custom event name for setting the phase directly; payload is the phase name
pub const SET_PHASE_EVENT: &str = "daytime.set_phase";

/// Phase bookkeeping, independent of the host
#[derive(Debug, Clone, PartialEq)]
pub struct DaytimeModel {
    phase: DayPhase,
    elapsed: f64,
    change_interval: f64,
}

impl DaytimeModel {
    pub fn new(change_interval: f64) -> Self {
        Self {
            phase: DayPhase::Morning,
            elapsed: 0.0,
            change_interval,
        }
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    /// Accumulate `dt`; returns the new phase when the interval elapses
    pub fn update(&mut self, dt: f64) -> Option<DayPhase> {
        self.elapsed += dt;
        if self.elapsed >= self.change_interval {
            self.elapsed = 0.0;
            self.phase = self.phase.next();
            return Some(self.phase);
        }
        None
    }

    /// Jump to `phase`; returns it if it differs from the current one
    pub fn set_phase(&mut self, phase: DayPhase) -> Option<DayPhase> {
        if phase == self.phase {
            return None;
        }
        self.phase = phase;
        self.elapsed = 0.0;
        Some(phase)
    }
}

impl Default for DaytimeModel {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGE_INTERVAL)
    }
}

/// Drives [`DaytimeModel`] from the host loop
pub struct DaytimePlugin {
    context: HostContext,
    model: DaytimeModel,
}

impl DaytimePlugin {
    pub fn new(context: HostContext) -> Self {
        Self {
            context,
            model: DaytimeModel::default(),
        }
    }

    pub fn model(&self) -> &DaytimeModel {
        &self.model
    }

    fn announce(&self, phase: Option<DayPhase>) {
        if let Some(phase) = phase {
            self.context.set_day_phase(Some(phase));
            info!("[Daytime] New phase: {}", phase);
            self.context.events().publish(&Event::DaytimeChanged(phase));
        }
    }
}

impl Plugin for DaytimePlugin {
    fn on_init(&mut self) -> PluginResult<()> {
        self.context.set_day_phase(Some(self.model.phase()));
        info!("[Daytime] Initialized at {}", self.model.phase());
        Ok(())
    }

    fn on_event(&mut self, event: &Event) -> PluginResult<()> {
        let changed = match event {
            Event::ButtonClicked(id) if id == SLEEP_BUTTON => {
                info!("[Daytime] Sleeping... setting time to Morning.");
                self.model.set_phase(DayPhase::Morning)
            }
            Event::Custom { name, payload } if name == SET_PHASE_EVENT => {
                match payload.as_str().map(str::parse::<DayPhase>) {
                    Some(Ok(phase)) => self.model.set_phase(phase),
                    _ => {
                        warn!("[Daytime] Unknown phase '{}'", payload);
                        None
                    }
                }
            }
            _ => None,
        };
        self.announce(changed);
        Ok(())
    }

    fn on_update(&mut self, dt: f64) -> PluginResult<()> {
        let changed = self.model.update(dt);
        self.announce(changed);
        Ok(())
    }

    fn on_render(&mut self, surface: &mut dyn RenderSurface) -> PluginResult<()> {
        surface.draw_text(150, 100, &format!("Time: {}", self.model.phase()));
        Ok(())
    }

    fn on_shutdown(&mut self) -> PluginResult<()> {
        self.context.set_day_phase(None);
        Ok(())
    }
}

pub fn create(context: &HostContext) -> PluginResult<Box<dyn Plugin>> {
    Ok(Box::new(DaytimePlugin::new(context.clone())))
}
