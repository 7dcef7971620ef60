//! Calendar Plugin
//!
//! Counts days and weekdays. A new day starts when the daytime cycle moves
//! from Night to Morning, so this plugin depends on `daytime`.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use crate::events::{DayPhase, Event, EventKind, SubscriptionId};
use crate::plugin::context::{HostContext, RenderSurface};
use crate::plugin::error::PluginResult;
use crate::plugin::traits::Plugin;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Day counter driven by phase changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarModel {
    day: u32,
    weekday_index: usize,
    last_phase: Option<DayPhase>,
}

impl CalendarModel {
    pub fn new() -> Self {
        Self {
            day: 1,
            weekday_index: 0,
            last_phase: None,
        }
    }

    /// Start counting from the phase the daytime cycle is already in
    pub fn starting_at(phase: Option<DayPhase>) -> Self {
        Self {
            last_phase: phase,
            ..Self::new()
        }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn weekday(&self) -> &'static str {
        WEEKDAYS[self.weekday_index]
    }

    /// Record a phase change; returns true when it started a new day
    pub fn on_phase(&mut self, phase: DayPhase) -> bool {
        let new_day = self.last_phase == Some(DayPhase::Night) && phase == DayPhase::Morning;
        if new_day {
            self.day += 1;
            self.weekday_index = (self.weekday_index + 1) % WEEKDAYS.len();
        }
        self.last_phase = Some(phase);
        new_day
    }
}

impl Default for CalendarModel {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CalendarPlugin {
    context: HostContext,
    model: Rc<RefCell<CalendarModel>>,
    subscription: Option<SubscriptionId>,
}

impl CalendarPlugin {
    pub fn new(context: HostContext) -> Self {
        Self {
            context,
            model: Rc::new(RefCell::new(CalendarModel::new())),
            subscription: None,
        }
    }

    /// Snapshot of the current calendar state
    pub fn model(&self) -> CalendarModel {
        self.model.borrow().clone()
    }
}

impl Plugin for CalendarPlugin {
    fn on_init(&mut self) -> PluginResult<()> {
        *self.model.borrow_mut() = CalendarModel::starting_at(self.context.day_phase());
        let model = self.model.clone();
        let id = self.context.events().subscribe(EventKind::DaytimeChanged, move |event| {
            if let Event::DaytimeChanged(phase) = event {
                let mut model = model.borrow_mut();
                if model.on_phase(*phase) {
                    info!("[Calendar] New day: {} ({})", model.day(), model.weekday());
                }
            }
            Ok(())
        });
        self.subscription = Some(id);

        info!("[Calendar] Initialized");
        Ok(())
    }

    fn on_render(&mut self, surface: &mut dyn RenderSurface) -> PluginResult<()> {
        let model = self.model.borrow();
        surface.draw_text(150, 150, &format!("Day: {}", model.day()));
        surface.draw_text(150, 200, &format!("Weekday: {}", model.weekday()));
        Ok(())
    }

    fn on_shutdown(&mut self) -> PluginResult<()> {
        if let Some(id) = self.subscription.take() {
            self.context.events().unsubscribe(id);
        }
        Ok(())
    }
}

pub fn create(context: &HostContext) -> PluginResult<Box<dyn Plugin>> {
    Ok(Box::new(CalendarPlugin::new(context.clone())))
}
