//! Pointer events to chart commands.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{hit_test, MenuOutcome, MenuTarget, RadialMenu, SurfaceHit};
use crate::chart::{AppliedCommand, ChartCommand, ChartSession};
use crate::layout::{ChartGrid, GridConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Plain click / tap
    Primary,
    /// Context click / long press
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Vec2,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            button: PointerButton::Primary,
        }
    }

    pub fn secondary(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            button: PointerButton::Secondary,
        }
    }
}

/// Interaction state of the 2D chart: the grid and the radial menu.
///
/// - primary click on a surface cycles it
/// - secondary click on a surface opens the menu there
/// - primary click inside the open menu issues the chosen command and closes it
/// - any click outside the open menu closes it
#[derive(Debug, Clone)]
pub struct InteractionController {
    grid: ChartGrid,
    menu: RadialMenu,
}

impl InteractionController {
    pub fn new(config: GridConfig, show_primary: bool) -> Self {
        let menu = RadialMenu::new(config.menu_radius, config.menu_inner_radius);
        Self {
            grid: ChartGrid::new(config, show_primary),
            menu,
        }
    }

    pub fn grid(&self) -> &ChartGrid {
        &self.grid
    }

    pub fn menu(&self) -> &RadialMenu {
        &self.menu
    }

    /// Rebuild the grid for a different dentition visibility. Closes the menu.
    pub fn set_show_primary(&mut self, show_primary: bool) {
        if self.grid.show_primary != show_primary {
            self.grid = ChartGrid::new(self.grid.config.clone(), show_primary);
        }
        self.menu.close();
    }

    pub fn hit_test(&self, point: Vec2) -> Option<SurfaceHit> {
        hit_test(&self.grid, point)
    }

    /// Translate a pointer event into a command, updating menu state.
    pub fn handle(&mut self, event: PointerEvent) -> Option<ChartCommand> {
        if self.menu.is_open() {
            match event.button {
                PointerButton::Primary => {
                    return match self.menu.select(event.position) {
                        MenuOutcome::Selected(command) => Some(command),
                        MenuOutcome::Dismissed | MenuOutcome::Ignored => None,
                    };
                }
                PointerButton::Secondary => self.menu.close(),
            }
        }

        let hit = self.hit_test(event.position)?;
        match event.button {
            PointerButton::Primary => Some(ChartCommand::cycle(hit.tooth, hit.surface)),
            PointerButton::Secondary => {
                debug!(tooth = %hit.tooth, surface = %hit.surface, "radial menu opened");
                self.menu.open(
                    event.position,
                    MenuTarget {
                        tooth: hit.tooth,
                        surface: Some(hit.surface),
                    },
                );
                None
            }
        }
    }

    /// Handle an event and dispatch the resulting command to a session.
    pub fn apply(
        &mut self,
        session: &mut ChartSession,
        event: PointerEvent,
    ) -> Option<AppliedCommand> {
        let command = self.handle(event)?;
        session.dispatch(command)
    }
}
