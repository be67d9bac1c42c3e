//! Radial (pie) context menu.
//!
//! The menu is a small state machine: it is either closed or open at an
//! anchor point for a target tooth (and optionally a surface). Slices are
//! laid out clockwise starting at the top, each centered on its direction.
//! Clicking inside the inner dead zone does nothing; clicking outside the
//! outer radius dismisses the menu.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::chart::ChartCommand;
use crate::models::{Condition, Surface, ToothCondition};
use crate::taxonomy::ToothNumber;

/// What the menu acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTarget {
    pub tooth: ToothNumber,
    pub surface: Option<Surface>,
}

/// One pie slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "item", content = "condition")]
pub enum MenuItem {
    /// Set the targeted surface to a condition
    SurfaceCondition(Condition),
    /// Whole-tooth action
    ToothCondition(ToothCondition),
    /// Clear the tooth
    Reset,
}

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::SurfaceCondition(Condition::Healthy) => "Healthy surface",
            MenuItem::SurfaceCondition(Condition::Caries) => "Caries",
            MenuItem::SurfaceCondition(Condition::Restored) => "Restored",
            MenuItem::SurfaceCondition(Condition::Completed) => "Completed",
            MenuItem::ToothCondition(ToothCondition::Healthy) => "Healthy tooth",
            MenuItem::ToothCondition(ToothCondition::Extracted) => "Extracted",
            MenuItem::Reset => "Reset",
        }
    }

    /// Command this item issues for a target, if it applies to it.
    pub fn command(&self, target: MenuTarget) -> Option<ChartCommand> {
        match *self {
            MenuItem::SurfaceCondition(condition) => target
                .surface
                .map(|surface| ChartCommand::set_surface(target.tooth, surface, condition)),
            MenuItem::ToothCondition(condition) => Some(ChartCommand::ToothEdit {
                tooth: target.tooth,
                condition,
            }),
            MenuItem::Reset => Some(ChartCommand::Reset {
                tooth: target.tooth,
            }),
        }
    }
}

/// Slices offered for a target. Surface conditions only appear when a
/// surface is targeted.
pub fn menu_items(target: &MenuTarget) -> Vec<MenuItem> {
    let mut items = Vec::with_capacity(7);
    if target.surface.is_some() {
        items.extend(Condition::ALL.into_iter().map(MenuItem::SurfaceCondition));
    }
    items.push(MenuItem::ToothCondition(ToothCondition::Healthy));
    items.push(MenuItem::ToothCondition(ToothCondition::Extracted));
    items.push(MenuItem::Reset);
    items
}

/// Menu state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum MenuState {
    Closed,
    Open { anchor: Vec2, target: MenuTarget },
}

/// Result of a click while the menu is open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuOutcome {
    /// An item was chosen; the menu closed
    Selected(ChartCommand),
    /// Click outside the menu; the menu closed
    Dismissed,
    /// Click in the dead zone, or the menu is closed
    Ignored,
}

/// The radial menu.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialMenu {
    state: MenuState,
    radius: f32,
    inner_radius: f32,
}

impl RadialMenu {
    pub fn new(radius: f32, inner_radius: f32) -> Self {
        Self {
            state: MenuState::Closed,
            radius,
            inner_radius,
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open { .. })
    }

    pub fn open(&mut self, anchor: Vec2, target: MenuTarget) {
        self.state = MenuState::Open { anchor, target };
    }

    pub fn close(&mut self) {
        self.state = MenuState::Closed;
    }

    /// Items of the open menu (empty when closed).
    pub fn items(&self) -> Vec<MenuItem> {
        match &self.state {
            MenuState::Open { target, .. } => menu_items(target),
            MenuState::Closed => Vec::new(),
        }
    }

    /// Item under a point, without changing state.
    pub fn item_at(&self, point: Vec2) -> Option<MenuItem> {
        let MenuState::Open { anchor, target } = self.state else {
            return None;
        };
        let offset = point - anchor;
        let distance = offset.length();
        if distance < self.inner_radius || distance > self.radius {
            return None;
        }
        let items = menu_items(&target);
        let index = slice_index(offset, items.len())?;
        items.get(index).copied()
    }

    /// Handle a click.
    pub fn select(&mut self, point: Vec2) -> MenuOutcome {
        let MenuState::Open { anchor, target } = self.state else {
            return MenuOutcome::Ignored;
        };
        let distance = (point - anchor).length();
        if distance > self.radius {
            self.close();
            return MenuOutcome::Dismissed;
        }
        match self.item_at(point).and_then(|item| item.command(target)) {
            Some(command) => {
                self.close();
                MenuOutcome::Selected(command)
            }
            None => MenuOutcome::Ignored,
        }
    }

    /// Center of a slice on screen, for drawing labels.
    pub fn slice_center(&self, index: usize) -> Option<Vec2> {
        let MenuState::Open { anchor, target } = self.state else {
            return None;
        };
        let count = menu_items(&target).len();
        if index >= count {
            return None;
        }
        let angle = index as f32 * std::f32::consts::TAU / count as f32;
        let mid = (self.radius + self.inner_radius) * 0.5;
        // clockwise from the top, y grows downwards
        Some(anchor + Vec2::new(angle.sin(), -angle.cos()) * mid)
    }
}

/// Slice under an offset from the anchor, slices centered on their direction
/// and counted clockwise from the top.
fn slice_index(offset: Vec2, count: usize) -> Option<usize> {
    if count == 0 || offset == Vec2::ZERO {
        return None;
    }
    let tau = std::f32::consts::TAU;
    let slice = tau / count as f32;
    let angle = offset.x.atan2(-offset.y).rem_euclid(tau);
    Some(((angle + slice * 0.5) / slice) as usize % count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tooth(code: u32) -> ToothNumber {
        ToothNumber::new(code).unwrap()
    }

    fn open_menu(surface: Option<Surface>) -> RadialMenu {
        let mut menu = RadialMenu::new(90.0, 20.0);
        menu.open(
            Vec2::new(100.0, 100.0),
            MenuTarget {
                tooth: tooth(16),
                surface,
            },
        );
        menu
    }

    #[test]
    fn test_items_depend_on_target() {
        assert_eq!(open_menu(Some(Surface::Occlusal)).items().len(), 7);
        assert_eq!(open_menu(None).items().len(), 3);
        assert!(RadialMenu::new(90.0, 20.0).items().is_empty());
    }

    #[test]
    fn test_top_slice_is_first_item() {
        let mut menu = open_menu(Some(Surface::Occlusal));
        let outcome = menu.select(Vec2::new(100.0, 40.0));
        assert_eq!(
            outcome,
            MenuOutcome::Selected(ChartCommand::set_surface(
                tooth(16),
                Surface::Occlusal,
                Condition::Healthy
            ))
        );
        assert!(!menu.is_open());
    }

    #[test]
    fn test_slice_centers_select_their_items() {
        let menu = open_menu(Some(Surface::Mesial));
        let items = menu.items();
        for (index, item) in items.iter().enumerate() {
            let center = menu.slice_center(index).unwrap();
            assert_eq!(menu.item_at(center), Some(*item));
        }
    }

    #[test]
    fn test_dead_zone_keeps_menu_open() {
        let mut menu = open_menu(None);
        assert_eq!(menu.select(Vec2::new(105.0, 100.0)), MenuOutcome::Ignored);
        assert!(menu.is_open());
    }

    #[test]
    fn test_click_outside_dismisses() {
        let mut menu = open_menu(None);
        assert_eq!(menu.select(Vec2::new(300.0, 100.0)), MenuOutcome::Dismissed);
        assert!(!menu.is_open());
    }

    #[test]
    fn test_tooth_actions_without_surface() {
        let mut menu = open_menu(None);
        // three slices: healthy (top), extracted (lower right), reset (lower left)
        let extracted = menu.select(Vec2::new(150.0, 130.0));
        assert_eq!(
            extracted,
            MenuOutcome::Selected(ChartCommand::ToothEdit {
                tooth: tooth(16),
                condition: ToothCondition::Extracted,
            })
        );
    }

    #[test]
    fn test_closed_menu_ignores_clicks() {
        let mut menu = RadialMenu::new(90.0, 20.0);
        assert_eq!(menu.select(Vec2::new(0.0, 0.0)), MenuOutcome::Ignored);
    }
}
