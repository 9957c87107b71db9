use log::{debug, info};
use winit::keyboard::KeyCode;

use crate::core::input::UiEvent;
use crate::game::entity::Entity;
use crate::game::scene::SceneRequest;
use crate::game::tick::{MenuCursor, TickContext};
use crate::ui::color::{RED, WHITE};

pub const FOCUSED_RGBA: [f32; 4] = WHITE;
pub const UNFOCUSED_RGBA: [f32; 4] = RED;

#[inline(always)]
pub const fn item_rgba(focused: bool) -> [f32; 4] {
    if focused { FOCUSED_RGBA } else { UNFOCUSED_RGBA }
}

fn pressed(events: &[UiEvent], wanted: KeyCode) -> bool {
    events
        .iter()
        .any(|e| matches!(e, UiEvent::KeyPressed { key, .. } if *key == wanted))
}

/// A selectable menu entry. Selected by its hotkey, or by Enter while it
/// holds the menu's focus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub hotkey: KeyCode,
    pub target: SceneRequest,
    /// Position in the menu, matched against the cursor's focus.
    pub index: usize,
    focused: bool,
}

impl MenuItem {
    pub fn new(
        label: impl Into<String>,
        hotkey: KeyCode,
        target: SceneRequest,
        index: usize,
    ) -> Self {
        Self {
            label: label.into(),
            hotkey,
            target,
            index,
            focused: index == 0,
        }
    }

    #[inline(always)]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focus(&mut self, focused: bool) {
        if focused != self.focused {
            debug!("Menu item '{}' focus: {focused}", self.label);
        }
        self.focused = focused;
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>, entity: &mut Entity) {
        let cursor = ctx.menu_cursor();
        if let Some(cursor) = cursor {
            self.set_focus(cursor.focus == self.index);
        }
        entity.renderable_mut().set_fill(item_rgba(self.focused));

        let by_cursor = self.focused && cursor.is_some_and(|c| c.selected);
        if by_cursor || pressed(ctx.ui_events, self.hotkey) {
            info!("Menu item '{}' selected", self.label);
            ctx.request_scene(self.target);
        }
    }
}

/// Moves the menu focus with the arrow keys and selects with Enter. Lives on
/// the menu's first entity so every item sees the cursor in the same tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuInputHandler {
    focus: usize,
    items: usize,
}

impl MenuInputHandler {
    pub fn new(items: usize) -> Self {
        assert!(items > 0, "a menu needs at least one item");
        Self { focus: 0, items }
    }

    #[inline(always)]
    pub const fn focus(&self) -> usize {
        self.focus
    }

    pub(crate) fn update(&mut self, ctx: &mut TickContext<'_>) {
        let mut selected = false;
        for event in ctx.ui_events {
            let UiEvent::KeyPressed { key, .. } = event else {
                continue;
            };
            match key {
                KeyCode::ArrowDown => self.focus = (self.focus + 1) % self.items,
                KeyCode::ArrowUp => self.focus = (self.focus + self.items - 1) % self.items,
                KeyCode::Enter | KeyCode::NumpadEnter => selected = true,
                _ => {}
            }
        }
        ctx.set_menu_cursor(MenuCursor {
            focus: self.focus,
            selected,
        });
    }
}

/// Static text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Label;
