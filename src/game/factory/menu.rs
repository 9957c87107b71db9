use glam::DVec2;
use winit::keyboard::KeyCode;

use crate::config::GameMode;
use crate::core::gfx::{Renderable, TextShape};
use crate::game::capability::menu::item_rgba;
use crate::game::capability::{Label, MenuInputHandler, MenuItem};
use crate::game::entity::Entity;
use crate::game::scene::SceneRequest;
use crate::ui::color::{GREEN, WHITE};

pub const TITLE: &str = "notefall";
const TITLE_SIZE: u32 = 100;
const ITEM_SIZE: u32 = 50;
const FOOTER_SIZE: u32 = 25;

const ITEMS: [(&str, KeyCode, SceneRequest); 3] = [
    ("1. Piano", KeyCode::Digit1, SceneRequest::Play(GameMode::Piano)),
    ("2. Drum", KeyCode::Digit2, SceneRequest::Play(GameMode::Drum)),
    ("0. Exit", KeyCode::Digit0, SceneRequest::Exit),
];

fn text(content: &str, char_size: u32, fill: [f32; 4], x: f64, y: f64) -> Entity {
    Entity::new(
        Renderable::Text(TextShape::new(content, char_size, fill)),
        DVec2::new(x, y),
    )
}

/// Entities of the intro scene: title, one item per mode, and the version.
/// The title comes first and carries the menu's input handler.
pub fn create_menu(screen_width: f64, screen_height: f64) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(ITEMS.len() + 2);
    entities.push(
        text(TITLE, TITLE_SIZE, GREEN, 0.0, 0.0)
            .with(Label)
            .with(MenuInputHandler::new(ITEMS.len())),
    );
    for (i, (label, hotkey, target)) in ITEMS.into_iter().enumerate() {
        let y = 150.0 + f64::from(ITEM_SIZE) * i as f64;
        entities.push(
            text(label, ITEM_SIZE, item_rgba(i == 0), 50.0, y)
                .with(MenuItem::new(label, hotkey, target, i)),
        );
    }
    let version = concat!("v", env!("CARGO_PKG_VERSION"));
    let width = TextShape::new(version, FOOTER_SIZE, WHITE).natural_size().x;
    let margin = f64::from(FOOTER_SIZE);
    entities.push(
        text(
            version,
            FOOTER_SIZE,
            WHITE,
            screen_width - width - margin,
            screen_height - margin * 2.0,
        )
        .with(Label),
    );
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::capability::CapabilityKind;

    #[test]
    fn menu_lists_modes_and_exit() {
        let menu = create_menu(1024.0, 768.0);
        let targets: Vec<_> = menu
            .iter()
            .filter_map(|e| e.get::<MenuItem>().map(|m| (m.hotkey, m.target)))
            .collect();
        assert_eq!(
            targets,
            vec![
                (KeyCode::Digit1, SceneRequest::Play(GameMode::Piano)),
                (KeyCode::Digit2, SceneRequest::Play(GameMode::Drum)),
                (KeyCode::Digit0, SceneRequest::Exit),
            ]
        );
    }

    #[test]
    fn every_menu_entity_has_a_unit() {
        let menu = create_menu(1024.0, 768.0);
        assert_eq!(menu.len(), 5);
        assert!(menu.iter().all(|e| e.unit_count() > 0), "inert entities would be reaped");
        assert!(menu.iter().any(|e| e.has(CapabilityKind::Label)));
        let footer = menu.last().expect("footer");
        assert!(footer.position().x + footer.size().x <= 1024.0);
    }

    #[test]
    fn title_drives_focus_and_first_item_starts_focused() {
        let menu = create_menu(1024.0, 768.0);
        assert!(menu[0].has(CapabilityKind::MenuInput));
        let focused: Vec<_> = menu
            .iter()
            .filter_map(|e| e.get::<MenuItem>())
            .map(MenuItem::is_focused)
            .collect();
        assert_eq!(focused, vec![true, false, false]);
        assert_eq!(menu[1].renderable().fill(), WHITE);
        assert_eq!(menu[2].renderable().fill(), crate::ui::color::RED);
    }
}
