/// Platform-agnostic input handling
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Platform-independent input events. Key names follow DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),

    PointerDown { x: f32, y: f32 },
    PointerUp,
    PointerMove { dx: f32, dy: f32 },
    Wheel { delta_y: f32 },
}

/// Key map plus accumulated pointer deltas since the last frame.
///
/// Keys stay held until their own keyup arrives; nothing clears them on blur.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys: HashMap<String, bool>,
    pub look_delta: (f32, f32),
    pub wheel_delta: f32,
    pub pointer_down: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(key.clone(), true);
            }
            InputEvent::KeyUp(key) => {
                self.keys.insert(key.clone(), false);
            }
            InputEvent::PointerDown { .. } => {
                self.pointer_down = true;
            }
            InputEvent::PointerUp => {
                self.pointer_down = false;
            }
            InputEvent::PointerMove { dx, dy } => {
                if self.pointer_down {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::Wheel { delta_y } => {
                self.wheel_delta += delta_y;
            }
        }
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Held keys, sorted for stable display.
    pub fn held_keys(&self) -> Vec<String> {
        let mut held: Vec<String> = self
            .keys
            .iter()
            .filter(|(_, down)| **down)
            .map(|(key, _)| key.clone())
            .collect();
        held.sort();
        held
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }

    pub fn consume_wheel(&mut self) -> f32 {
        std::mem::take(&mut self.wheel_delta)
    }
}

/// One-shot scene commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneAction {
    /// Put every physics body back at its spawn point.
    ResetBodies,
    ToggleOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTrigger {
    #[default]
    KeyDown,
    KeyUp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAction {
    pub key: String,
    #[serde(default)]
    pub trigger: KeyTrigger,
    pub action: SceneAction,
}

/// Maps key events onto [`SceneAction`]s. Key repeat is filtered so a held
/// key fires its keydown action once.
#[derive(Debug, Clone, Default)]
pub struct ActionManager {
    bindings: Vec<KeyAction>,
}

impl ActionManager {
    pub fn new(bindings: Vec<KeyAction>) -> Self {
        Self { bindings }
    }

    /// Call before the event reaches `input` so repeats can be told apart.
    pub fn dispatch(&self, event: &InputEvent, input: &InputState) -> Vec<SceneAction> {
        let (key, trigger) = match event {
            InputEvent::KeyDown(key) if !input.is_held(key) => (key, KeyTrigger::KeyDown),
            InputEvent::KeyUp(key) => (key, KeyTrigger::KeyUp),
            _ => return Vec::new(),
        };

        self.bindings
            .iter()
            .filter(|b| b.trigger == trigger && b.key == *key)
            .map(|b| b.action)
            .collect()
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{Event, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn pointer_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDown { x: e.client_x() as f32, y: e.client_y() as f32 }
    }

    pub fn pointer_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove { dx: e.movement_x() as f32, dy: e.movement_y() as f32 }
    }

    pub fn wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val = wasm_bindgen::JsValue::from(e.clone());
        let delta_y = js_sys::Reflect::get(&js_val, &wasm_bindgen::JsValue::from_str("deltaY")).ok()?;
        delta_y.as_f64().map(|dy| InputEvent::Wheel { delta_y: dy as f32 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str) -> InputEvent {
        InputEvent::KeyDown(key.to_string())
    }

    fn up(key: &str) -> InputEvent {
        InputEvent::KeyUp(key.to_string())
    }

    #[test]
    fn keydown_and_keyup_toggle_the_map() {
        let mut input = InputState::new();
        input.process_event(&down("w"));
        input.process_event(&down("d"));
        assert!(input.is_held("w"));
        assert_eq!(input.held_keys(), vec!["d".to_string(), "w".to_string()]);

        input.process_event(&up("w"));
        assert!(!input.is_held("w"));
        assert_eq!(input.keys.get("w"), Some(&false));
        assert!(!input.is_held("never-pressed"));
    }

    #[test]
    fn look_delta_only_accumulates_while_dragging() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerMove { dx: 5.0, dy: 5.0 });
        assert_eq!(input.consume_look(), (0.0, 0.0));

        input.process_event(&InputEvent::PointerDown { x: 0.0, y: 0.0 });
        input.process_event(&InputEvent::PointerMove { dx: 3.0, dy: -1.0 });
        input.process_event(&InputEvent::PointerMove { dx: 2.0, dy: -1.0 });
        assert_eq!(input.consume_look(), (5.0, -2.0));
        assert_eq!(input.consume_look(), (0.0, 0.0));

        input.process_event(&InputEvent::Wheel { delta_y: 120.0 });
        assert_eq!(input.consume_wheel(), 120.0);
        assert_eq!(input.consume_wheel(), 0.0);
    }

    #[test]
    fn actions_fire_once_per_press() {
        let actions = ActionManager::new(vec![
            KeyAction { key: "r".into(), trigger: KeyTrigger::KeyDown, action: SceneAction::ResetBodies },
            KeyAction { key: "o".into(), trigger: KeyTrigger::KeyUp, action: SceneAction::ToggleOverlay },
        ]);
        let mut input = InputState::new();

        assert_eq!(actions.dispatch(&down("r"), &input), vec![SceneAction::ResetBodies]);
        input.process_event(&down("r"));
        // auto-repeat
        assert!(actions.dispatch(&down("r"), &input).is_empty());

        assert!(actions.dispatch(&down("o"), &input).is_empty());
        input.process_event(&down("o"));
        assert_eq!(actions.dispatch(&up("o"), &input), vec![SceneAction::ToggleOverlay]);
    }
}
