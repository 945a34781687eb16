use std::collections::{HashMap, HashSet};

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state across window events.
///
/// Events are applied synchronously as they arrive; the frame loop reads the
/// per-key press counts once per loop iteration and then calls
/// [`Input::begin_frame`] to drain them. Discrete presses are counted, so
/// press-release-press of the same key between two reads registers twice.
/// OS key repeat does not count as a new press while the key stays held.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    press_counts: HashMap<KeyCode, u32>,
    keys_released: HashSet<KeyCode>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per loop iteration, after the presses have been consumed.
    pub fn begin_frame(&mut self) {
        self.press_counts.clear();
        self.keys_released.clear();
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if let PhysicalKey::Code(key) = event.physical_key {
                self.on_key(key, event.state);
            }
        }
    }

    pub(crate) fn on_key(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // HashSet::insert is false for an already-held key, which is
                // how OS key repeat arrives.
                if self.keys_down.insert(key) {
                    *self.press_counts.entry(key).or_insert(0) += 1;
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed since the last [`Input::begin_frame`].
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.press_counts.contains_key(&key)
    }

    /// Number of discrete presses of the key since the last
    /// [`Input::begin_frame`].
    pub fn key_press_count(&self, key: KeyCode) -> u32 {
        self.press_counts.get(&key).copied().unwrap_or(0)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_pressed_and_down() {
        let mut input = Input::new();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);

        assert!(input.key_pressed(KeyCode::KeyW));
        assert!(input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn begin_frame_clears_edges_but_not_held_state() {
        let mut input = Input::new();
        input.on_key(KeyCode::KeyA, ElementState::Pressed);
        input.begin_frame();

        assert!(!input.key_pressed(KeyCode::KeyA));
        assert!(input.key_down(KeyCode::KeyA));
    }

    #[test]
    fn repeated_press_does_not_retrigger() {
        // OS key repeat arrives as another Pressed while the key is held.
        let mut input = Input::new();
        input.on_key(KeyCode::KeyS, ElementState::Pressed);
        input.begin_frame();
        input.on_key(KeyCode::KeyS, ElementState::Pressed);

        assert!(!input.key_pressed(KeyCode::KeyS));
    }

    #[test]
    fn press_release_press_counts_each_press() {
        let mut input = Input::new();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        input.on_key(KeyCode::KeyW, ElementState::Released);
        input.on_key(KeyCode::KeyW, ElementState::Pressed);

        assert_eq!(input.key_press_count(KeyCode::KeyW), 2);
    }

    #[test]
    fn release_clears_down_state() {
        let mut input = Input::new();
        input.on_key(KeyCode::KeyD, ElementState::Pressed);
        input.on_key(KeyCode::KeyD, ElementState::Released);

        assert!(!input.key_down(KeyCode::KeyD));
        assert!(input.key_released(KeyCode::KeyD));
    }
}
