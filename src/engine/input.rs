use crate::browser;
use anyhow::Result;
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use std::collections::HashSet;
use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, KeyboardEvent};

/// Keyboard events travel from the browser callbacks to the game loop
/// through an unbounded channel, the loop drains it once per frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    KeyDown(String),
    KeyUp(String),
}

/// Keys the browser would otherwise use to scroll the page
const SCROLL_KEYS: [&str; 5] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space"];

fn scrolls_page(code: &str) -> bool {
    SCROLL_KEYS.contains(&code)
}

/// Typing in a form field keeps its default behaviour
fn targets_text_field(event: &KeyboardEvent) -> bool {
    event
        .target()
        .map(|target| target.dyn_into::<HtmlInputElement>().is_ok())
        .unwrap_or(false)
}

/// Which `KeyboardEvent.code`s are currently held down
#[derive(Debug, Default)]
pub struct KeyState {
    pressed_keys: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState::default()
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains(code)
    }

    pub fn any_pressed(&self, codes: &[&str]) -> bool {
        codes.iter().any(|code| self.is_pressed(code))
    }

    pub fn set_pressed(&mut self, code: &str) {
        self.pressed_keys.insert(code.to_string());
    }

    pub fn set_released(&mut self, code: &str) {
        self.pressed_keys.remove(code);
    }

    pub fn apply(&mut self, press: &KeyPress) {
        match press {
            KeyPress::KeyDown(code) => self.set_pressed(code),
            KeyPress::KeyUp(code) => self.set_released(code),
        }
    }
}

/// Installs window keyboard listeners and returns the receiving end of the
/// key event channel
pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
    let (keydown_sender, keyevent_receiver) = unbounded();
    let keyup_sender = keydown_sender.clone();

    let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        if scrolls_page(&event.code()) && !targets_text_field(&event) {
            event.prevent_default();
        }
        if !event.repeat() {
            let _ = keydown_sender.unbounded_send(KeyPress::KeyDown(event.code()));
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let onkeyup = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
        let _ = keyup_sender.unbounded_send(KeyPress::KeyUp(event.code()));
    }) as Box<dyn FnMut(KeyboardEvent)>);

    let window = browser::window()?;
    window.set_onkeydown(Some(onkeydown.as_ref().unchecked_ref()));
    window.set_onkeyup(Some(onkeyup.as_ref().unchecked_ref()));

    // listeners live as long as the page
    onkeydown.forget();
    onkeyup.forget();

    Ok(keyevent_receiver)
}

/// Applies every queued key event to `state`
pub fn process_input(state: &mut KeyState, keyevent_receiver: &mut UnboundedReceiver<KeyPress>) {
    // try_next: Ok(Some) = event, Ok(None) = channel closed, Err = empty
    while let Ok(Some(press)) = keyevent_receiver.try_next() {
        state.apply(&press);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_then_up_toggles_state() {
        let mut state = KeyState::new();
        state.apply(&KeyPress::KeyDown("ArrowLeft".into()));
        assert!(state.is_pressed("ArrowLeft"));
        assert!(state.any_pressed(&["KeyA", "ArrowLeft"]));
        state.apply(&KeyPress::KeyUp("ArrowLeft".into()));
        assert!(!state.is_pressed("ArrowLeft"));
    }

    #[test]
    fn arrows_and_space_scroll_the_page() {
        for code in ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight", "Space"] {
            assert!(scrolls_page(code), "{}", code);
        }
        assert!(!scrolls_page("KeyA"));
        assert!(!scrolls_page("Enter"));
    }

    #[test]
    fn process_input_drains_queued_events() {
        let (sender, mut receiver) = unbounded();
        sender.unbounded_send(KeyPress::KeyDown("Space".into())).unwrap();
        sender.unbounded_send(KeyPress::KeyDown("KeyD".into())).unwrap();
        sender.unbounded_send(KeyPress::KeyUp("Space".into())).unwrap();

        let mut state = KeyState::new();
        process_input(&mut state, &mut receiver);

        assert!(!state.is_pressed("Space"));
        assert!(state.is_pressed("KeyD"));
        assert!(receiver.try_next().is_err());
    }
}
