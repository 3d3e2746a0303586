//! Browser checks, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use star_catcher::config::GameConfig;
use star_catcher::engine::dom::{Overlay, OverlayClick};
use star_catcher::engine::Point;
use star_catcher::session::state::GameStatus;
use star_catcher::session::Session;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

const NAME_FORM: &str = r#"<input type="text" id="name" value="ada"><button id="play">Play</button>"#;

fn ensure_game_container() {
    let document = star_catcher::browser::document().unwrap();
    if document.get_element_by_id("game").is_none() {
        let container = document.create_element("div").unwrap();
        container.set_id("game");
        document.body().unwrap().append_child(&container).unwrap();
    }
}

#[wasm_bindgen_test]
fn overlay_reports_clicks_by_element_id() {
    ensure_game_container();
    let mut overlay = Overlay::from_html(NAME_FORM, Point { x: 400.0, y: 300.0 }).unwrap();

    let document = star_catcher::browser::document().unwrap();
    let play = document
        .get_element_by_id("play")
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    play.click();

    assert_eq!(
        overlay.poll_clicks(),
        vec![OverlayClick {
            target_id: "play".to_string()
        }]
    );
    assert!(overlay.poll_clicks().is_empty());
    assert_eq!(overlay.input_value("name").unwrap(), "ada");
    assert!(overlay.input_value("missing").is_err());
}

#[wasm_bindgen_test]
fn overlay_visibility_toggles_display() {
    ensure_game_container();
    let overlay = Overlay::from_html("<p>hi</p>", Point { x: 10.0, y: 10.0 }).unwrap();
    overlay.set_visible(false).unwrap();
    overlay.set_visible(true).unwrap();
}

#[wasm_bindgen_test]
fn session_runs_with_browser_entropy() {
    let mut session = Session::new(GameConfig::default());
    assert!(session.submit_name("ada"));
    assert_eq!(session.status(), GameStatus::Start);

    let seeded = Session::new(GameConfig {
        seed: Some(js_sys::Date::now() as u64),
        ..GameConfig::default()
    });
    assert_eq!(seeded.stars().len(), 12);
}
