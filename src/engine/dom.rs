//! HTML forms layered over the canvas.

use crate::browser;
use crate::engine::Point;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement, MouseEvent};

/// A click inside an overlay, identified by the id of the clicked element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayClick {
    pub target_id: String,
}

pub struct Overlay {
    element: HtmlElement,
    clicks: UnboundedReceiver<OverlayClick>,
    // dropping the closure would detach the listener
    _onclick: Closure<dyn FnMut(MouseEvent)>,
}

impl Overlay {
    /// Builds the overlay from an html fragment and centres it on `center`
    /// (canvas coordinates)
    pub fn from_html(html: &str, center: Point) -> Result<Self> {
        let element = browser::create_div()?;
        element.set_inner_html(html);

        let style = element.style();
        let css = [
            ("position", "absolute".to_string()),
            ("left", format!("{}px", center.x)),
            ("top", format!("{}px", center.y)),
            ("transform", "translate(-50%, -50%)".to_string()),
        ];
        for (property, value) in css.iter() {
            style
                .set_property(property, value)
                .map_err(|err| anyhow!("Could not set overlay style {} : {:#?}", property, err))?;
        }

        browser::game_container()?
            .append_child(&element)
            .map_err(|err| anyhow!("Could not attach overlay : {:#?}", err))?;

        let (click_sender, clicks) = unbounded();
        let onclick = browser::closure_wrap(Box::new(move |event: MouseEvent| {
            let target_id = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .map(|element| element.id())
                .unwrap_or_default();
            let _ = click_sender.unbounded_send(OverlayClick { target_id });
        }) as Box<dyn FnMut(MouseEvent)>);
        element.set_onclick(Some(onclick.as_ref().unchecked_ref()));

        Ok(Overlay {
            element,
            clicks,
            _onclick: onclick,
        })
    }

    /// Drains the clicks received since the last call
    pub fn poll_clicks(&mut self) -> Vec<OverlayClick> {
        let mut clicks = Vec::new();
        while let Ok(Some(click)) = self.clicks.try_next() {
            clicks.push(click);
        }
        clicks
    }

    /// Current value of the `<input>` with `id` inside this overlay
    pub fn input_value(&self, id: &str) -> Result<String> {
        let input = self
            .element
            .query_selector(&format!("#{}", id))
            .map_err(|err| anyhow!("Invalid selector for '{}' : {:#?}", id, err))?
            .ok_or_else(|| anyhow!("No element with id '{}' in overlay", id))?
            .dyn_into::<HtmlInputElement>()
            .map_err(|element| anyhow!("Error converting {:#?} to HtmlInputElement", element))?;
        Ok(input.value())
    }

    pub fn set_visible(&self, visible: bool) -> Result<()> {
        let display = if visible { "block" } else { "none" };
        self.element
            .style()
            .set_property("display", display)
            .map_err(|err| anyhow!("Could not change overlay visibility : {:#?}", err))
    }
}
