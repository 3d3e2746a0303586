use crate::browser;
use anyhow::{anyhow, Error, Result};
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - because we control the closure creation and specify the expected type,
    // in principle this should be generally safe (unsafe) code
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

pub mod dom;
pub mod input;
pub mod physics;

use self::input::KeyState;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState);
    fn draw(&mut self, renderer: &Renderer);
}

/// length of a frame in milliseconds
pub const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer::new(browser::context()?)?;
        let mut keystate = KeyState::new();

        // web assembly is a single threaded environment, so Rc RefCell > Mutex
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);

            game_loop.accumulated_delta += (perf - game_loop.last_frame) as f32;
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update(&keystate);
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);

            if let Some(closure) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(closure) {
                    log::error!("GameLoop: could not schedule next frame: {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Axis aligned rectangle, `position` is the top left corner
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn from_center(center: Point, size: Size) -> Self {
        Rect {
            position: Point {
                x: center.x - size.width / 2.0,
                y: center.y - size.height / 2.0,
            },
            size,
        }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width / 2.0,
            y: self.position.y + self.size.height / 2.0,
        }
    }

    /// Strict intersection, rectangles that only share an edge don't intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Text placement for `Renderer::draw_text`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAlign {
    Left,
    Right,
}

impl TextAlign {
    fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub font: &'a str,
    pub color: &'a str,
    pub align: TextAlign,
}

pub struct Renderer {
    context: CanvasRenderingContext2d,
    // scratch surface used to multiply a tint colour into a single sprite
    tint_canvas: HtmlCanvasElement,
    tint_context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(context: CanvasRenderingContext2d) -> Result<Self> {
        let tint_canvas = browser::create_canvas_element()?;
        let tint_context = browser::context_of(&tint_canvas)?;
        Ok(Renderer {
            context,
            tint_canvas,
            tint_context,
        })
    }

    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    /// Draws the whole image stretched into `destination`
    pub fn draw_image(&self, image: &HtmlImageElement, destination: &Rect) {
        if let Err(err) = self.context.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            destination.position.x.into(),
            destination.position.y.into(),
            destination.size.width.into(),
            destination.size.height.into(),
        ) {
            log::error!("Renderer: draw_image failed: {:?}", err);
        }
    }

    pub fn draw_sprite(&self, image: &HtmlImageElement, frame: &Rect, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.position.x.into(),
                frame.position.y.into(),
                frame.size.width.into(),
                frame.size.height.into(),
                destination.position.x.into(),
                destination.position.y.into(),
                destination.size.width.into(),
                destination.size.height.into(),
            )
        {
            log::error!("Renderer: draw_sprite failed: {:?}", err);
        }
    }

    /// Draws a sprite frame with `tint` (0xRRGGBB) multiplied over it,
    /// keeping the frame's own alpha
    pub fn draw_tinted_sprite(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        destination: &Rect,
        tint: u32,
    ) {
        let width = frame.size.width;
        let height = frame.size.height;
        self.tint_canvas.set_width(width as u32);
        self.tint_canvas.set_height(height as u32);

        let scratch = Rect::new(Point::default(), frame.size);
        let result = self
            .tint_context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.position.x.into(),
                frame.position.y.into(),
                width.into(),
                height.into(),
                0.0,
                0.0,
                width.into(),
                height.into(),
            )
            .and_then(|_| {
                self.tint_context.set_global_composite_operation("multiply")?;
                self.tint_context.set_fill_style_str(&css_color(tint));
                self.tint_context.fill_rect(0.0, 0.0, width.into(), height.into());
                self.tint_context
                    .set_global_composite_operation("destination-in")?;
                self.tint_context
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        image,
                        frame.position.x.into(),
                        frame.position.y.into(),
                        width.into(),
                        height.into(),
                        0.0,
                        0.0,
                        width.into(),
                        height.into(),
                    )?;
                self.tint_context
                    .set_global_composite_operation("source-over")?;
                self.context
                    .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        &self.tint_canvas,
                        scratch.position.x.into(),
                        scratch.position.y.into(),
                        scratch.size.width.into(),
                        scratch.size.height.into(),
                        destination.position.x.into(),
                        destination.position.y.into(),
                        destination.size.width.into(),
                        destination.size.height.into(),
                    )
            });

        if let Err(err) = result {
            log::error!("Renderer: draw_tinted_sprite failed: {:?}", err);
        }
    }

    pub fn draw_text(&self, text: &str, position: &Point, style: &TextStyle) {
        self.context.set_font(style.font);
        self.context.set_fill_style_str(style.color);
        self.context.set_text_align(style.align.as_str());
        self.context.set_text_baseline("top");
        if let Err(err) = self
            .context
            .fill_text(text, position.x.into(), position.y.into())
        {
            log::error!("Renderer: draw_text failed: {:?}", err);
        }
    }

    #[cfg(debug_assertions)]
    pub fn draw_rect_outline(&self, rect: &Rect, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.stroke_rect(
            rect.position.x.into(),
            rect.position.y.into(),
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }
}

/// 0xRRGGBB -> "#rrggbb"
pub fn css_color(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

/// Outlines drawn over the scene in debug builds only
#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.draw_rect_outline(self, "#ff00ff");
    }
}

/// A static image placed in the scene
pub struct Image {
    element: HtmlImageElement,
    bounding_box: Rect,
}

impl Image {
    /// Places the image so that its centre lands on `center`
    pub fn centered(element: HtmlImageElement, center: Point) -> Self {
        let size = Size {
            width: element.width() as f32,
            height: element.height() as f32,
        };
        Image {
            element,
            bounding_box: Rect::from_center(center, size),
        }
    }

    pub fn draw(&self, renderer: &Renderer) {
        renderer.draw_image(&self.element, &self.bounding_box);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let source_name = source.to_string();
    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "Error loading image {}: {:#?}",
                source_name,
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callback alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - double unwrap because Result<Result<(), Error>, oneshot::Canceled>
    // - first unwrap yields channel result : Result<(), Error>
    // - second unwrap yields image load result : () or propagating Error
    rx.await??;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect::new(Point { x, y }, Size { width, height })
    }

    #[test]
    fn from_center_places_top_left() {
        let r = Rect::from_center(Point { x: 400.0, y: 584.0 }, Size { width: 800.0, height: 32.0 });
        assert_eq!(r.left(), 0.0);
        assert_eq!(r.top(), 568.0);
        assert_eq!(r.right(), 800.0);
        assert_eq!(r.bottom(), 600.0);
        assert_eq!(r.center(), Point { x: 400.0, y: 584.0 });
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn overlapping_rects_intersect() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 9.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn css_color_is_zero_padded() {
        assert_eq!(css_color(0xff0000), "#ff0000");
        assert_eq!(css_color(0x00000f), "#00000f");
    }
}
