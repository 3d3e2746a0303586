#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::physics::Body;
use crate::engine::{Rect, Renderer, Size};
use crate::sprite::{AnimationPlayer, SpriteSheet};
use web_sys::HtmlImageElement;

/// The player character's spritesheet, drawn wherever its body is
///
/// ┌──────── frames of dude.png ────────┐
/// │  0 1 2 3  │  4   │  5 6 7 8        │
/// │  left     │ turn │  right          │
/// └────────────────────────────────────┘
pub struct Dude {
    sheet: SpriteSheet,
    image: HtmlImageElement,
}

impl Dude {
    pub const FRAME_SIZE: Size = Size {
        width: 32.0,
        height: 42.0,
    };

    pub fn new(image: HtmlImageElement) -> Self {
        let sheet_size = Size {
            width: image.width() as f32,
            height: image.height() as f32,
        };
        Dude {
            sheet: SpriteSheet::new(Self::FRAME_SIZE, sheet_size),
            image,
        }
    }

    pub fn draw(
        &self,
        renderer: &Renderer,
        body: &Body,
        animation: &AnimationPlayer,
        tint: Option<u32>,
    ) {
        if !body.visible {
            return;
        }
        let frame = self.sheet.frame(animation.sheet_frame());
        let destination = Rect::from_center(body.position, self.sheet.frame_size());

        match tint {
            Some(color) => renderer.draw_tinted_sprite(&self.image, &frame, &destination, color),
            None => renderer.draw_sprite(&self.image, &frame, &destination),
        }

        #[cfg(debug_assertions)]
        body.bounding_box().draw_debug(renderer);
    }
}
