use crate::browser;
use crate::config::GameConfig;
use crate::engine::dom::Overlay;
use crate::engine::input::KeyState;
#[cfg(debug_assertions)]
use crate::engine::DebugDraw;
use crate::engine::{
    self, Game, Image, Point, Rect, Renderer, TextAlign, TextStyle, FRAME_SIZE,
};
use crate::session::movement::ControlInput;
use crate::session::{Session, SessionEvent};
use crate::sprite::dude::Dude;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::try_join;
use web_sys::HtmlImageElement;

/// ┌──────────────────────── Update Flow ──────────────────────────┐
/// │                                                               │
/// │  GameLoop ──KeyState──► StarCatcher::update                   │
/// │                           ├─► overlay clicks (name, restart)  │
/// │                           ├─► Session::tick(ControlInput)     │
/// │                           └─► SessionEvent::GameOver          │
/// │                                 └─► show game over overlay    │
/// │                                                               │
/// │  GameLoop ──Renderer──► StarCatcher::draw                     │
/// │                           sky → platforms → stars → bombs     │
/// │                           → dude → score / name text          │
/// └───────────────────────────────────────────────────────────────┘
pub enum StarCatcher {
    /// Assets are being fetched
    Loading,

    /// Scene built, game running
    Loaded(Scene),
}

mod assets {
    pub const SKY: &str = "assets/sky.png";
    pub const PLATFORM: &str = "assets/platform.png";
    pub const STAR: &str = "assets/star.png";
    pub const BOMB: &str = "assets/bomb.png";
    pub const DUDE: &str = "assets/dude.png";
    pub const NAME_FORM: &str = "assets/nameform.html";
    pub const GAME_OVER: &str = "assets/gameover.html";
}

mod ids {
    pub const PLAY_BUTTON: &str = "play";
    pub const NAME_INPUT: &str = "name";
    pub const RESTART_BUTTON: &str = "restart";
}

const NAME_PLACEHOLDER: &str = "enter you name";
const HUD_MARGIN: f32 = 16.0;
const HUD_STYLE: TextStyle<'static> = TextStyle {
    font: "24px monospace",
    color: "#000",
    align: TextAlign::Left,
};

impl StarCatcher {
    pub fn new() -> Self {
        StarCatcher::Loading
    }

    async fn load_image(path: &str) -> Result<HtmlImageElement> {
        engine::load_image(path)
            .await
            .with_context(|| format!("Failed to load image resource from : {}", path))
    }

    async fn load_html(path: &str) -> Result<String> {
        browser::fetch_text(path)
            .await
            .with_context(|| format!("Failed to load overlay from : {}", path))
    }
}

impl Default for StarCatcher {
    fn default() -> Self {
        StarCatcher::new()
    }
}

#[async_trait(?Send)]
impl Game for StarCatcher {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            StarCatcher::Loading => {
                let config = GameConfig::load().await;
                // independent resources load simultaneously
                let (sky, platform, star, bomb, dude, name_form_html, game_over_html) = try_join!(
                    Self::load_image(assets::SKY),
                    Self::load_image(assets::PLATFORM),
                    Self::load_image(assets::STAR),
                    Self::load_image(assets::BOMB),
                    Self::load_image(assets::DUDE),
                    Self::load_html(assets::NAME_FORM),
                    Self::load_html(assets::GAME_OVER),
                )?;

                let center = Point {
                    x: config.world.width / 2.0,
                    y: config.world.height / 2.0,
                };
                let name_form = Overlay::from_html(&name_form_html, center)?;
                let scene = Scene {
                    sky: Image::centered(sky, center),
                    platform,
                    star,
                    bomb,
                    dude: Dude::new(dude),
                    name_form,
                    game_over_html,
                    game_over: None,
                    overlay_center: center,
                    session: Session::new(config),
                };
                log::info!("Scene ready");
                Ok(Box::new(StarCatcher::Loaded(scene)))
            }
            StarCatcher::Loaded(_) => Err(anyhow!("Game is already initialized")),
        }
    }

    fn update(&mut self, keystate: &KeyState) {
        if let StarCatcher::Loaded(scene) = self {
            scene.handle_overlays();
            let events = scene.session.tick(&ControlInput::from(keystate), FRAME_SIZE);
            for event in events {
                if let SessionEvent::GameOver { score } = event {
                    log::info!("Showing game over overlay, final score {}", score);
                    if let Err(err) = scene.show_game_over() {
                        log::error!("{:#}", err);
                    }
                }
            }
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let StarCatcher::Loaded(scene) = self {
            scene.draw(renderer);
        }
    }
}

pub struct Scene {
    session: Session,
    sky: Image,
    platform: HtmlImageElement,
    star: HtmlImageElement,
    bomb: HtmlImageElement,
    dude: Dude,
    name_form: Overlay,
    game_over_html: String,
    // created the first time the player dies
    game_over: Option<Overlay>,
    overlay_center: Point,
}

impl Scene {
    fn handle_overlays(&mut self) {
        for click in self.name_form.poll_clicks() {
            if click.target_id != ids::PLAY_BUTTON {
                continue;
            }
            match self.name_form.input_value(ids::NAME_INPUT) {
                Ok(name) => {
                    if self.session.submit_name(&name) {
                        if let Err(err) = self.name_form.set_visible(false) {
                            log::error!("{:#}", err);
                        }
                    }
                }
                Err(err) => log::error!("{:#}", err),
            }
        }

        let restart_requested = self
            .game_over
            .as_mut()
            .map(|overlay| {
                overlay
                    .poll_clicks()
                    .iter()
                    .any(|click| click.target_id == ids::RESTART_BUTTON)
            })
            .unwrap_or(false);

        if restart_requested && self.session.restart() {
            if let Some(overlay) = &self.game_over {
                if let Err(err) = overlay.set_visible(false) {
                    log::error!("{:#}", err);
                }
            }
        }
    }

    fn show_game_over(&mut self) -> Result<()> {
        match &self.game_over {
            Some(overlay) => overlay.set_visible(true),
            None => {
                let overlay = Overlay::from_html(&self.game_over_html, self.overlay_center)?;
                self.game_over = Some(overlay);
                Ok(())
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        let world = self.session.world();
        renderer.clear(world.bounds());

        // Draw order matters : background -> foreground
        self.sky.draw(renderer);
        for platform in world.platforms() {
            renderer.draw_image(&self.platform, platform);
        }
        for star in self.session.stars() {
            if star.body.visible {
                renderer.draw_image(&self.star, &star.body.bounding_box());
            }
        }
        for bomb in self.session.bombs() {
            if bomb.visible {
                renderer.draw_image(&self.bomb, &bomb.bounding_box());
            }
        }
        self.dude.draw(
            renderer,
            self.session.player(),
            self.session.animation(),
            self.session.tint(),
        );

        self.draw_hud(renderer, world.bounds());

        #[cfg(debug_assertions)]
        {
            for platform in world.platforms() {
                platform.draw_debug(renderer);
            }
            for star in self.session.stars().iter().filter(|star| star.body.enabled) {
                star.body.bounding_box().draw_debug(renderer);
            }
            for bomb in self.session.bombs() {
                bomb.bounding_box().draw_debug(renderer);
            }
        }
    }

    fn draw_hud(&self, renderer: &Renderer, bounds: &Rect) {
        renderer.draw_text(
            &self.session.score_text(),
            &Point {
                x: HUD_MARGIN,
                y: HUD_MARGIN,
            },
            &HUD_STYLE,
        );
        renderer.draw_text(
            self.session.username().unwrap_or(NAME_PLACEHOLDER),
            &Point {
                x: bounds.right() - HUD_MARGIN,
                y: HUD_MARGIN,
            },
            &TextStyle {
                align: TextAlign::Right,
                ..HUD_STYLE
            },
        );
    }
}
