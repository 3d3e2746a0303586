//! One play session: the player, the stars, the bombs and the score.
//!
//! Everything here is plain data driven by `tick`, so the whole game can be
//! run without a browser.

pub mod movement;
pub mod state;

use self::movement::{ControlInput, JumpAction, JumpController, MovementController};
use self::state::{Event, GameStatus, StatusMachine};
use crate::config::GameConfig;
use crate::engine::physics::{Body, World};
use crate::engine::{Point, Rect};
use crate::sprite::{Animation, AnimationPlayer};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Things the scene reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StarCollected { score: u32 },
    BombSpawned,
    GameOver { score: u32 },
}

#[derive(Debug, Clone)]
pub struct Star {
    pub body: Body,
    home_x: f32,
}

pub struct Session {
    config: GameConfig,
    world: World,
    player: Body,
    stars: Vec<Star>,
    bombs: Vec<Body>,
    status: StatusMachine,
    movement: MovementController,
    jump: JumpController,
    animation: AnimationPlayer,
    tint: Option<u32>,
    username: Option<String>,
    rng: Pcg32,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };

        let mut world = World::new(config.world_size(), config.world.gravity);
        for platform in &config.platforms {
            world.add_platform(Rect::from_center(
                Point {
                    x: platform.x,
                    y: platform.y,
                },
                config.platform_size(platform),
            ));
        }

        let player_config = &config.player;
        let player = Body::new(player_config.spawn(), player_config.size())
            .with_bounce(player_config.bounce, player_config.bounce)
            .with_max_velocity(player_config.max_velocity_x, player_config.max_velocity_y)
            .colliding_world_bounds();

        let stars = (0..config.stars.count)
            .map(|index| {
                let home_x = config.stars.x_of(index);
                let bounce_y = rng.gen_range(config.stars.bounce_min..config.stars.bounce_max);
                Star {
                    body: Body::new(Point { x: home_x, y: 0.0 }, config.stars.size())
                        .with_bounce(0.0, bounce_y),
                    home_x,
                }
            })
            .collect();

        Session {
            movement: MovementController::new(config.movement.deadband),
            jump: JumpController::new(config.player.jump_hold_ms),
            world,
            player,
            stars,
            bombs: Vec::new(),
            status: StatusMachine::default(),
            animation: AnimationPlayer::new(Animation::Turn),
            tint: None,
            username: None,
            rng,
            config,
        }
    }

    /// Accepts the player name and starts play. Blank names and names sent
    /// after the session started are ignored.
    pub fn submit_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.status() != GameStatus::Ready {
            return false;
        }
        log::info!("Player '{}' joined", name);
        self.username = Some(name.to_string());
        self.status = self.status.transition(Event::SubmitName);
        true
    }

    /// Advances the session by `dt_ms` milliseconds
    pub fn tick(&mut self, input: &ControlInput, dt_ms: f32) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let playing = self.status() == GameStatus::Start;

        if playing {
            self.control_player(input, dt_ms);
        }

        let dt = dt_ms / 1000.0;
        self.world.step(&mut self.player, dt);
        for star in self.stars.iter_mut() {
            self.world.step(&mut star.body, dt);
        }
        for bomb in self.bombs.iter_mut() {
            self.world.step(bomb, dt);
        }

        if playing {
            for index in 0..self.stars.len() {
                if self.player.overlaps(&self.stars[index].body) {
                    events.extend(self.collect_star(index));
                }
            }
            if self.bombs.iter().any(|bomb| self.player.overlaps(bomb)) {
                events.push(self.hit_bomb());
            }
        }

        self.animation.update(dt_ms);
        events
    }

    fn control_player(&mut self, input: &ControlInput, dt_ms: f32) {
        let grounded = self.player.touching_down;
        let forces = if grounded {
            self.config.movement.ground
        } else {
            self.config.movement.air
        };

        if let Some(steering) = self
            .movement
            .steer(forces, input.horizontal, self.player.velocity.x)
        {
            self.player.acceleration.x = steering.acceleration_x;
            if let Some(velocity_x) = steering.velocity_x {
                self.player.velocity.x = velocity_x;
            }
            self.animation
                .play(steering.animation, steering.ignore_if_playing);
        }

        match self.jump.update(input.jump, grounded, dt_ms) {
            JumpAction::Launch => {
                self.player.velocity.y = -self.config.player.jump_speed;
                self.player.acceleration.y = -self.world.gravity();
            }
            JumpAction::Sustain => self.player.acceleration.y = -self.world.gravity(),
            JumpAction::Cut => self.player.acceleration.y = 0.0,
            JumpAction::Idle => {}
        }
    }

    /// Player touched star `index`
    fn collect_star(&mut self, index: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.stars[index].body.disable(true);
        self.status = self.status.transition(Event::CollectStar {
            points: self.config.stars.points,
        });
        events.push(SessionEvent::StarCollected {
            score: self.score(),
        });
        log::debug!("Star {} collected, score {}", index, self.score());

        if self.active_stars() == 0 {
            self.reset_stars();
            self.spawn_bomb();
            events.push(SessionEvent::BombSpawned);
        }
        events
    }

    /// Drops a bomb on the half of the field the player is not on
    fn spawn_bomb(&mut self) {
        let bombs = &self.config.bombs;
        let width = self.config.world.width;
        let half = width / 2.0;
        let x: i32 = if self.player.position.x < half {
            self.rng.gen_range(half as i32..=width as i32)
        } else {
            self.rng.gen_range(0..=half as i32)
        };
        let x = x as f32;
        let speed_x = self.rng.gen_range(-bombs.max_speed_x..=bombs.max_speed_x) as f32;

        let bomb = Body::new(
            Point {
                x,
                y: bombs.spawn_y,
            },
            bombs.size(),
        )
        .with_bounce(bombs.bounce, bombs.bounce)
        .with_velocity(speed_x, bombs.speed_y)
        .colliding_world_bounds();

        log::info!("Bomb spawned at x={} moving {}", x, speed_x);
        self.bombs.push(bomb);
    }

    /// Player touched a bomb
    fn hit_bomb(&mut self) -> SessionEvent {
        self.world.pause();
        self.tint = Some(self.config.player.hit_tint);
        self.animation.play(Animation::Turn, false);
        self.jump.reset();
        self.status = self.status.transition(Event::HitBomb);
        log::info!("Game over with score {}", self.score());
        SessionEvent::GameOver {
            score: self.score(),
        }
    }

    /// Starts a fresh round after a game over, any other time it does nothing
    pub fn restart(&mut self) -> bool {
        if self.status() != GameStatus::GameOver {
            return false;
        }
        log::info!("Restart");
        self.world.resume();
        let spawn = self.config.player.spawn();
        self.player.reset(spawn.x, spawn.y);
        self.tint = None;
        self.reset_stars();
        self.bombs.clear();
        self.jump.reset();
        self.status = self.status.transition(Event::Restart);
        true
    }

    fn reset_stars(&mut self) {
        for star in self.stars.iter_mut() {
            star.body.enable_at(star.home_x, 0.0);
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status.status()
    }

    pub fn score(&self) -> u32 {
        self.status.context().score
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score())
    }

    pub fn active_stars(&self) -> usize {
        self.stars.iter().filter(|star| star.body.enabled).count()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn player(&self) -> &Body {
        &self.player
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn bombs(&self) -> &[Body] {
        &self.bombs
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn animation(&self) -> &AnimationPlayer {
        &self.animation
    }

    pub fn tint(&self) -> Option<u32> {
        self.tint
    }

    pub fn is_jump_charging(&self) -> bool {
        self.jump.is_charging()
    }
}
