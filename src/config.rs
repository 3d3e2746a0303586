//! Tunable game parameters.
//!
//! Every field has a default so `config.json` only needs the values it
//! overrides.

use crate::browser;
use crate::engine::{Point, Size};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Acceleration available to the player and the friction-like term working
/// against it, in px/s^2
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forces {
    pub budget: f32,
    pub natural: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            width: 800.0,
            height: 600.0,
            gravity: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    pub bounce: f32,
    pub max_velocity_x: f32,
    pub max_velocity_y: f32,
    /// upward speed given on the first jump frame, px/s
    pub jump_speed: f32,
    /// how long a held jump keeps cancelling gravity
    pub jump_hold_ms: f32,
    pub hit_tint: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            spawn_x: 100.0,
            spawn_y: 450.0,
            width: 32.0,
            height: 42.0,
            bounce: 0.2,
            max_velocity_x: 160.0,
            max_velocity_y: 400.0,
            jump_speed: 400.0,
            jump_hold_ms: 300.0,
            hit_tint: 0xff0000,
        }
    }
}

impl PlayerConfig {
    pub fn spawn(&self) -> Point {
        Point {
            x: self.spawn_x,
            y: self.spawn_y,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub ground: Forces,
    pub air: Forces,
    /// below this horizontal speed an idle player snaps to a stop
    pub deadband: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig {
            ground: Forces {
                budget: 600.0,
                natural: 300.0,
            },
            air: Forces {
                budget: 400.0,
                natural: 200.0,
            },
            deadband: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    pub first_x: f32,
    pub step_x: f32,
    pub width: f32,
    pub height: f32,
    pub points: u32,
    pub bounce_min: f32,
    pub bounce_max: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        StarConfig {
            count: 12,
            first_x: 12.0,
            step_x: 70.0,
            width: 24.0,
            height: 22.0,
            points: 10,
            bounce_min: 0.3,
            bounce_max: 0.5,
        }
    }
}

impl StarConfig {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Horizontal home of star `index`
    pub fn x_of(&self, index: usize) -> f32 {
        self.first_x + self.step_x * index as f32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BombConfig {
    pub spawn_y: f32,
    pub width: f32,
    pub height: f32,
    /// horizontal speed is drawn from `-max_speed_x..=max_speed_x`
    pub max_speed_x: i32,
    pub speed_y: f32,
    pub bounce: f32,
}

impl Default for BombConfig {
    fn default() -> Self {
        BombConfig {
            spawn_y: 16.0,
            width: 14.0,
            height: 14.0,
            max_speed_x: 200,
            speed_y: 20.0,
            bounce: 1.0,
        }
    }
}

impl BombConfig {
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// A platform is the platform image centred on `(x, y)`, stretched by
/// `scale_x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "unit_scale")]
    pub scale_x: f32,
}

fn unit_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub movement: MovementConfig,
    pub stars: StarConfig,
    pub bombs: BombConfig,
    pub platform_width: f32,
    pub platform_height: f32,
    pub platforms: Vec<PlatformConfig>,
    /// fixed seed for reproducible bomb spawns, entropy when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let platform_height = 32.0;
        let world = WorldConfig::default();
        GameConfig {
            platforms: vec![
                PlatformConfig {
                    x: 400.0,
                    y: world.height - platform_height / 2.0,
                    scale_x: 2.0,
                },
                PlatformConfig {
                    x: 600.0,
                    y: 400.0,
                    scale_x: 1.0,
                },
                PlatformConfig {
                    x: 50.0,
                    y: 250.0,
                    scale_x: 1.0,
                },
                PlatformConfig {
                    x: 750.0,
                    y: 220.0,
                    scale_x: 1.0,
                },
            ],
            world,
            player: PlayerConfig::default(),
            movement: MovementConfig::default(),
            stars: StarConfig::default(),
            bombs: BombConfig::default(),
            platform_width: 400.0,
            platform_height,
            seed: None,
        }
    }
}

impl GameConfig {
    pub const PATH: &'static str = "config.json";

    /// Fetches `config.json`, any failure falls back to the defaults
    pub async fn load() -> Self {
        match Self::fetch().await {
            Ok(config) => {
                log::info!("Loaded game config from {}", Self::PATH);
                config
            }
            Err(err) => {
                log::warn!("Using default game config : {:#}", err);
                GameConfig::default()
            }
        }
    }

    async fn fetch() -> Result<Self> {
        let config: GameConfig = browser::fetch_json(Self::PATH)
            .await
            .with_context(|| format!("Failed to load config from : {}", Self::PATH))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            bail!(
                "world size must be positive, got {}x{}",
                self.world.width,
                self.world.height
            );
        }
        if self.stars.count == 0 {
            bail!("at least one star is required");
        }
        if self.stars.bounce_min >= self.stars.bounce_max {
            bail!(
                "star bounce range is empty : {}..{}",
                self.stars.bounce_min,
                self.stars.bounce_max
            );
        }
        if self.bombs.max_speed_x < 0 {
            bail!("bomb max_speed_x must not be negative");
        }
        if self.movement.deadband < 0.0 || self.player.jump_hold_ms < 0.0 {
            bail!("deadband and jump hold must not be negative");
        }
        Ok(())
    }

    pub fn world_size(&self) -> Size {
        Size {
            width: self.world.width,
            height: self.world.height,
        }
    }

    pub fn platform_size(&self, platform: &PlatformConfig) -> Size {
        Size {
            width: self.platform_width * platform.scale_x,
            height: self.platform_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn ground_platform_sits_on_the_floor() {
        let config = GameConfig::default();
        let ground = config.platforms[0];
        assert_eq!(ground.y, 584.0);
        assert_eq!(config.platform_size(&ground).width, 800.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"movement":{"deadband":2.5},"seed":7}"#).unwrap();
        assert_eq!(config.movement.deadband, 2.5);
        assert_eq!(config.movement.ground, MovementConfig::default().ground);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.stars.count, 12);
    }

    #[test]
    fn empty_star_bounce_range_is_rejected() {
        let mut config = GameConfig::default();
        config.stars.bounce_min = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn star_positions_step_across_the_field() {
        let stars = StarConfig::default();
        assert_eq!(stars.x_of(0), 12.0);
        assert_eq!(stars.x_of(11), 782.0);
    }
}
