//! Per-frame player control: horizontal steering and variable height jumps.

use crate::config::Forces;
use crate::engine::input::KeyState;
use crate::sprite::Animation;

const LEFT_KEYS: [&str; 2] = ["ArrowLeft", "KeyA"];
const RIGHT_KEYS: [&str; 2] = ["ArrowRight", "KeyD"];
const JUMP_KEYS: [&str; 2] = ["ArrowUp", "Space"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Horizontal {
    Left,
    Right,
    #[default]
    Neutral,
}

/// Input sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlInput {
    pub horizontal: Horizontal,
    pub jump: bool,
}

impl From<&KeyState> for ControlInput {
    fn from(keystate: &KeyState) -> Self {
        // left wins when both directions are held
        let horizontal = if keystate.any_pressed(&LEFT_KEYS) {
            Horizontal::Left
        } else if keystate.any_pressed(&RIGHT_KEYS) {
            Horizontal::Right
        } else {
            Horizontal::Neutral
        };
        ControlInput {
            horizontal,
            jump: keystate.any_pressed(&JUMP_KEYS),
        }
    }
}

/// What the steering decided for this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub acceleration_x: f32,
    /// overrides the horizontal velocity when set
    pub velocity_x: Option<f32>,
    pub animation: Animation,
    pub ignore_if_playing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementController {
    deadband: f32,
}

impl MovementController {
    pub fn new(deadband: f32) -> Self {
        MovementController { deadband }
    }

    /// `None` when `forces.budget < forces.natural`, the caller keeps the
    /// previous acceleration
    pub fn steer(&self, forces: Forces, input: Horizontal, velocity_x: f32) -> Option<Steering> {
        if forces.budget < forces.natural {
            return None;
        }
        let drive = forces.budget - forces.natural;

        let steering = match input {
            Horizontal::Left => Steering {
                acceleration_x: -drive,
                velocity_x: None,
                animation: Animation::Left,
                ignore_if_playing: true,
            },
            Horizontal::Right => Steering {
                acceleration_x: drive,
                velocity_x: None,
                animation: Animation::Right,
                ignore_if_playing: true,
            },
            Horizontal::Neutral if velocity_x >= self.deadband => Steering {
                acceleration_x: -forces.natural,
                velocity_x: None,
                animation: Animation::RightStill,
                ignore_if_playing: false,
            },
            Horizontal::Neutral if velocity_x <= -self.deadband => Steering {
                acceleration_x: forces.natural,
                velocity_x: None,
                animation: Animation::LeftStill,
                ignore_if_playing: false,
            },
            Horizontal::Neutral => Steering {
                acceleration_x: 0.0,
                velocity_x: Some(0.0),
                animation: Animation::Turn,
                ignore_if_playing: false,
            },
        };
        Some(steering)
    }
}

/// Vertical command for this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpAction {
    /// nothing changes
    Idle,
    /// give the upward impulse and start cancelling gravity
    Launch,
    /// keep cancelling gravity
    Sustain,
    /// stop cancelling gravity
    Cut,
}

/// Tracks a jump from the press that launched it until the key is released.
/// Gravity is cancelled for at most `hold_limit_ms` of holding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpController {
    hold_limit_ms: f32,
    charging: bool,
    boosting: bool,
    held_ms: f32,
}

impl JumpController {
    pub fn new(hold_limit_ms: f32) -> Self {
        JumpController {
            hold_limit_ms,
            charging: false,
            boosting: false,
            held_ms: 0.0,
        }
    }

    pub fn update(&mut self, pressed: bool, grounded: bool, dt_ms: f32) -> JumpAction {
        if !pressed {
            let was_boosting = self.boosting;
            self.reset();
            return if was_boosting {
                JumpAction::Cut
            } else {
                JumpAction::Idle
            };
        }

        if !self.charging {
            if !grounded {
                return JumpAction::Idle;
            }
            self.charging = true;
            self.boosting = true;
            self.held_ms = 0.0;
            return JumpAction::Launch;
        }

        self.held_ms += dt_ms;
        if !self.boosting {
            JumpAction::Idle
        } else if self.held_ms < self.hold_limit_ms {
            JumpAction::Sustain
        } else {
            self.boosting = false;
            JumpAction::Cut
        }
    }

    pub fn reset(&mut self) {
        self.charging = false;
        self.boosting = false;
        self.held_ms = 0.0;
    }

    /// the jump-hold flag
    pub fn is_charging(&self) -> bool {
        self.charging
    }

    pub fn held_ms(&self) -> f32 {
        self.held_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GROUND: Forces = Forces {
        budget: 600.0,
        natural: 300.0,
    };

    fn controller() -> MovementController {
        MovementController::new(5.0)
    }

    #[test]
    fn directional_input_applies_net_force() {
        let left = controller().steer(GROUND, Horizontal::Left, 0.0).unwrap();
        assert_relative_eq!(left.acceleration_x, -300.0);
        assert_eq!(left.animation, Animation::Left);
        assert!(left.ignore_if_playing);

        let right = controller().steer(GROUND, Horizontal::Right, -40.0).unwrap();
        assert_relative_eq!(right.acceleration_x, 300.0);
        assert_eq!(right.animation, Animation::Right);
        assert_eq!(right.velocity_x, None);
    }

    #[test]
    fn idle_input_brakes_against_velocity() {
        let sliding_right = controller().steer(GROUND, Horizontal::Neutral, 120.0).unwrap();
        assert_relative_eq!(sliding_right.acceleration_x, -300.0);
        assert_eq!(sliding_right.animation, Animation::RightStill);

        let sliding_left = controller().steer(GROUND, Horizontal::Neutral, -5.0).unwrap();
        assert_relative_eq!(sliding_left.acceleration_x, 300.0);
        assert_eq!(sliding_left.animation, Animation::LeftStill);
    }

    #[test]
    fn idle_inside_deadband_is_neutral() {
        for velocity in [-4.99_f32, -2.0, 0.0, 1.5, 4.99] {
            let steering = controller()
                .steer(GROUND, Horizontal::Neutral, velocity)
                .unwrap();
            assert_eq!(steering.acceleration_x, 0.0);
            assert_eq!(steering.velocity_x, Some(0.0));
            assert_eq!(steering.animation, Animation::Turn);
        }
    }

    #[test]
    fn weak_budget_is_a_no_op() {
        let pairs = [(0.0, 1.0), (199.0, 200.0), (10.0, 300.0)];
        for (budget, natural) in pairs {
            let forces = Forces { budget, natural };
            for input in [Horizontal::Left, Horizontal::Right, Horizontal::Neutral] {
                assert_eq!(controller().steer(forces, input, 50.0), None);
            }
        }
    }

    #[test]
    fn control_input_reads_bindings() {
        let mut keys = KeyState::new();
        keys.set_pressed("KeyD");
        keys.set_pressed("Space");
        let input = ControlInput::from(&keys);
        assert_eq!(input.horizontal, Horizontal::Right);
        assert!(input.jump);

        keys.set_pressed("KeyA");
        assert_eq!(ControlInput::from(&keys).horizontal, Horizontal::Left);
    }

    #[test]
    fn jump_launches_only_from_ground() {
        let mut jump = JumpController::new(300.0);
        assert_eq!(jump.update(true, false, 16.0), JumpAction::Idle);
        assert!(!jump.is_charging());
        assert_eq!(jump.update(true, true, 16.0), JumpAction::Launch);
        assert!(jump.is_charging());
    }

    #[test]
    fn jump_boost_ends_at_hold_limit() {
        let mut jump = JumpController::new(300.0);
        assert_eq!(jump.update(true, true, 100.0), JumpAction::Launch);
        assert_eq!(jump.update(true, false, 100.0), JumpAction::Sustain);
        assert_eq!(jump.update(true, false, 100.0), JumpAction::Sustain);
        assert_eq!(jump.update(true, false, 100.0), JumpAction::Cut);
        assert_eq!(jump.update(true, false, 100.0), JumpAction::Idle);
        assert!(jump.is_charging());
    }

    #[test]
    fn releasing_early_cuts_the_boost() {
        let mut jump = JumpController::new(300.0);
        jump.update(true, true, 16.0);
        jump.update(true, false, 16.0);
        assert_eq!(jump.update(false, false, 16.0), JumpAction::Cut);
        assert!(!jump.is_charging());
        assert_eq!(jump.held_ms(), 0.0);
    }

    #[test]
    fn held_key_does_not_rejump_on_landing() {
        let mut jump = JumpController::new(300.0);
        jump.update(true, true, 100.0);
        for _ in 0..10 {
            jump.update(true, false, 100.0);
        }
        assert_eq!(jump.update(true, true, 100.0), JumpAction::Idle);
        jump.update(false, true, 100.0);
        assert_eq!(jump.update(true, true, 100.0), JumpAction::Launch);
    }
}
