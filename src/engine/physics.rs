//! Arcade physics: axis aligned bodies, gravity, static platforms and world
//! bounds.
//!
//! Positions are body centres in pixels, velocities in px/s and
//! accelerations in px/s^2. y grows downwards so gravity is positive.

use super::{Point, Rect, Size};

/// Rebounds slower than this (px/s) come to rest instead of bouncing forever.
/// Only bodies that lose energy on impact settle.
const RESTING_SPEED: f32 = 20.0;

/// Slack when comparing the previous box against a platform edge
const CONTACT_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Point,
    pub size: Size,
    pub velocity: Point,
    pub acceleration: Point,
    pub max_velocity: Option<Point>,
    pub bounce: Point,
    pub collide_world_bounds: bool,
    pub enabled: bool,
    pub visible: bool,
    /// set by the last `World::step` when the body rests on something below it
    pub touching_down: bool,
}

impl Body {
    pub fn new(position: Point, size: Size) -> Self {
        Body {
            position,
            size,
            velocity: Point::default(),
            acceleration: Point::default(),
            max_velocity: None,
            bounce: Point::default(),
            collide_world_bounds: false,
            enabled: true,
            visible: true,
            touching_down: false,
        }
    }

    pub fn with_bounce(mut self, x: f32, y: f32) -> Self {
        self.bounce = Point { x, y };
        self
    }

    pub fn with_max_velocity(mut self, x: f32, y: f32) -> Self {
        self.max_velocity = Some(Point { x, y });
        self
    }

    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Point { x, y };
        self
    }

    pub fn colliding_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn bounding_box(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    /// Both bodies take part in the simulation and their boxes intersect
    pub fn overlaps(&self, other: &Body) -> bool {
        self.enabled && other.enabled && self.bounding_box().intersects(&other.bounding_box())
    }

    /// Moves the body to `(x, y)` and stops it
    pub fn reset(&mut self, x: f32, y: f32) {
        self.position = Point { x, y };
        self.velocity = Point::default();
        self.acceleration = Point::default();
        self.touching_down = false;
    }

    /// Removes the body from the simulation, optionally hiding it as well
    pub fn disable(&mut self, hide: bool) {
        self.enabled = false;
        if hide {
            self.visible = false;
        }
    }

    /// Resets the body to `(x, y)` and brings it back into the simulation
    pub fn enable_at(&mut self, x: f32, y: f32) {
        self.reset(x, y);
        self.enabled = true;
        self.visible = true;
    }
}

#[derive(Debug, Clone)]
pub struct World {
    bounds: Rect,
    gravity: f32,
    platforms: Vec<Rect>,
    paused: bool,
}

impl World {
    pub fn new(size: Size, gravity: f32) -> Self {
        World {
            bounds: Rect::new(Point::default(), size),
            gravity,
            platforms: Vec::new(),
            paused: false,
        }
    }

    pub fn add_platform(&mut self, platform: Rect) {
        self.platforms.push(platform);
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advances `body` by `dt` seconds
    pub fn step(&self, body: &mut Body, dt: f32) {
        if self.paused || !body.enabled {
            return;
        }

        body.touching_down = false;

        body.velocity.x += body.acceleration.x * dt;
        body.velocity.y += (self.gravity + body.acceleration.y) * dt;
        if let Some(max) = body.max_velocity {
            body.velocity.x = body.velocity.x.clamp(-max.x, max.x);
            body.velocity.y = body.velocity.y.clamp(-max.y, max.y);
        }

        let previous = body.bounding_box();
        body.position.x += body.velocity.x * dt;
        body.position.y += body.velocity.y * dt;

        for platform in &self.platforms {
            separate(body, &previous, platform);
        }

        if body.collide_world_bounds {
            self.contain(body);
        }
    }

    fn contain(&self, body: &mut Body) {
        let half_width = body.size.width / 2.0;
        let half_height = body.size.height / 2.0;

        if body.position.x - half_width < self.bounds.left() {
            body.position.x = self.bounds.left() + half_width;
            if body.velocity.x < 0.0 {
                body.velocity.x = rebound(body.velocity.x, body.bounce.x);
            }
        } else if body.position.x + half_width > self.bounds.right() {
            body.position.x = self.bounds.right() - half_width;
            if body.velocity.x > 0.0 {
                body.velocity.x = rebound(body.velocity.x, body.bounce.x);
            }
        }

        if body.position.y - half_height < self.bounds.top() {
            body.position.y = self.bounds.top() + half_height;
            if body.velocity.y < 0.0 {
                body.velocity.y = rebound(body.velocity.y, body.bounce.y);
            }
        } else if body.position.y + half_height >= self.bounds.bottom() {
            body.position.y = self.bounds.bottom() - half_height;
            if body.velocity.y > 0.0 {
                body.velocity.y = rebound(body.velocity.y, body.bounce.y);
            }
            body.touching_down = true;
        }
    }
}

/// Side of a platform a body came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Top,
    Bottom,
    Left,
    Right,
}

/// Picks the face of `platform` the body crossed, judged from where its box
/// sat before the move. A body that already overlapped falls back to the
/// axis of least penetration.
fn contact(previous: &Rect, current: &Rect, platform: &Rect) -> Contact {
    if previous.bottom() <= platform.top() + CONTACT_EPSILON {
        return Contact::Top;
    }
    if previous.top() >= platform.bottom() - CONTACT_EPSILON {
        return Contact::Bottom;
    }
    if previous.right() <= platform.left() + CONTACT_EPSILON {
        return Contact::Left;
    }
    if previous.left() >= platform.right() - CONTACT_EPSILON {
        return Contact::Right;
    }

    let overlap_x = current.right().min(platform.right()) - current.left().max(platform.left());
    let overlap_y = current.bottom().min(platform.bottom()) - current.top().max(platform.top());
    let center = current.center();
    let platform_center = platform.center();
    match (overlap_y <= overlap_x, center.y < platform_center.y, center.x < platform_center.x) {
        (true, true, _) => Contact::Top,
        (true, false, _) => Contact::Bottom,
        (false, _, true) => Contact::Left,
        (false, _, false) => Contact::Right,
    }
}

/// Pushes `body` out of `platform` through the face it entered by
fn separate(body: &mut Body, previous: &Rect, platform: &Rect) {
    let bounds = body.bounding_box();
    if !bounds.intersects(platform) {
        return;
    }

    let half_width = body.size.width / 2.0;
    let half_height = body.size.height / 2.0;

    match contact(previous, &bounds, platform) {
        Contact::Top => {
            body.position.y = platform.top() - half_height;
            if body.velocity.y > 0.0 {
                body.velocity.y = rebound(body.velocity.y, body.bounce.y);
            }
            body.touching_down = true;
        }
        Contact::Bottom => {
            body.position.y = platform.bottom() + half_height;
            if body.velocity.y < 0.0 {
                body.velocity.y = rebound(body.velocity.y, body.bounce.y);
            }
        }
        Contact::Left => {
            body.position.x = platform.left() - half_width;
            if body.velocity.x > 0.0 {
                body.velocity.x = rebound(body.velocity.x, body.bounce.x);
            }
        }
        Contact::Right => {
            body.position.x = platform.right() + half_width;
            if body.velocity.x < 0.0 {
                body.velocity.x = rebound(body.velocity.x, body.bounce.x);
            }
        }
    }
}

fn rebound(velocity: f32, bounce: f32) -> f32 {
    let reflected = -velocity * bounce;
    if bounce < 1.0 && reflected.abs() < RESTING_SPEED {
        0.0
    } else {
        reflected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    fn world() -> World {
        let mut world = World::new(
            Size {
                width: 800.0,
                height: 600.0,
            },
            1000.0,
        );
        world.add_platform(Rect::new(
            Point { x: 0.0, y: 568.0 },
            Size {
                width: 800.0,
                height: 32.0,
            },
        ));
        world
    }

    /// The scene's ground and three ledges
    fn level() -> World {
        let mut world = world();
        for (x, y) in [(600.0, 400.0), (50.0, 250.0), (750.0, 220.0)] {
            world.add_platform(Rect::from_center(
                Point { x, y },
                Size {
                    width: 400.0,
                    height: 32.0,
                },
            ));
        }
        world
    }

    fn bomb(x: f32, y: f32) -> Body {
        Body::new(
            Point { x, y },
            Size {
                width: 14.0,
                height: 14.0,
            },
        )
        .with_bounce(1.0, 1.0)
        .colliding_world_bounds()
    }

    /// Depth of the shallower overlap, zero when the boxes only touch
    fn penetration(a: &Rect, b: &Rect) -> f32 {
        let x = a.right().min(b.right()) - a.left().max(b.left());
        let y = a.bottom().min(b.bottom()) - a.top().max(b.top());
        x.min(y).max(0.0)
    }

    fn crate_body(x: f32, y: f32) -> Body {
        Body::new(
            Point { x, y },
            Size {
                width: 32.0,
                height: 42.0,
            },
        )
    }

    #[test]
    fn gravity_accelerates_a_falling_body() {
        let world = world();
        let mut body = crate_body(100.0, 100.0);
        world.step(&mut body, DT);
        assert_relative_eq!(body.velocity.y, 1000.0 * DT);
        assert!(body.position.y > 100.0);
        assert!(!body.touching_down);
    }

    #[test]
    fn body_lands_on_platform_and_touches_down() {
        let world = world();
        let mut body = crate_body(100.0, 450.0);
        for _ in 0..120 {
            world.step(&mut body, DT);
        }
        assert!(body.touching_down);
        assert_relative_eq!(body.bounding_box().bottom(), 568.0, epsilon = 1.0);
    }

    #[test]
    fn max_velocity_clamps_both_axes() {
        let world = world();
        let mut body = crate_body(400.0, 100.0).with_max_velocity(160.0, 400.0);
        body.acceleration.x = 100_000.0;
        for _ in 0..30 {
            world.step(&mut body, DT);
        }
        assert_relative_eq!(body.velocity.x, 160.0);
        assert!(body.velocity.y <= 400.0);
    }

    #[test]
    fn paused_world_does_not_move_bodies() {
        let mut world = world();
        world.pause();
        let mut body = crate_body(100.0, 100.0).with_velocity(50.0, 0.0);
        world.step(&mut body, DT);
        assert_eq!(body.position, Point { x: 100.0, y: 100.0 });
        world.resume();
        world.step(&mut body, DT);
        assert!(body.position.x > 100.0);
    }

    #[test]
    fn disabled_body_is_skipped() {
        let world = world();
        let mut body = crate_body(100.0, 100.0);
        body.disable(true);
        world.step(&mut body, DT);
        assert_eq!(body.position, Point { x: 100.0, y: 100.0 });
        assert!(!body.visible);
    }

    #[test]
    fn full_bounce_reflects_off_world_edge() {
        let world = World::new(
            Size {
                width: 800.0,
                height: 600.0,
            },
            0.0,
        );
        let mut body = Body::new(
            Point { x: 795.0, y: 300.0 },
            Size {
                width: 14.0,
                height: 14.0,
            },
        )
        .with_bounce(1.0, 1.0)
        .with_velocity(200.0, 0.0)
        .colliding_world_bounds();
        world.step(&mut body, DT);
        assert_relative_eq!(body.velocity.x, -200.0);
        assert_relative_eq!(body.position.x, 793.0);
    }

    #[test]
    fn enable_at_restores_a_disabled_body() {
        let mut body = crate_body(100.0, 300.0).with_velocity(10.0, 10.0);
        body.disable(true);
        body.enable_at(82.0, 0.0);
        assert!(body.enabled);
        assert!(body.visible);
        assert_eq!(body.position, Point { x: 82.0, y: 0.0 });
        assert_eq!(body.velocity, Point::default());
    }

    #[test]
    fn overlaps_ignores_disabled_bodies() {
        let a = crate_body(100.0, 100.0);
        let mut b = crate_body(110.0, 110.0);
        assert!(a.overlaps(&b));
        b.disable(false);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn fast_narrow_body_lands_on_top_instead_of_sliding_sideways() {
        // falls further in one step than it is wide
        let world = world();
        let mut body = bomb(400.0, 555.0).with_velocity(0.0, 1300.0);
        world.step(&mut body, DT);
        assert_relative_eq!(body.bounding_box().bottom(), 568.0, epsilon = 0.001);
        assert_relative_eq!(body.position.x, 400.0);
        assert!(body.velocity.y < 0.0);
        assert!(body.touching_down);
    }

    #[test]
    fn body_rising_into_a_ledge_is_pushed_below_it() {
        let world = level();
        let mut body = bomb(100.0, 280.0).with_velocity(0.0, -900.0);
        world.step(&mut body, DT);
        assert_relative_eq!(body.bounding_box().top(), 266.0, epsilon = 0.001);
        assert!(body.velocity.y > 0.0);
        assert!(!body.touching_down);
    }

    #[test]
    fn body_moving_into_a_ledge_side_bounces_back() {
        let mut world = World::new(
            Size {
                width: 800.0,
                height: 600.0,
            },
            0.0,
        );
        world.add_platform(Rect::new(
            Point { x: 400.0, y: 384.0 },
            Size {
                width: 400.0,
                height: 32.0,
            },
        ));
        let mut body = bomb(390.0, 400.0).with_velocity(200.0, 0.0);
        world.step(&mut body, DT);
        assert_relative_eq!(body.bounding_box().right(), 400.0, epsilon = 0.001);
        assert_relative_eq!(body.velocity.x, -200.0);
    }

    #[test]
    fn dropped_bombs_never_end_a_step_inside_a_platform() {
        let world = level();
        for spawn_x in (0..=16).map(|i| 10.0 + 48.0 * i as f32) {
            for speed_x in [-200.0, -120.0, -15.0, 0.0, 15.0, 90.0, 200.0] {
                let mut body = bomb(spawn_x, 16.0).with_velocity(speed_x, 20.0);
                for frame in 0..1200 {
                    world.step(&mut body, DT);
                    let bounds = body.bounding_box();
                    for platform in world.platforms() {
                        assert!(
                            penetration(&bounds, platform) < 0.01,
                            "bomb from x={} vx={} inside {:?} at frame {}: {:?}",
                            spawn_x,
                            speed_x,
                            platform,
                            frame,
                            bounds
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn full_bounce_keeps_slow_bodies_moving() {
        let world = World::new(
            Size {
                width: 800.0,
                height: 600.0,
            },
            0.0,
        );
        let mut body = bomb(7.0, 300.0).with_velocity(-15.0, 0.0);
        world.step(&mut body, DT);
        assert_relative_eq!(body.velocity.x, 15.0);
        assert_relative_eq!(body.position.x, 7.0);
    }

    #[test]
    fn partial_bounce_comes_to_rest() {
        let world = world();
        let mut body = crate_body(100.0, 500.0).with_bounce(0.5, 0.5);
        for _ in 0..300 {
            world.step(&mut body, DT);
        }
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.touching_down);
    }
}
