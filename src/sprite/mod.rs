// ┌──────────────────────────────────────────────────────────────────────────┐
// │                          Sprite module layout                            │
// ├────────────────┬─────────────────────────────────────────────────────────┤
// │   mod.rs       │ SpriteSheet grid, Animation clips, AnimationPlayer      │
// │   dude.rs      │ the player character: clip playback -> canvas           │
// └────────────────┴─────────────────────────────────────────────────────────┘
pub mod dude;

use crate::engine::{Point, Rect, Size};

/// A spritesheet laid out as a grid of equally sized frames, numbered left
/// to right then top to bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteSheet {
    frame_size: Size,
    columns: u32,
}

impl SpriteSheet {
    pub fn new(frame_size: Size, sheet_size: Size) -> Self {
        let columns = (sheet_size.width / frame_size.width).floor().max(1.0) as u32;
        SpriteSheet {
            frame_size,
            columns,
        }
    }

    pub fn frame_size(&self) -> Size {
        self.frame_size
    }

    /// Source rectangle of frame `index` inside the sheet image
    pub fn frame(&self, index: u32) -> Rect {
        let column = index % self.columns;
        let row = index / self.columns;
        Rect::new(
            Point {
                x: column as f32 * self.frame_size.width,
                y: row as f32 * self.frame_size.height,
            },
            self.frame_size,
        )
    }
}

/// Playback settings of one clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteMetadata {
    pub first_frame: u32,
    pub last_frame: u32,
    pub frame_rate: f32,
    pub repeat: bool,
}

/// Clips of the player spritesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Animation {
    Left,
    LeftStill,
    Right,
    RightStill,
    Turn,
}

impl Animation {
    pub fn metadata(&self) -> SpriteMetadata {
        match self {
            Animation::Left => SpriteMetadata {
                first_frame: 0,
                last_frame: 3,
                frame_rate: 10.0,
                repeat: true,
            },
            Animation::LeftStill => still(0),
            Animation::Right => SpriteMetadata {
                first_frame: 5,
                last_frame: 8,
                frame_rate: 10.0,
                repeat: true,
            },
            Animation::RightStill => still(5),
            Animation::Turn => still(4),
        }
    }

    pub fn total_frames(&self) -> u32 {
        let metadata = self.metadata();
        metadata.last_frame - metadata.first_frame + 1
    }
}

fn still(frame: u32) -> SpriteMetadata {
    SpriteMetadata {
        first_frame: frame,
        last_frame: frame,
        frame_rate: 20.0,
        repeat: false,
    }
}

/// Steps through the frames of the current clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationPlayer {
    current: Animation,
    frame: u32,
    elapsed_ms: f32,
    finished: bool,
}

impl AnimationPlayer {
    pub fn new(animation: Animation) -> Self {
        AnimationPlayer {
            current: animation,
            frame: 0,
            elapsed_ms: 0.0,
            finished: animation.total_frames() == 1 && !animation.metadata().repeat,
        }
    }

    /// Starts `animation` from its first frame. With `ignore_if_playing` a
    /// clip that is already running keeps its place.
    pub fn play(&mut self, animation: Animation, ignore_if_playing: bool) {
        if ignore_if_playing && self.current == animation && !self.finished {
            return;
        }
        *self = AnimationPlayer::new(animation);
    }

    pub fn update(&mut self, dt_ms: f32) {
        if self.finished {
            return;
        }
        let metadata = self.current.metadata();
        let frame_duration = 1000.0 / metadata.frame_rate;
        self.elapsed_ms += dt_ms;
        while self.elapsed_ms >= frame_duration {
            self.elapsed_ms -= frame_duration;
            if self.frame + 1 < self.current.total_frames() {
                self.frame += 1;
            } else if metadata.repeat {
                self.frame = 0;
            } else {
                self.finished = true;
                return;
            }
        }
    }

    pub fn current(&self) -> Animation {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        !self.finished
    }

    /// Index of the displayed frame in the spritesheet
    pub fn sheet_frame(&self) -> u32 {
        self.current.metadata().first_frame + self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_frames_follow_the_grid() {
        let sheet = SpriteSheet::new(
            Size {
                width: 32.0,
                height: 42.0,
            },
            Size {
                width: 288.0,
                height: 42.0,
            },
        );
        assert_eq!(sheet.frame(4).position, Point { x: 128.0, y: 0.0 });
        assert_eq!(sheet.frame(8).position, Point { x: 256.0, y: 0.0 });
    }

    #[test]
    fn walking_clip_loops() {
        let mut player = AnimationPlayer::new(Animation::Right);
        assert_eq!(player.sheet_frame(), 5);
        player.update(100.0);
        assert_eq!(player.sheet_frame(), 6);
        player.update(300.0);
        assert_eq!(player.sheet_frame(), 5);
        assert!(player.is_playing());
    }

    #[test]
    fn play_with_ignore_keeps_running_clip() {
        let mut player = AnimationPlayer::new(Animation::Left);
        player.update(150.0);
        assert_eq!(player.sheet_frame(), 1);
        player.play(Animation::Left, true);
        assert_eq!(player.sheet_frame(), 1);
        player.play(Animation::Left, false);
        assert_eq!(player.sheet_frame(), 0);
    }

    #[test]
    fn still_clips_show_a_single_frame() {
        let mut player = AnimationPlayer::new(Animation::Right);
        player.play(Animation::Turn, false);
        assert_eq!(player.sheet_frame(), 4);
        player.update(1000.0);
        assert_eq!(player.sheet_frame(), 4);
        assert_eq!(Animation::LeftStill.total_frames(), 1);
    }
}
