//! The status of a play session as a typestate machine. Transitions are only
//! reachable through the methods below, so a score can't grow outside of
//! play and a restart can't happen before a game over.
//!
//! ┌──────────────── Status Transition Flow ─────────────────┐
//! │  From State  →  Event        →  To State                │
//! ├─────────────────────────────────────────────────────────┤
//! │  Ready       →  SubmitName   →  Playing                 │
//! │  Playing     →  CollectStar  →  Playing (score + n)     │
//! │  Playing     →  HitBomb      →  GameOver                │
//! │  GameOver    →  Restart      →  Playing (score = 0)     │
//! └─────────────────────────────────────────────────────────┘

/// Observable status, mirrors the machine variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ready,
    Start,
    GameOver,
}

#[derive(Debug, Copy, Clone)]
pub struct Ready;

#[derive(Debug, Copy, Clone)]
pub struct Playing;

#[derive(Debug, Copy, Clone)]
pub struct GameOver;

/// Carried across every status
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub score: u32,
}

#[derive(Debug, Copy, Clone)]
pub struct SessionState<S> {
    context: SessionContext,
    // type-level marker, never read
    _state: S,
}

impl<S> SessionState<S> {
    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

impl SessionState<Ready> {
    pub fn new() -> Self {
        SessionState {
            context: SessionContext::default(),
            _state: Ready,
        }
    }

    pub fn start(self) -> SessionState<Playing> {
        SessionState {
            context: self.context,
            _state: Playing,
        }
    }
}

impl SessionState<Playing> {
    pub fn collect_star(mut self, points: u32) -> Self {
        self.context.score = self.context.score.saturating_add(points);
        self
    }

    pub fn hit_bomb(self) -> SessionState<GameOver> {
        SessionState {
            context: self.context,
            _state: GameOver,
        }
    }
}

impl SessionState<GameOver> {
    pub fn restart(self) -> SessionState<Playing> {
        SessionState {
            context: SessionContext::default(),
            _state: Playing,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    SubmitName,
    CollectStar { points: u32 },
    HitBomb,
    Restart,
}

#[derive(Debug, Copy, Clone)]
pub enum StatusMachine {
    Ready(SessionState<Ready>),
    Playing(SessionState<Playing>),
    GameOver(SessionState<GameOver>),
}

impl Default for StatusMachine {
    fn default() -> Self {
        StatusMachine::Ready(SessionState::new())
    }
}

impl From<SessionState<Ready>> for StatusMachine {
    fn from(state: SessionState<Ready>) -> Self {
        StatusMachine::Ready(state)
    }
}

impl From<SessionState<Playing>> for StatusMachine {
    fn from(state: SessionState<Playing>) -> Self {
        StatusMachine::Playing(state)
    }
}

impl From<SessionState<GameOver>> for StatusMachine {
    fn from(state: SessionState<GameOver>) -> Self {
        StatusMachine::GameOver(state)
    }
}

impl StatusMachine {
    /// Consumes the current status. Events that make no sense in the current
    /// status leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        // the marker structs share the variant names, so variants stay qualified
        match (self, event) {
            (StatusMachine::Ready(state), Event::SubmitName) => state.start().into(),
            (StatusMachine::Playing(state), Event::CollectStar { points }) => {
                state.collect_star(points).into()
            }
            (StatusMachine::Playing(state), Event::HitBomb) => state.hit_bomb().into(),
            (StatusMachine::GameOver(state), Event::Restart) => state.restart().into(),
            _ => self,
        }
    }

    pub fn status(&self) -> GameStatus {
        match self {
            StatusMachine::Ready(_) => GameStatus::Ready,
            StatusMachine::Playing(_) => GameStatus::Start,
            StatusMachine::GameOver(_) => GameStatus::GameOver,
        }
    }

    pub fn context(&self) -> &SessionContext {
        match self {
            StatusMachine::Ready(state) => state.context(),
            StatusMachine::Playing(state) => state.context(),
            StatusMachine::GameOver(state) => state.context(),
        }
    }
}
