/// Game aggregate: the mode state machine and the live level session.
///
/// `Mode` is a tagged union; data specific to one screen lives in that
/// screen's variant (the title tip), and the whole level session lives
/// in `Playing`. Entering a level builds a fresh `Session` from the
/// loader's `LevelData` in one move — there is no partially-initialized
/// state to observe across a transition, and leaving `Playing` drops
/// every actor, bullet and collectible of the old session at once.
///
/// Score lives on `Game`, not the session: it is carried unchanged
/// across level advances and reset only when a new game starts.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::GameConfig;
use crate::domain::entity::{Bullet, Coin, FrameInput, Player, Spider};
use crate::domain::geometry::Rect;
use crate::domain::modifiers::Modifiers;

use super::event::GameEvent;
use super::level::{self, LevelData, LoadError};
use super::step::{self, Outcome};

/// One running level: every live collection plus the per-session
/// environment modifiers, rebuilt whole on each transition.
pub struct Session {
    /// 1-based level index.
    pub level: usize,
    pub name: String,
    pub bounds: Rect,
    pub platforms: Vec<Rect>,
    pub ladders: Vec<Rect>,
    pub water: Vec<Rect>,
    pub coins: Vec<Coin>,
    pub spiders: Vec<Spider>,
    pub bullets: Vec<Bullet>,
    pub player: Player,
    pub modifiers: Modifiers,
    pub tick: u64,
}

impl Session {
    pub fn new(level: usize, data: LevelData, config: &GameConfig) -> Self {
        Session {
            level,
            name: data.name,
            bounds: data.bounds,
            platforms: data.platforms,
            ladders: data.ladders,
            water: data.water,
            coins: data.coins,
            spiders: data.spiders,
            bullets: Vec::new(),
            player: Player::new(data.player_spawn),
            modifiers: Modifiers::surfaced(&config.tuning),
            tick: 0,
        }
    }
}

pub const TIPS: &[&str] = &[
    "Spiders hate water!",
    "Shooting a coin collects it!",
    "Everything moves slower in water!",
    "Spiders can't climb ladders!",
];

pub enum Mode {
    Title { tip: &'static str },
    Instructions,
    Playing(Session),
    GameOver,
    Win,
}

pub struct Game {
    pub mode: Mode,
    pub score: u32,
    pub config: GameConfig,
    pub rng: Pcg32,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let tip = TIPS[rng.random_range(0..TIPS.len())];
        Game { mode: Mode::Title { tip }, score: 0, config, rng }
    }

    /// Enter `Playing` at the 1-based `level`. An index past the last
    /// defined level goes straight to `Win` with no session built; a
    /// malformed level is fatal and propagated.
    pub fn enter_playing(&mut self, level: usize) -> Result<(), LoadError> {
        match level::load(level, &self.config.levels_dir) {
            Ok(data) => {
                self.mode = Mode::Playing(Session::new(level, data, &self.config));
                Ok(())
            }
            Err(LoadError::Exhausted { .. }) => {
                self.mode = Mode::Win;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Start a new game: score 0, level 1.
    pub fn start_new(&mut self) -> Result<(), LoadError> {
        self.score = 0;
        self.enter_playing(1)
    }

    /// Generic "continue" input for the passive screens.
    pub fn advance_screen(&mut self) -> Result<(), LoadError> {
        match self.mode {
            Mode::Title { .. } => {
                self.mode = Mode::Instructions;
                Ok(())
            }
            Mode::Instructions | Mode::GameOver | Mode::Win => self.start_new(),
            Mode::Playing(_) => Ok(()),
        }
    }

    /// Back to the title screen with a fresh tip.
    pub fn return_to_title(&mut self) {
        let tip = TIPS[self.rng.random_range(0..TIPS.len())];
        self.mode = Mode::Title { tip };
    }

    /// One simulation tick. No-op outside `Playing`.
    pub fn tick(&mut self, input: FrameInput) -> Result<Vec<GameEvent>, LoadError> {
        let (mut events, outcome, next) = {
            let Mode::Playing(session) = &mut self.mode else {
                return Ok(Vec::new());
            };
            let (events, outcome) =
                step::step(session, &mut self.score, input, &self.config.tuning, &mut self.rng);
            (events, outcome, session.level + 1)
        };
        match outcome {
            Outcome::Continue => {}
            Outcome::Died => self.mode = Mode::GameOver,
            Outcome::Cleared => {
                self.enter_playing(next)?;
                if matches!(self.mode, Mode::Win) {
                    events.push(GameEvent::GameWon);
                }
            }
        }
        Ok(events)
    }
}
