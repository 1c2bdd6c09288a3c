//! The strategy plug-in contract and registry.
//!
//! Strategies are opaque implementations of a fixed capability set,
//! resolved by name from a registry at match setup (no dynamic
//! loading). The engine calls them synchronously and sequentially,
//! never concurrently, and only ever hands them value copies of state.

mod explorer;
mod random;

pub use explorer::ExplorerStrategy;
pub use random::RandomStrategy;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Action, Game, GridUpdate};

/// The capability set every strategy implements.
///
/// Contract calls are wall-clock timed by the engine and billed against
/// the player's budget. A panic inside `perform_action`,
/// `handle_grid_update`, or `init` forfeits the seat's remaining
/// actions; a panic inside `debug` is discarded.
pub trait Strategy {
    /// Receive the initial fog-projected game. `assigned_color`
    /// identifies the receiving player.
    fn init(&mut self, game: Game);

    /// Receive the diff emitted after an action, including the
    /// strategy's own.
    fn handle_grid_update(&mut self, update: GridUpdate);

    /// Decide this turn's action.
    fn perform_action(&mut self) -> Action;

    /// Render a diagnostic summary of the strategy's local state.
    fn debug(&self) -> String;
}

/// Apply a diff to a strategy's local copy of the game.
///
/// The reconciliation every well-behaved strategy performs: replace
/// changed cells, replace changed player records.
pub fn apply_update(game: &mut Game, update: &GridUpdate) {
    for cell_update in &update.cell_updates {
        game.grid
            .set(cell_update.coordinates, cell_update.cell.clone());
    }
    for info in &update.player_info_updates {
        if let Some(record) = game.grid.player_info_mut(info.player) {
            *record = *info;
        }
    }
}

/// How to build one player's strategy: a registry name plus an opaque
/// configuration string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    /// Registry name.
    pub name: String,
    /// Configuration forwarded verbatim to the constructor.
    #[serde(default)]
    pub config: String,
}

impl StrategySpec {
    /// Parse a `name` or `name:config` CLI argument.
    #[must_use]
    pub fn parse(arg: &str) -> Self {
        match arg.split_once(':') {
            Some((name, config)) => Self {
                name: name.to_string(),
                config: config.to_string(),
            },
            None => Self {
                name: arg.to_string(),
                config: String::new(),
            },
        }
    }
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.config.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.name, self.config)
        }
    }
}

/// Constructor signature for registered strategies.
///
/// `seed` makes stochastic strategies reproducible; deterministic
/// strategies may ignore it.
pub type StrategyCtor = fn(seed: u64, config: &str) -> Box<dyn Strategy>;

/// Maps strategy names to constructors, resolved at match setup.
#[derive(Clone)]
pub struct StrategyRegistry {
    entries: BTreeMap<&'static str, StrategyCtor>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl StrategyRegistry {
    /// An empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The registry of bundled strategies.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("random", |seed, _config| {
            Box::new(RandomStrategy::new(seed))
        });
        registry.register("explorer", |_seed, _config| {
            Box::new(ExplorerStrategy::new())
        });
        registry
    }

    /// Register a constructor under a name, replacing any previous one.
    pub fn register(&mut self, name: &'static str, ctor: StrategyCtor) {
        self.entries.insert(name, ctor);
    }

    /// Instantiate a strategy from a spec, or `None` for an unknown
    /// name.
    #[must_use]
    pub fn create(&self, spec: &StrategySpec, seed: u64) -> Option<Box<dyn Strategy>> {
        self.entries
            .get(spec.name.as_str())
            .map(|ctor| ctor(seed, &spec.config))
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Instantiate one strategy per player for a match.
    ///
    /// Each seat gets a seed derived from the match seed and its player
    /// id, so the same `(seed, specs)` pair always rebuilds the same
    /// lineup.
    ///
    /// # Errors
    ///
    /// Returns the first spec whose name is not registered.
    pub fn create_lineup(
        &self,
        specs: &[StrategySpec],
        players: &[crate::game::PlayerId],
        match_seed: u64,
    ) -> Result<Vec<Box<dyn Strategy>>, UnknownStrategy> {
        players
            .iter()
            .zip(specs)
            .map(|(player, spec)| {
                self.create(spec, player_seed(match_seed, *player))
                    .ok_or_else(|| UnknownStrategy(spec.name.clone()))
            })
            .collect()
    }
}

/// Per-seat seed derivation: stable across replays and tournaments.
#[must_use]
pub fn player_seed(match_seed: u64, player: crate::game::PlayerId) -> u64 {
    match_seed ^ (u64::from(player) << 32)
}

/// Error returned when a spec names an unregistered strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown strategy: {}", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Enumerate plausible actions for the assigned player in a local game
/// copy: moves onto known-passable cells and mines toward stone.
///
/// Also reports the wood type of a closed door currently blocking the
/// player, if any, so strategies can broadcast it as a signal.
pub(crate) fn candidate_actions(
    game: &Game,
) -> (Vec<Action>, Option<crate::game::WoodType>) {
    use crate::game::{CellKind, Direction};

    let Some(me) = game.assigned_color else {
        return (Vec::new(), None);
    };
    let Some(info) = game.grid.player_info(me) else {
        return (Vec::new(), None);
    };
    let position = info.position;
    let Some(cell) = game.grid.get(position) else {
        return (Vec::new(), None);
    };

    let mut blocked_by = None;
    let mut candidates = Vec::new();

    for direction in Direction::ALL {
        if let Some(door) = cell.kind.door()
            && door.direction == direction
            && !door.is_open
        {
            blocked_by = Some(door.wood_type);
            continue;
        }
        let Some(target) = position.step(direction, game.grid.height(), game.grid.width()) else {
            continue;
        };
        if game
            .grid
            .get(target)
            .is_some_and(|c| c.kind.is_passable())
        {
            candidates.push(Action::step(direction));
        }
    }

    for direction in Direction::ALL {
        let Some(target) = position.step(direction, game.grid.height(), game.grid.width()) else {
            continue;
        };
        if game
            .grid
            .get(target)
            .is_some_and(|c| matches!(c.kind, CellKind::Stone { .. }))
        {
            candidates.push(Action::mine(direction));
        }
    }

    (candidates, blocked_by)
}
