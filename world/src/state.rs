//! Immutable game snapshots and the successor primitive.

use std::collections::BTreeSet;

use grid_chase_core::{CellCoord, GridWorld, Move};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CAPSULE_REWARD, CHASER_REWARD, FOOD_REWARD, MOVE_COST, SCARED_DURATION};

/// Index of the seeker within the agent ordering used by game-tree search.
pub const SEEKER: usize = 0;

/// Adversary record. A captured chaser keeps its slot with no position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chaser {
    position: Option<CellCoord>,
    scared: bool,
    scared_timer: u32,
}

impl Chaser {
    /// Creates a threatening chaser standing on `position`.
    #[must_use]
    pub const fn new(position: CellCoord) -> Self {
        Self {
            position: Some(position),
            scared: false,
            scared_timer: 0,
        }
    }

    /// Creates a chaser that stays scared for `timer` more turns.
    #[must_use]
    pub const fn scared(position: CellCoord, timer: u32) -> Self {
        Self {
            position: Some(position),
            scared: timer > 0,
            scared_timer: timer,
        }
    }

    /// Cell occupied by the chaser, or `None` once it has been captured.
    #[must_use]
    pub const fn position(&self) -> Option<CellCoord> {
        self.position
    }

    /// Reports whether the chaser still takes part in the game.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.position.is_some()
    }

    /// Reports whether the chaser is currently vulnerable.
    #[must_use]
    pub const fn is_scared(&self) -> bool {
        self.scared
    }

    /// Turns remaining until the chaser threatens again.
    #[must_use]
    pub const fn scared_timer(&self) -> u32 {
        self.scared_timer
    }

    /// Position of an active chaser that is scared.
    #[must_use]
    pub fn vulnerable_at(&self) -> Option<CellCoord> {
        self.position.filter(|_| self.scared)
    }

    /// Position of an active chaser that is not scared.
    #[must_use]
    pub fn threatening_at(&self) -> Option<CellCoord> {
        self.position.filter(|_| !self.scared)
    }

    fn capture(&mut self) {
        self.position = None;
        self.scared = false;
        self.scared_timer = 0;
    }

    fn frighten(&mut self) {
        if self.is_active() {
            self.scared = true;
            self.scared_timer = SCARED_DURATION;
        }
    }

    fn tick_timer(&mut self) {
        self.scared_timer = self.scared_timer.saturating_sub(1);
        self.scared = self.scared_timer > 0;
    }
}

/// Terminal classification of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The game continues.
    InProgress,
    /// The seeker cleared every food item.
    Won,
    /// The seeker was caught or ran out of turns.
    Lost,
}

/// One immutable snapshot of a game in progress.
///
/// Every transition builds a fresh snapshot; collections are owned and never
/// shared between two live states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    seeker: CellCoord,
    chasers: Vec<Chaser>,
    food: BTreeSet<CellCoord>,
    capsules: BTreeSet<CellCoord>,
    score: i64,
    turn: u32,
    status: GameStatus,
}

impl GameState {
    /// Creates the opening snapshot with a zero score.
    #[must_use]
    pub fn new<F, C>(seeker: CellCoord, chasers: Vec<Chaser>, food: F, capsules: C) -> Self
    where
        F: IntoIterator<Item = CellCoord>,
        C: IntoIterator<Item = CellCoord>,
    {
        Self {
            seeker,
            chasers,
            food: food.into_iter().collect(),
            capsules: capsules.into_iter().collect(),
            score: 0,
            turn: 0,
            status: GameStatus::InProgress,
        }
    }

    /// Returns a copy of the snapshot carrying a different score.
    #[must_use]
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Cell occupied by the seeker.
    #[must_use]
    pub const fn seeker(&self) -> CellCoord {
        self.seeker
    }

    /// Chaser records in stable agent order.
    #[must_use]
    pub fn chasers(&self) -> &[Chaser] {
        &self.chasers
    }

    /// Remaining food items.
    #[must_use]
    pub fn food(&self) -> &BTreeSet<CellCoord> {
        &self.food
    }

    /// Remaining capsules.
    #[must_use]
    pub fn capsules(&self) -> &BTreeSet<CellCoord> {
        &self.capsules
    }

    /// Running score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Number of full turns played so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Terminal classification of the snapshot.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Reports whether the game has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status != GameStatus::InProgress
    }

    /// Reports whether the game ended with the seeker clearing the board.
    #[must_use]
    pub fn is_won(&self) -> bool {
        self.status == GameStatus::Won
    }

    /// Seeker plus every chaser slot, captured or not.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        1 + self.chasers.len()
    }

    /// Legal moves for `agent`; empty for captured chasers and unknown agents.
    #[must_use]
    pub fn legal_moves(&self, grid: &GridWorld, agent: usize) -> Vec<Move> {
        let origin = if agent == SEEKER {
            Some(self.seeker)
        } else {
            self.chasers
                .get(agent - 1)
                .and_then(|chaser| chaser.position())
        };

        origin.map_or_else(Vec::new, |cell| grid.legal_moves(cell).collect())
    }

    /// Applies `step` for `agent` and returns the resulting snapshot.
    ///
    /// The seeker's move charges the move cost, consumes food or a capsule,
    /// updates scared timers, resolves collisions at the chasers' current
    /// cells and detects a win. A chaser's move only relocates that chaser and
    /// resolves its collision. No chaser policy runs here.
    #[must_use]
    pub fn successor(&self, agent: usize, step: Move) -> GameState {
        let mut next = self.clone();
        if agent == SEEKER {
            next.advance_seeker(step.destination());
        } else {
            next.relocate_chaser(agent - 1, step.destination());
        }
        next
    }

    pub(crate) fn advance_seeker(&mut self, destination: CellCoord) {
        self.seeker = destination;
        self.score -= MOVE_COST;

        if self.food.remove(&destination) {
            self.score += FOOD_REWARD;
        }

        if self.capsules.remove(&destination) {
            self.score += CAPSULE_REWARD;
            for chaser in &mut self.chasers {
                chaser.frighten();
            }
        } else {
            for chaser in &mut self.chasers {
                chaser.tick_timer();
            }
        }

        self.resolve_collisions();
        if self.is_game_over() {
            return;
        }

        if self.food.is_empty() {
            self.status = GameStatus::Won;
        }
    }

    pub(crate) fn relocate_chaser(&mut self, index: usize, destination: CellCoord) {
        let Some(chaser) = self.chasers.get_mut(index) else {
            return;
        };
        if !chaser.is_active() {
            return;
        }
        chaser.position = Some(destination);
        self.resolve_collision(index);
    }

    pub(crate) fn resolve_collisions(&mut self) {
        for index in 0..self.chasers.len() {
            self.resolve_collision(index);
        }
    }

    pub(crate) fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    pub(crate) fn mark_lost(&mut self) {
        self.status = GameStatus::Lost;
    }

    fn resolve_collision(&mut self, index: usize) {
        let seeker = self.seeker;
        let Some(chaser) = self.chasers.get_mut(index) else {
            return;
        };
        if chaser.position() != Some(seeker) {
            return;
        }

        if chaser.is_scared() {
            chaser.capture();
            self.score += CHASER_REWARD;
            debug!(chaser = index, cell = %seeker, "seeker captured scared chaser");
        } else {
            self.status = GameStatus::Lost;
        }
    }
}

#[cfg(test)]
mod tests {
    use grid_chase_core::Direction;

    use super::*;

    fn open_grid() -> GridWorld {
        GridWorld::open(5, 5).expect("valid grid")
    }

    fn east_of(cell: CellCoord) -> Move {
        Move::new(Direction::East, CellCoord::new(cell.column() + 1, cell.row()))
    }

    #[test]
    fn plain_move_costs_one_point() {
        let state = GameState::new(
            CellCoord::new(0, 0),
            Vec::new(),
            [CellCoord::new(4, 4)],
            [],
        );
        let next = state.successor(SEEKER, east_of(state.seeker()));
        assert_eq!(next.score(), -1);
        assert_eq!(next.seeker(), CellCoord::new(1, 0));
        assert_eq!(next.status(), GameStatus::InProgress);
        assert_eq!(state.score(), 0, "original snapshot must stay untouched");
    }

    #[test]
    fn eating_last_food_wins() {
        let state = GameState::new(CellCoord::new(0, 0), Vec::new(), [CellCoord::new(1, 0)], []);
        let next = state.successor(SEEKER, east_of(state.seeker()));
        assert_eq!(next.score(), 9);
        assert!(next.is_won());
        assert!(next.food().is_empty());
    }

    #[test]
    fn capsule_scares_only_active_chasers() {
        let grid = open_grid();
        let captured = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::scared(CellCoord::new(1, 0), 3), Chaser::new(CellCoord::new(4, 4))],
            [CellCoord::new(3, 3)],
            [CellCoord::new(2, 0)],
        )
        .successor(SEEKER, east_of(CellCoord::new(0, 0)));
        assert!(!captured.chasers()[0].is_active());

        let next = captured.successor(SEEKER, east_of(captured.seeker()));
        assert!(!next.chasers()[0].is_scared());
        assert!(next.chasers()[1].is_scared());
        assert_eq!(next.chasers()[1].scared_timer(), SCARED_DURATION);
        assert!(next.legal_moves(&grid, 1).is_empty());
    }

    #[test]
    fn scared_timers_tick_down_without_capsule() {
        let state = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::scared(CellCoord::new(4, 4), 1)],
            [CellCoord::new(3, 3)],
            [],
        );
        let next = state.successor(SEEKER, east_of(state.seeker()));
        assert_eq!(next.chasers()[0].scared_timer(), 0);
        assert!(!next.chasers()[0].is_scared());
    }

    #[test]
    fn chaser_stepping_onto_seeker_ends_the_game() {
        let state = GameState::new(
            CellCoord::new(2, 2),
            vec![Chaser::new(CellCoord::new(3, 2))],
            [CellCoord::new(0, 0)],
            [],
        );
        let next = state.successor(1, Move::new(Direction::West, CellCoord::new(2, 2)));
        assert_eq!(next.status(), GameStatus::Lost);
        assert_eq!(next.score(), 0);
    }
}
