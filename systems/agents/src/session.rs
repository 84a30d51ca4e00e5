use grid_chase_core::GridWorld;
use grid_chase_world::{step_turn, DirectionalPursuit, GameState, TURN_LIMIT};
use rand::Rng;
use tracing::info;

use crate::SeekerAgent;

/// Whole game driven by a [`SeekerAgent`] against pursuing chasers.
///
/// Iterating yields the snapshot after each turn until the game ends or the
/// configured turn budget is spent.
#[derive(Debug)]
pub struct GameSession<'a, R> {
    grid: &'a GridWorld,
    agent: SeekerAgent,
    policy: DirectionalPursuit,
    state: GameState,
    max_turns: u32,
    rng: R,
}

impl<'a, R> GameSession<'a, R>
where
    R: Rng,
{
    /// Starts a session from `initial`, capped at [`TURN_LIMIT`] turns.
    #[must_use]
    pub fn new(
        grid: &'a GridWorld,
        initial: GameState,
        agent: SeekerAgent,
        policy: DirectionalPursuit,
        rng: R,
    ) -> Self {
        Self {
            grid,
            agent,
            policy,
            state: initial,
            max_turns: TURN_LIMIT,
            rng,
        }
    }

    /// Stops the session after `max_turns` turns even if the game goes on.
    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Snapshot after the most recent turn.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Agent steering the seeker.
    #[must_use]
    pub fn agent(&self) -> &SeekerAgent {
        &self.agent
    }

    /// Plays every remaining turn and returns the last snapshot.
    #[must_use]
    pub fn play_out(mut self) -> GameState {
        while self.next().is_some() {}
        info!(
            procedure = %self.agent.procedure(),
            turns = self.state.turn(),
            score = self.state.score(),
            won = self.state.is_won(),
            "session finished"
        );
        self.state
    }
}

impl<R> Iterator for GameSession<'_, R>
where
    R: Rng,
{
    type Item = GameState;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.is_game_over() || self.state.turn() >= self.max_turns {
            return None;
        }

        let seeker_move = self
            .agent
            .choose_move(self.grid, &self.state, &mut self.rng);
        self.state = step_turn(
            self.grid,
            &self.state,
            seeker_move,
            &self.policy,
            &mut self.rng,
        );
        Some(self.state.clone())
    }
}
