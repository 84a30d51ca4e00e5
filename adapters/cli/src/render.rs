//! ASCII frames for terminals.

use grid_chase_core::{CellCoord, GridWorld};
use grid_chase_system_inference::Belief;
use grid_chase_system_search::{SearchSnapshot, SearchStatus};
use grid_chase_world::GameState;

const WALL: char = '%';
const FLOOR: char = ' ';
const SEEKER: char = 'P';
const CHASER: char = 'G';
const SCARED_CHASER: char = 'g';
const FOOD: char = '.';
const CAPSULE: char = 'o';
const EXPANDED: char = '+';
const PATH: char = '*';

/// Glyphs for increasing belief mass, lightest first.
const SHADES: [char; 9] = [' ', '.', ':', '-', '=', '+', '*', '#', '@'];

fn draw(grid: &GridWorld, glyph: impl Fn(CellCoord) -> char) -> String {
    (0..grid.height())
        .map(|row| {
            (0..grid.width())
                .map(|column| {
                    let cell = CellCoord::new(column, row);
                    if grid.is_wall(cell) {
                        WALL
                    } else {
                        glyph(cell)
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expanded cells and, once found, the path between `start` and `goal`.
pub(crate) fn search_frame(
    grid: &GridWorld,
    start: CellCoord,
    goal: CellCoord,
    snapshot: &SearchSnapshot,
) -> String {
    let mut marks = vec![FLOOR; grid.cell_count()];
    let mut mark = |cell: CellCoord, glyph: char| {
        if let Some(index) = grid.index(cell) {
            marks[index] = glyph;
        }
    };
    for cell in snapshot.visited() {
        mark(cell, EXPANDED);
    }
    if snapshot.status() == SearchStatus::Found {
        for cell in snapshot.path() {
            mark(*cell, PATH);
        }
    }
    mark(goal, FOOD);
    mark(start, SEEKER);

    draw(grid, |cell| {
        grid.index(cell)
            .and_then(|index| marks.get(index).copied())
            .unwrap_or(FLOOR)
    })
}

/// Board with a one-line header of turn, score and status.
pub(crate) fn game_frame(grid: &GridWorld, state: &GameState) -> String {
    let board = draw(grid, |cell| {
        if cell == state.seeker() {
            return SEEKER;
        }
        if let Some(chaser) = state
            .chasers()
            .iter()
            .find(|chaser| chaser.position() == Some(cell))
        {
            return if chaser.is_scared() {
                SCARED_CHASER
            } else {
                CHASER
            };
        }
        if state.capsules().contains(&cell) {
            CAPSULE
        } else if state.food().contains(&cell) {
            FOOD
        } else {
            FLOOR
        }
    });
    format!(
        "turn {} score {} {:?}\n{board}",
        state.turn(),
        state.score(),
        state.status()
    )
}

/// Shaded belief mass summed over every tracked chaser, with the true
/// positions overlaid.
pub(crate) fn belief_frame(
    grid: &GridWorld,
    seeker: CellCoord,
    chasers: &[CellCoord],
    beliefs: &[Belief],
) -> String {
    draw(grid, |cell| {
        if cell == seeker {
            SEEKER
        } else if chasers.contains(&cell) {
            CHASER
        } else {
            let mass: f64 = beliefs.iter().map(|belief| belief.probability(cell)).sum();
            shade(mass)
        }
    })
}

fn shade(mass: f64) -> char {
    if !(mass > 0.0) {
        return SHADES[0];
    }
    let top = SHADES.len() - 1;
    let level = (mass.min(1.0) * top as f64).ceil() as usize;
    SHADES[level.clamp(1, top)]
}

#[cfg(test)]
mod tests {
    use grid_chase_system_search::{search, SearchAlgorithm};
    use grid_chase_world::Chaser;

    use super::*;

    #[test]
    fn found_path_is_drawn_between_the_endpoints() {
        let grid = GridWorld::new(4, 3, [CellCoord::new(1, 1), CellCoord::new(2, 1)])
            .expect("valid grid");
        let start = CellCoord::new(0, 1);
        let goal = CellCoord::new(3, 1);
        let snapshot = search(&grid, start, goal, SearchAlgorithm::Bfs)
            .expect("legal endpoints")
            .finish();

        let frame = search_frame(&grid, start, goal, &snapshot);
        let rows: Vec<&str> = frame.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], "P%%.");
        assert_eq!(frame.matches(PATH).count(), 4);
    }

    #[test]
    fn game_frame_marks_every_entity() {
        let grid = GridWorld::open(4, 1).expect("valid grid");
        let state = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::scared(CellCoord::new(3, 0), 5)],
            [CellCoord::new(1, 0)],
            [CellCoord::new(2, 0)],
        );
        let frame = game_frame(&grid, &state);
        assert_eq!(frame, "turn 0 score 0 InProgress\nP.og");
    }

    #[test]
    fn shades_grow_with_mass() {
        assert_eq!(shade(0.0), ' ');
        assert_eq!(shade(1e-9), '.');
        assert_eq!(shade(0.5), '=');
        assert_eq!(shade(1.0), '@');
        assert_eq!(shade(3.0), '@');
    }
}
