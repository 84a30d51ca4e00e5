use std::{ffi::OsStr, fs, io::Write, path::Path, thread, time::Duration};

use anyhow::{bail, Context, Result};
use grid_chase_core::{CellCoord, Move};
use grid_chase_layout::Layout;
use grid_chase_system_agents::{GameSession, SeekerAgent};
use grid_chase_system_inference::{transition_targets, Belief, NoisySensor};
use grid_chase_system_search::{search, SearchAlgorithm};
use grid_chase_world::DirectionalPursuit;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{
    config::Config,
    render,
    report::{emit, Record},
    tracking::Tracker,
    OutputFormat, PlayArgs, SearchArgs, TrackArgs,
};

fn load_layout(path: &Path) -> Result<Layout> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read layout {}", path.display()))?;
    let name = path.file_stem().and_then(OsStr::to_str).unwrap_or("layout");
    Ok(Layout::parse(name, &text)?)
}

pub(crate) fn run_search<W>(
    args: &SearchArgs,
    config: &Config,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    let layout = load_layout(&args.layout)?;
    let grid = layout.grid();
    let start = layout.seeker();
    let goal = layout.search_goal();
    let algorithms = match (args.algorithm, config.search.algorithm) {
        (Some(choice), _) => choice.algorithms(),
        (None, Some(algorithm)) => vec![algorithm],
        (None, None) => SearchAlgorithm::ALL.to_vec(),
    };

    for algorithm in algorithms {
        let mut run = search(grid, start, goal, algorithm)
            .with_context(|| format!("cannot search layout {}", layout.name()))?;
        if args.frames {
            for snapshot in &mut run {
                let record = Record::SearchFrame {
                    algorithm,
                    snapshot: &snapshot,
                };
                emit(out, format, &record, || {
                    format!(
                        "-- {algorithm} expansion {} --\n{}",
                        snapshot.total_expansions(),
                        render::search_frame(grid, start, goal, &snapshot)
                    )
                })?;
            }
        }

        let snapshot = run.finish();
        info!(
            %algorithm,
            status = ?snapshot.status(),
            expansions = snapshot.total_expansions(),
            "search finished"
        );
        let record = Record::SearchSummary {
            layout: layout.name(),
            algorithm,
            status: snapshot.status(),
            path_length: snapshot.path_length(),
            expansions: snapshot.total_expansions(),
            path: snapshot.path(),
        };
        emit(out, format, &record, || {
            let length = snapshot
                .path_length()
                .map_or_else(|| "-".to_owned(), |length| length.to_string());
            format!(
                "{algorithm} on {}: {:?}, path length {length}, {} expanded\n{}",
                layout.name(),
                snapshot.status(),
                snapshot.total_expansions(),
                render::search_frame(grid, start, goal, &snapshot)
            )
        })?;
    }
    Ok(())
}

pub(crate) fn run_play<W>(
    args: &PlayArgs,
    config: &Config,
    seed: u64,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    let layout = load_layout(&args.layout)?;
    let grid = layout.grid();
    let procedure = args.procedure.unwrap_or(config.game.procedure);
    let depth = args.depth.unwrap_or(config.game.depth);
    let max_turns = args.max_turns.unwrap_or(config.game.max_turns);
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(config.game.delay_ms));

    let initial = layout.initial_state();
    emit(out, format, &Record::GameFrame { state: &initial }, || {
        render::game_frame(grid, &initial)
    })?;

    let agent = SeekerAgent::new(procedure, depth, config.weights.clone());
    let mut session = GameSession::new(
        grid,
        initial,
        agent,
        DirectionalPursuit::default(),
        ChaCha8Rng::seed_from_u64(seed),
    )
    .with_max_turns(max_turns);

    for state in &mut session {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        emit(out, format, &Record::GameFrame { state: &state }, || {
            render::game_frame(grid, &state)
        })?;
    }

    let last = session.state();
    info!(
        %procedure,
        depth,
        turns = last.turn(),
        score = last.score(),
        "game finished"
    );
    let record = Record::GameSummary {
        layout: layout.name(),
        procedure,
        depth,
        turns: last.turn(),
        score: last.score(),
        status: last.status(),
    };
    emit(out, format, &record, || {
        format!(
            "{procedure} (depth {depth}) on {}: {:?} after {} turns with score {}",
            layout.name(),
            last.status(),
            last.turn(),
            last.score()
        )
    })
}

pub(crate) fn run_track<W>(
    args: &TrackArgs,
    config: &Config,
    seed: u64,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    W: Write + ?Sized,
{
    let layout = load_layout(&args.layout)?;
    if layout.chasers().is_empty() {
        bail!("layout {} has no chasers to track", layout.name());
    }
    let grid = layout.grid();
    let inference = &config.inference;
    let steps = args.steps.unwrap_or(config.track.steps);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let sensor = NoisySensor::from_config(inference);
    let mut tracker = Tracker::new(args.filter, grid, layout.chasers().len(), inference, &mut rng)?;
    let mut seeker = layout.seeker();
    let mut chasers = layout.chasers().to_vec();

    for step in 0..steps {
        let readings: Vec<Option<u32>> = chasers
            .iter()
            .map(|chaser| sensor.read(seeker, Some(*chaser), &mut rng))
            .collect();
        tracker.observe(&readings, seeker, &mut rng);

        let beliefs = tracker.beliefs();
        let record = Record::TrackFrame {
            step,
            seeker,
            readings: &readings,
            chasers: &chasers,
            estimates: beliefs.iter().map(Belief::most_likely).collect(),
        };
        emit(out, format, &record, || {
            format!(
                "step {step} readings {}\n{}",
                describe_readings(&readings),
                render::belief_frame(grid, seeker, &chasers, &beliefs)
            )
        })?;

        for chaser in &mut chasers {
            if let Some(next) = transition_targets(grid, *chaser, inference.allow_stay).choose(&mut rng)
            {
                *chaser = *next;
            }
        }
        let moves: Vec<Move> = grid.legal_moves(seeker).collect();
        if let Some(walk) = moves.choose(&mut rng) {
            seeker = walk.destination();
        }
        tracker.elapse_time(&mut rng);
    }

    let errors = estimation_errors(&tracker.beliefs(), &chasers);
    info!(filter = ?args.filter, steps, ?errors, "tracking finished");
    let record = Record::TrackSummary {
        layout: layout.name(),
        filter: args.filter,
        steps,
        errors: &errors,
    };
    emit(out, format, &record, || {
        format!(
            "{:?} filter on {} after {steps} steps: estimate errors {}",
            args.filter,
            layout.name(),
            describe_readings(&errors)
        )
    })
}

/// Distance between each chaser and the most likely cell of its belief.
fn estimation_errors(beliefs: &[Belief], chasers: &[CellCoord]) -> Vec<Option<u32>> {
    beliefs
        .iter()
        .zip(chasers)
        .map(|(belief, chaser)| {
            belief
                .most_likely()
                .map(|estimate| estimate.manhattan_distance(*chaser))
        })
        .collect()
}

fn describe_readings(values: &[Option<u32>]) -> String {
    values
        .iter()
        .map(|value| value.map_or_else(|| "-".to_owned(), |value| value.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}
