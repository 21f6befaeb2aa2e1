use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use maze_explorer::agent::{Agent, RunOutcome};
use maze_explorer::environment::Maze;
use maze_explorer::replay;

const DEFAULT_MAZE_PATH: &str = "maze.txt";

struct Options {
    maze_path: PathBuf,
    delay_ms: u64,
    replay_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        maze_path: PathBuf::from(DEFAULT_MAZE_PATH),
        delay_ms: 100,
        replay_dir: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--delay-ms" => {
                let value = args.next().context("--delay-ms needs a value")?;
                options.delay_ms = value.parse().context("--delay-ms needs an integer")?;
            }
            "--replay" => {
                let dir = args.next().context("--replay needs a directory")?;
                options.replay_dir = Some(PathBuf::from(dir));
            }
            path => options.maze_path = PathBuf::from(path),
        }
    }
    Ok(options)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let options = parse_args()?;

    let source = match std::fs::read_to_string(&options.maze_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "error: could not read maze file '{}': {}",
                options.maze_path.display(),
                e
            );
            process::exit(1);
        }
    };

    let mut maze = Maze::parse(&source)?;
    println!(
        "Maze loaded: {}x{}, {} food",
        maze.width(),
        maze.height(),
        maze.total_food()
    );

    let mut agent = Agent::new(&maze);
    let delay = Duration::from_millis(options.delay_ms);
    let outcome = agent.run(&mut maze, None, |report| {
        // Clear the terminal between ticks; purely cosmetic.
        print!("\x1B[2J\x1B[1;1H");
        print!("{}", report.render);
        println!(
            "Position: ({}, {}) | Heading: {:?}",
            report.pos.x, report.pos.y, report.heading
        );
        println!(
            "Steps: {} | Food: {}/{}",
            report.steps, report.collected, report.total_food
        );
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    });

    match outcome {
        RunOutcome::Completed { score } => {
            println!();
            println!("--- Simulation finished ---");
            println!("Food collected: {}", agent.collected());
            println!("Steps taken:    {}", agent.steps());
            println!(
                "Final score:    ({} x 10) - {} = {}",
                agent.collected(),
                agent.steps(),
                score
            );
        }
        RunOutcome::TickLimit => unreachable!("unbounded run cannot hit a tick limit"),
    }

    if let Some(dir) = options.replay_dir {
        // Replay works from a fresh copy of the initial grid. Failure here
        // never touches the simulation result.
        let initial = Maze::parse(&source)?;
        if let Err(e) = replay::write_frames(&dir, &initial, agent.trajectory()).and_then(|_| {
            replay::export_trajectory_csv(dir.join("trajectory.csv"), agent.trajectory())
        }) {
            warn!("replay export failed: {}", e);
        } else {
            println!("Replay written to {}", dir.display());
        }
    }

    Ok(())
}
