use idastar::nav::config::{SearchConfig, DEFAULT_CONFIG_PATH};
use idastar::nav::map::{load_map, load_text_map, GridMap};
use idastar::nav::pathfinding::{Cell, IdaStar, SearchOutcome};
use idastar::nav::structures::Grid;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::error::Error;
use std::fs;
use std::path::Path;

const USAGE: &str = "usage: idastar [MAP] [START_ROW START_COL GOAL_ROW GOAL_COL]";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("idastar=info"))
}

fn setup_file_logging(log_dir: &Path) -> std::io::Result<String> {
    // Create logs directory if it doesn't exist
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(log_dir, 25);

    // Generate timestamped filename
    let now = chrono::Local::now();
    let log_filename = format!("idastar_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        log_dir,
        &log_filename
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false); // No ANSI colors in file

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    tracing_subscriber::registry()
        .with(log_filter())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

/// Stdout-only subscriber for when the log file cannot be opened.
fn setup_stdout_logging() {
    let _ = tracing_subscriber::registry()
        .with(log_filter())
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .try_init();
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("idastar") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Sort by modified time (oldest first)
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

// ============================================================================
// Demonstration grids
// ============================================================================

struct Demo {
    name: &'static str,
    grid: &'static str,
    start: Cell,
    goal: Cell,
    expect_path: bool,
}

const DEMOS: &[Demo] = &[
    Demo {
        name: "Clear route along the edge",
        grid: ".....\n##.#.\n...#.\n.###.\n.....",
        start: Cell::new(0, 0),
        goal: Cell::new(4, 4),
        expect_path: true,
    },
    Demo {
        name: "Path around obstacles",
        grid: ".....\n##.#.\n...#.\n.###.\n.....",
        start: Cell::new(0, 0),
        goal: Cell::new(1, 2),
        expect_path: true,
    },
    Demo {
        name: "Goal inside a wall",
        grid: ".....\n##.#.\n...#.\n.###.\n.....",
        start: Cell::new(0, 0),
        goal: Cell::new(3, 1),
        expect_path: false,
    },
    Demo {
        name: "Reverse route",
        grid: ".....\n##.#.\n...#.\n.###.\n.....",
        start: Cell::new(4, 4),
        goal: Cell::new(0, 0),
        expect_path: true,
    },
    Demo {
        name: "Maze",
        grid: ".#.....\n.#.###.\n.....#.\n####.#.\n.......\n.#####.\n.......",
        start: Cell::new(0, 0),
        goal: Cell::new(6, 6),
        expect_path: true,
    },
    Demo {
        name: "Sealed barrier",
        grid: ".....\n#####\n...#.\n.###.\n.....",
        start: Cell::new(0, 0),
        goal: Cell::new(4, 4),
        expect_path: false,
    },
];

fn run_demonstrations(search: &IdaStar) -> Result<(), Box<dyn Error>> {
    let mut failures = 0;
    for (i, demo) in DEMOS.iter().enumerate() {
        let grid: Grid = demo.grid.parse()?;
        let report = search.search(&grid, demo.start, demo.goal)?;
        let ok = report.path_exists() == demo.expect_path;
        if !ok {
            failures += 1;
        }

        println!("\nDemo {}: {}", i + 1, demo.name);
        println!("  Start: {}, Goal: {}", demo.start, demo.goal);
        match &report.outcome {
            SearchOutcome::Found(path) => println!("  Result: PATH FOUND (cost {}, {} moves)", path.cost, path.len()),
            SearchOutcome::NoPath => println!("  Result: NO PATH"),
        }
        println!("  Expected: {}", if demo.expect_path { "PATH FOUND" } else { "NO PATH" });
        println!("  Passes: {}, nodes expanded: {}", report.stats.iterations, report.stats.nodes_expanded);
        println!("  Status: {}", if ok { "PASS" } else { "FAIL" });
    }

    if failures > 0 {
        return Err(format!("{} demonstration(s) did not match expectations", failures).into());
    }
    Ok(())
}

fn parse_cells(args: &[String]) -> Result<(Cell, Cell), Box<dyn Error>> {
    let values = args
        .iter()
        .map(|a| a.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        &[sr, sc, gr, gc] => Ok((Cell::new(sr, sc), Cell::new(gr, gc))),
        _ => Err(USAGE.into()),
    }
}

fn run_map(search: &IdaStar, args: &[String]) -> Result<(), Box<dyn Error>> {
    let map_path = Path::new(&args[0]);
    let map: GridMap = if map_path.extension().is_some_and(|ext| ext == "map") {
        load_map(map_path)?
    } else {
        load_text_map(map_path)?
    };
    info!("Loaded {}x{} grid from {}", map.grid.width(), map.grid.height(), map_path.display());

    let (start, goal) = if args.len() > 1 {
        parse_cells(&args[1..])?
    } else {
        match (map.start, map.goal) {
            (Some(start), Some(goal)) => (start, goal),
            _ => return Err(format!("{} has no S/G markers\n{}", map_path.display(), USAGE).into()),
        }
    };

    let report = search.search(&map.grid, start, goal)?;
    match &report.outcome {
        SearchOutcome::Found(path) => {
            println!("Path from {} to {}: cost {}, {} moves", start, goal, path.cost, path.len());
            let cells: Vec<String> = path.cells.iter().map(|c| c.to_string()).collect();
            println!("{}", cells.join(" -> "));
        }
        SearchOutcome::NoPath => println!("No path from {} to {}", start, goal),
    }
    let thresholds: Vec<String> = report.stats.thresholds.iter().map(|t| t.to_string()).collect();
    println!(
        "Passes: {} (thresholds {}), nodes expanded: {}, time: {:?}",
        report.stats.iterations,
        thresholds.join(", "),
        report.stats.nodes_expanded,
        report.stats.elapsed
    );
    Ok(())
}

fn main() {
    match setup_file_logging(Path::new("logs")) {
        Ok(log_file) => {
            println!("╔══════════════════════════════════════════════════════════╗");
            println!("║  IDA* grid search - Logging to file                      ║");
            println!("╠══════════════════════════════════════════════════════════╣");
            println!("║  Log file: {:<45} ║", log_file);
            println!("╚══════════════════════════════════════════════════════════╝");
        }
        Err(e) => {
            // Without a file layer nothing else is installed; keep errors visible on stdout
            setup_stdout_logging();
            eprintln!("File logging disabled: {}", e);
        }
    }

    let config = SearchConfig::load(DEFAULT_CONFIG_PATH);
    let search = IdaStar::new(config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None => run_demonstrations(&search),
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(_) => run_map(&search, &args),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
