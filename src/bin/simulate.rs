use clap::Parser;
use maze_chase_rust_core::constants::{STARTING_LIVES, TICK_RATE};
use maze_chase_rust_core::engine::Simulation;
use maze_chase_rust_core::maze::Maze;
use maze_chase_rust_core::rng::Rng;
use maze_chase_rust_core::types::{
    Cell, Direction, PursuerRole, PursuerSetup, SimEvent, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Ticks to simulate (20 ticks per simulated second).
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Comma-separated directions (up/down/left/right), applied one per
    /// simulated second instead of the random input policy.
    #[arg(long)]
    scripted: Option<String>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

/// The demo layout the headless driver runs on. The core never owns a
/// maze; this one belongs to the binary alone.
const DEMO_MAZE: [&str; 23] = [
    "#####################",
    "#o........#........o#",
    "#.###.###.#.###.###.#",
    "#...................#",
    "#.###.#.#######.###.#",
    "#.....#...#...#.....#",
    "#####.###.#.###.#####",
    "#####.#...#...#.#####",
    "#####.#.#####.#.#####",
    "#.....#.#   #.#.....#",
    "......#.#   #.#......",
    "#.....#.#   #.#.....#",
    "#.###.#.##.##.#.###.#",
    "#...................#",
    "#.###.###.#.###.###.#",
    "#o..#.....#.....#..o#",
    "###.#.#.#####.#.#.###",
    "#...#.#...#...#.#...#",
    "#.#####.#.#.#.#####.#",
    "#...................#",
    "#.#######.#.#######.#",
    "#...................#",
    "#####################",
];

const PLAYER_SPAWN: (f32, f32) = (10.0, 13.0);

fn demo_pursuers() -> Vec<PursuerSetup> {
    vec![
        PursuerSetup {
            x: 9.0,
            y: 10.0,
            dir: Direction::Up,
            role: PursuerRole::Leader,
            corner: Cell { x: 1, y: 1 },
        },
        PursuerSetup {
            x: 11.0,
            y: 10.0,
            dir: Direction::Down,
            role: PursuerRole::AmbusherA,
            corner: Cell { x: 1, y: 21 },
        },
        PursuerSetup {
            x: 9.0,
            y: 11.0,
            dir: Direction::Left,
            role: PursuerRole::AmbusherB,
            corner: Cell { x: 19, y: 1 },
        },
        PursuerSetup {
            x: 11.0,
            y: 11.0,
            dir: Direction::Right,
            role: PursuerRole::Opportunist,
            corner: Cell { x: 19, y: 21 },
        },
    ]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StopReason {
    TicksExhausted,
    OutOfLives,
    MazeCleared,
}

#[derive(Clone, Debug, Serialize)]
struct RunResult {
    seed: u32,
    #[serde(rename = "ticksRun")]
    ticks_run: u64,
    reason: StopReason,
    score: i32,
    lives: i32,
    #[serde(rename = "itemsLeft")]
    items_left: usize,
    deaths: i32,
    #[serde(rename = "pursuersCaught")]
    pursuers_caught: i32,
    #[serde(rename = "cellsConsumed")]
    cells_consumed: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    result: RunResult,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| now_ms()));
    let ticks = cli.ticks.unwrap_or(120 * TICK_RATE as u64);
    let started_at_ms = now_ms();
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, started_at_ms));
    let script = cli.scripted.as_deref().map(parse_script);

    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        json!({
            "seed": seed,
            "ticks": ticks,
            "scripted": script.is_some(),
        }),
    );

    let (result, anomaly_records) = run_simulation(seed, ticks, script, &run_id);

    for anomaly in &anomaly_records {
        emit_log(
            "warn",
            "anomaly_detected",
            &run_id,
            Some(anomaly.tick),
            json!({ "message": anomaly.message }),
        );
    }
    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(result.ticks_run),
        json!({
            "reason": result.reason,
            "score": result.score,
            "lives": result.lives,
            "anomalyCount": anomaly_records.len(),
        }),
    );

    println!(
        "{}",
        serde_json::to_string(&result).expect("run result should serialize")
    );

    let has_anomalies = !result.anomalies.is_empty();
    if let Some(path) = cli.summary_out.as_ref() {
        let summary = RunSummary {
            run_id: run_id.clone(),
            started_at_ms,
            finished_at_ms: now_ms(),
            anomaly_count: anomaly_records.len(),
            result,
            anomaly_records,
        };
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    }

    if has_anomalies {
        std::process::exit(1);
    }
}

fn run_simulation(
    seed: u32,
    ticks: u64,
    script: Option<Vec<Direction>>,
    run_id: &str,
) -> (RunResult, Vec<AnomalyRecord>) {
    let maze = Maze::parse(&DEMO_MAZE);
    let mut sim = Simulation::new(maze, PLAYER_SPAWN, demo_pursuers(), seed);
    let mut policy_rng = Rng::new(seed.wrapping_add(1));
    let mut next_input_at = 1u64;
    let mut deaths = 0;
    let mut pursuers_caught = 0;
    let mut cells_consumed = 0;
    let mut last_score = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut reason = StopReason::TicksExhausted;

    for _ in 0..ticks {
        let tick = sim.tick() + 1;
        if let Some(script) = script.as_ref() {
            let second = (tick / TICK_RATE as u64) as usize;
            if let Some(dir) = script.get(second.min(script.len().saturating_sub(1))) {
                sim.set_player_direction(*dir);
            }
        } else if tick >= next_input_at {
            let dir = Direction::ALL[policy_rng.pick_index(Direction::ALL.len())];
            sim.set_player_direction(dir);
            next_input_at = tick + policy_rng.int(10, 40) as u64;
        }

        sim.step();
        let snapshot = sim.build_snapshot(true);

        for event in &snapshot.events {
            match event {
                SimEvent::CellConsumed { .. } => cells_consumed += 1,
                SimEvent::PlayerDied { lives_left } => {
                    deaths += 1;
                    emit_log(
                        "info",
                        "player_died",
                        run_id,
                        Some(snapshot.tick),
                        json!({ "livesLeft": lives_left }),
                    );
                }
                SimEvent::PursuerCaught { role } => {
                    pursuers_caught += 1;
                    emit_log(
                        "info",
                        "pursuer_caught",
                        run_id,
                        Some(snapshot.tick),
                        json!({ "role": role }),
                    );
                }
                _ => {}
            }
        }

        for message in collect_snapshot_anomalies(&snapshot, last_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.player.score;

        if sim.lives() <= 0 {
            reason = StopReason::OutOfLives;
            break;
        }
        if snapshot.items_left == 0 {
            reason = StopReason::MazeCleared;
            break;
        }
    }

    let result = RunResult {
        seed,
        ticks_run: sim.tick(),
        reason,
        score: sim.score(),
        lives: sim.lives(),
        items_left: sim.maze().remaining_items(),
        deaths,
        pursuers_caught,
        cells_consumed,
        anomalies,
    };
    (result, anomaly_records)
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, last_score: i32) -> Vec<String> {
    let width = DEMO_MAZE[0].len() as f32;
    let height = DEMO_MAZE.len() as f32;
    let mut anomalies = Vec::new();

    if snapshot.player.score < last_score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            last_score, snapshot.player.score
        ));
    }
    if snapshot.player.lives < 0 || snapshot.player.lives > STARTING_LIVES {
        anomalies.push(format!("lives out of range: {}", snapshot.player.lives));
    }
    if !(0.0..width).contains(&snapshot.player.x) || !(0.0..height).contains(&snapshot.player.y) {
        anomalies.push(format!(
            "player outside the grid: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    for pursuer in &snapshot.pursuers {
        if !(0.0..width).contains(&pursuer.x) || !(0.0..height).contains(&pursuer.y) {
            anomalies.push(format!(
                "pursuer {:?} outside the grid: ({}, {})",
                pursuer.role, pursuer.x, pursuer.y
            ));
        }
        if pursuer.path.len() > (width * height) as usize {
            anomalies.push(format!("pursuer {:?} path too long", pursuer.role));
        }
    }
    anomalies
}

fn parse_script(raw: &str) -> Vec<Direction> {
    raw.split(',')
        .filter_map(|part| Direction::parse_move(part.trim()))
        .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn emit_log(level: &str, event: &str, run_id: &str, tick: Option<u64>, details: Value) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
