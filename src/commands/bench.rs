use ouroboros::{BenchStats, EndReason, Mode, SessionReport, simulate, summarize};
use serde_json::json;
use tracing::info;

use super::GridArgs;

pub(super) fn run_bench(
    grid: &GridArgs,
    runs: u64,
    seed_start: u64,
    max_ticks: u64,
    verbose: bool,
    json: bool,
) -> Result<(), String> {
    if runs == 0 {
        return Err("bench needs at least one run".to_string());
    }

    let mut reports = Vec::with_capacity(runs as usize);
    for i in 0..runs {
        let seed = seed_start.wrapping_add(i);
        let report = simulate(grid.config(Mode::Autonomous, Some(seed)), Some(max_ticks))
            .map_err(|e| e.to_string())?;
        if verbose && !json {
            println!("{}", describe_run(&report));
        }
        reports.push(report);
    }

    let stats = summarize(&reports);
    info!(
        runs = stats.runs,
        mean_score = stats.mean_score(),
        max_score = stats.max_score,
        "bench finished"
    );

    if json {
        let runs = if verbose { json!(reports) } else { json!(null) };
        let out = json!({
            "stats": stats,
            "mean_score": stats.mean_score(),
            "mean_ticks": stats.mean_ticks(),
            "runs": runs,
        });
        let out = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        println!("{}", out);
        return Ok(());
    }

    print_summary(grid, &stats);
    Ok(())
}

fn describe_run(report: &SessionReport) -> String {
    let end = report.end.map_or("tick limit", EndReason::label);
    format!(
        "seed {:>4}: score={:<4} length={:<4} ticks={:<7} end={}",
        report.seed.unwrap_or_default(),
        report.score,
        report.length,
        report.ticks,
        end
    )
}

fn print_summary(grid: &GridArgs, stats: &BenchStats) {
    println!(
        "{} runs on {}x{} with strategy={}",
        stats.runs, grid.width, grid.height, grid.strategy
    );
    println!(
        "score: mean={:.2} min={} max={} | ticks: mean={:.1}",
        stats.mean_score(),
        stats.min_score,
        stats.max_score,
        stats.mean_ticks()
    );
    println!(
        "endings: collision={} grid_full={} tick_limit={}",
        stats.collisions, stats.grid_full, stats.unfinished
    );
}
