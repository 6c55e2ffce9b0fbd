//! Plain-text reporting on finished simulation results.

use crate::stats::{PopulationStats, SimulationStats};
use std::fmt::Write;

// Column widths for the summary table.
const LABEL_WIDTH: usize = 13;
const CELL_WIDTH: usize = 10;

/// Format the end-of-run summary table.
///
/// Reports individual totals, the smallest/largest/average per-step
/// population, and deaths by cause, for each species and aggregated.
pub fn summary_table(stats: &SimulationStats) -> String {
    let mut out = String::new();

    let divider = format!(
        "{}+{}+{}+{}+",
        "-".repeat(LABEL_WIDTH),
        "-".repeat(CELL_WIDTH),
        "-".repeat(CELL_WIDTH),
        "-".repeat(CELL_WIDTH),
    );

    writeln!(
        out,
        "{:<label$}|{:>cell$}|{:>cell$}|{:>cell$}|",
        "",
        "foxes",
        "rabbits",
        "total",
        label = LABEL_WIDTH,
        cell = CELL_WIDTH,
    )
    .unwrap();
    writeln!(out, "{divider}").unwrap();

    row(
        &mut out,
        "individuals",
        stats.foxes.total as f64,
        stats.rabbits.total as f64,
        false,
    );
    row(
        &mut out,
        " min",
        min_size(&stats.foxes) as f64,
        min_size(&stats.rabbits) as f64,
        false,
    );
    row(
        &mut out,
        " max",
        max_size(&stats.foxes) as f64,
        max_size(&stats.rabbits) as f64,
        false,
    );
    row(
        &mut out,
        " avg",
        avg_size(&stats.foxes),
        avg_size(&stats.rabbits),
        true,
    );
    writeln!(out, "{divider}").unwrap();

    row(
        &mut out,
        "deaths",
        total_deaths(&stats.foxes) as f64,
        total_deaths(&stats.rabbits) as f64,
        false,
    );
    row(
        &mut out,
        " old age",
        stats.foxes.dead_by_old_age as f64,
        stats.rabbits.dead_by_old_age as f64,
        false,
    );
    row(
        &mut out,
        " starvation",
        stats.foxes.dead_by_starvation as f64,
        stats.rabbits.dead_by_starvation as f64,
        false,
    );
    row(
        &mut out,
        " predation",
        stats.foxes.dead_by_predation as f64,
        stats.rabbits.dead_by_predation as f64,
        false,
    );
    writeln!(out, "{divider}").unwrap();

    out
}

fn row(out: &mut String, label: &str, foxes: f64, rabbits: f64, fractional: bool) {
    let cell = |value: f64| {
        if fractional {
            format!("{value:.2}")
        } else {
            format!("{value:.0}")
        }
    };
    writeln!(
        out,
        "{:<label_w$}|{:>cell_w$}|{:>cell_w$}|{:>cell_w$}|",
        label,
        cell(foxes),
        cell(rabbits),
        cell(foxes + rabbits),
        label_w = LABEL_WIDTH,
        cell_w = CELL_WIDTH,
    )
    .unwrap();
}

fn min_size(stats: &PopulationStats) -> usize {
    stats.size_per_step.iter().copied().min().unwrap_or(0)
}

fn max_size(stats: &PopulationStats) -> usize {
    stats.size_per_step.iter().copied().max().unwrap_or(0)
}

fn avg_size(stats: &PopulationStats) -> f64 {
    if stats.size_per_step.is_empty() {
        return 0.0;
    }
    stats.size_per_step.iter().sum::<usize>() as f64 / stats.size_per_step.len() as f64
}

fn total_deaths(stats: &PopulationStats) -> u64 {
    stats.dead_by_old_age + stats.dead_by_starvation + stats.dead_by_predation
}
