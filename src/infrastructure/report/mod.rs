//! Console report rendering
//!
//! Each TestRun is rendered as one atomic block: banner, one line per
//! check, then a summary with per-status counts and the overall verdict.
//! Discover mode appends a combined block across all runs.

use crate::domain::entities::{RunStatus, TestResult, TestRun, TestStatus};

pub mod color {
    pub const GREEN: &str = "\x1b[92m";
    pub const RED: &str = "\x1b[91m";
    pub const YELLOW: &str = "\x1b[93m";
    pub const BLUE: &str = "\x1b[94m";
    pub const CYAN: &str = "\x1b[96m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

const RULE_WIDTH: usize = 60;

fn status_color(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Pass => color::GREEN,
        TestStatus::Fail => color::RED,
        TestStatus::Warn | TestStatus::Skip => color::YELLOW,
    }
}

pub fn print_header(text: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}{}{}{}", color::BOLD, color::CYAN, rule, color::RESET);
    println!("{}{}{}{}", color::BOLD, color::CYAN, text, color::RESET);
    println!("{}{}{}{}\n", color::BOLD, color::CYAN, rule, color::RESET);
}

pub fn print_result(result: &TestResult) {
    println!(
        "{}{}{} {} {}({:.2}s){}",
        status_color(result.status),
        result.status.glyph(),
        color::RESET,
        result.name,
        color::CYAN,
        result.duration.as_secs_f64(),
        color::RESET,
    );

    if !result.message.is_empty() {
        println!("   {}", result.message);
    }

    if let Some(payload) = &result.payload {
        println!("   {}Details:{}", color::BLUE, color::RESET);
        let rendered =
            serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        for line in rendered.lines() {
            println!("   {}", line);
        }
    }
}

pub fn print_summary(run: &TestRun) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{}{}{}", color::BOLD, rule, color::RESET);

    let counts = run.counts();
    println!("{}Test Summary:{}", color::BOLD, color::RESET);
    println!(
        "  Total: {} checks in {:.2}s",
        run.results.len(),
        run.total_duration().as_secs_f64()
    );
    println!("  {}✅ Passed: {}{}", color::GREEN, counts.passed, color::RESET);
    if counts.failed > 0 {
        println!("  {}❌ Failed: {}{}", color::RED, counts.failed, color::RESET);
    }
    if counts.warned > 0 {
        println!("  {}⚠️  Warned: {}{}", color::YELLOW, counts.warned, color::RESET);
    }
    if counts.skipped > 0 {
        println!("  {}⏭️  Skipped: {}{}", color::YELLOW, counts.skipped, color::RESET);
    }

    println!(
        "\n{}Overall Status: {}{}",
        color::BOLD,
        verdict(run.overall()),
        color::RESET
    );
    println!("{}{}{}\n", color::BOLD, rule, color::RESET);
}

pub fn print_combined_summary(runs: &[TestRun]) {
    let rule = "=".repeat(RULE_WIDTH);
    println!("{}{}{}", color::BOLD, rule, color::RESET);
    println!("{}Combined Summary:{}", color::BOLD, color::RESET);

    let mut passed = 0;
    for run in runs {
        let overall = run.overall();
        if overall == RunStatus::Passed {
            passed += 1;
        }
        println!("  {} {}{}", run.url, verdict(overall), color::RESET);
    }

    println!(
        "\n{}{}/{} agents passed{}",
        color::BOLD,
        passed,
        runs.len(),
        color::RESET
    );
    println!("{}{}{}\n", color::BOLD, rule, color::RESET);
}

fn verdict(status: RunStatus) -> String {
    match status {
        RunStatus::Passed => format!("{}PASSED", color::GREEN),
        RunStatus::Failed => format!("{}FAILED", color::RED),
    }
}
