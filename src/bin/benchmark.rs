use std::path::PathBuf;
use std::time::Instant;

use jsx_lint::workspace::Workspace;
use jsx_lint::Linter;

fn main() {
    let project_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ".".to_string());

    println!("==================================================");
    println!("JSX LINT - BENCHMARK");
    println!("==================================================");
    println!();
    println!("Project: {}", project_path);
    println!();

    // Benchmark 1: Workspace initialization
    println!("--- WORKSPACE INITIALIZATION ---");
    let start = Instant::now();
    let mut workspace = Workspace::new(PathBuf::from(&project_path), Linter::default());
    workspace.initialize().expect("Failed to initialize workspace");
    let init_time = start.elapsed();
    println!(
        "  Linted {} files in {:?} ({} reports)",
        workspace.files.len(),
        init_time,
        workspace.report_count()
    );
    println!();

    // Benchmark 2: Re-lint the largest file
    let Some(largest) = workspace.files.iter().max_by_key(|f| f.text.len()) else {
        println!("No JSX files found");
        return;
    };
    println!("--- LINT LARGEST FILE ({:?}, {} bytes) ---", largest.path, largest.text.len());
    let linter = Linter::default();
    let runs = 5;
    let mut times = Vec::new();
    for i in 1..=runs {
        let start = Instant::now();
        let reports = linter.lint_source(&largest.text, largest.dialect);
        let elapsed = start.elapsed();
        times.push(elapsed);
        let count = reports.map(|r| r.len()).unwrap_or(0);
        println!("  Run {}: {:?} ({} reports)", i, elapsed, count);
    }
    let avg: u128 = times.iter().map(|t| t.as_micros()).sum::<u128>() / runs as u128;
    println!("  Average: {}μs", avg);
    println!();

    // Benchmark 3: Fix the largest file
    println!("--- FIX LARGEST FILE ---");
    times.clear();
    for i in 1..=runs {
        let start = Instant::now();
        let outcome = linter.fix_source(&largest.text, largest.dialect);
        let elapsed = start.elapsed();
        times.push(elapsed);
        let passes = outcome.map(|o| o.passes).unwrap_or(0);
        println!("  Run {}: {:?} ({} passes)", i, elapsed, passes);
    }
    let avg: u128 = times.iter().map(|t| t.as_micros()).sum::<u128>() / runs as u128;
    println!("  Average: {}μs", avg);
    println!();

    println!("==================================================");
    println!("SUMMARY");
    println!("==================================================");
    println!("  Initialization: {:?} ({} files)", init_time, workspace.files.len());
    println!();
}
