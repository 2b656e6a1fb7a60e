// scripts/benchmark.rs
use ndarray::Array1;
use payoff_algebra::math_utils::Timer;
use payoff_algebra::payoff::{
    AnnuityI, AnnuityTerms, CallA, CallVR, PutV, Stack, Time, UpAndOut, VariableStrike,
};
use payoff_algebra::{Payoff, PayoffResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal};
use rayon::prelude::*;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process::Command;

const MATURITY: f64 = 5.0;
const EVALUATIONS: usize = 200;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(target_os = "macos")]
        {
            Command::new("sysctl")
                .args(["-n", "machdep.cpu.brand_string"])
                .output()
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|_| "Unknown CPU".to_string())
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            "Unknown CPU".to_string()
        }
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    nodes: usize,
    time_ms: f64,
    throughput_nodes_per_sec: f64,
    checksum: f64,
}

/// Callable, puttable convertible with a knock-out on the conversion right.
fn convertible_tree() -> PayoffResult<Stack> {
    let bond = AnnuityI::new(AnnuityTerms {
        maturity: MATURITY,
        times: (1..=10).map(|i| 0.5 * i as f64).collect(),
        coupon: 2.0,
        nominal: 100.0,
        recovery: 0.4,
    })?;
    let conversion = UpAndOut::new(
        VariableStrike::new(CallA::new(MATURITY, 0.0)?, |t: f64| 2.0 * t),
        400.0,
    )?;
    let put = Time::new(PutV::new(MATURITY, 105.0)?, [3.0])?;
    let call = Time::new(CallVR::new(MATURITY, 115.0)?, [(2.0, MATURITY)])?;

    Stack::new(vec![
        Box::new(bond),
        Box::new(put),
        Box::new(conversion),
        Box::new(call),
    ])
}

fn spot_grid(seed: u64, nodes: usize) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = LogNormal::new(100f64.ln(), 0.4).expect("valid lognormal parameters");
    Array1::from_iter((0..nodes).map(|_| dist.sample(&mut rng)))
}

/// One sweep: terminal value, then transient/default at every coupon date.
fn sweep(payoff: &dyn Payoff, s: &Array1<f64>) -> f64 {
    let mut v = payoff.terminal_value(s.view());
    for i in (0..10).rev() {
        let t = 0.5 * i as f64;
        v = payoff.transient_value(t, v.view(), s.view());
        v = v + payoff.default_value(t, s.view()) * 1e-3;
    }
    v.sum()
}

fn run_sequential_benchmarks(payoff: &dyn Payoff) -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    for &nodes in &[1_000, 10_000, 100_000] {
        println!("Running sweeps over {} nodes...", nodes);
        let s = spot_grid(42, nodes);

        let mut timer = Timer::new();
        timer.start();
        let mut checksum = 0.0;
        for _ in 0..EVALUATIONS {
            checksum += sweep(payoff, &s);
        }
        let time_ms = timer.elapsed_ms();
        let total_nodes = nodes * EVALUATIONS;

        results.push(BenchmarkResult {
            name: format!("Convertible sweep ({}k nodes)", nodes / 1000),
            nodes: total_nodes,
            time_ms,
            throughput_nodes_per_sec: total_nodes as f64 / (time_ms / 1000.0),
            checksum: checksum / EVALUATIONS as f64,
        });
    }

    results
}

fn run_parallel_benchmark() -> PayoffResult<BenchmarkResult> {
    let scenarios = 256;
    let nodes = 10_000;
    println!("Running {} independent scenarios in parallel...", scenarios);

    let mut timer = Timer::new();
    timer.start();
    // payoffs are !Sync, so every worker composes its own tree
    let checksums = (0..scenarios)
        .into_par_iter()
        .map(|i| -> PayoffResult<f64> {
            let payoff = convertible_tree()?;
            Ok(sweep(&payoff, &spot_grid(i as u64, nodes)))
        })
        .collect::<PayoffResult<Vec<f64>>>()?;
    let time_ms = timer.elapsed_ms();
    let total_nodes = scenarios * nodes;

    Ok(BenchmarkResult {
        name: format!("Parallel scenarios ({} x {}k)", scenarios, nodes / 1000),
        nodes: total_nodes,
        time_ms,
        throughput_nodes_per_sec: total_nodes as f64 / (time_ms / 1000.0),
        checksum: checksums.iter().sum::<f64>() / scenarios as f64,
    })
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(file, "Benchmark,Nodes,Time_ms,Throughput_nodes_per_sec,Checksum")?;
    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{:.6}",
            result.name,
            result.nodes,
            result.time_ms,
            result.throughput_nodes_per_sec,
            result.checksum
        )?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("payoff-algebra Benchmark Suite");
    println!("==============================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let payoff = convertible_tree()?;
    let mut results = run_sequential_benchmarks(&payoff);
    results.push(run_parallel_benchmark()?);

    println!("\n{:=<80}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<80}", "");
    println!(
        "{:<36} {:>10} {:>12} {:>15}",
        "Benchmark", "Nodes", "Time (ms)", "Nodes/sec"
    );
    println!("{:-<80}", "");
    for result in &results {
        println!(
            "{:<36} {:>10} {:>12.2} {:>15.0}",
            result.name, result.nodes, result.time_ms, result.throughput_nodes_per_sec
        );
    }
    println!("{:=<80}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&results, &system_info, &filename)?;
    println!("\nResults saved to: {}", filename);

    Ok(())
}
