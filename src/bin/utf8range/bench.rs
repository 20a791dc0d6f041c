//! Kernel benchmarking.
//!
//! Times every requested kernel on each corpus and reports the median
//! throughput, alongside `std::str::from_utf8` as a baseline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use utf8range::{range, Kernel};

use crate::generators::{self, Utf8Pattern};

/// Name recorded for the `std::str::from_utf8` baseline.
const STD_BASELINE: &str = "std";

/// Benchmark result for a single kernel on a single corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub pattern: String,
    pub size: String,
    pub filesize: u64,
    pub kernel: String,
    pub valid: bool,
    pub wall_time_ms: f64,
    pub throughput_mib_s: f64,
}

/// Configuration for the benchmark
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Read corpora from `<data_dir>/<pattern>/<size>.txt`; generate when `None`.
    pub data_dir: Option<PathBuf>,
    pub patterns: Vec<Utf8Pattern>,
    /// Size labels with their byte counts.
    pub sizes: Vec<(String, usize)>,
    pub kernels: Vec<Kernel>,
    pub warmup_runs: usize,
    pub benchmark_runs: usize,
}

/// Run the benchmark suite
pub fn run_benchmark(
    config: &BenchConfig,
    output_jsonl: Option<&Path>,
    output_md: Option<&Path>,
) -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupted! Writing partial results...");
    })
    .context("Failed to set Ctrl+C handler")?;

    eprintln!("Running UTF-8 validation benchmark...");
    eprintln!("  Selected kernel: {}", range::selected_kernel());
    eprintln!(
        "  Kernels: {}",
        config
            .kernels
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match &config.data_dir {
        Some(dir) => eprintln!("  Data directory: {}", dir.display()),
        None => eprintln!("  Data: generated (seed 0)"),
    }
    eprintln!("  Warmup runs: {}", config.warmup_runs);
    eprintln!("  Benchmark runs: {}", config.benchmark_runs);
    eprintln!();

    let mut jsonl_file = output_jsonl
        .map(|p| {
            std::fs::File::create(p).with_context(|| format!("Failed to create {}", p.display()))
        })
        .transpose()?;

    'outer: for &pattern in &config.patterns {
        for (label, bytes) in &config.sizes {
            if interrupted.load(Ordering::SeqCst) {
                break 'outer;
            }

            let data = match load_corpus(config, pattern, label, *bytes)? {
                Some(data) => data,
                None => continue,
            };

            eprintln!(
                "  {} {} ({})",
                pattern.name(),
                label,
                format_bytes(data.len())
            );

            let mut runners: Vec<(&str, Box<dyn Fn(&[u8]) -> bool>)> = config
                .kernels
                .iter()
                .map(|&kernel| {
                    let run: Box<dyn Fn(&[u8]) -> bool> =
                        Box::new(move |d: &[u8]| {
                            range::is_valid_with(kernel, d).unwrap_or(false)
                        });
                    (kernel.name(), run)
                })
                .collect();
            runners.push((
                STD_BASELINE,
                Box::new(|d: &[u8]| std::str::from_utf8(d).is_ok()),
            ));

            for (name, run) in &runners {
                if interrupted.load(Ordering::SeqCst) {
                    break 'outer;
                }
                eprint!("    {:<10} ", name);
                std::io::stderr().flush()?;

                let (valid, median) = time_runs(&data, config, run.as_ref());
                let result = BenchmarkResult {
                    pattern: pattern.name().to_string(),
                    size: label.clone(),
                    filesize: data.len() as u64,
                    kernel: name.to_string(),
                    valid,
                    wall_time_ms: median * 1000.0,
                    throughput_mib_s: throughput_mib_s(data.len(), median),
                };

                eprintln!(
                    "{:>10.3}ms {:>10.1} MiB/s{}",
                    result.wall_time_ms,
                    result.throughput_mib_s,
                    if result.valid { "" } else { " [INVALID]" }
                );

                if let Some(ref mut f) = jsonl_file {
                    serde_json::to_writer(&mut *f, &result)?;
                    writeln!(f)?;
                    f.flush()?;
                }

                results.push(result);
            }
        }
    }

    if let Some(md_path) = output_md {
        std::fs::write(md_path, markdown_summary(&results))
            .with_context(|| format!("Failed to write {}", md_path.display()))?;
    }

    eprintln!();
    eprintln!("Completed {} benchmarks", results.len());

    Ok(results)
}

/// Read the corpus from disk, or generate it. Returns `None` when a file is
/// missing.
fn load_corpus(
    config: &BenchConfig,
    pattern: Utf8Pattern,
    label: &str,
    bytes: usize,
) -> Result<Option<Vec<u8>>> {
    let Some(dir) = &config.data_dir else {
        return Ok(Some(generators::generate_utf8(bytes, pattern, Some(0))));
    };

    let path = dir.join(pattern.name()).join(format!("{}.txt", label));
    if !path.exists() {
        eprintln!("  Skipping {} (not found)", path.display());
        return Ok(None);
    }
    std::fs::read(&path)
        .map(Some)
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Run warmups then timed runs; returns the verdict and the median seconds.
fn time_runs(data: &[u8], config: &BenchConfig, run: &dyn Fn(&[u8]) -> bool) -> (bool, f64) {
    for _ in 0..config.warmup_runs {
        std::hint::black_box(run(std::hint::black_box(data)));
    }

    let mut times = Vec::with_capacity(config.benchmark_runs);
    let mut valid = false;
    for _ in 0..config.benchmark_runs.max(1) {
        let start = Instant::now();
        valid = run(std::hint::black_box(data));
        times.push(start.elapsed().as_secs_f64());
    }
    times.sort_by(|a, b| a.total_cmp(b));
    (valid, times[times.len() / 2])
}

fn throughput_mib_s(bytes: usize, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    (bytes as f64 / (1024.0 * 1024.0)) / seconds
}

/// Markdown summary: one table per pattern, one column per kernel.
fn markdown_summary(results: &[BenchmarkResult]) -> String {
    let mut md = String::new();

    md.push_str("# UTF-8 Validation Benchmark Results\n\n");
    md.push_str("Median throughput in MiB/s per kernel. `std` is `std::str::from_utf8`.\n\n");

    let mut kernels: Vec<&str> = Vec::new();
    let mut patterns: Vec<&str> = Vec::new();
    for r in results {
        if !kernels.contains(&r.kernel.as_str()) {
            kernels.push(&r.kernel);
        }
        if !patterns.contains(&r.pattern.as_str()) {
            patterns.push(&r.pattern);
        }
    }

    for pattern in patterns {
        md.push_str(&format!("## {}\n\n", pattern));
        md.push_str("| Size |");
        for k in &kernels {
            md.push_str(&format!(" {} |", k));
        }
        md.push_str("\n|------|");
        for _ in &kernels {
            md.push_str("------|");
        }
        md.push('\n');

        let mut sizes: Vec<&str> = Vec::new();
        for r in results.iter().filter(|r| r.pattern == pattern) {
            if !sizes.contains(&r.size.as_str()) {
                sizes.push(&r.size);
            }
        }

        for size in sizes {
            md.push_str(&format!("| {} |", size));
            for k in &kernels {
                let cell = results
                    .iter()
                    .find(|r| r.pattern == pattern && r.size == size && r.kernel == *k)
                    .map(|r| format!(" {:.1} |", r.throughput_mib_s))
                    .unwrap_or_else(|| " - |".to_string());
                md.push_str(&cell);
            }
            md.push('\n');
        }
        md.push('\n');
    }

    md
}

/// Format bytes as human-readable string
fn format_bytes(bytes: usize) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(pattern: &str, size: &str, kernel: &str, mib: f64) -> BenchmarkResult {
        BenchmarkResult {
            pattern: pattern.into(),
            size: size.into(),
            filesize: 1024,
            kernel: kernel.into(),
            valid: true,
            wall_time_ms: 1.0,
            throughput_mib_s: mib,
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_throughput() {
        assert_eq!(throughput_mib_s(1024 * 1024, 0.5), 2.0);
        assert_eq!(throughput_mib_s(100, 0.0), 0.0);
    }

    #[test]
    fn test_time_runs_reports_verdict() {
        let config = BenchConfig {
            data_dir: None,
            patterns: vec![],
            sizes: vec![],
            kernels: vec![Kernel::Naive],
            warmup_runs: 1,
            benchmark_runs: 3,
        };
        let run = |d: &[u8]| range::is_valid_with(Kernel::Naive, d).unwrap_or(false);
        assert!(time_runs("héllo".as_bytes(), &config, &run).0);
        assert!(!time_runs(&[0xFF], &config, &run).0);
    }

    #[test]
    fn test_load_corpus_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("cjk")).unwrap();
        std::fs::write(dir.path().join("cjk").join("1kb.txt"), "漢字").unwrap();

        let config = BenchConfig {
            data_dir: Some(dir.path().to_path_buf()),
            patterns: vec![Utf8Pattern::Cjk],
            sizes: vec![("1kb".into(), 1024)],
            kernels: vec![],
            warmup_runs: 0,
            benchmark_runs: 1,
        };
        let data = load_corpus(&config, Utf8Pattern::Cjk, "1kb", 1024).unwrap();
        assert_eq!(data.as_deref(), Some("漢字".as_bytes()));
        assert!(load_corpus(&config, Utf8Pattern::Emoji, "1kb", 1024)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_markdown_summary_columns() {
        let results = vec![
            result("ascii", "1kb", "naive", 100.0),
            result("ascii", "1kb", "avx2", 900.0),
            result("ascii", "1mb", "naive", 120.0),
            result("cjk", "1kb", "naive", 50.0),
        ];
        let md = markdown_summary(&results);
        assert!(md.contains("## ascii\n\n| Size | naive | avx2 |\n|------|------|------|\n"));
        assert!(md.contains("| 1kb | 100.0 | 900.0 |\n"));
        assert!(md.contains("| 1mb | 120.0 | - |\n"));
        assert!(md.contains("## cjk"));
    }

    #[test]
    fn test_result_jsonl_shape() {
        let json = serde_json::to_string(&result("emoji", "64kb", "sse41", 1.5)).unwrap();
        assert_eq!(
            json,
            r#"{"pattern":"emoji","size":"64kb","filesize":1024,"kernel":"sse41","valid":true,"wall_time_ms":1.0,"throughput_mib_s":1.5}"#
        );
    }
}
