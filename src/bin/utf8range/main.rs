//! utf8range CLI tool for validating UTF-8 and comparing validation kernels.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use utf8range::{range, Kernel};

mod bench;
mod generators;
mod validate;

#[derive(Debug, Parser)]
#[command(name = "utf8range")]
#[command(about = "UTF-8 validation with the range algorithm", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate files (or stdin) as UTF-8
    Validate(validate::ValidateArgs),
    /// Generate synthetic UTF-8 corpora for benchmarking and testing
    Generate(GenerateArgs),
    /// List validation kernels and their availability on this CPU
    Kernels,
    /// Benchmark validation kernels
    Bench(BenchArgs),
}

/// Kernel selection on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum KernelArg {
    /// Best kernel for this CPU
    #[default]
    Auto,
    /// Byte-by-byte reference validator
    Naive,
    /// Range algorithm without intrinsics
    Portable,
    /// Range algorithm with SSE4.1
    Sse41,
    /// Range algorithm with AVX2
    Avx2,
    /// Range algorithm with NEON
    Neon,
}

impl KernelArg {
    /// The pinned kernel, or `None` for automatic selection.
    pub fn kernel(self) -> Option<Kernel> {
        match self {
            KernelArg::Auto => None,
            KernelArg::Naive => Some(Kernel::Naive),
            KernelArg::Portable => Some(Kernel::Portable),
            KernelArg::Sse41 => Some(Kernel::Sse41),
            KernelArg::Avx2 => Some(Kernel::Avx2),
            KernelArg::Neon => Some(Kernel::Neon),
        }
    }
}

/// Generate synthetic UTF-8 text for benchmarking and testing
#[derive(Debug, Parser)]
struct GenerateArgs {
    /// Size of text to generate (supports b, kb, mb, gb - case insensitive)
    /// Examples: 1024, 1kb, 512MB, 2Gb
    #[arg(value_parser = parse_size)]
    size: usize,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Text pattern to generate
    #[arg(short, long, default_value = "mixed")]
    pattern: PatternArg,

    /// Random seed for reproducible generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Inject this many invalid sequences
    #[arg(long, default_value = "0")]
    corrupt: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PatternArg {
    /// Pure ASCII prose
    Ascii,
    /// Latin accented words (2-byte sequences)
    Latin,
    /// Greek and Cyrillic words (2-byte sequences)
    GreekCyrillic,
    /// Chinese, Japanese and Korean text (3-byte sequences)
    Cjk,
    /// Emoji (4-byte sequences)
    Emoji,
    /// Mostly ASCII prose with occasional non-ASCII words (default)
    Mixed,
    /// Uniform mix of 1- to 4-byte sequences
    AllLengths,
    /// Edge code points straddling 16- and 32-byte block boundaries
    Boundary,
    /// Maximum multi-byte density, no whitespace
    Pathological,
}

impl From<PatternArg> for generators::Utf8Pattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Ascii => generators::Utf8Pattern::Ascii,
            PatternArg::Latin => generators::Utf8Pattern::Latin,
            PatternArg::GreekCyrillic => generators::Utf8Pattern::GreekCyrillic,
            PatternArg::Cjk => generators::Utf8Pattern::Cjk,
            PatternArg::Emoji => generators::Utf8Pattern::Emoji,
            PatternArg::Mixed => generators::Utf8Pattern::Mixed,
            PatternArg::AllLengths => generators::Utf8Pattern::AllLengths,
            PatternArg::Boundary => generators::Utf8Pattern::Boundary,
            PatternArg::Pathological => generators::Utf8Pattern::Pathological,
        }
    }
}

/// Benchmark validation kernels on generated or on-disk corpora
#[derive(Debug, Parser)]
struct BenchArgs {
    /// Read corpora from `<DIR>/<pattern>/<size>.txt` instead of generating them
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Corpus sizes to benchmark
    #[arg(long, value_delimiter = ',', default_value = "1kb,64kb,1mb")]
    sizes: Vec<String>,

    /// Patterns to benchmark (defaults to all)
    #[arg(short, long, value_delimiter = ',')]
    patterns: Vec<PatternArg>,

    /// Timed runs per kernel (the median is reported)
    #[arg(long, default_value = "5")]
    runs: usize,

    /// Warmup runs per kernel
    #[arg(long, default_value = "1")]
    warmup: usize,

    /// Only benchmark this kernel (defaults to every available kernel)
    #[arg(short, long, default_value = "auto")]
    kernel: KernelArg,

    /// Stream results to this JSONL file
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Write a markdown summary to this file
    #[arg(long)]
    markdown: Option<PathBuf>,
}

/// Parse size string like "1mb", "512KB", "2GB", "1024" (case insensitive)
fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim().to_lowercase();

    if let Ok(bytes) = s.parse::<usize>() {
        return Ok(bytes);
    }

    let (num_str, unit) = if let Some(n) = s.strip_suffix("gb") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("mb") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("kb") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('b') {
        (n, 1)
    } else {
        return Err(format!(
            "Invalid size format: '{}'. Use format like '1mb', '512KB', or '1024'",
            s
        ));
    };

    let n = num_str
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid number in size: '{}'", s))?;
    n.checked_mul(unit)
        .ok_or_else(|| format!("Size too large: '{}'", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Validate(args) => {
            let code = validate::run(args)?;
            std::process::exit(code);
        }
        Command::Generate(args) => run_generate(args),
        Command::Kernels => {
            print_kernels();
            Ok(())
        }
        Command::Bench(args) => run_bench(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut text = generators::generate_utf8(args.size, args.pattern.into(), args.seed);

    if args.corrupt > 0 {
        let offsets = generators::corrupt(&mut text, args.corrupt, args.seed);
        eprintln!(
            "✓ Injected {} invalid sequence(s), first at byte {}",
            offsets.len(),
            offsets.first().copied().unwrap_or(0)
        );
    }

    match args.output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {} bytes to {}", text.len(), path.display());
        }
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(&text)
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn print_kernels() {
    let selected = range::selected_kernel();
    println!("{:<10} {:>6}  {}", "KERNEL", "WIDTH", "STATUS");
    for kernel in range::ALL_KERNELS {
        let status = if kernel == selected {
            "selected"
        } else if kernel.is_available() {
            "available"
        } else {
            "unavailable"
        };
        println!("{:<10} {:>6}  {}", kernel.name(), kernel.width(), status);
    }
}

fn run_bench(args: BenchArgs) -> Result<()> {
    let sizes = args
        .sizes
        .iter()
        .map(|s| parse_size(s).map(|bytes| (s.trim().to_lowercase(), bytes)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::msg)?;

    let patterns = if args.patterns.is_empty() {
        generators::Utf8Pattern::ALL.to_vec()
    } else {
        args.patterns.iter().map(|&p| p.into()).collect()
    };

    let kernels = match args.kernel.kernel() {
        Some(kernel) => {
            anyhow::ensure!(kernel.is_available(), utf8range::UnsupportedKernel(kernel));
            vec![kernel]
        }
        None => Kernel::available(),
    };

    let config = bench::BenchConfig {
        data_dir: args.data_dir,
        patterns,
        sizes,
        kernels,
        warmup_runs: args.warmup,
        benchmark_runs: args.runs.max(1),
    };

    bench::run_benchmark(&config, args.jsonl.as_deref(), args.markdown.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        // Plain numbers
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);

        // Units, case insensitive
        assert_eq!(parse_size("100b").unwrap(), 100);
        assert_eq!(parse_size("64KB").unwrap(), 64 * 1024);
        assert_eq!(parse_size("1Mb").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("2gb").unwrap(), 2 * 1024 * 1024 * 1024);

        // Whitespace
        assert_eq!(parse_size(" 1mb ").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("4 kb").unwrap(), 4 * 1024);

        // Invalid
        assert!(parse_size("abc").is_err());
        assert!(parse_size("1tb").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("mb").is_err());

        // Overflow
        assert!(parse_size("99999999999999gb").is_err());
        assert!(parse_size(&format!("{}kb", usize::MAX)).is_err());
        assert_eq!(parse_size(&format!("{}b", usize::MAX)).unwrap(), usize::MAX);
    }

    #[test]
    fn test_kernel_arg_names_match_kernels() {
        for arg in KernelArg::value_variants() {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            match arg.kernel() {
                Some(kernel) => assert_eq!(name, kernel.name()),
                None => assert_eq!(name, "auto"),
            }
        }
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["utf8range", "validate", "--kernel", "naive", "a.txt"])
            .unwrap();
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.kernel, KernelArg::Naive);
                assert_eq!(args.files, vec![PathBuf::from("a.txt")]);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["utf8range", "bench", "--sizes", "1kb,2kb"]).unwrap();
        match cli.command {
            Command::Bench(args) => {
                assert_eq!(args.sizes, vec!["1kb", "2kb"]);
                assert_eq!(args.kernel, KernelArg::Auto);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
