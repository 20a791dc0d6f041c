//! CLI handler for the `validate` command.

use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;
use utf8range::text::utf8::{Utf8Error, Utf8ErrorKind};
use utf8range::{Config, Validator};

use crate::KernelArg;

/// Validate files for UTF-8 compliance.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Input files to validate (reads from stdin if none provided)
    #[arg(trailing_var_arg = true)]
    pub files: Vec<PathBuf>,

    /// Quiet mode: exit code only, no output
    #[arg(short, long)]
    pub quiet: bool,

    /// Force color output even when not a TTY
    #[arg(short = 'C', long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(short = 'M', long = "no-color")]
    pub no_color: bool,

    /// Validation kernel
    #[arg(short, long, default_value = "auto")]
    pub kernel: KernelArg,

    /// Print the kernel and throughput for each input
    #[arg(short, long)]
    pub verbose: bool,
}

/// Exit codes for the validate command.
pub mod exit_codes {
    /// UTF-8 is valid.
    pub const SUCCESS: i32 = 0;
    /// UTF-8 is invalid (validation error).
    pub const INVALID: i32 = 1;
    /// I/O error (file not found, permission denied, etc.).
    pub const IO_ERROR: i32 = 2;
}

/// ANSI color codes for error output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const LOCATION: &str = "\x1b[1;34m"; // Bold blue
    pub const GUTTER: &str = "\x1b[0;34m"; // Blue
    pub const CARET: &str = "\x1b[1;32m"; // Bold green
    pub const HINT: &str = "\x1b[0;33m"; // Yellow
}

/// Color scheme that can be disabled.
#[derive(Clone, Copy)]
struct ColorScheme {
    error: &'static str,
    location: &'static str,
    gutter: &'static str,
    caret: &'static str,
    hint: &'static str,
    reset: &'static str,
}

impl ColorScheme {
    fn new(use_color: bool) -> Self {
        if use_color {
            Self {
                error: colors::ERROR,
                location: colors::LOCATION,
                gutter: colors::GUTTER,
                caret: colors::CARET,
                hint: colors::HINT,
                reset: colors::RESET,
            }
        } else {
            Self {
                error: "",
                location: "",
                gutter: "",
                caret: "",
                hint: "",
                reset: "",
            }
        }
    }
}

/// Run the validate command, returning the process exit code.
pub fn run(args: ValidateArgs) -> Result<i32> {
    let use_color = if args.no_color {
        false
    } else if args.color {
        true
    } else {
        atty::is(atty::Stream::Stderr)
    };
    let scheme = ColorScheme::new(use_color);

    let config = Config {
        kernel: args.kernel.kernel(),
    };
    let validator = match Validator::with_config(config) {
        Ok(v) => v,
        Err(e) => {
            if !args.quiet {
                eprintln!("{}error{}: {}", scheme.error, scheme.reset, e);
            }
            return Ok(exit_codes::IO_ERROR);
        }
    };

    if args.files.is_empty() {
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .context("failed to read from stdin")?;
        return Ok(validate_input(&validator, &input, "<stdin>", &args, scheme));
    }

    let mut any_invalid = false;
    let mut any_io_error = false;

    for path in &args.files {
        match fs::read(path) {
            Ok(input) => {
                let name = path.to_string_lossy();
                if validate_input(&validator, &input, &name, &args, scheme) == exit_codes::INVALID
                {
                    any_invalid = true;
                }
            }
            Err(e) => {
                any_io_error = true;
                if !args.quiet {
                    eprintln!(
                        "{}error{}: {}: {}",
                        scheme.error,
                        scheme.reset,
                        path.display(),
                        e
                    );
                }
            }
        }
    }

    Ok(if any_io_error {
        exit_codes::IO_ERROR
    } else if any_invalid {
        exit_codes::INVALID
    } else {
        exit_codes::SUCCESS
    })
}

/// Validate a single input and print errors.
fn validate_input(
    validator: &Validator,
    input: &[u8],
    name: &str,
    args: &ValidateArgs,
    scheme: ColorScheme,
) -> i32 {
    let start = Instant::now();
    let result = validator.validate(input);
    let elapsed = start.elapsed().as_secs_f64();

    if args.verbose && !args.quiet {
        let mib = input.len() as f64 / (1024.0 * 1024.0);
        eprintln!(
            "{}: {} bytes, kernel {}, {:.3} ms ({:.1} MiB/s)",
            name,
            input.len(),
            validator.kernel(),
            elapsed * 1000.0,
            if elapsed > 0.0 { mib / elapsed } else { 0.0 }
        );
    }

    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            if !args.quiet {
                eprintln!("{}", render_error(&err, input, name, scheme));
            }
            exit_codes::INVALID
        }
    }
}

/// Render an error with a rustc-style context snippet.
fn render_error(err: &Utf8Error, input: &[u8], name: &str, scheme: ColorScheme) -> String {
    let mut out = String::new();
    let byte = input
        .get(err.offset)
        .map(|b| format!(" (byte 0x{:02X})", b))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{}error{}: {}{}",
        scheme.error, scheme.reset, err.kind, byte
    );
    let _ = writeln!(
        out,
        "  {}--> {}:{}:{}{}",
        scheme.location, name, err.line, err.column, scheme.reset
    );

    let snippet = snippet(input, err.offset, err.column);
    let width = err.line.to_string().len().max(3);
    let pad = " ".repeat(width + 2);
    let _ = writeln!(out, "{}{}|{}", pad, scheme.gutter, scheme.reset);
    let _ = writeln!(
        out,
        " {}{:>width$}{} {}|{} {}",
        scheme.gutter,
        err.line,
        scheme.reset,
        scheme.gutter,
        scheme.reset,
        snippet.text,
        width = width
    );
    let _ = write!(
        out,
        "{}{}|{} {}{}{}{}",
        pad,
        scheme.gutter,
        scheme.reset,
        " ".repeat(snippet.caret_offset),
        scheme.caret,
        "^".repeat(snippet.caret_width),
        scheme.reset
    );
    if let Some(hint) = hint(err.kind) {
        let _ = write!(out, " {}{}{}", scheme.hint, hint, scheme.reset);
    }
    out
}

fn hint(kind: Utf8ErrorKind) -> Option<&'static str> {
    match kind {
        Utf8ErrorKind::InvalidLeadByte => Some("bytes 0x80-0xBF are continuation bytes"),
        Utf8ErrorKind::InvalidContinuationByte => Some("expected byte 0x80-0xBF"),
        Utf8ErrorKind::OverlongEncoding => Some("use shortest possible encoding"),
        Utf8ErrorKind::SurrogateCodepoint => Some("U+D800-U+DFFF are reserved for UTF-16"),
        Utf8ErrorKind::OutOfRangeCodepoint => Some("maximum is U+10FFFF"),
        Utf8ErrorKind::TruncatedSequence => None,
    }
}

/// Display form of the erroneous line.
struct Snippet {
    text: String,
    /// Characters before the caret.
    caret_offset: usize,
    /// Characters used to show the offending byte.
    caret_width: usize,
}

/// Longest stretch of a line shown on either side of the error, in bytes.
const CONTEXT: usize = 40;

/// Render the line around `offset`. Bytes that are not part of a valid
/// sequence are shown as `\xNN` escapes, control characters as `\t`, `\r`
/// or `\xNN`, so caret positions stay exact.
fn snippet(input: &[u8], offset: usize, column: usize) -> Snippet {
    let line_start = offset + 1 - column;
    let line_end = input[offset.min(input.len())..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(input.len(), |i| offset + i);

    let mut from = line_start.max(offset.saturating_sub(CONTEXT));
    while from > line_start && input[from] & 0xC0 == 0x80 {
        from -= 1;
    }
    let mut to = line_end.min(offset + CONTEXT);
    while to < line_end && input[to] & 0xC0 == 0x80 {
        to += 1;
    }

    let mut text = String::new();
    if from > line_start {
        text.push_str("...");
    }
    let prefix = escape(&input[from..offset]);
    let caret_offset = text.chars().count() + prefix.chars().count();
    text.push_str(&prefix);

    let bad = escape(&input[offset.min(to)..(offset + 1).min(to)]);
    let caret_width = bad.chars().count().max(1);
    text.push_str(&bad);
    text.push_str(&escape(&input[(offset + 1).min(to)..to]));
    if to < line_end {
        text.push_str("...");
    }

    Snippet {
        text,
        caret_offset,
        caret_width,
    }
}

/// Escape `bytes` for single-line display.
fn escape(mut bytes: &[u8]) -> String {
    let mut out = String::new();
    while !bytes.is_empty() {
        let valid_len = match std::str::from_utf8(bytes) {
            Ok(_) => bytes.len(),
            Err(e) => e.valid_up_to(),
        };
        let (valid, rest) = bytes.split_at(valid_len);
        for ch in String::from_utf8_lossy(valid).chars() {
            match ch {
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                c if c.is_control() => {
                    let _ = write!(out, "\\x{:02X}", c as u32);
                }
                c => out.push(c),
            }
        }
        bytes = match rest.split_first() {
            Some((&b, tail)) => {
                let _ = write!(out, "\\x{:02X}", b);
                tail
            }
            None => rest,
        };
    }
    out
}
