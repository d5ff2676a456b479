//! Headless converter: feed a capture file or stdin through the emulator
//! and print the JSON, text, or HTML projection.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use ansigrid::{to_html, to_json, to_text, RenderOptions};

const HELP_TEXT: &str = r#"ansigrid - interpret ANSI/VT escape streams into structured output

USAGE:
    ansigrid [OPTIONS] [FILE]

With no FILE, input is read from stdin.

OPTIONS:
    --format <json|text|html>  Output mode (default: json)
    --cols <N>                 Grid width (default: 120 json, 500 text/html)
    --rows <N>                 Grid height (default: 40 json, 256 text/html)
    --offset <N>               Rows to skip before emission
    --limit <N>                Maximum rows to emit (0 = no limit)
    -o <FILE>                  Write output to FILE instead of stdout
    -h, --help                 Print help
    -V, --version              Print version

ENVIRONMENT VARIABLES:
    ANSIGRID_COLS              Override grid width
    ANSIGRID_ROWS              Override grid height
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
    Html,
}

struct Args {
    format: Format,
    cols: Option<usize>,
    rows: Option<usize>,
    offset: usize,
    limit: usize,
    input: Option<String>,
    output: Option<String>,
}

fn parse_args() -> Result<Option<Args>, String> {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args {
        format: Format::Json,
        cols: None,
        rows: None,
        offset: 0,
        limit: 0,
        input: None,
        output: None,
    };

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                print!("{HELP_TEXT}");
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("ansigrid {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--format" => {
                i += 1;
                args.format = match argv.get(i).map(String::as_str) {
                    Some("json") => Format::Json,
                    Some("text") => Format::Text,
                    Some("html") => Format::Html,
                    other => return Err(format!("invalid --format value: {other:?}")),
                };
            }
            "--cols" => {
                i += 1;
                args.cols = Some(numeric_arg(&argv, i, "--cols")?);
            }
            "--rows" => {
                i += 1;
                args.rows = Some(numeric_arg(&argv, i, "--rows")?);
            }
            "--offset" => {
                i += 1;
                args.offset = numeric_arg(&argv, i, "--offset")?;
            }
            "--limit" => {
                i += 1;
                args.limit = numeric_arg(&argv, i, "--limit")?;
            }
            "-o" => {
                i += 1;
                args.output = Some(
                    argv.get(i)
                        .ok_or_else(|| "-o requires a file argument".to_string())?
                        .clone(),
                );
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option: {flag}"));
            }
            path => {
                if args.input.is_some() {
                    return Err(format!("unexpected extra argument: {path}"));
                }
                args.input = Some(path.to_string());
            }
        }
        i += 1;
    }
    Ok(Some(args))
}

fn numeric_arg(argv: &[String], i: usize, flag: &str) -> Result<usize, String> {
    argv.get(i)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{flag} requires a numeric argument"))
}

fn env_dimension(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.parse().ok()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("ansigrid: {message}");
            return ExitCode::FAILURE;
        }
    };

    let mut input = Vec::new();
    let read = match &args.input {
        Some(path) => std::fs::read(path).map(|bytes| input = bytes),
        None => io::stdin().read_to_end(&mut input).map(|_| ()),
    };
    if let Err(err) = read {
        eprintln!("ansigrid: failed to read input: {err}");
        return ExitCode::FAILURE;
    }

    let defaults = match args.format {
        Format::Json => RenderOptions::json(),
        Format::Text | Format::Html => RenderOptions::text(),
    };
    let options = RenderOptions {
        cols: args
            .cols
            .or_else(|| env_dimension("ANSIGRID_COLS"))
            .unwrap_or(defaults.cols),
        rows: args
            .rows
            .or_else(|| env_dimension("ANSIGRID_ROWS"))
            .unwrap_or(defaults.rows),
        offset: args.offset,
        limit: args.limit,
    };

    let rendered = match args.format {
        Format::Json => to_json(&input, &options),
        Format::Text => to_text(&input, &options),
        Format::Html => to_html(&input, &options),
    };
    let mut rendered = match rendered {
        Ok(out) => out,
        Err(err) => {
            eprintln!("ansigrid: {err}");
            return ExitCode::FAILURE;
        }
    };
    rendered.push('\n');

    let written = match &args.output {
        Some(path) => std::fs::write(path, rendered.as_bytes()),
        None => io::stdout().write_all(rendered.as_bytes()),
    };
    if let Err(err) = written {
        eprintln!("ansigrid: failed to write output: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
