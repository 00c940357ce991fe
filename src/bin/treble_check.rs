//! treble-check: Treble 支持检测、系统分区布局查询的命令行工具
//!
//! Usage:
//!   treble-check detect [--root <dir>] [--props <file>] [--engine <lib>] [--json] [-v]
//!   treble-check sar [--mounts <file>] [--props <file>] [-v]
//!   treble-check version

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde_json::json;
use treble_check::detector::{DetectorConfig, TrebleDetector};
use treble_check::partitions::{self, MOUNTS_PATH};
use treble_check::props::StaticProperties;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "detect" => cmd_detect(&args[2..]),
        "sar" => cmd_sar(&args[2..]),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"treble-check: Treble 支持检测工具

USAGE:
    treble-check <COMMAND> [OPTIONS]

COMMANDS:
    detect      Classify the device's Treble support
    sar         Report system-as-root and dynamic partitions
    version     Show version information
    help        Show this help message

OPTIONS:
    --root <dir>        Device root holding vendor/ and odm/ (default /)
    --props <file>      Read properties from a build.prop or getprop dump
                        instead of running getprop
    --engine <lib>      Native compatibility engine library
    --mounts <file>     Mount table to inspect (default /proc/mounts)
    --json              Print the verdict as JSON
    -v, --verbose       Debug logging (RUST_LOG takes precedence)

ENVIRONMENT:
    TREBLE_CHECK_ROOT           Default for --root
    TREBLE_CHECK_ENGINE_LIB     Default for --engine"#
    );
}

fn version_line() -> String {
    format!("treble-check {}", env!("CARGO_PKG_VERSION"))
}

fn cmd_version() {
    println!("{}", version_line());
}

#[derive(Debug, Default)]
struct Options {
    root: Option<PathBuf>,
    props: Option<PathBuf>,
    engine: Option<PathBuf>,
    mounts: Option<PathBuf>,
    json: bool,
    verbose: bool,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .with_context(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "--root" => options.root = Some(value("--root")?),
            "--props" => options.props = Some(value("--props")?),
            "--engine" => options.engine = Some(value("--engine")?),
            "--mounts" => options.mounts = Some(value("--mounts")?),
            "--json" => options.json = true,
            "-v" | "--verbose" => options.verbose = true,
            other => bail!("Unknown option: {other}"),
        }
    }
    Ok(options)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// `getprop` listings are recognised by their `[key]: [value]` lines.
fn load_properties(path: Option<&Path>) -> anyhow::Result<StaticProperties> {
    let Some(path) = path else {
        return Ok(StaticProperties::from_getprop());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read properties from {}", path.display()))?;
    let is_getprop = text.lines().any(|l| l.trim_start().starts_with('['));
    Ok(if is_getprop {
        StaticProperties::from_getprop_output(&text)
    } else {
        StaticProperties::from_build_prop(&text)
    })
}

fn cmd_detect(args: &[String]) -> anyhow::Result<()> {
    let options = parse_options(args)?;
    init_logging(options.verbose);

    let mut config = DetectorConfig::from_env();
    if let Some(root) = options.root {
        config.root = root;
    }
    if let Some(engine) = options.engine {
        config.engine_library = engine;
    }

    let detector = TrebleDetector::builder()
        .with_config(config)
        .with_properties(load_properties(options.props.as_deref())?)
        .build();

    let verdict = detector.detect();
    if options.json {
        let value = match &verdict {
            Ok(Some(result)) => json!({ "treble": true, "result": result }),
            Ok(None) => json!({ "treble": false }),
            Err(e) => json!({ "treble": null, "error": e.to_string() }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    match verdict {
        Ok(Some(result)) => {
            if !options.json {
                println!("{result}");
            }
            Ok(())
        }
        Ok(None) => {
            if !options.json {
                println!("Not Treble");
            }
            Ok(())
        }
        Err(e) if options.json => {
            tracing::debug!(error = %e, "detection failed");
            std::process::exit(2);
        }
        Err(e) => Err(e).context("Treble support could not be determined"),
    }
}

fn cmd_sar(args: &[String]) -> anyhow::Result<()> {
    let options = parse_options(args)?;
    init_logging(options.verbose);

    let props = load_properties(options.props.as_deref())?;
    let mounts_path = options.mounts.unwrap_or_else(|| PathBuf::from(MOUNTS_PATH));
    let sar = partitions::is_system_as_root(&props, || partitions::read_mounts(&mounts_path))?;
    let dynamic = partitions::is_dynamic(&props);

    if options.json {
        let value = json!({ "system_as_root": sar, "dynamic_partitions": dynamic });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("System-as-root: {}", if sar { "yes" } else { "no" });
        match dynamic {
            Some(true) => println!("Dynamic partitions: yes"),
            Some(false) => println!("Dynamic partitions: no"),
            None => println!("Dynamic partitions: unknown"),
        }
    }
    Ok(())
}
