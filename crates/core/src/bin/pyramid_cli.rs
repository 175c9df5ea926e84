//! Offline tooling for loyalist rosters.
//!
//! Examples:
//!   pyramid-cli check data/loyalists.json
//!   pyramid-cli layout data/loyalists.json 6.5
//!   pyramid-cli render data/loyalists.json 8 --hover some_user --out pyramid.svg
//!
//! `--config file.json` overrides the default `PyramidConfig`.
//! Set `RUST_LOG=debug` to see layout and interaction logs.

use std::fs;
use std::process;

use pyramid::prelude::*;
use pyramid::loyalists::ValidationReport;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!("pyramid-cli: inspect and render loyalist rosters\n");
    eprintln!("Usage: pyramid-cli [--config file.json] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  check <roster.json>                          Validate names and avatars");
    eprintln!("  layout <roster.json> <generations>           Print the segment table");
    eprintln!("  render <roster.json> <generations> [--hover user] [--out file.svg]");
    eprintln!("                                               Render the pyramid to SVG");
    process::exit(1);
}

fn parse_args() -> (Option<String>, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut config_path = None;
    if args.len() >= 2 && args[0] == "--config" {
        config_path = Some(args[1].clone());
        args.drain(0..2);
    }

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" || args[0] == "help" {
        usage();
    }

    (config_path, args)
}

fn load_config(path: Option<&str>) -> Result<PyramidConfig, String> {
    let Some(path) = path else {
        return Ok(PyramidConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    let config: PyramidConfig =
        serde_json::from_str(&text).map_err(|e| format!("parse {path}: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("invalid config {path}: {e}"))?;
    Ok(config)
}

fn load_roster(path: &str) -> Result<Roster, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    Roster::from_json(&text).map_err(|e| format!("{path}: {e}"))
}

fn parse_generations(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("generations must be a positive number, got {s:?}")),
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{label} ({}):", items.len());
    for item in items {
        println!("  @{item}");
    }
}

fn run_check(args: &[String]) -> Result<bool, String> {
    let [path] = args else {
        usage();
    };
    let roster = load_roster(path)?;
    let report = ValidationReport::check(&roster.dataset, &roster.directory);

    println!(
        "{path}: {} generations, {} loyalists",
        roster.dataset.generation_count(),
        roster.dataset.total_members()
    );
    print_list("missing display names", &report.missing_display_names);
    print_list("display names for unknown users", &report.extra_display_names);
    print_list("missing avatars", &report.missing_avatars);
    print_list("unreferenced avatars", &report.unreferenced_avatars);

    match (report.is_ok(), report.has_warnings()) {
        (true, false) => println!("ok"),
        (true, true) => println!("ok (with avatar warnings)"),
        (false, _) => println!("display names do not match the roster"),
    }
    Ok(report.is_ok())
}

/// Session positioned at `generations`, clamped into the roster's range.
fn session_at(roster: Roster, config: PyramidConfig, generations: f64) -> Result<Session, String> {
    let session = Session::new(roster, config).map_err(|e| e.to_string())?;
    let value = session.controller().clamp_to_bounds(generations);
    if value != generations {
        tracing::warn!(requested = generations, value, "generations clamped to roster depth");
    }
    session.store().set_generations(value);
    Ok(session)
}

fn run_layout(args: &[String], config: PyramidConfig) -> Result<bool, String> {
    let [path, generations] = args else {
        usage();
    };
    let generations = parse_generations(generations)?;
    let session = session_at(load_roster(path)?, config, generations)?;
    let store = session.store();

    println!(
        "generations={:.3} tiers={:.3}",
        store.generations(),
        store.generations_in_pyramid()
    );
    println!(
        "{:>4} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}",
        "gen", "top_y", "bottom_y", "height", "left_x", "right_x", "members"
    );
    for segment in store.segments().iter() {
        let members = session
            .roster()
            .dataset
            .generation(segment.generation)
            .map_or(0, <[String]>::len);
        println!(
            "{:>4} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>8}",
            segment.generation,
            segment.top_y,
            segment.bottom_y,
            segment.height(),
            segment.bottom_left_x,
            segment.bottom_right_x,
            members
        );
    }
    println!("avatars placed: {}", session.placements().len());
    Ok(true)
}

fn run_render(args: &[String], config: PyramidConfig) -> Result<bool, String> {
    if args.len() < 2 {
        usage();
    }
    let path = &args[0];
    let generations = parse_generations(&args[1])?;

    let mut hover = None;
    let mut out = None;
    let mut rest = args[2..].iter();
    while let Some(flag) = rest.next() {
        match (flag.as_str(), rest.next()) {
            ("--hover", Some(user)) => hover = Some(user.clone()),
            ("--out", Some(file)) => out = Some(file.clone()),
            _ => usage(),
        }
    }

    let mut session = session_at(load_roster(path)?, config, generations)?;
    if let Some(user) = hover {
        let Some(generation) = session.roster().dataset.generation_of(&user) else {
            return Err(format!("@{user} is not in {path}"));
        };
        session.hover_avatar(generation, &user);
    }

    let svg = session.scene().to_svg();
    match out {
        Some(file) => {
            fs::write(&file, svg).map_err(|e| format!("write {file}: {e}"))?;
            println!("wrote {file}");
        }
        None => print!("{svg}"),
    }
    Ok(true)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (config_path, args) = parse_args();
    let cmd = args[0].as_str();
    let rest = &args[1..];

    let result = load_config(config_path.as_deref()).and_then(|config| match cmd {
        "check" => run_check(rest),
        "layout" => run_layout(rest, config),
        "render" => run_render(rest, config),
        _ => usage(),
    });

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(message) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
    }
}
