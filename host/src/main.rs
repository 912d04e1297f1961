use crash_core::{BetId, BetStatus, Clock, GraphRenderer, GraphView, ManualClock, Phase, SystemClock};
use host::{
    load_config, save_summary, to_svg, AppConfig, ProviderSpec, RoundLog, RunSummary, Session,
    SvgSurface, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Largest multiplier `render` will draw
const MAX_RENDER_MULTIPLIER: f64 = 10_000.0;

/// Options for the `run` command
struct RunOptions {
    rounds: usize,
    provider: ProviderSpec,
    config: Option<PathBuf>,
    fast: bool,
    frames_dir: Option<PathBuf>,
    summary: Option<String>,
    bet: Option<f64>,
    cash_out: Option<f64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            rounds: 3,
            provider: ProviderSpec::default(),
            config: None,
            fast: false,
            frames_dir: None,
            summary: None,
            bet: None,
            cash_out: None,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "run" => {
            let opts = parse_run_args(&args[2..]).unwrap_or_else(|e| {
                eprintln!("❌ Error: {}", e);
                std::process::exit(1);
            });
            run_command(opts);
        }

        "render" => render_command(&args[2..]),

        "--help" | "-h" => {
            print_usage(&args[0]);
            std::process::exit(0);
        }

        _ => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run [--rounds N] [--crash-point X | --seed HEX] [--config FILE] [--fast]");
    eprintln!("      [--frames DIR] [--summary FILE] [--bet AMOUNT [--cash-out X]]");
    eprintln!("      Play N rounds (default 3) and write a JSON run summary");
    eprintln!("      - --crash-point: fixed crash point for every round (default 9.99)");
    eprintln!("      - --seed: 32-byte hex seed for the exponential sampler");
    eprintln!("      - --fast: simulated time instead of real time");
    eprintln!("      - --frames: write an SVG of the graph at every phase change");
    eprintln!("      - --bet: stake AMOUNT every round; --cash-out X cashes out at X");
    eprintln!("      Summary defaults to: crash-run_<timestamp>.json");
    eprintln!();
    eprintln!("  render --multiplier M [--crashed] [--size WxH] [output_file]");
    eprintln!("      Draw a single graph frame as SVG (default crash-graph.svg)");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {} run --rounds 5 --seed <64 hex chars> --fast --frames frames/", program);
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_number(raw: &str, flag: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|e| format!("Invalid value '{}' for {}: {}", raw, flag, e))
}

fn parse_size(raw: &str) -> Result<(f64, f64), String> {
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| format!("Invalid size '{}': expected WIDTHxHEIGHT", raw))?;
    let w = parse_number(w, "--size")?;
    let h = parse_number(h, "--size")?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("Invalid size '{}': both sides must be > 0", raw));
    }
    Ok((w, h))
}

fn parse_run_args(args: &[String]) -> Result<RunOptions, String> {
    let mut opts = RunOptions::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--rounds" | "-n" => {
                let raw = value(args, i, flag)?;
                opts.rounds = raw
                    .parse()
                    .map_err(|e| format!("Invalid round count '{}': {}", raw, e))?;
                i += 2;
            }
            "--crash-point" => {
                opts.provider = ProviderSpec::Fixed(parse_number(value(args, i, flag)?, flag)?);
                i += 2;
            }
            "--seed" => {
                let seed = value(args, i, flag)?;
                host::parse_seed(seed)?;
                opts.provider = ProviderSpec::Hashed(seed.to_string());
                i += 2;
            }
            "--config" | "-c" => {
                opts.config = Some(PathBuf::from(value(args, i, flag)?));
                i += 2;
            }
            "--frames" => {
                opts.frames_dir = Some(PathBuf::from(value(args, i, flag)?));
                i += 2;
            }
            "--summary" => {
                opts.summary = Some(value(args, i, flag)?.to_string());
                i += 2;
            }
            "--bet" => {
                opts.bet = Some(parse_number(value(args, i, flag)?, flag)?);
                i += 2;
            }
            "--cash-out" => {
                opts.cash_out = Some(parse_number(value(args, i, flag)?, flag)?);
                i += 2;
            }
            "--fast" => {
                opts.fast = true;
                i += 1;
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    if opts.cash_out.is_some() && opts.bet.is_none() {
        return Err("--cash-out requires --bet".into());
    }
    Ok(opts)
}

fn run_command(opts: RunOptions) {
    let config = match &opts.config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }),
        None => AppConfig::default(),
    };

    let provider = opts.provider.build().unwrap_or_else(|e| {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    });

    if let Some(dir) = &opts.frames_dir {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("❌ Error creating frames directory '{}': {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    println!("🚀 Crash game simulation");
    println!("{}", "=".repeat(70));
    println!("  Rounds: {}", opts.rounds);
    println!("  Crash points: {}", opts.provider);
    println!("  Clock: {}", if opts.fast { "simulated" } else { "real time" });
    println!();

    let surface = SvgSurface::new(config.width, config.height);
    let start = Instant::now();

    let result = if opts.fast {
        let clock = ManualClock::new();
        let waiter = clock.clone();
        Session::mount(&config, provider, clock, surface)
            .map(|mut session| drive(&mut session, &config, &opts, move |d| waiter.advance(d)))
    } else {
        Session::mount(&config, provider, SystemClock::new(), surface)
            .map(|mut session| drive(&mut session, &config, &opts, std::thread::sleep))
    };

    let (log, history, frames_drawn) = result.unwrap_or_else(|e| {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    });

    println!();
    println!("✅ Finished {} rounds in {:.2}s", log.completed(), start.elapsed().as_secs_f64());
    println!("  Frames drawn: {}", frames_drawn);
    println!(
        "  History: {}",
        history
            .iter()
            .map(|v| format!("{:.2}x", v))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let summary = RunSummary {
        provider: opts.provider.clone(),
        rounds: log.records().to_vec(),
        history,
        frames_drawn,
        finished_at: chrono::Utc::now().to_rfc3339(),
    };

    let default_filename = format!("crash-run_{}.json", chrono::Utc::now().timestamp());
    let file_to_save = opts.summary.as_deref().unwrap_or(&default_filename);

    match save_summary(&summary, file_to_save) {
        Ok(_) => {
            println!();
            println!("💾 Summary saved to: {}", file_to_save);
            println!("{}", "=".repeat(70));
        }
        Err(e) => {
            eprintln!("❌ Error saving summary: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the session until enough rounds have crashed, then unmount it
fn drive<C, W>(
    session: &mut Session<C, SvgSurface>,
    config: &AppConfig,
    opts: &RunOptions,
    wait: W,
) -> (RoundLog, Vec<f64>, u64)
where
    C: Clock,
    W: FnMut(Duration),
{
    let renderer = GraphRenderer::new(config.graph.clone());
    let mut log = RoundLog::new();
    let mut bet: Option<BetId> = None;

    session.run_until(
        |s| {
            let snap = s.snapshot();

            if let Some(change) = log.observe(&snap, s.now()) {
                match change.to {
                    Phase::Waiting => {
                        println!("⏳ Round {} waiting", change.round_id);
                        bet = opts.bet.and_then(|amount| match s.place_bet("cli", amount) {
                            Ok(id) => Some(id),
                            Err(e) => {
                                tracing::warn!("Bet rejected: {}", e);
                                None
                            }
                        });
                    }
                    Phase::Running => println!("📈 Round {} running", change.round_id),
                    Phase::Crashed => {
                        println!("💥 Round {} crashed at {:.2}x", change.round_id, snap.multiplier);
                        for b in &snap.bets {
                            let outcome = match b.status {
                                BetStatus::Won => "won",
                                BetStatus::Lost => "lost",
                                BetStatus::Active => "active",
                            };
                            println!(
                                "   Bet {} ({}): {} {:+.2}",
                                b.id,
                                b.player,
                                outcome,
                                b.profit.unwrap_or(0.0)
                            );
                        }
                    }
                }

                if let Some(dir) = &opts.frames_dir {
                    let frame = renderer.frame(&snap.view(), config.width, config.height);
                    let path = dir.join(format!("round{:03}_{}.svg", change.round_id, change.to));
                    if let Err(e) = fs::write(&path, to_svg(&frame)) {
                        tracing::error!("Error writing frame '{}': {}", path.display(), e);
                    }
                }
            }

            if let (Some(id), Some(target)) = (bet, opts.cash_out) {
                if snap.phase == Phase::Running && snap.multiplier >= target {
                    match s.cash_out(id) {
                        Ok(payout) => println!("💰 Cashed out at {:.2}x for {:.2}", snap.multiplier, payout),
                        Err(e) => tracing::warn!("Cash-out failed: {}", e),
                    }
                    bet = None;
                }
            }

            log.completed() >= opts.rounds
        },
        wait,
    );

    let history = session.snapshot().history;
    let frames = session.frames_drawn();
    session.unmount();
    (log, history, frames)
}

fn render_command(args: &[String]) {
    let mut multiplier: Option<f64> = None;
    let mut crashed = false;
    let mut size = (DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut output: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let parsed: Result<usize, String> = match flag {
            "--multiplier" | "-m" => value(args, i, flag)
                .and_then(|raw| parse_number(raw, flag))
                .map(|m| {
                    multiplier = Some(m);
                    2
                }),
            "--crashed" => {
                crashed = true;
                Ok(1)
            }
            "--size" => value(args, i, flag).and_then(parse_size).map(|s| {
                size = s;
                2
            }),
            other if !other.starts_with('-') && output.is_none() => {
                output = Some(other);
                Ok(1)
            }
            other => Err(format!("Unknown option: {}", other)),
        };
        match parsed {
            Ok(n) => i += n,
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let Some(multiplier) = multiplier.filter(|m| (1.0..=MAX_RENDER_MULTIPLIER).contains(m)) else {
        eprintln!(
            "❌ Error: --multiplier is required and must be between 1.0 and {}",
            MAX_RENDER_MULTIPLIER
        );
        std::process::exit(1);
    };

    let frame = GraphRenderer::default().frame(&GraphView::at(multiplier, crashed), size.0, size.1);
    let path = Path::new(output.unwrap_or("crash-graph.svg"));

    match fs::write(path, to_svg(&frame)) {
        Ok(_) => {
            println!("✅ Rendered {:.2}x ({})", multiplier, if crashed { "crashed" } else { "running" });
            println!("💾 Saved to: {}", path.display());
        }
        Err(e) => {
            eprintln!("❌ Error writing '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
