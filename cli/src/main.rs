use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use trax::{
    request_ai_move, restart, submit_human_move, AiConfig, Color, GameError, GameSession, Phase,
    Placement, RuleConfig, Strategist,
};

mod render;

/// Play Trax in the terminal.
#[derive(Debug, Parser)]
#[command(name = "trax", version)]
struct Args {
    /// Color you play. White moves first.
    #[arg(long, value_enum, default_value_t = ColorArg::White)]
    color: ColorArg,

    /// Two people share the terminal instead of playing the computer
    #[arg(long)]
    two_player: bool,

    /// Seed for the computer's random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before the computer moves, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Columns (or rows) minus one a line must cross to win
    #[arg(long, default_value_t = 7)]
    line_span: i32,

    /// Print a JSON snapshot of the session after every move
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorArg {
    White,
    Red,
}

impl From<ColorArg> for Color {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::White => Color::White,
            ColorArg::Red => Color::Red,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let rules = RuleConfig {
        min_line_span: args.line_span,
        ..RuleConfig::default()
    };
    let mut strategist = Strategist::new(AiConfig {
        seed: args.seed,
        turn_delay: Duration::from_millis(args.delay_ms),
    });
    let human = Color::from(args.color);
    let new_game = || GameSession::start(human, !args.two_player, rules);

    let mut session = new_game();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_help();
    loop {
        if session.phase() == Phase::Intro {
            session = new_game();
            info!(human = %human, ai = !args.two_player, "new game");
        }
        show(&session, args.json)?;

        if session.ai_turn_pending() {
            tokio::time::sleep(strategist.config().turn_delay).await;
            // Retrying cannot help, so any failure here ends the game.
            session = request_ai_move(&session, &mut strategist)
                .inspect_err(|err| error!(%err, "computer could not move"))
                .context("game halted")?;
            continue;
        }

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };
        match line.trim() {
            "" => {}
            "quit" | "q" => break,
            "restart" => session = restart(),
            "help" => print_help(),
            text => match text.parse::<Placement>() {
                Ok(p) => {
                    let result = submit_human_move(&session, p.coord, p.shape, p.rotation);
                    session = settle(&session, result)?;
                }
                Err(err) => println!("{err}"),
            },
        }
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Ordinary rejections keep the current session; engine defects stop the game.
fn settle(
    session: &GameSession,
    result: Result<GameSession, GameError>,
) -> anyhow::Result<GameSession> {
    match result {
        Ok(next) => Ok(next),
        Err(err) if err.is_defect() => {
            error!(%err, "rules engine reached an inconsistent state");
            Err(err).context("game halted")
        }
        Err(err) => {
            println!("rejected: {err}");
            Ok(session.clone())
        }
    }
}

fn show(session: &GameSession, json: bool) -> anyhow::Result<()> {
    print!("{}", render::board(session));
    println!("{}", render::status(session));
    if json {
        println!("{}", serde_json::to_string(&session.view())?);
    }
    if session.phase() == Phase::GameOver {
        println!("type `restart` for another game or `quit` to leave");
    }
    Ok(())
}

fn print_help() {
    println!("place a tile with `<x>,<y> <c|x><degrees>`, e.g. `0,0 c90` or `1,0 x0`");
    println!("c = curve (0/90/180/270), x = cross (0/90); y grows downward");
    println!("commands: help, restart, quit");
}
