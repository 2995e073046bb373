//! Reel CLI
//!
//! Play, step through, and validate carousels of text slides.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reel_carousel::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod step;

use config::{frame, ReelDeck};
use step::parse_commands;

#[derive(Parser)]
#[command(name = "reel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reel carousel CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the slides come from
#[derive(Args)]
struct DeckArgs {
    /// Deck file ([carousel] options and [[slides]])
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Slide text, appended after the deck's slides (repeatable)
    #[arg(short, long = "slide")]
    slides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Autoplay a carousel in real time
    Play {
        #[command(flatten)]
        deck: DeckArgs,

        /// Exit after this many slide changes
        #[arg(short = 'n', long)]
        changes: Option<usize>,

        /// Override the tick interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop at the last slide instead of wrapping
        #[arg(long)]
        no_loop: bool,

        /// Step backwards through the slides
        #[arg(short, long)]
        reverse: bool,
    },

    /// Run scripted commands against a carousel on a manual clock
    Step {
        #[command(flatten)]
        deck: DeckArgs,

        /// Commands: tick, next, prev, goto:<i>, play, stop
        #[arg(required = true)]
        commands: Vec<String>,
    },

    /// Check a deck file for errors
    Check {
        /// Deck file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Play {
            deck,
            changes,
            interval,
            no_loop,
            reverse,
        } => cmd_play(&deck, changes, interval, no_loop, reverse),

        Commands::Step { deck, commands } => cmd_step(&deck, &commands),

        Commands::Check { file } => cmd_check(&file),
    }
}

fn cmd_play(
    args: &DeckArgs,
    changes: Option<usize>,
    interval: Option<u64>,
    no_loop: bool,
    reverse: bool,
) -> Result<()> {
    let mut deck = ReelDeck::resolve(args.config.as_deref(), &args.slides)?;

    deck.carousel.autoplay = true;
    if let Some(interval_ms) = interval {
        deck.carousel.interval_ms = interval_ms;
    }
    if no_loop {
        deck.carousel.looping = false;
    }
    if reverse {
        deck.carousel.direction = deck.carousel.direction.reversed();
    }
    deck.carousel
        .validate()
        .context("Invalid playback options")?;

    info!(
        "Playing {} slides every {}ms",
        deck.slides.len(),
        deck.carousel.interval_ms
    );

    let (tx, rx) = mpsc::channel();
    let carousel = deck.build(move |index| {
        let _ = tx.send(index);
    });
    carousel.mount(Arc::new(IntervalTimer::new()));

    println!("{}", frame(&carousel));

    if !carousel.state().is_playing {
        info!("Nothing to cycle through");
        return Ok(());
    }

    let mut seen = 0;
    while changes.map_or(true, |limit| seen < limit) {
        let Ok(index) = rx.recv() else {
            break;
        };
        seen += 1;
        tracing::debug!("Slide change #{} -> {}", seen, index);

        println!("{}", frame(&carousel));

        if !carousel.state().is_playing {
            info!("Reached the last slide");
            break;
        }
    }

    Ok(())
}

fn cmd_step(args: &DeckArgs, commands: &[String]) -> Result<()> {
    let deck = ReelDeck::resolve(args.config.as_deref(), &args.slides)?;
    let commands = parse_commands(commands)?;

    let timer = Arc::new(ManualTimer::new());
    let carousel = deck.build(|index| info!("Slide changed to {}", index));
    carousel.mount(timer.clone());

    println!("{:>10}  {}", "start", frame(&carousel));
    for command in commands {
        command.apply(&carousel, &timer);
        println!("{:>10}  {}", command.to_string(), frame(&carousel));
    }

    Ok(())
}

fn cmd_check(path: &std::path::Path) -> Result<()> {
    let deck = ReelDeck::load(path)?;
    let carousel = &deck.carousel;

    info!("Deck {} is valid", path.display());
    println!("  slides:    {}", deck.slides.len());
    println!("  autoplay:  {}", carousel.autoplay);
    println!("  interval:  {}ms", carousel.interval_ms);
    println!("  direction: {}", i64::from(carousel.direction));
    println!("  loop:      {}", carousel.looping);

    if deck.slides.len() < 2 && carousel.autoplay {
        tracing::warn!("Autoplay needs at least two slides; this deck will not cycle");
    }

    Ok(())
}
