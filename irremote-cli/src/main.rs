mod press;
mod report;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use irremote_core::board::{self, BoardConfig};
use irremote_core::frame;
use irremote_core::hal::Selector;
use irremote_core::sim::SimBoard;
use irremote_core::{Outcome, Remote, TransFlags};
use log::info;

#[derive(Parser)]
#[command(name = "irremote-cli")]
#[command(about = "RC5 IR remote inspector and simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every key with its position code and command byte
    Keys {
        /// Board variant (dip-select or fixed-address)
        #[arg(long, default_value = "dip-select")]
        board: String,
    },
    /// Show the frame and waveform a single key press sends
    Frame {
        /// Key index, 0..24
        #[arg(long)]
        key: String,
        /// Selector switch state, 0..=3
        #[arg(long, default_value = "0")]
        selector: String,
        /// Send with the toggle bit set
        #[arg(long)]
        toggle: bool,
        #[arg(long, default_value = "dip-select")]
        board: String,
    },
    /// Run scripted presses through the firmware loop on a simulated board
    Simulate {
        #[arg(long, default_value = "dip-select")]
        board: String,
        #[arg(long, default_value = "0")]
        selector: String,
        /// KEY:HOLD_MS or 0xCODE:HOLD_MS, repeatable
        #[arg(long = "press", required = true)]
        presses: Vec<String>,
        /// Idle time between the end of one press and the next
        #[arg(long, default_value_t = 500)]
        gap_ms: u64,
        /// Print every segment and sleep
        #[arg(long)]
        trace: bool,
    },
}

/// Selector lines fixed at one state.
struct Switches(u8);

impl Selector for Switches {
    fn read_selector(&mut self) -> u8 {
        self.0
    }
}

fn find_board(name: &str) -> Result<&'static BoardConfig> {
    match board::by_name(name) {
        Some(config) => Ok(config),
        None => {
            let known: Vec<&str> = board::BOARDS.iter().map(|b| b.name).collect();
            bail!("unknown board '{}' (known: {})", name, known.join(", "))
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Keys { board } => {
            let config = find_board(&board)?;
            print!("{}", report::key_table(config));
        }
        Command::Frame {
            key,
            selector,
            toggle,
            board,
        } => {
            let config = find_board(&board)?;
            let key = press::parse_key(&key)?;
            let selector = press::parse_selector(&selector)?;
            if !config.can_scan(key.position()) {
                bail!("key {} is not wired on board {}", key, config.name);
            }

            let flags = TransFlags {
                held_down: false,
                toggle,
            };
            let frame = frame::encode(key, &flags, config, &mut Switches(selector));
            print!("{}", report::frame_breakdown(frame));
        }
        Command::Simulate {
            board,
            selector,
            presses,
            gap_ms,
            trace,
        } => {
            let config = find_board(&board)?;
            let selector = press::parse_selector(&selector)?;

            let mut sim = SimBoard::new();
            sim.set_selector(selector);
            for arg in &presses {
                let parsed = press::parse_press(arg)?;
                sim.press_after(gap_ms * 1000, parsed.code, parsed.hold_ms * 1000);
            }
            info!("simulating {} presses on {}", presses.len(), config.name);

            let mut remote = Remote::new(sim, config);
            let mut total_frames = 0;
            let mut n = 0;
            while remote.board().pending() > 0 {
                n += 1;
                let outcome = remote.press_cycle();
                if let Outcome::Sent { frames, .. } = outcome {
                    total_frames += frames;
                }
                print!("{}", report::cycle_line(n, &outcome, remote.board().now_us()));
            }

            let sim = remote.into_board();
            println!("{} presses, {} frames", n, total_frames);
            if trace {
                println!();
                print!("{}", report::trace(&sim));
            }
        }
    }

    Ok(())
}
