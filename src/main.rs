// region: --- Modules

mod ais;
mod assistant;
mod error;
mod session;
mod utils;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use textwrap::wrap;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::ais::new_oa_client;
use crate::assistant::{Assistant, Config};
use crate::utils::cli::{ico_err, ico_res, prompt, text_res, CliConfirm};

pub use self::error::{Error, Result};

// endregion: --- Modules

const DEFAULT_DIR: &str = "assistant";

#[tokio::main]
async fn main() {
    println!();

    match start().await {
        Ok(_) => println!("\nBye!\n"),
        Err(e) => println!("\n{} Error: {}\n", ico_err(), e),
    }
}

async fn start() -> Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

    let config = Config::load_from_dir(&dir)?;
    init_tracing(&config.log_level);

    let oac = new_oa_client()?;
    let Some(asst) = Assistant::init(Arc::new(oac), &dir, config, &mut CliConfirm).await? else {
        println!("No assistant created, exiting.");
        return Ok(());
    };

    let conv = match asst.load_conv().await {
        Ok(conv) => conv,
        Err(err) => {
            println!("{} Failed to start chat due to thread creation error.", ico_err());
            return Err(err);
        }
    };

    // Ctrl-C during a turn cancels the run wait, anywhere else it quits.
    let in_turn = Arc::new(AtomicBool::new(false));
    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn({
        let in_turn = in_turn.clone();
        async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !in_turn.load(Ordering::SeqCst) || cancel_tx.send(true).is_err() {
                    println!("\n\nBye!\n");
                    std::process::exit(0);
                }
            }
        }
    });

    println!(
        "->> Chatting with '{}' ({}), type 'exit' to quit",
        asst.name(),
        asst.asst_id()
    );

    session::run_session(
        &asst,
        &conv,
        || {
            println!();
            in_turn.store(false, Ordering::SeqCst);
            let input = prompt("You");
            in_turn.store(true, Ordering::SeqCst);
            input
        },
        |reply: &str| {
            let reply = wrap(reply, 80).join("\n");
            println!("{} Assistant: {}", ico_res(), text_res(reply));
        },
        Some(&mut cancel_rx),
    )
    .await
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
