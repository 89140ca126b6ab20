//! FundMe client.
//!
//! Terminal front-end for the FundMe session controller: connects a local
//! wallet to the configured FundMe contract, runs one action or an
//! interactive session, and prints notifications as they arrive.
//!
//! ```text
//!   stdin commands ──┐
//!                    ├──▶ SessionController ──▶ FundMe contract (alloy)
//!   wallet events ───┘          │
//!                               ▼
//!                      display model + notifications ──▶ stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use fundme_client::blockchain::{ChainId, ProviderEvent};
use fundme_client::lifecycle::startup::{self, LocalController};
use fundme_client::lifecycle::{signals, Shutdown};
use fundme_client::session::{Notification, NotificationKind};

#[derive(Parser)]
#[command(name = "fundme-client")]
#[command(about = "Fund and manage a FundMe contract from a local wallet", long_about = None)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "fundme.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contract's ETH balance
    Balance,
    /// Show the contract owner
    Owner,
    /// Show the contract's minimum funding amount in USD
    Minimum,
    /// Fund the contract
    Fund {
        /// Amount in ETH
        #[arg(short, long)]
        amount: String,
    },
    /// Withdraw all funds (owner only)
    Withdraw,
    /// Interactive session reading commands from stdin
    Session,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(&cli.config)?;
    let controller = startup::start(&config).await?;
    let printer = tokio::spawn(print_notifications(controller.view().notifications()));

    match cli.command {
        Commands::Session => run_session(&controller).await?,
        command => run_once(&controller, command).await,
    }

    // Closing the view ends the printer once it has drained.
    drop(controller);
    let _ = printer.await;
    Ok(())
}

async fn run_once(controller: &LocalController, command: Commands) {
    if !controller.state().is_connected() && controller.connect().await.is_err() {
        return;
    }

    // Failures are already reported as notifications.
    let _ = match command {
        Commands::Balance => controller.refresh_balance().await.map(drop),
        Commands::Owner => controller.get_owner().await.map(drop),
        Commands::Minimum => controller.get_minimum_usd().await.map(drop),
        Commands::Fund { amount } => controller.fund(&amount).await.map(drop),
        Commands::Withdraw => controller.withdraw().await.map(drop),
        Commands::Session => Ok(()),
    };
}

async fn run_session(controller: &LocalController) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Arc::new(Shutdown::new());
    let mut stop = shutdown.subscribe();
    signals::spawn_ctrl_c_handler(Arc::clone(&shutdown));

    let mut events = controller.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            Some(event) = next_event(&mut events) => controller.handle_event(event).await,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => execute(controller, command).await,
                    Err(e) => eprintln!("{}", e),
                }
            }
        }
    }

    tracing::info!("Session closed");
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Connect,
    Amount(String),
    Fund(Option<String>),
    Withdraw,
    Balance,
    Owner,
    Minimum,
    Use(usize),
    Disconnect,
    Chain(u64),
    Show,
    Help,
    Quit,
}

const HELP: &str = "commands: connect | amount <eth> | fund [eth] | withdraw | balance | owner | \
minimum | use <n> | disconnect | chain <id> | show | help | quit";

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(SessionCommand::Help);
    };
    let arg = parts.next();

    let command = match (word, arg) {
        ("connect", None) => SessionCommand::Connect,
        ("amount", value) => SessionCommand::Amount(value.unwrap_or_default().to_string()),
        ("fund", value) => SessionCommand::Fund(value.map(str::to_string)),
        ("withdraw", None) => SessionCommand::Withdraw,
        ("balance", None) => SessionCommand::Balance,
        ("owner", None) => SessionCommand::Owner,
        ("minimum", None) => SessionCommand::Minimum,
        ("use", Some(index)) => SessionCommand::Use(
            index
                .parse()
                .map_err(|_| format!("not an account index: {}", index))?,
        ),
        ("disconnect", None) => SessionCommand::Disconnect,
        ("chain", Some(id)) => {
            SessionCommand::Chain(id.parse().map_err(|_| format!("not a chain id: {}", id))?)
        }
        ("show", None) => SessionCommand::Show,
        ("help", None) => SessionCommand::Help,
        ("quit", None) | ("exit", None) => SessionCommand::Quit,
        _ => return Err(format!("unknown command '{}'; {}", line.trim(), HELP)),
    };
    Ok(command)
}

async fn execute(controller: &LocalController, command: SessionCommand) {
    match command {
        SessionCommand::Connect => {
            let _ = controller.connect().await;
        }
        SessionCommand::Amount(value) => {
            controller.set_amount_input(&value);
            if let Some(error) = controller.display().amount_error {
                eprintln!("{}", error);
            }
        }
        SessionCommand::Fund(value) => {
            let amount = value.unwrap_or_else(|| controller.display().amount_input);
            let _ = controller.fund(&amount).await;
        }
        SessionCommand::Withdraw => {
            let _ = controller.withdraw().await;
        }
        SessionCommand::Balance => {
            let _ = controller.refresh_balance().await;
        }
        SessionCommand::Owner => {
            let _ = controller.get_owner().await;
        }
        SessionCommand::Minimum => {
            let _ = controller.get_minimum_usd().await;
        }
        SessionCommand::Use(index) => match controller.provider() {
            Some(wallet) => {
                if let Err(e) = wallet.select_account(index) {
                    eprintln!("{}", e);
                }
            }
            None => eprintln!("no wallet loaded"),
        },
        SessionCommand::Disconnect => {
            if let Some(wallet) = controller.provider() {
                wallet.disconnect();
            }
        }
        SessionCommand::Chain(id) => {
            if let Some(wallet) = controller.provider() {
                wallet.announce_chain(ChainId(id));
            }
        }
        SessionCommand::Show => match serde_json::to_string_pretty(&controller.display()) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e),
        },
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => {}
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<ProviderEvent>>,
) -> Option<ProviderEvent> {
    let Some(rx) = events.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Dropped wallet events");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

async fn print_notifications(mut feed: broadcast::Receiver<Notification>) {
    loop {
        match feed.recv().await {
            Ok(notification) => {
                let tag = match notification.kind {
                    NotificationKind::Info => "info",
                    NotificationKind::Success => "ok",
                    NotificationKind::Error => "error",
                };
                println!("[{}] {}", tag, notification.message);
            }
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("connect"), Ok(SessionCommand::Connect));
        assert_eq!(parse_command("  fund 0.01 "), Ok(SessionCommand::Fund(Some("0.01".into()))));
        assert_eq!(parse_command("fund"), Ok(SessionCommand::Fund(None)));
        assert_eq!(parse_command("amount"), Ok(SessionCommand::Amount(String::new())));
        assert_eq!(parse_command("use 1"), Ok(SessionCommand::Use(1)));
        assert_eq!(parse_command("chain 11155111"), Ok(SessionCommand::Chain(11155111)));
        assert_eq!(parse_command(""), Ok(SessionCommand::Help));
        assert_eq!(parse_command("exit"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("use x").is_err());
        assert!(parse_command("chain").is_err());
        assert!(parse_command("withdraw now").is_err());
        assert!(parse_command("dance").is_err());
    }
}
