//! GateKeep checkout terminal
//!
//! Interactive rendition of the hosted checkout page: resolves a
//! session, collects a contact (or goes straight to code entry when the
//! merchant preset one), and walks the payer through OTP verification
//! with resend cooldown and code expiry countdowns.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gk_cli::prompt::{self, Command};
use gk_cli::terminal::{TerminalNavigator, TerminalNotifier};
use gk_client::HttpCheckoutApi;
use gk_core::errors::FlowError;
use gk_core::services::checkout::{
    CheckoutFlow, CheckoutFlowConfig, FlowState, ResendOutcome, SubmitOutcome, SystemClock,
};
use gk_shared::config::ApiConfig;

/// Verify a GateKeep checkout session from the terminal
#[derive(Debug, Parser)]
#[command(name = "gatekeep-checkout", version, about)]
struct Args {
    /// Checkout session token from the merchant's checkout link
    session_token: String,

    /// Verification service base URL (overrides GATEKEEP_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides GATEKEEP_API_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Logs go to stderr so the interactive prompt stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting GateKeep checkout terminal");

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(base_url) = args.api_url {
        config.base_url = base_url;
    }
    if let Some(seconds) = args.timeout_secs {
        config.request_timeout = seconds;
    }
    info!("Verification service at {}", config.base_url);

    let flow_config = CheckoutFlowConfig::default();
    let success_delay_ms = flow_config.success_redirect_delay_ms;
    let lockout_delay_ms = flow_config.lockout_redirect_delay_ms;

    let api = Arc::new(
        HttpCheckoutApi::new(config).context("Failed to build the verification service client")?,
    );
    let flow = Arc::new(CheckoutFlow::new(
        api,
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
        Arc::new(SystemClock),
        flow_config,
    ));

    println!("Loading checkout...");
    if flow.bootstrap(&args.session_token).await.is_err() {
        // The notifier already printed the reason
        println!();
        println!("Session Not Found");
        println!("This checkout session is invalid or has expired.");
        std::process::exit(1);
    }

    let snapshot = flow.snapshot();
    println!();
    if let Some(project) = &snapshot.project_name {
        println!("{}", project);
    }
    println!("Secure OTP Verification");
    println!("Secured by GateKeep");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut input_lines = stdin.lines();
    let mut shown_state: Option<FlowState> = None;
    let mut redirect_pending: Option<u64> = None;

    loop {
        let state = flow.state();
        if shown_state != Some(state) {
            shown_state = Some(state);
            println!();
            for line in prompt::render_status(&flow.snapshot()) {
                println!("{}", line);
            }
            if !matches!(state, FlowState::Completed | FlowState::Locked) {
                println!("Type 'help' for commands.");
            }
        }

        if matches!(state, FlowState::Completed | FlowState::Locked) {
            // Let a scheduled redirect fire before the process exits
            if let Some(delay_ms) = redirect_pending.take() {
                tokio::time::sleep(Duration::from_millis(delay_ms + 200)).await;
            }
            break;
        }

        print!("> ");
        io::stdout().flush()?;
        let Some(line) = input_lines.next_line().await? else {
            break;
        };

        match prompt::parse_command(state, &line) {
            Command::Contact(contact) => match flow.request_code(contact).await {
                Ok(_) => {}
                // Guard failures carry no notice; print them here
                Err(
                    err @ (FlowError::InvalidContact { .. }
                    | FlowError::InvalidState { .. }
                    | FlowError::ActionPending { .. }),
                ) => println!("  ✗ {}", err),
                Err(_) => {}
            },
            Command::Digits(digits) => {
                let start = {
                    let snapshot = flow.snapshot();
                    // A full line replaces the code; a partial one continues it
                    if digits.len() >= snapshot.slots.len() {
                        0
                    } else {
                        snapshot.filled_slots
                    }
                };
                match flow.input_digits(start, &digits) {
                    Ok(_) => {
                        let snapshot = flow.snapshot();
                        if !snapshot.slots.is_empty()
                            && snapshot.filled_slots == snapshot.slots.len()
                        {
                            match flow.submit_code().await {
                                Ok(SubmitOutcome::Completed { redirect_url, .. }) => {
                                    if redirect_url.is_some() {
                                        redirect_pending = Some(success_delay_ms);
                                    }
                                }
                                Ok(SubmitOutcome::Superseded) => {}
                                Err(FlowError::Locked { redirect_url, .. }) => {
                                    if redirect_url.is_some() {
                                        redirect_pending = Some(lockout_delay_ms);
                                    }
                                }
                                Err(
                                    err @ (FlowError::InvalidState { .. }
                                    | FlowError::ActionPending { .. }),
                                ) => println!("  ✗ {}", err),
                                Err(_) => {}
                            }
                        } else {
                            println!("  Code: {}", prompt::slot_row(&snapshot));
                        }
                    }
                    Err(err) => println!("  ✗ {}", err),
                }
            }
            Command::Resend => match flow.resend_code().await {
                Ok(ResendOutcome::CooldownActive { seconds_left }) => {
                    println!("  Resend in {}s", seconds_left);
                }
                Ok(_) => {}
                Err(
                    err @ (FlowError::InvalidState { .. } | FlowError::ActionPending { .. }),
                ) => println!("  ✗ {}", err),
                Err(_) => {}
            },
            Command::ChangeContact => {
                if let Err(err) = flow.change_contact() {
                    println!("  ✗ {}", err);
                }
            }
            Command::Clear => {
                let slot_count = flow.snapshot().slots.len();
                let cleared = (0..slot_count.max(1)).try_for_each(|index| flow.erase_digit(index));
                match cleared {
                    Ok(()) => println!("  Code: {}", prompt::slot_row(&flow.snapshot())),
                    Err(err) => println!("  ✗ {}", err),
                }
            }
            Command::Status => {
                for line in prompt::render_status(&flow.snapshot()) {
                    println!("  {}", line);
                }
            }
            Command::Help => {
                for line in prompt::help_text(flow.state()) {
                    println!("  {}", line);
                }
            }
            Command::Quit => break,
            Command::Unknown(text) => {
                println!("  ✗ Unrecognized input '{}'. Type 'help' for commands.", text);
            }
        }
    }

    Ok(())
}
