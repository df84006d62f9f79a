//! Input parsing and status rendering for the interactive prompt

use gk_core::domain::entities::ContactMethod;
use gk_core::services::checkout::{FlowSnapshot, FlowState};

/// A parsed line of payer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Contact to send the verification code to
    Contact(ContactMethod),
    /// Digits for the code entry slots
    Digits(String),
    /// Request a fresh code
    Resend,
    /// Go back and enter a different contact
    ChangeContact,
    /// Empty all code entry slots
    Clear,
    /// Reprint the current step
    Status,
    /// Print the available commands
    Help,
    /// Leave the checkout
    Quit,
    /// Input that fits no command in the current step
    Unknown(String),
}

/// Parse one line of input against the current flow step.
///
/// Keywords win over free-form input. Contact collection accepts
/// `phone <value>` / `email <value>`, or a bare value read as an email
/// when it contains `@` and as a phone number otherwise; code entry
/// accepts digit runs.
pub fn parse_command(state: FlowState, input: &str) -> Command {
    let trimmed = input.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "resend" | "r" => return Command::Resend,
        "change" | "c" => return Command::ChangeContact,
        "clear" => return Command::Clear,
        "status" | "s" => return Command::Status,
        "help" | "h" | "?" | "" => return Command::Help,
        _ => {}
    }

    match state {
        FlowState::CollectingContact => {
            if let Some(rest) = strip_keyword(trimmed, "phone") {
                return Command::Contact(ContactMethod::Phone(rest.to_string()));
            }
            if let Some(rest) = strip_keyword(trimmed, "email") {
                return Command::Contact(ContactMethod::Email(rest.to_string()));
            }
            if trimmed.contains('@') {
                Command::Contact(ContactMethod::Email(trimmed.to_string()))
            } else {
                Command::Contact(ContactMethod::Phone(trimmed.to_string()))
            }
        }
        _ => {
            if trimmed.chars().all(|c| c.is_ascii_digit()) {
                Command::Digits(trimmed.to_string())
            } else {
                Command::Unknown(trimmed.to_string())
            }
        }
    }
}

/// Commands available in the given flow step.
pub fn help_text(state: FlowState) -> Vec<&'static str> {
    match state {
        FlowState::CollectingContact => vec![
            "Enter a phone number (e.g. 0501234567) or an email address.",
            "Prefix with 'phone' or 'email' to force the contact type.",
            "Commands: status, help, quit",
        ],
        FlowState::AwaitingCode => vec![
            "Type the verification code (partial entry continues where you left off).",
            "Commands: resend, change, clear, status, help, quit",
        ],
        _ => vec!["Commands: status, quit"],
    }
}

/// Render the current step the way the checkout card lays it out.
pub fn render_status(snapshot: &FlowSnapshot) -> Vec<String> {
    match snapshot.state {
        FlowState::CollectingContact => {
            let mut lines = vec![
                "We'll send a 6-digit verification code to your phone or email.".to_string(),
            ];
            if let Some(contact) = &snapshot.contact {
                lines.push(format!("Current contact: {}", contact.value()));
            }
            lines
        }
        FlowState::AwaitingCode => {
            let mut lines = Vec::new();
            if let Some(display) = &snapshot.expiry_display {
                lines.push(format!("Code expires in {}", display));
            }
            if let Some(contact) = &snapshot.contact {
                lines.push(format!("Code sent to {}", contact.value()));
            }
            if !snapshot.slots.is_empty() {
                lines.push(format!("Code: {}", slot_row(snapshot)));
            }
            if let Some(remaining) = snapshot.remaining_tries {
                if remaining < 3 {
                    let plural = if remaining == 1 { "" } else { "s" };
                    lines.push(format!("{} attempt{} remaining", remaining, plural));
                }
            }
            if snapshot.cooldown_seconds > 0 {
                lines.push(format!("Resend in {}s", snapshot.cooldown_seconds));
            } else {
                lines.push("Resend available (type 'resend')".to_string());
            }
            lines
        }
        FlowState::Completed => {
            let heading = match &snapshot.verified_name {
                Some(name) => format!("Welcome, {}!", name),
                None => "Verified!".to_string(),
            };
            vec![
                heading,
                "Your phone number has been verified successfully.".to_string(),
            ]
        }
        FlowState::Locked => vec![
            "Too many failed attempts. This session is locked.".to_string(),
        ],
    }
}

fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let (head, rest) = input.split_once(char::is_whitespace)?;
    if head.eq_ignore_ascii_case(keyword) {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// The digit slots as a spaced row, underscores for empty slots.
pub fn slot_row(snapshot: &FlowSnapshot) -> String {
    snapshot
        .slots
        .iter()
        .map(|slot| slot.unwrap_or('_').to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
