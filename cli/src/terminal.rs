//! Terminal adapters for flow notices and scheduled navigation

use gk_core::services::checkout::{FlowNotice, FlowNotifier, Navigator};

/// Prints flow notices as they arrive.
///
/// Notices can come from countdown tasks as well as from the command
/// the payer just ran, so every line is a full `println!` call.
pub struct TerminalNotifier;

impl FlowNotifier for TerminalNotifier {
    fn notify(&self, notice: FlowNotice) {
        match notice {
            FlowNotice::CodeSent { .. }
            | FlowNotice::CodeResent
            | FlowNotice::VerificationSucceeded { .. } => println!("  ✓ {}", notice),
            other => println!("  ✗ {}", other),
        }
    }
}

/// Prints the redirect destination instead of opening a browser.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) {
        println!("  → Continue to: {}", url);
    }
}
