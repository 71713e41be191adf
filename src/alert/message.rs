//! Alert payload formatting.

use crate::round::{DownSet, RoundResult};
use std::fmt::Write;

/// Subject and body handed to an [`AlertDispatcher`](crate::alert::AlertDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub body: String,
}

impl Alert {
    /// Alert for targets that went down this round.
    ///
    /// Only results whose identifier is in `newly_down` are listed; totals
    /// cover the whole round.
    pub fn for_new_failures(round: &RoundResult, newly_down: &DownSet) -> Self {
        let listed: Vec<_> = round.down_results_in(newly_down).collect();

        let mut body = String::from("The following targets are down:\n\n");
        for result in &listed {
            let error = result.error().unwrap_or_else(|| "unknown error".to_string());
            let _ = writeln!(body, "{}: {}", result.target(), error);
        }
        let _ = write!(
            body,
            "\nCheck status: {} target(s) up, {} target(s) down",
            round.up_count(),
            round.down_count()
        );

        Self {
            subject: format!("ALERT: {} target(s) down", listed.len()),
            body,
        }
    }

    /// Alert for targets that came back up this round.
    pub fn for_recoveries(round: &RoundResult, recovered: &DownSet) -> Self {
        let mut body = String::from("The following targets are reachable again:\n\n");
        for id in recovered.iter() {
            let _ = writeln!(body, "{}", id);
        }
        let _ = write!(
            body,
            "\nCheck status: {} target(s) up, {} target(s) down",
            round.up_count(),
            round.down_count()
        );

        Self {
            subject: format!("RECOVERED: {} target(s) back up", recovered.len()),
            body,
        }
    }
}
