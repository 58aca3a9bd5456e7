use anyhow::{bail, Result};

use crate::db::Database;
use crate::models::TicketStatus;

pub fn run(
    db: &Database,
    status: Option<&str>,
    assignee: Option<&str>,
    escalated_only: bool,
) -> Result<()> {
    let status_filter = match status {
        Some("all") | None => None,
        Some(s) => match TicketStatus::parse(s) {
            Some(st) => Some(st),
            None => bail!("Invalid status: {}", s),
        },
    };

    let tickets = db.list_tickets(status_filter, assignee, escalated_only)?;

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    for ticket in tickets {
        let status_display = format!("[{}]", ticket.status);
        let assignee = ticket.assignee_id.as_deref().unwrap_or("-");
        let esc = if ticket.is_escalated { " ESC" } else { "" };
        let date = ticket.created_at.format("%Y-%m-%d");
        println!(
            "{:<10} {:14} {:<40} {:8} {:6} {}{}",
            ticket.id,
            status_display,
            truncate(&ticket.summary, 40),
            ticket.priority,
            assignee,
            date,
            esc
        );
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("a very long ticket summary here", 10), "a very ...");
    }

    #[test]
    fn test_truncate_multibyte() {
        let s = "ticket résumé with accénts and more words";
        let out = truncate(s, 10);
        assert_eq!(out.chars().count(), 10);
    }
}
