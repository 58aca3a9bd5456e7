use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::engine::sla;
use crate::models::Ticket;

/// SLA standing: one ticket when an id is given, otherwise every open
/// ticket.
pub fn run(db: &Database, id: Option<&str>) -> Result<()> {
    let rules = db.list_sla_rules()?;
    let now = Utc::now();

    if let Some(id) = id {
        let ticket = match db.get_ticket(id)? {
            Some(t) => t,
            None => bail!("Ticket {} not found", id),
        };
        let standing = sla::evaluate(&ticket, &rules, now);
        println!("Ticket {}: {}", ticket.id, ticket.summary);
        println!("Status: {}", ticket.status);
        println!(
            "Window: {}h, level {}, {:.1}h elapsed",
            ticket.sla_hours, standing.sla_level, standing.elapsed_hours
        );
        if let Some(hours) = standing.in_progress_hours {
            println!("In progress: {:.1}h", hours);
        }
        if standing.breach_hours > 0.0 {
            println!("SLA BREACHED by {:.1}h", standing.breach_hours);
        }
        if standing.is_escalated {
            println!("ESCALATED");
        }
        return Ok(());
    }

    let tickets = db.list_open_tickets()?;
    if tickets.is_empty() {
        println!("No open tickets.");
        return Ok(());
    }

    println!(
        "{:<10} {:14} {:>6} {:>9} {:>9} {:>6}  {}",
        "ID", "STATUS", "LEVEL", "ELAPSED", "WINDOW", "ESC", "SUMMARY"
    );
    for ticket in tickets {
        print_row(&ticket, &rules, now);
    }

    Ok(())
}

fn print_row(ticket: &Ticket, rules: &[crate::models::SlaRule], now: chrono::DateTime<Utc>) {
    let standing = sla::evaluate(ticket, rules, now);
    let esc = if standing.is_escalated { "yes" } else { "" };
    println!(
        "{:<10} {:14} {:>6} {:>8.1}h {:>8}h {:>6}  {}",
        ticket.id,
        format!("[{}]", ticket.status),
        standing.sla_level,
        standing.elapsed_hours,
        ticket.sla_hours,
        esc,
        ticket.summary
    );
    if standing.breach_hours > 0.0 {
        println!("{:>11} breached by {:.1}h", "", standing.breach_hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, init::seed_reference_data};
    use tempfile::tempdir;

    #[test]
    fn test_per_ticket_and_queue_reports() {
        let dir = tempdir().unwrap();
        let mut db = Database::open(&dir.path().join("test.db")).unwrap();
        seed_reference_data(&db).unwrap();
        create::run(
            &mut db,
            "u3",
            "IT",
            "Network down",
            Some("the network keeps dropping"),
            None,
            None,
            None,
            &[],
        )
        .unwrap();
        let id = db.list_tickets(None, None, false).unwrap()[0].id.clone();

        run(&db, Some(&id)).unwrap();
        run(&db, None).unwrap();
    }

    #[test]
    fn test_unknown_ticket_id() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        assert!(run(&db, Some("TKT-9999")).is_err());
    }
}
