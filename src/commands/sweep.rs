use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::db::Database;
use crate::engine::sla;

pub struct SweepOutcome {
    pub examined: usize,
    pub escalated: Vec<String>,
    pub levels_raised: usize,
}

/// One pass over the open tickets: recompute SLA standing, ratchet the
/// persisted pressure level, and flip the escalation flag where a breached
/// auto-escalate rule applies. Both writes are idempotent, so overlapping
/// sweeps (daemon plus a manual run) settle on the same state.
pub fn sweep(db: &Database, now: DateTime<Utc>) -> Result<SweepOutcome> {
    let tickets = db.list_open_tickets()?;
    let rules = db.list_sla_rules()?;

    let mut outcome = SweepOutcome {
        examined: tickets.len(),
        escalated: Vec::new(),
        levels_raised: 0,
    };

    for ticket in &tickets {
        let standing = sla::evaluate(ticket, &rules, now);

        if db.raise_sla_level(&ticket.id, standing.sla_level)? {
            outcome.levels_raised += 1;
        }

        if standing.is_escalated && db.mark_escalated(&ticket.id, now)? {
            info!(
                ticket = %ticket.id,
                breach_hours = standing.breach_hours,
                "ticket escalated"
            );
            outcome.escalated.push(ticket.id.clone());
        }
    }

    Ok(outcome)
}

pub fn run(db: &Database) -> Result<()> {
    let outcome = sweep(db, Utc::now())?;

    println!("Examined {} open ticket(s).", outcome.examined);
    if outcome.escalated.is_empty() {
        println!("No new escalations.");
    } else {
        for id in &outcome.escalated {
            println!("ESCALATED: {}", id);
        }
    }
    Ok(())
}
