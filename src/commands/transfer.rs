use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::engine::lifecycle::{self, TicketAction};

pub fn run(db: &mut Database, id: &str, actor_id: &str, to_user_id: &str) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket {} not found", id),
    };
    let actor = match db.get_user(actor_id)? {
        Some(u) => u,
        None => bail!("User '{}' not found", actor_id),
    };
    let users = db.list_users()?;

    let action = TicketAction::Transfer {
        to_user_id: to_user_id.to_string(),
    };
    let next = lifecycle::transition(&ticket, &action, &actor, &users, Utc::now())?;

    if !db.apply_transition(ticket.status, &next)? {
        bail!(
            "Ticket {} changed state while this command ran; re-read and retry",
            id
        );
    }

    println!("Ticket {} transferred to {}.", id, to_user_id);
    Ok(())
}
