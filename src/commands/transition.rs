use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::engine::lifecycle::{self, TicketAction};

pub fn start(db: &mut Database, id: &str, actor_id: &str) -> Result<()> {
    apply(db, id, actor_id, TicketAction::StartWork)?;
    println!("Ticket {} is now in progress.", id);
    Ok(())
}

pub fn resolve(db: &mut Database, id: &str, actor_id: &str, note: Option<&str>) -> Result<()> {
    apply(
        db,
        id,
        actor_id,
        TicketAction::Resolve {
            note: note.unwrap_or("").to_string(),
        },
    )?;
    println!("Ticket {} marked as resolved. Awaiting requester confirmation.", id);
    Ok(())
}

pub fn confirm(db: &mut Database, id: &str, actor_id: &str) -> Result<()> {
    apply(db, id, actor_id, TicketAction::Confirm)?;
    println!("Ticket {} closed.", id);
    Ok(())
}

pub fn reject(db: &mut Database, id: &str, actor_id: &str, reason: &str) -> Result<()> {
    apply(
        db,
        id,
        actor_id,
        TicketAction::Reject {
            reason: reason.to_string(),
        },
    )?;
    println!("Resolution rejected; ticket {} is back in progress.", id);
    Ok(())
}

pub fn reopen(db: &mut Database, id: &str, actor_id: &str) -> Result<()> {
    apply(db, id, actor_id, TicketAction::Reopen)?;
    println!("Ticket {} reopened.", id);
    Ok(())
}

/// Run one engine transition and persist the successor. The status guard in
/// the store catches a concurrent writer; the losing transition writes
/// nothing.
fn apply(db: &mut Database, id: &str, actor_id: &str, action: TicketAction) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket {} not found", id),
    };
    let actor = match db.get_user(actor_id)? {
        Some(u) => u,
        None => bail!("User '{}' not found", actor_id),
    };
    let users = db.list_users()?;

    let next = lifecycle::transition(&ticket, &action, &actor, &users, Utc::now())?;

    if !db.apply_transition(ticket.status, &next)? {
        bail!(
            "Ticket {} changed state while this command ran; re-read and retry",
            id
        );
    }
    Ok(())
}
