use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::engine::lifecycle::{self, TicketAction};

pub fn run(db: &mut Database, id: &str, actor_id: &str, text: &str) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket {} not found", id),
    };
    let actor = match db.get_user(actor_id)? {
        Some(u) => u,
        None => bail!("User '{}' not found", actor_id),
    };
    let users = db.list_users()?;

    let action = TicketAction::Comment {
        text: text.to_string(),
    };
    let next = lifecycle::transition(&ticket, &action, &actor, &users, Utc::now())?;

    if !db.apply_transition(ticket.status, &next)? {
        bail!(
            "Ticket {} changed state while this command ran; re-read and retry",
            id
        );
    }

    println!("Comment added to {}.", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{create, init::seed_reference_data, transition};
    use tempfile::tempdir;

    fn setup_with_ticket() -> (Database, tempfile::TempDir, String) {
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
        (db, dir, id)
    }

    #[test]
    fn test_comment_appends_in_order() {
        let (mut db, _dir, id) = setup_with_ticket();
        let before = db.get_ticket(&id).unwrap().unwrap().comments.len();

        run(&mut db, &id, "u3", "any update on this?").unwrap();
        run(&mut db, &id, "u2", "looking at it now").unwrap();

        let comments = db.get_ticket(&id).unwrap().unwrap().comments;
        assert_eq!(comments.len(), before + 2);
        assert_eq!(comments[before].body, "any update on this?");
        assert_eq!(comments[before + 1].body, "looking at it now");
    }

    #[test]
    fn test_internal_marker_classifies_comment() {
        let (mut db, _dir, id) = setup_with_ticket();
        run(&mut db, &id, "u2", "INTERNAL: vendor escalation filed").unwrap();

        let comments = db.get_ticket(&id).unwrap().unwrap().comments;
        assert!(comments.last().unwrap().is_internal);
    }

    #[test]
    fn test_empty_comment_is_rejected() {
        let (mut db, _dir, id) = setup_with_ticket();
        assert!(run(&mut db, &id, "u3", "   ").is_err());
    }

    #[test]
    fn test_comment_on_closed_ticket_is_rejected() {
        let (mut db, _dir, id) = setup_with_ticket();
        transition::start(&mut db, &id, "u2").unwrap();
        transition::resolve(&mut db, &id, "u2", None).unwrap();
        transition::confirm(&mut db, &id, "u3").unwrap();

        assert!(run(&mut db, &id, "u3", "one more thing").is_err());
    }
}
