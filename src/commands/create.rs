use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::engine::lifecycle::{self, CreateTicketRequest};
use crate::models::{Attachment, Priority, TicketType};

#[allow(clippy::too_many_arguments)]
pub fn run(
    db: &mut Database,
    requester_id: &str,
    app_id: &str,
    summary: &str,
    description: Option<&str>,
    ai_summary: Option<&str>,
    ticket_type: Option<&str>,
    priority: Option<&str>,
    attach: &[PathBuf],
) -> Result<()> {
    let requester = match db.get_user(requester_id)? {
        Some(u) => u,
        None => bail!("User '{}' not found", requester_id),
    };

    let ticket_type = match ticket_type {
        Some(s) => match TicketType::parse(s) {
            Some(t) => Some(t),
            None => bail!("Invalid ticket type: {}", s),
        },
        None => None,
    };
    let priority = match priority {
        Some(s) => match Priority::parse(s) {
            Some(p) => Some(p),
            None => bail!("Invalid priority: {}", s),
        },
        None => None,
    };

    let attachments = attach
        .iter()
        .map(|p| attachment_from_path(p))
        .collect::<Result<Vec<_>>>()?;

    let req = CreateTicketRequest {
        requester_id: requester.id.clone(),
        requester_name: requester.name.clone(),
        app_id: app_id.to_string(),
        summary: summary.to_string(),
        description: description.unwrap_or(summary).to_string(),
        ai_summary: ai_summary.unwrap_or("").to_string(),
        ticket_type,
        priority,
        attachments,
    };

    let issues = db.list_issues()?;
    let sla_rules = db.list_sla_rules()?;
    let tickets = db.list_tickets(None, None, false)?;
    let users = db.list_users()?;

    let id = db.next_ticket_id()?;
    let created = lifecycle::create_ticket(id, &req, &issues, &sla_rules, &tickets, &users, Utc::now())?;
    db.insert_ticket(&created.ticket)?;

    let t = &created.ticket;
    println!("Created ticket {}: {}", t.id, t.summary);
    println!(
        "  Issue: {} ({}), priority {}, SLA {}h",
        t.issue_name, t.issue_code, t.priority, t.sla_hours
    );
    match &t.assignee_id {
        Some(assignee) => println!("  Assignee: {}", assignee),
        None => println!("  Assignee: (unassigned)"),
    }
    println!("  Routing: {}", created.assignment_reason);
    if !t.attachments.is_empty() {
        println!("  Attachments: {}", t.attachments.len());
    }

    Ok(())
}

fn attachment_from_path(path: &Path) -> Result<Attachment> {
    let meta = fs::metadata(path)
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;
    if !meta.is_file() {
        bail!("Attachment {} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Attachment {
        id: 0,
        mime_type: mime_for(&name).to_string(),
        size_bytes: meta.len() as i64,
        url: format!("file://{}", path.display()),
        name,
    })
}

fn mime_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|e| e.to_ascii_lowercase()) {
        Some(ext) => match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "pdf" => "application/pdf",
            "txt" | "log" => "text/plain",
            "csv" => "text/csv",
            "json" => "application/json",
            _ => "application/octet-stream",
        },
        None => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::seed_reference_data;
    use crate::models::TicketStatus;
    use tempfile::tempdir;

    fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        seed_reference_data(&db).unwrap();
        (db, dir)
    }

    #[test]
    fn test_create_routes_to_matched_issue() {
        let (mut db, _dir) = setup();
        run(
            &mut db,
            "u3",
            "IT",
            "Network down on floor 3",
            Some("the network keeps dropping every few minutes"),
            None,
            None,
            None,
            &[],
        )
        .unwrap();

        let tickets = db.list_tickets(None, None, false).unwrap();
        assert_eq!(tickets.len(), 1);
        let t = &tickets[0];
        assert_eq!(t.issue_code, "IT-NET-001");
        assert_eq!(t.status, TicketStatus::New);
        assert!(t.assignee_id.is_some());
    }

    #[test]
    fn test_create_rejects_unknown_requester() {
        let (mut db, _dir) = setup();
        let result = run(&mut db, "nobody", "IT", "help", None, None, None, None, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_rejects_bad_priority() {
        let (mut db, _dir) = setup();
        let result = run(
            &mut db,
            "u3",
            "IT",
            "help",
            None,
            None,
            None,
            Some("urgent-ish"),
            &[],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_priority_override_is_respected() {
        let (mut db, _dir) = setup();
        run(
            &mut db,
            "u3",
            "IT",
            "printer jammed again",
            None,
            None,
            None,
            Some("low"),
            &[],
        )
        .unwrap();

        let tickets = db.list_tickets(None, None, false).unwrap();
        assert_eq!(tickets[0].priority, Priority::Low);
    }

    #[test]
    fn test_attachment_is_captured() {
        let (mut db, dir) = setup();
        let file = dir.path().join("screenshot.png");
        fs::write(&file, b"not really a png").unwrap();

        run(
            &mut db,
            "u3",
            "IT",
            "Network down",
            Some("the network keeps dropping"),
            None,
            None,
            None,
            &[file.clone()],
        )
        .unwrap();

        let ticket = &db.list_tickets(None, None, false).unwrap()[0];
        assert_eq!(ticket.attachments.len(), 1);
        let a = &ticket.attachments[0];
        assert_eq!(a.name, "screenshot.png");
        assert_eq!(a.mime_type, "image/png");
        assert_eq!(a.size_bytes, 16);
        assert!(a.url.ends_with("screenshot.png"));
    }

    #[test]
    fn test_missing_attachment_fails_before_any_write() {
        let (mut db, dir) = setup();
        let result = run(
            &mut db,
            "u3",
            "IT",
            "Network down",
            None,
            None,
            None,
            None,
            &[dir.path().join("does-not-exist.log")],
        );
        assert!(result.is_err());
        assert!(db.list_tickets(None, None, false).unwrap().is_empty());
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(mime_for("trace.log"), "text/plain");
        assert_eq!(mime_for("report.PDF"), "application/pdf");
        assert_eq!(mime_for("mystery"), "application/octet-stream");
    }
}
