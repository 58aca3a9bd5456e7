use anyhow::{bail, Result};
use chrono::Utc;

use crate::db::Database;
use crate::engine::sla;

pub fn run(db: &Database, id: &str) -> Result<()> {
    let ticket = match db.get_ticket(id)? {
        Some(t) => t,
        None => bail!("Ticket {} not found", id),
    };

    println!("Ticket {}: {}", ticket.id, ticket.summary);
    println!("Status: {}", ticket.status);
    println!("Priority: {}", ticket.priority);
    println!("Type: {}", ticket.ticket_type);
    println!("Issue: {} ({})", ticket.issue_name, ticket.issue_code);
    println!("Application: {}", ticket.app_id);
    println!(
        "Requester: {} ({})",
        ticket.requester_name, ticket.requester_id
    );
    match &ticket.assignee_id {
        Some(assignee) => println!("Assignee: {}", assignee),
        None => println!("Assignee: (unassigned)"),
    }
    println!("Created: {}", ticket.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(started) = ticket.work_started_at {
        println!("Work started: {}", started.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(resolved) = ticket.resolved_at {
        println!("Resolved: {}", resolved.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(closed) = ticket.closed_at {
        println!("Closed: {}", closed.format("%Y-%m-%d %H:%M:%S"));
    }

    let rules = db.list_sla_rules()?;
    let standing = sla::evaluate(&ticket, &rules, Utc::now());
    println!(
        "\nSLA: {}h window, level {}, {:.1}h elapsed",
        ticket.sla_hours, standing.sla_level, standing.elapsed_hours
    );
    if standing.breach_hours > 0.0 {
        println!("SLA BREACHED by {:.1}h", standing.breach_hours);
    }
    if ticket.is_escalated || standing.is_escalated {
        println!("ESCALATED");
    }

    if !ticket.description.is_empty() {
        println!("\nDescription:");
        for line in ticket.description.lines() {
            println!("  {}", line);
        }
    }

    if !ticket.comments.is_empty() {
        println!("\nActivity:");
        for comment in &ticket.comments {
            let marker = if comment.is_internal { "*" } else { " " };
            println!(
                " {} [{}] {}: {}",
                marker,
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.author_name,
                comment.body
            );
        }
    }

    if !ticket.attachments.is_empty() {
        println!("\nAttachments:");
        for attachment in &ticket.attachments {
            println!(
                "  {} ({} bytes, {})",
                attachment.name, attachment.size_bytes, attachment.mime_type
            );
        }
    }

    Ok(())
}
