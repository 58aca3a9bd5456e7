use anyhow::{bail, Result};

use crate::db::Database;
use crate::engine::{assign, matcher};

/// Dry-run of the intake pipeline: show which catalog issue a description
/// would match and who would be assigned, without creating anything.
pub fn run(db: &Database, app_id: &str, description: &str, ai_summary: Option<&str>) -> Result<()> {
    let app = match db.get_application(app_id)? {
        Some(a) => a,
        None => bail!("Application '{}' not found", app_id),
    };

    let issues = db.list_issues()?;
    let candidates: Vec<_> = issues
        .iter()
        .filter(|i| i.app_id == app.id && i.active)
        .cloned()
        .collect();

    let matched = matcher::best_match(&candidates, description, ai_summary.unwrap_or(""));
    let issue = match matched {
        Some(i) => i,
        None => {
            println!("No matching issue for application {}.", app.id);
            return Ok(());
        }
    };

    println!("Matched issue: {} ({})", issue.name, issue.code);
    println!("  Category: {}, priority: {}", issue.category, issue.priority);
    if let Some(hours) = issue.sla_hours {
        println!("  SLA override: {}h", hours);
    }

    let tickets = db.list_tickets(None, None, false)?;
    let users = db.list_users()?;
    let (assignee, reason) = assign::select_assignee(issue, &tickets, &users);
    match assignee {
        Some(user) => println!("Would assign: {} ({})", user.name, user.id),
        None => println!("Would assign: (nobody)"),
    }
    println!("  Reason: {}", reason);

    Ok(())
}
