use anyhow::Result;

use crate::db::Database;

pub fn run(db: &Database, app_id: Option<&str>) -> Result<()> {
    let issues = db.list_issues()?;
    let issues: Vec<_> = match app_id {
        Some(app) => issues.into_iter().filter(|i| i.app_id == app).collect(),
        None => issues,
    };

    if issues.is_empty() {
        println!("No issue definitions found.");
        return Ok(());
    }

    for issue in issues {
        let sla = issue
            .sla_hours
            .map(|h| format!("{}h", h))
            .unwrap_or_else(|| "-".to_string());
        let inactive = if issue.active { "" } else { " (inactive)" };
        println!(
            "{:<14} {:<30} {:6} {:8} {:>5}  {}{}",
            issue.code,
            issue.name,
            issue.app_id,
            issue.priority,
            sla,
            issue.assignee_ids.join(","),
            inactive
        );
    }

    Ok(())
}
