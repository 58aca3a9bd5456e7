use anyhow::{bail, Result};

use crate::db::Database;
use crate::engine::eligibility;

/// Department-based candidate list for an application's default assignees.
pub fn run(db: &Database, app_id: &str) -> Result<()> {
    let app = match db.get_application(app_id)? {
        Some(a) => a,
        None => bail!("Application '{}' not found", app_id),
    };

    let users = db.list_users()?;
    let eligible = eligibility::eligible_assignees(&app, &users);

    if eligible.is_empty() {
        println!("No eligible assignees for {} ({}).", app.name, app.id);
        return Ok(());
    }

    println!("Eligible assignees for {} ({}):", app.name, app.id);
    for user in eligible {
        println!("  {:<6} {:<20} {:10} {}", user.id, user.name, user.role, user.department);
    }

    Ok(())
}
