use anyhow::Result;

use crate::db::Database;

pub fn run(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users. Run 'helixdesk init --seed' for demo data.");
        return Ok(());
    }

    for user in users {
        let manager = user.manager_id.as_deref().unwrap_or("-");
        println!(
            "{:<6} {:<20} {:10} {:<28} mgr:{}",
            user.id, user.name, user.role, user.department, manager
        );
    }

    Ok(())
}
