use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::db::Database;
use crate::models::{
    Application, Department, IssueDefinition, Priority, SlaRule, TicketType, User, UserRole,
};

pub fn run(path: &Path, seed: bool) -> Result<()> {
    let data_dir = path.join(".helixdesk");

    if data_dir.exists() {
        println!("Already initialized at {}", path.display());
        if seed {
            let db = Database::open(&data_dir.join("helixdesk.db"))?;
            seed_reference_data(&db)?;
            println!("Reference data refreshed.");
        }
        return Ok(());
    }

    fs::create_dir_all(&data_dir).context("Failed to create .helixdesk directory")?;

    let db_path = data_dir.join("helixdesk.db");
    let db = Database::open(&db_path)?;
    println!("Created {}", data_dir.display());

    if seed {
        seed_reference_data(&db)?;
        println!("Seeded demo reference data.");
    }

    println!("Helixdesk initialized successfully!");
    println!("\nNext steps:");
    println!("  helixdesk users                      # See who can file tickets");
    println!("  helixdesk create u3 IT \"Summary\"     # File a ticket");

    Ok(())
}

/// Demo directory, application catalog, issue catalog, and SLA rule table.
/// Everything is written with INSERT OR REPLACE so re-seeding is safe.
pub fn seed_reference_data(db: &Database) -> Result<()> {
    for app in [
        app("IT", "IT Infrastructure"),
        app("P2P", "P2P System"),
        app("ESHOP", "Eshopaid"),
        app("ERP", "Oracle ERP"),
        app("WEB", "Website / CMS"),
        app("HIS", "Hospital Info System"),
    ] {
        db.upsert_application(&app)?;
    }

    for dept in [
        department("IT-INFRA", "IT Infrastructure"),
        department("FIN", "Finance"),
        department("ACC", "Accounts Payable"),
        department("RPA", "Robotic Procees Automation"),
        department("MKT", "Marketing"),
        department("HIS-OPS", "Hospital Info Systems"),
    ] {
        db.upsert_department(&dept)?;
    }

    for user in [
        user("u1", "Alice Admin", UserRole::Admin, "IT Infrastructure", None),
        user("u2", "Bob Engineer", UserRole::Assignee, "IT Infrastructure", Some("u4")),
        user("u3", "Charlie Requester", UserRole::Requester, "Finance", None),
        user("u4", "Dave Manager", UserRole::Manager, "IT Infrastructure", None),
        user("u5", "Erin Requester", UserRole::Requester, "Marketing", None),
        user("u6", "Frank Engineer", UserRole::Assignee, "IT Infrastructure", Some("u4")),
        user("u7", "Grace Engineer", UserRole::Assignee, "Finance", Some("u4")),
        user("u8", "Heidi Engineer", UserRole::Assignee, "Hospital Info Systems", Some("u4")),
    ] {
        db.upsert_user(&user)?;
    }

    for issue in [
        issue("IT-NET-001", "Network Issue", "IT", Priority::Critical, &["u2", "u6"], Some(4)),
        issue("IT-PRN-001", "Printer/Scanner Issue", "IT", Priority::Medium, &["u6", "u2"], Some(8)),
        issue("IT-EML-001", "Email Delivery Issue", "IT", Priority::High, &["u2"], Some(8)),
        issue("IT-ACC-001", "Account Lockout", "IT", Priority::High, &["u6"], Some(4)),
        issue("P2P-INV-001", "Invoice Processing Failure", "P2P", Priority::High, &["u7"], Some(8)),
        issue("ESHOP-ORD-001", "Order Sync Issue", "ESHOP", Priority::Medium, &["u7"], Some(24)),
        issue("WEB-CMS-001", "Website Content Issue", "WEB", Priority::Low, &["u6"], None),
        issue("HIS-REG-001", "Patient Registration Issue", "HIS", Priority::Critical, &["u8"], Some(4)),
    ] {
        db.upsert_issue(&issue)?;
    }

    for rule in [
        rule(Priority::Critical, TicketType::Incident, 4, true),
        rule(Priority::High, TicketType::Incident, 8, true),
        rule(Priority::Medium, TicketType::Incident, 24, false),
        rule(Priority::Low, TicketType::ServiceRequest, 48, false),
    ] {
        db.upsert_sla_rule(&rule)?;
    }

    Ok(())
}

fn app(id: &str, name: &str) -> Application {
    Application {
        id: id.to_string(),
        name: name.to_string(),
        active: true,
    }
}

fn department(code: &str, name: &str) -> Department {
    Department {
        code: code.to_string(),
        name: name.to_string(),
        active: true,
    }
}

fn user(id: &str, name: &str, role: UserRole, department: &str, manager_id: Option<&str>) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@helix.test", id),
        role,
        department: department.to_string(),
        location: None,
        manager_id: manager_id.map(|m| m.to_string()),
    }
}

fn issue(
    code: &str,
    name: &str,
    app_id: &str,
    priority: Priority,
    assignee_ids: &[&str],
    sla_hours: Option<i64>,
) -> IssueDefinition {
    IssueDefinition {
        code: code.to_string(),
        name: name.to_string(),
        app_id: app_id.to_string(),
        category: TicketType::Incident,
        priority,
        assignee_ids: assignee_ids.iter().map(|s| s.to_string()).collect(),
        sla_hours,
        active: true,
    }
}

fn rule(
    priority: Priority,
    ticket_type: TicketType,
    resolution_hours: i64,
    auto_escalate: bool,
) -> SlaRule {
    SlaRule {
        priority,
        ticket_type,
        resolution_hours,
        auto_escalate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_run_fresh_init() {
        let dir = tempdir().unwrap();
        run(dir.path(), false).unwrap();

        assert!(dir.path().join(".helixdesk").exists());
        assert!(dir.path().join(".helixdesk/helixdesk.db").exists());
    }

    #[test]
    fn test_run_already_initialized() {
        let dir = tempdir().unwrap();
        run(dir.path(), false).unwrap();
        // Second init is a no-op, not an error.
        run(dir.path(), false).unwrap();
    }

    #[test]
    fn test_seed_populates_reference_data() {
        let dir = tempdir().unwrap();
        run(dir.path(), true).unwrap();

        let db = Database::open(&dir.path().join(".helixdesk/helixdesk.db")).unwrap();
        assert_eq!(db.list_applications().unwrap().len(), 6);
        assert_eq!(db.list_users().unwrap().len(), 8);
        assert_eq!(db.list_issues().unwrap().len(), 8);
        assert_eq!(db.list_sla_rules().unwrap().len(), 4);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = tempdir().unwrap();
        run(dir.path(), true).unwrap();
        run(dir.path(), true).unwrap();

        let db = Database::open(&dir.path().join(".helixdesk/helixdesk.db")).unwrap();
        assert_eq!(db.list_users().unwrap().len(), 8);
    }

    #[test]
    fn test_seeded_manager_links_resolve() {
        let dir = tempdir().unwrap();
        run(dir.path(), true).unwrap();

        let db = Database::open(&dir.path().join(".helixdesk/helixdesk.db")).unwrap();
        let bob = db.get_user("u2").unwrap().unwrap();
        let manager = db.get_user(bob.manager_id.as_deref().unwrap()).unwrap();
        assert_eq!(manager.unwrap().role, UserRole::Manager);
    }
}
