//! Application-to-department assignee eligibility.
//!
//! Used when an administrator edits an issue definition to populate its
//! default-assignee candidate list; never evaluated per-ticket. The matching
//! is an explicit keyword heuristic, not a generalized fuzzy matcher: short
//! stems ("robotic", "infra", "account") tolerate the near-miss spellings
//! that appear in real department data.

use crate::models::{Application, User, UserRole};

/// Users eligible to be listed as default assignees for the application.
///
/// Filters to assignee-capable roles, then accepts a user when either the
/// lowercase app id/name and department contain one another (bidirectional
/// substring), or one of the fixed domain keyword families links them.
pub fn eligible_assignees<'a>(app: &Application, users: &'a [User]) -> Vec<&'a User> {
    let app_id = app.id.to_lowercase();
    let app_name = app.name.to_lowercase();

    users
        .iter()
        .filter(|u| matches!(u.role, UserRole::Assignee | UserRole::Manager))
        .filter(|u| {
            let dept = u.department.to_lowercase();

            let direct = dept.contains(&app_id)
                || app_id.contains(&dept)
                || dept.contains(&app_name)
                || app_name.contains(&dept);

            // Robotic process automation family. Stems chosen to survive
            // typos like 'Procees Automation'.
            let rpa = (app_id.contains("rpa")
                || app_name.contains("robotic")
                || app_name.contains("automation")
                || app_name.contains("rpa"))
                && (dept.contains("robotic")
                    || dept.contains("automation")
                    || dept.contains("rpa"));

            // Finance-owned business systems: P2P and Eshopaid route to
            // finance/accounts departments.
            let finance = (app_id == "p2p"
                || app_id == "eshopaid"
                || app_name.contains("finance")
                || app_name.contains("p2p")
                || app_name.contains("eshopaid"))
                && (dept.contains("finance") || dept.contains("accounts"));

            // Hospital information system.
            let his = (app_id == "his" || app_name.contains("his"))
                && (dept.contains("his") || dept.contains("hospital"));

            let website = (app_id.contains("website")
                || app_name.contains("website")
                || app_name.contains("cms"))
                && (dept.contains("website") || dept.contains("marketing"));

            let it = (app_id == "it" || app_name.contains("infrastructure"))
                && (dept.contains("it") || dept.contains("infra"));

            direct || rpa || finance || his || website || it
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, name: &str) -> Application {
        Application {
            id: id.to_string(),
            name: name.to_string(),
            active: true,
        }
    }

    fn user(id: &str, role: UserRole, department: &str) -> User {
        User {
            id: id.to_string(),
            name: format!("User {}", id),
            email: format!("{}@helix.test", id),
            role,
            department: department.to_string(),
            location: None,
            manager_id: None,
        }
    }

    #[test]
    fn test_requesters_and_admins_are_never_eligible() {
        let users = vec![
            user("r1", UserRole::Requester, "IT Infrastructure"),
            user("a1", UserRole::Admin, "IT Infrastructure"),
        ];
        let eligible = eligible_assignees(&app("IT", "IT Infrastructure"), &users);
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_direct_department_match() {
        let users = vec![
            user("e1", UserRole::Assignee, "IT Infrastructure"),
            user("e2", UserRole::Assignee, "Finance"),
        ];
        let eligible = eligible_assignees(&app("IT", "IT Infrastructure"), &users);
        let ids: Vec<&str> = eligible.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["e1"]);
    }

    #[test]
    fn test_managers_are_assignee_capable() {
        let users = vec![user("m1", UserRole::Manager, "IT Infrastructure")];
        let eligible = eligible_assignees(&app("IT", "IT Infrastructure"), &users);
        assert_eq!(eligible.len(), 1);
    }

    #[test]
    fn test_finance_family_routes_p2p() {
        let users = vec![
            user("f1", UserRole::Assignee, "Finance"),
            user("f2", UserRole::Assignee, "Accounts Payable"),
            user("i1", UserRole::Assignee, "IT Infrastructure"),
        ];
        let eligible = eligible_assignees(&app("P2P", "P2P System"), &users);
        let ids: Vec<&str> = eligible.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
    }

    #[test]
    fn test_rpa_family_tolerates_misspelled_department() {
        let users = vec![user("r1", UserRole::Assignee, "Robotic Procees Automation")];
        let eligible = eligible_assignees(&app("RPA", "Robotic Process Automation"), &users);
        assert_eq!(eligible.len(), 1);
    }

    #[test]
    fn test_his_family() {
        let users = vec![
            user("h1", UserRole::Assignee, "Hospital Info Systems"),
            user("w1", UserRole::Assignee, "Website Team"),
        ];
        let eligible = eligible_assignees(&app("HIS", "Hospital Info System"), &users);
        let ids: Vec<&str> = eligible.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["h1"]);
    }

    #[test]
    fn test_website_family_includes_marketing() {
        let users = vec![user("m1", UserRole::Assignee, "Marketing")];
        let eligible = eligible_assignees(&app("WEB", "Website / CMS"), &users);
        assert_eq!(eligible.len(), 1);
    }

    #[test]
    fn test_it_family_matches_infra_stem() {
        let users = vec![user("i1", UserRole::Assignee, "Infra Services")];
        let eligible = eligible_assignees(&app("IT", "IT Infrastructure"), &users);
        assert_eq!(eligible.len(), 1);
    }

    #[test]
    fn test_unrelated_department_is_excluded() {
        let users = vec![user("x1", UserRole::Assignee, "Human Resources")];
        let eligible = eligible_assignees(&app("P2P", "P2P System"), &users);
        assert!(eligible.is_empty());
    }
}
