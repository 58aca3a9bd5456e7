//! Load-balanced assignee selection.
//!
//! New work is routed to the least-busy engineer on the issue's candidate
//! list. The selector reads ticket loads at a point in time; under concurrent
//! ticket creation two selections may transiently pick the same "least
//! loaded" engineer. Balance is eventual, not exact, and that is accepted.

use crate::models::{IssueDefinition, Ticket, User};

/// Count of tickets currently assigned to `user_id` that are neither
/// Resolved nor Closed.
pub fn active_load(tickets: &[Ticket], user_id: &str) -> usize {
    tickets
        .iter()
        .filter(|t| t.assignee() == Some(user_id) && !t.status.is_terminal_for_sla())
        .count()
}

/// Pick the least-loaded candidate from the issue's ordered assignee list.
///
/// Ties resolve to the first candidate in `assignee_ids` order, so the
/// primary (first-listed) engineer wins whenever loads are level. The reason
/// string explains the decision for the activity log. A winner id with no
/// matching user record yields `(None, reason)` rather than an error; a
/// dangling assignee id is a catalog defect the caller can surface without
/// failing the whole triage flow.
pub fn select_assignee<'a>(
    issue: &IssueDefinition,
    tickets: &[Ticket],
    users: &'a [User],
) -> (Option<&'a User>, String) {
    if issue.assignee_ids.is_empty() {
        return (None, "No engineers defined for this issue type.".to_string());
    }

    let loads: Vec<(&str, usize)> = issue
        .assignee_ids
        .iter()
        .map(|id| (id.as_str(), active_load(tickets, id)))
        .collect();

    // Strict minimum scan keeps the tie-break stable on list order.
    let mut winner = loads[0];
    for candidate in &loads[1..] {
        if candidate.1 < winner.1 {
            winner = *candidate;
        }
    }

    let user = users.iter().find(|u| u.id == winner.0);

    let primary_id = loads[0].0;
    let primary_load = loads[0].1;

    let reason = if winner.0 != primary_id && primary_load > 0 {
        let primary_name = users
            .iter()
            .find(|u| u.id == primary_id)
            .map(|u| u.name.as_str())
            .unwrap_or(primary_id);
        format!(
            "Primary engineer ({}) is currently busy with {} active tasks. Re-routed for faster resolution.",
            primary_name, primary_load
        )
    } else {
        let winner_name = user.map(|u| u.name.as_str()).unwrap_or(winner.0);
        format!("Assigned to {} based on current availability.", winner_name)
    };

    (user, reason)
}
