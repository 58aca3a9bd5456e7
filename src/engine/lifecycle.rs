//! Ticket lifecycle: creation and the state machine driving every
//! subsequent mutation.
//!
//! States: New -> Assigned -> InProgress -> (PendingUser) -> Resolved ->
//! Closed, with a Resolved -> InProgress reopening edge. All functions here
//! are pure: they take the current ticket plus read-only reference data and
//! return a successor ticket, so a failed transition leaves the caller's
//! ticket untouched and the store can serialize concurrent writers with an
//! optimistic status check.

use chrono::{DateTime, Utc};

use crate::engine::error::EngineError;
use crate::engine::{assign, matcher, sla};
use crate::models::{
    Attachment, Comment, IssueDefinition, Priority, SlaRule, Ticket, TicketStatus, TicketType,
    User, UserRole,
};

/// Marker substrings that classify a log entry as internal. Content-based,
/// case-sensitive, matching the log lines the engine itself writes.
const INTERNAL_MARKERS: [&str; 2] = ["INTERNAL", "SYSTEM"];

/// Placeholder when a resolution is submitted without remarks.
const NO_REMARKS: &str = "No detailed remarks provided.";

/// A new-ticket request as it arrives from the UI/AI triage flow.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub requester_id: String,
    pub requester_name: String,
    pub app_id: String,
    pub summary: String,
    pub description: String,
    /// Free-text summary produced by the AI triage chat; may be empty.
    pub ai_summary: String,
    /// Explicit overrides; default to the matched issue's category/priority.
    pub ticket_type: Option<TicketType>,
    pub priority: Option<Priority>,
    pub attachments: Vec<Attachment>,
}

/// Outcome of ticket creation: the ticket plus the assignment decision
/// explanation for the caller to surface.
#[derive(Debug, Clone)]
pub struct CreatedTicket {
    pub ticket: Ticket,
    pub assignment_reason: String,
}

/// Actions that drive state transitions.
#[derive(Debug, Clone)]
pub enum TicketAction {
    StartWork,
    Resolve { note: String },
    Confirm,
    Reject { reason: String },
    Reopen,
    Transfer { to_user_id: String },
    Comment { text: String },
}

impl TicketAction {
    /// Verb phrase for error messages.
    pub fn verb(&self) -> &'static str {
        match self {
            TicketAction::StartWork => "start work on",
            TicketAction::Resolve { .. } => "resolve",
            TicketAction::Confirm => "confirm",
            TicketAction::Reject { .. } => "reject",
            TicketAction::Reopen => "reopen",
            TicketAction::Transfer { .. } => "transfer",
            TicketAction::Comment { .. } => "comment on",
        }
    }
}

/// Create a ticket from a triage request: resolve the issue definition via
/// the matcher, pick an owner via the load balancer, stamp SLA parameters,
/// and write the initial activity log.
///
/// `id` is allocated by the store; the engine stays pure. `issues` is the
/// full catalog; inactive definitions and other applications are filtered
/// out here.
#[allow(clippy::too_many_arguments)]
pub fn create_ticket(
    id: String,
    req: &CreateTicketRequest,
    issues: &[IssueDefinition],
    sla_rules: &[SlaRule],
    tickets: &[Ticket],
    users: &[User],
    now: DateTime<Utc>,
) -> Result<CreatedTicket, EngineError> {
    if req.summary.trim().is_empty() {
        return Err(EngineError::Validation("summary is required".into()));
    }

    let candidates: Vec<IssueDefinition> = issues
        .iter()
        .filter(|i| i.app_id == req.app_id && i.active)
        .cloned()
        .collect();

    let issue = matcher::best_match(&candidates, &req.description, &req.ai_summary)
        .ok_or_else(|| EngineError::not_found("active issue definitions for application", &req.app_id))?;

    let (assignee, assignment_reason) = assign::select_assignee(issue, tickets, users);

    let ticket_type = req.ticket_type.unwrap_or(issue.category);
    let priority = req.priority.unwrap_or(issue.priority);
    let sla_hours = sla::effective_window_hours(issue.sla_hours, sla_rules, priority, ticket_type);

    let mut comments = vec![log_comment(
        &req.requester_id,
        &req.requester_name,
        "Ticket created and initialized. Status set to new.".to_string(),
        now,
    )];
    comments.push(system_comment(
        format!("SYSTEM TRIAGE: {}", assignment_reason),
        now,
    ));

    let ticket = Ticket {
        id,
        requester_id: req.requester_id.clone(),
        requester_name: req.requester_name.clone(),
        app_id: req.app_id.clone(),
        ticket_type,
        issue_code: issue.code.clone(),
        issue_name: issue.name.clone(),
        summary: req.summary.clone(),
        description: req.description.clone(),
        status: TicketStatus::New,
        priority,
        assignee_id: assignee.map(|u| u.id.clone()),
        created_at: now,
        assigned_at: None,
        updated_at: now,
        work_started_at: None,
        resolved_at: None,
        closed_at: None,
        sla_hours,
        sla_level: 1,
        is_escalated: false,
        comments,
        attachments: req.attachments.clone(),
    };

    Ok(CreatedTicket {
        ticket,
        assignment_reason,
    })
}

/// Apply one action to a ticket, returning the successor ticket.
///
/// Fails as `InvalidTransition` when the action is not legal from the
/// current state, `Unauthorized` when the actor lacks the role precondition,
/// and `Validation` when a required payload field is missing. No transition
/// is permitted on a Closed ticket.
pub fn transition(
    ticket: &Ticket,
    action: &TicketAction,
    actor: &User,
    users: &[User],
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status == TicketStatus::Closed {
        return Err(EngineError::invalid_transition(
            action.verb(),
            ticket.status,
        ));
    }

    match action {
        TicketAction::StartWork => start_work(ticket, actor, users, now),
        TicketAction::Resolve { note } => resolve(ticket, actor, users, note, now),
        TicketAction::Confirm => confirm(ticket, actor, users, now),
        TicketAction::Reject { reason } => reject(ticket, actor, users, reason, now),
        TicketAction::Reopen => reopen(ticket, actor, users, now),
        TicketAction::Transfer { to_user_id } => transfer(ticket, actor, users, to_user_id, now),
        TicketAction::Comment { text } => comment(ticket, actor, text, now),
    }
}

fn start_work(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    let startable = matches!(ticket.status, TicketStatus::New | TicketStatus::Assigned)
        && ticket.work_started_at.is_none();
    if !startable {
        return Err(EngineError::invalid_transition("start work on", ticket.status));
    }
    require_worker(ticket, actor, users, "start work on")?;

    let mut next = ticket.clone();
    next.status = TicketStatus::InProgress;
    next.work_started_at = Some(now);
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!("{} started working on this ticket.", actor.name),
        now,
    ));
    Ok(next)
}

fn resolve(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    note: &str,
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status != TicketStatus::InProgress {
        return Err(EngineError::invalid_transition("resolve", ticket.status));
    }
    require_worker(ticket, actor, users, "resolve")?;

    let note = if note.trim().is_empty() {
        NO_REMARKS
    } else {
        note.trim()
    };

    let mut next = ticket.clone();
    next.status = TicketStatus::Resolved;
    next.resolved_at = Some(now);
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!("MARKED AS RESOLVED by {}: {}", actor.name, note),
        now,
    ));
    next.comments.push(system_comment(
        format!(
            "SYSTEM NOTIFICATION: Email sent to user {} regarding resolution.",
            ticket.requester_name
        ),
        now,
    ));
    Ok(next)
}

fn confirm(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status != TicketStatus::Resolved {
        return Err(EngineError::invalid_transition("confirm", ticket.status));
    }
    require_closer(ticket, actor, users, "confirm")?;

    let mut next = ticket.clone();
    next.status = TicketStatus::Closed;
    next.closed_at = Some(now);
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!("Ticket closed by {} (Confirmation).", actor.name),
        now,
    ));
    Ok(next)
}

fn reject(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    reason: &str,
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status != TicketStatus::Resolved {
        return Err(EngineError::invalid_transition("reject", ticket.status));
    }
    require_closer(ticket, actor, users, "reject")?;
    if reason.trim().is_empty() {
        return Err(EngineError::Validation(
            "a rejection reason is required to reopen the ticket".into(),
        ));
    }

    let assignee_name = ticket
        .assignee()
        .and_then(|id| users.iter().find(|u| u.id == id))
        .map(|u| u.name.clone())
        .unwrap_or_else(|| "Unassigned".to_string());

    let mut next = ticket.clone();
    next.status = TicketStatus::InProgress;
    next.resolved_at = None;
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!(
            "RESOLUTION REJECTED / REOPENED by {}. Remarks: {}",
            actor.name,
            reason.trim()
        ),
        now,
    ));
    next.comments.push(system_comment(
        format!(
            "SYSTEM NOTIFICATION: Reopen notification sent to assignee: {}.",
            assignee_name
        ),
        now,
    ));
    Ok(next)
}

fn reopen(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status != TicketStatus::Resolved {
        return Err(EngineError::invalid_transition("reopen", ticket.status));
    }
    require_worker(ticket, actor, users, "reopen")?;

    let mut next = ticket.clone();
    next.status = TicketStatus::InProgress;
    next.resolved_at = None;
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!("Ticket reopened by {}.", actor.name),
        now,
    ));
    Ok(next)
}

fn transfer(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    to_user_id: &str,
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if ticket.status == TicketStatus::Resolved {
        return Err(EngineError::invalid_transition("transfer", ticket.status));
    }
    require_worker(ticket, actor, users, "transfer")?;

    let target = users
        .iter()
        .find(|u| u.id == to_user_id)
        .ok_or_else(|| EngineError::not_found("user", to_user_id))?;
    if !matches!(target.role, UserRole::Assignee | UserRole::Manager) {
        return Err(EngineError::Validation(format!(
            "{} cannot receive tickets (role: {})",
            target.name, target.role
        )));
    }
    if ticket.assignee() == Some(to_user_id) {
        return Err(EngineError::Validation(
            "ticket is already assigned to that user".into(),
        ));
    }

    let mut next = ticket.clone();
    next.assignee_id = Some(target.id.clone());
    next.assigned_at = Some(now);
    next.updated_at = now;
    next.comments.push(log_comment(
        &actor.id,
        &actor.name,
        format!("Ticket transferred from {} to {}.", actor.name, target.name),
        now,
    ));
    Ok(next)
}

fn comment(
    ticket: &Ticket,
    actor: &User,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Ticket, EngineError> {
    if text.trim().is_empty() {
        return Err(EngineError::Validation("comment text is required".into()));
    }

    let mut next = ticket.clone();
    next.updated_at = now;
    next.comments
        .push(log_comment(&actor.id, &actor.name, text.to_string(), now));
    Ok(next)
}

/// Assignee, the assignee's reporting manager, anyone with the Manager role,
/// or an admin.
fn require_worker(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    verb: &str,
) -> Result<(), EngineError> {
    if can_work(ticket, actor, users) {
        Ok(())
    } else {
        Err(EngineError::unauthorized(actor.name.clone(), verb))
    }
}

/// Requester, manager, or admin: the parties who can accept or reject a
/// resolution.
fn require_closer(
    ticket: &Ticket,
    actor: &User,
    users: &[User],
    verb: &str,
) -> Result<(), EngineError> {
    let is_requester = actor.id == ticket.requester_id;
    if is_requester || is_manager_for(ticket, actor, users) || actor.role == UserRole::Admin {
        Ok(())
    } else {
        Err(EngineError::unauthorized(actor.name.clone(), verb))
    }
}

fn can_work(ticket: &Ticket, actor: &User, users: &[User]) -> bool {
    ticket.assignee() == Some(actor.id.as_str())
        || is_manager_for(ticket, actor, users)
        || actor.role == UserRole::Admin
}

fn is_manager_for(ticket: &Ticket, actor: &User, users: &[User]) -> bool {
    if actor.role == UserRole::Manager {
        return true;
    }
    // Direct reporting manager of the current assignee.
    ticket
        .assignee()
        .and_then(|id| users.iter().find(|u| u.id == id))
        .and_then(|assignee| assignee.manager_id.as_deref())
        .map(|manager_id| manager_id == actor.id)
        .unwrap_or(false)
}

fn log_comment(author_id: &str, author_name: &str, body: String, now: DateTime<Utc>) -> Comment {
    let is_internal = INTERNAL_MARKERS.iter().any(|m| body.contains(m));
    Comment {
        id: 0, // assigned by the store on persist
        author_id: author_id.to_string(),
        author_name: author_name.to_string(),
        body,
        is_internal,
        created_at: now,
    }
}

fn system_comment(body: String, now: DateTime<Utc>) -> Comment {
    log_comment("system", "System", body, now)
}
