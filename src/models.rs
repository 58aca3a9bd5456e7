use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket priority, linked to the SLA rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" => Some(Priority::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Broad ticket category, the second key of the SLA rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketType {
    Incident,
    ServiceRequest,
    Change,
    Other,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Incident => "incident",
            TicketType::ServiceRequest => "service_request",
            TicketType::Change => "change",
            TicketType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "incident" => Some(TicketType::Incident),
            "service_request" => Some(TicketType::ServiceRequest),
            "change" => Some(TicketType::Change),
            "other" => Some(TicketType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle states. Transitions between them are owned exclusively by
/// `engine::lifecycle`; everything else treats the status as read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    New,
    Assigned,
    InProgress,
    PendingUser,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Assigned => "assigned",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::PendingUser => "pending_user",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(TicketStatus::New),
            "assigned" => Some(TicketStatus::Assigned),
            "in_progress" => Some(TicketStatus::InProgress),
            "pending_user" => Some(TicketStatus::PendingUser),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    /// Resolved and Closed tickets no longer count toward an engineer's
    /// active load and stop the SLA clock.
    pub fn is_terminal_for_sla(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Requester,
    Assignee,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Requester => "requester",
            UserRole::Assignee => "assignee",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requester" => Some(UserRole::Requester),
            "assignee" => Some(UserRole::Assignee),
            "manager" => Some(UserRole::Manager),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: String,
    pub location: Option<String>,
    /// Reporting manager, used for escalation visibility and the
    /// manager-of-assignee authorization check.
    pub manager_id: Option<String>,
}

/// An application users file tickets against (e.g. 'IT', 'P2P').
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub code: String,
    pub name: String,
    pub active: bool,
}

/// Catalog entry describing one kind of problem within an application.
/// Edited by administrators; tickets snapshot the code and name at creation
/// so later catalog edits only affect future tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDefinition {
    pub code: String,
    pub name: String,
    pub app_id: String,
    pub category: TicketType,
    pub priority: Priority,
    /// Ordered candidate assignees; the first entry is the primary engineer.
    pub assignee_ids: Vec<String>,
    /// Issue-specific resolution window. When absent the generic SLA rule
    /// table applies.
    pub sla_hours: Option<i64>,
    pub active: bool,
}

/// One row of the static SLA table, keyed by (priority, ticket type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaRule {
    pub priority: Priority,
    pub ticket_type: TicketType,
    pub resolution_hours: i64,
    pub auto_escalate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub name: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub app_id: String,
    pub ticket_type: TicketType,
    /// Snapshot of the issue definition at creation time.
    pub issue_code: String,
    pub issue_name: String,
    pub summary: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub work_started_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Resolution window in hours stamped at creation (issue override or
    /// SLA table fallback).
    pub sla_hours: i64,
    /// 1..=5 escalation pressure indicator. 1 = fresh, 5 = deeply breached.
    pub sla_level: u8,
    pub is_escalated: bool,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
}

impl Ticket {
    /// The user currently responsible, if any.
    pub fn assignee(&self) -> Option<&str> {
        self.assignee_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TicketStatus::New,
            TicketStatus::Assigned,
            TicketStatus::InProgress,
            TicketStatus::PendingUser,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_priority_roundtrip() {
        for p in [
            Priority::Low,
            Priority::Medium,
            Priority::High,
            Priority::Critical,
        ] {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_ticket_type_roundtrip() {
        for t in [
            TicketType::Incident,
            TicketType::ServiceRequest,
            TicketType::Change,
            TicketType::Other,
        ] {
            assert_eq!(TicketType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_role_roundtrip() {
        for r in [
            UserRole::Requester,
            UserRole::Assignee,
            UserRole::Manager,
            UserRole::Admin,
        ] {
            assert_eq!(UserRole::parse(r.as_str()), Some(r));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(TicketStatus::parse("open"), None);
        assert_eq!(Priority::parse("urgent"), None);
        assert_eq!(TicketType::parse(""), None);
    }

    #[test]
    fn test_terminal_for_sla() {
        assert!(TicketStatus::Resolved.is_terminal_for_sla());
        assert!(TicketStatus::Closed.is_terminal_for_sla());
        assert!(!TicketStatus::New.is_terminal_for_sla());
        assert!(!TicketStatus::InProgress.is_terminal_for_sla());
        assert!(!TicketStatus::PendingUser.is_terminal_for_sla());
    }
}
