//! SLA windows, breach detection, and escalation pressure.
//!
//! The rule table is static configuration; the engine only looks it up. An
//! issue definition may carry its own `sla_hours`, which takes precedence
//! over the generic table at ticket creation.

use chrono::{DateTime, Utc};

use crate::models::{Priority, SlaRule, Ticket, TicketType};

/// SLA pressure thresholds as a fraction of the resolution window.
/// Level 1 below half the window, level 5 once the breach passes half the
/// window again. Monotone in elapsed time.
const LEVEL_THRESHOLDS: [(f64, u8); 4] = [(0.5, 1), (0.75, 2), (1.0, 3), (1.5, 4)];

/// Point-in-time SLA standing for one ticket. Pure derivation; nothing here
/// is persisted except by an explicit caller decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaStanding {
    /// 1..=5 escalation pressure. 1 = fresh, 5 = deeply breached.
    pub sla_level: u8,
    /// True when the matching rule auto-escalates, the window is breached,
    /// and the ticket is still open. Sticky: an already-escalated ticket
    /// never de-escalates.
    pub is_escalated: bool,
    /// Hours past the resolution window; 0.0 when inside the window.
    pub breach_hours: f64,
    /// Creation-to-resolution clock (to now for open tickets).
    pub elapsed_hours: f64,
    /// Work-started-to-resolution stopwatch, when work has started.
    pub in_progress_hours: Option<f64>,
}

/// Generic resolution window for (priority, ticket type), from the rule
/// table. `None` when no rule covers the pair.
pub fn resolution_window_hours(
    rules: &[SlaRule],
    priority: Priority,
    ticket_type: TicketType,
) -> Option<i64> {
    rules
        .iter()
        .find(|r| r.priority == priority && r.ticket_type == ticket_type)
        .map(|r| r.resolution_hours)
}

/// The window stamped on a new ticket: the issue-specific override when
/// present, otherwise the rule table, otherwise a conservative default.
pub fn effective_window_hours(
    issue_sla_hours: Option<i64>,
    rules: &[SlaRule],
    priority: Priority,
    ticket_type: TicketType,
) -> i64 {
    issue_sla_hours
        .or_else(|| resolution_window_hours(rules, priority, ticket_type))
        .unwrap_or(DEFAULT_WINDOW_HOURS)
}

/// Fallback window when neither the issue nor the rule table covers the
/// ticket. Matches the widest seeded rule.
pub const DEFAULT_WINDOW_HOURS: i64 = 48;

/// Evaluate a ticket's SLA standing at `now`.
///
/// The elapsed clock runs from `created_at` to `resolved_at`/`closed_at` once
/// the ticket reaches a terminal-for-SLA state, otherwise to `now`. Safe to
/// call inline on read and from the periodic sweep; evaluating an
/// already-escalated ticket again is a no-op on the flag.
pub fn evaluate(ticket: &Ticket, rules: &[SlaRule], now: DateTime<Utc>) -> SlaStanding {
    let end = clock_end(ticket, now);
    let elapsed_hours = hours_between(ticket.created_at, end);
    let in_progress_hours = ticket
        .work_started_at
        .map(|started| hours_between(started, end));

    let window = ticket.sla_hours as f64;
    let breach_hours = if window > 0.0 && elapsed_hours > window {
        elapsed_hours - window
    } else {
        0.0
    };

    let auto_escalate = rules
        .iter()
        .find(|r| r.priority == ticket.priority && r.ticket_type == ticket.ticket_type)
        .map(|r| r.auto_escalate)
        .unwrap_or(false);

    let is_escalated = ticket.is_escalated
        || (auto_escalate && breach_hours > 0.0 && !ticket.status.is_terminal_for_sla());

    SlaStanding {
        sla_level: level_for(elapsed_hours, window),
        is_escalated,
        breach_hours,
        elapsed_hours,
        in_progress_hours,
    }
}

fn clock_end(ticket: &Ticket, now: DateTime<Utc>) -> DateTime<Utc> {
    if ticket.status.is_terminal_for_sla() {
        ticket.resolved_at.or(ticket.closed_at).unwrap_or(now)
    } else {
        now
    }
}

fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let secs = end.signed_duration_since(start).num_seconds();
    (secs.max(0) as f64) / 3600.0
}

fn level_for(elapsed_hours: f64, window_hours: f64) -> u8 {
    if window_hours <= 0.0 {
        return 1;
    }
    let ratio = elapsed_hours / window_hours;
    for (threshold, level) in LEVEL_THRESHOLDS {
        if ratio < threshold {
            return level;
        }
    }
    5
}
