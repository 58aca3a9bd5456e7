use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::models::{
    Application, Attachment, Comment, Department, IssueDefinition, Priority, SlaRule, Ticket,
    TicketStatus, TicketType, User, UserRole,
};

const SCHEMA_VERSION: i32 = 1;

/// First ticket number handed out by the sequence; tickets read as TKT-1000,
/// TKT-1001, ...
const TICKET_SEQ_START: i64 = 1000;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM pragma_user_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                -- Directory of people who can file, work, or manage tickets
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    role TEXT NOT NULL,
                    department TEXT NOT NULL,
                    location TEXT,
                    manager_id TEXT
                );

                -- Static reference configuration
                CREATE TABLE IF NOT EXISTS departments (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    active INTEGER NOT NULL DEFAULT 1
                );

                CREATE TABLE IF NOT EXISTS applications (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    active INTEGER NOT NULL DEFAULT 1
                );

                -- Issue catalog; assignee_ids is an ordered JSON array
                CREATE TABLE IF NOT EXISTS issues (
                    code TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    app_id TEXT NOT NULL,
                    category TEXT NOT NULL,
                    priority TEXT NOT NULL,
                    assignee_ids TEXT NOT NULL,
                    sla_hours INTEGER,
                    active INTEGER NOT NULL DEFAULT 1
                );

                CREATE TABLE IF NOT EXISTS sla_rules (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    priority TEXT NOT NULL,
                    ticket_type TEXT NOT NULL,
                    resolution_hours INTEGER NOT NULL,
                    auto_escalate INTEGER NOT NULL,
                    UNIQUE (priority, ticket_type)
                );

                -- Core tickets table
                CREATE TABLE IF NOT EXISTS tickets (
                    id TEXT PRIMARY KEY,
                    requester_id TEXT NOT NULL,
                    requester_name TEXT NOT NULL,
                    app_id TEXT NOT NULL,
                    ticket_type TEXT NOT NULL,
                    issue_code TEXT NOT NULL,
                    issue_name TEXT NOT NULL,
                    summary TEXT NOT NULL,
                    description TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'new',
                    priority TEXT NOT NULL,
                    assignee_id TEXT,
                    created_at TEXT NOT NULL,
                    assigned_at TEXT,
                    updated_at TEXT NOT NULL,
                    work_started_at TEXT,
                    resolved_at TEXT,
                    closed_at TEXT,
                    sla_hours INTEGER NOT NULL,
                    sla_level INTEGER NOT NULL DEFAULT 1,
                    is_escalated INTEGER NOT NULL DEFAULT 0
                );

                -- Append-only activity log
                CREATE TABLE IF NOT EXISTS comments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ticket_id TEXT NOT NULL,
                    author_id TEXT NOT NULL,
                    author_name TEXT NOT NULL,
                    body TEXT NOT NULL,
                    is_internal INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
                );

                CREATE TABLE IF NOT EXISTS attachments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ticket_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    size_bytes INTEGER NOT NULL,
                    mime_type TEXT NOT NULL,
                    url TEXT NOT NULL,
                    FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
                );

                -- Ticket number sequence
                CREATE TABLE IF NOT EXISTS meta (
                    key TEXT PRIMARY KEY,
                    value INTEGER NOT NULL
                );

                -- Indexes
                CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
                CREATE INDEX IF NOT EXISTS idx_tickets_assignee ON tickets(assignee_id);
                CREATE INDEX IF NOT EXISTS idx_comments_ticket ON comments(ticket_id);
                CREATE INDEX IF NOT EXISTS idx_attachments_ticket ON attachments(ticket_id);
                CREATE INDEX IF NOT EXISTS idx_issues_app ON issues(app_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(())
    }

    // Users
    pub fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (id, name, email, role, department, location, manager_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.name,
                user.email,
                user.role.as_str(),
                user.department,
                user.location,
                user.manager_id
            ],
        )?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, role, department, location, manager_id FROM users WHERE id = ?1",
        )?;
        let user = stmt.query_row([id], map_user).ok();
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, role, department, location, manager_id FROM users ORDER BY id",
        )?;
        let users = stmt
            .query_map([], map_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    // Departments
    pub fn upsert_department(&self, dept: &Department) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO departments (code, name, active) VALUES (?1, ?2, ?3)",
            params![dept.code, dept.name, dept.active as i64],
        )?;
        Ok(())
    }

    pub fn list_departments(&self) -> Result<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare("SELECT code, name, active FROM departments ORDER BY code")?;
        let depts = stmt
            .query_map([], |row| {
                Ok(Department {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(depts)
    }

    // Applications
    pub fn upsert_application(&self, app: &Application) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO applications (id, name, active) VALUES (?1, ?2, ?3)",
            params![app.id, app.name, app.active as i64],
        )?;
        Ok(())
    }

    pub fn get_application(&self, id: &str) -> Result<Option<Application>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, active FROM applications WHERE id = ?1")?;
        let app = stmt
            .query_row([id], |row| {
                Ok(Application {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get::<_, i64>(2)? != 0,
                })
            })
            .ok();
        Ok(app)
    }

    pub fn list_applications(&self) -> Result<Vec<Application>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, active FROM applications ORDER BY id")?;
        let apps = stmt
            .query_map([], |row| {
                Ok(Application {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(apps)
    }

    // Issue catalog
    pub fn upsert_issue(&self, issue: &IssueDefinition) -> Result<()> {
        let assignee_ids = serde_json::to_string(&issue.assignee_ids)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO issues (code, name, app_id, category, priority, assignee_ids, sla_hours, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                issue.code,
                issue.name,
                issue.app_id,
                issue.category.as_str(),
                issue.priority.as_str(),
                assignee_ids,
                issue.sla_hours,
                issue.active as i64
            ],
        )?;
        Ok(())
    }

    pub fn get_issue(&self, code: &str) -> Result<Option<IssueDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, name, app_id, category, priority, assignee_ids, sla_hours, active
             FROM issues WHERE code = ?1",
        )?;
        let issue = stmt.query_row([code], map_issue).ok();
        Ok(issue)
    }

    pub fn list_issues(&self) -> Result<Vec<IssueDefinition>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, name, app_id, category, priority, assignee_ids, sla_hours, active
             FROM issues ORDER BY code",
        )?;
        let issues = stmt
            .query_map([], map_issue)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(issues)
    }

    // SLA rules
    pub fn upsert_sla_rule(&self, rule: &SlaRule) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sla_rules (priority, ticket_type, resolution_hours, auto_escalate)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                rule.priority.as_str(),
                rule.ticket_type.as_str(),
                rule.resolution_hours,
                rule.auto_escalate as i64
            ],
        )?;
        Ok(())
    }

    pub fn list_sla_rules(&self) -> Result<Vec<SlaRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT priority, ticket_type, resolution_hours, auto_escalate FROM sla_rules ORDER BY id",
        )?;
        let rules = stmt
            .query_map([], |row| {
                Ok(SlaRule {
                    priority: parse_priority(0, &row.get::<_, String>(0)?)?,
                    ticket_type: parse_ticket_type(1, &row.get::<_, String>(1)?)?,
                    resolution_hours: row.get(2)?,
                    auto_escalate: row.get::<_, i64>(3)? != 0,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    // Ticket numbering
    pub fn next_ticket_id(&self) -> Result<String> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES ('ticket_seq', ?1)
             ON CONFLICT(key) DO UPDATE SET value = value + 1",
            params![TICKET_SEQ_START],
        )?;
        let n: i64 = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'ticket_seq'", [], |row| {
                row.get(0)
            })?;
        Ok(format!("TKT-{}", n))
    }

    // Tickets
    pub fn insert_ticket(&mut self, ticket: &Ticket) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO tickets (id, requester_id, requester_name, app_id, ticket_type,
                issue_code, issue_name, summary, description, status, priority, assignee_id,
                created_at, assigned_at, updated_at, work_started_at, resolved_at, closed_at,
                sla_hours, sla_level, is_escalated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                ticket.id,
                ticket.requester_id,
                ticket.requester_name,
                ticket.app_id,
                ticket.ticket_type.as_str(),
                ticket.issue_code,
                ticket.issue_name,
                ticket.summary,
                ticket.description,
                ticket.status.as_str(),
                ticket.priority.as_str(),
                ticket.assignee_id,
                ticket.created_at.to_rfc3339(),
                ticket.assigned_at.map(|t| t.to_rfc3339()),
                ticket.updated_at.to_rfc3339(),
                ticket.work_started_at.map(|t| t.to_rfc3339()),
                ticket.resolved_at.map(|t| t.to_rfc3339()),
                ticket.closed_at.map(|t| t.to_rfc3339()),
                ticket.sla_hours,
                ticket.sla_level as i64,
                ticket.is_escalated as i64
            ],
        )?;
        for comment in &ticket.comments {
            insert_comment(&tx, &ticket.id, comment)?;
        }
        for attachment in &ticket.attachments {
            tx.execute(
                "INSERT INTO attachments (ticket_id, name, size_bytes, mime_type, url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    ticket.id,
                    attachment.name,
                    attachment.size_bytes,
                    attachment.mime_type,
                    attachment.url
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_ticket(&self, id: &str) -> Result<Option<Ticket>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tickets WHERE id = ?1",
            TICKET_COLUMNS
        ))?;
        let ticket = stmt.query_row([id], map_ticket).ok();

        match ticket {
            Some(mut t) => {
                t.comments = self.get_comments(&t.id)?;
                t.attachments = self.get_attachments(&t.id)?;
                Ok(Some(t))
            }
            None => Ok(None),
        }
    }

    pub fn list_tickets(
        &self,
        status_filter: Option<TicketStatus>,
        assignee_filter: Option<&str>,
        escalated_only: bool,
    ) -> Result<Vec<Ticket>> {
        let mut sql = format!("SELECT {} FROM tickets", TICKET_COLUMNS);
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = status_filter {
            conditions.push(format!("status = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(status.as_str().to_string()));
        }
        if let Some(assignee) = assignee_filter {
            conditions.push(format!("assignee_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(assignee.to_string()));
        }
        if escalated_only {
            conditions.push("is_escalated = 1".to_string());
        }

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut tickets = stmt
            .query_map(params_refs.as_slice(), map_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for t in &mut tickets {
            t.comments = self.get_comments(&t.id)?;
            t.attachments = self.get_attachments(&t.id)?;
        }
        Ok(tickets)
    }

    /// Tickets still counting against their SLA window (not Resolved/Closed).
    pub fn list_open_tickets(&self) -> Result<Vec<Ticket>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tickets WHERE status NOT IN ('resolved', 'closed') ORDER BY created_at",
            TICKET_COLUMNS
        ))?;
        let mut tickets = stmt
            .query_map([], map_ticket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for t in &mut tickets {
            t.comments = self.get_comments(&t.id)?;
            t.attachments = self.get_attachments(&t.id)?;
        }
        Ok(tickets)
    }

    /// Persist a successor ticket produced by the engine, guarded by an
    /// optimistic check on the previous status. Returns false when the row
    /// no longer carries `prev_status` (a concurrent transition won); the
    /// caller reports that as an invalid transition and nothing is written.
    ///
    /// `sla_level` and `is_escalated` are deliberately not written here.
    /// They belong to the sweep's idempotent writes, and a sweep landing
    /// between a caller's read and this update must not be undone from the
    /// caller's stale snapshot.
    pub fn apply_transition(&mut self, prev_status: TicketStatus, ticket: &Ticket) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let rows = tx.execute(
            "UPDATE tickets SET status = ?1, priority = ?2, assignee_id = ?3,
                assigned_at = ?4, updated_at = ?5, work_started_at = ?6,
                resolved_at = ?7, closed_at = ?8
             WHERE id = ?9 AND status = ?10",
            params![
                ticket.status.as_str(),
                ticket.priority.as_str(),
                ticket.assignee_id,
                ticket.assigned_at.map(|t| t.to_rfc3339()),
                ticket.updated_at.to_rfc3339(),
                ticket.work_started_at.map(|t| t.to_rfc3339()),
                ticket.resolved_at.map(|t| t.to_rfc3339()),
                ticket.closed_at.map(|t| t.to_rfc3339()),
                ticket.id,
                prev_status.as_str()
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }
        // Comments with id 0 are new since the engine appended them.
        for comment in ticket.comments.iter().filter(|c| c.id == 0) {
            insert_comment(&tx, &ticket.id, comment)?;
        }
        tx.commit()?;
        Ok(true)
    }

    /// Idempotent escalation write for the SLA sweep: flips the flag only
    /// when it is not already set. Returns true when this call escalated.
    pub fn mark_escalated(&self, ticket_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE tickets SET is_escalated = 1, updated_at = ?1 WHERE id = ?2 AND is_escalated = 0",
            params![now.to_rfc3339(), ticket_id],
        )?;
        Ok(rows > 0)
    }

    /// Ratchet the persisted SLA pressure level upward; never lowers it.
    pub fn raise_sla_level(&self, ticket_id: &str, level: u8) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE tickets SET sla_level = ?1 WHERE id = ?2 AND sla_level < ?1",
            params![level as i64, ticket_id],
        )?;
        Ok(rows > 0)
    }

    fn get_comments(&self, ticket_id: &str) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, author_id, author_name, body, is_internal, created_at
             FROM comments WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let comments = stmt
            .query_map([ticket_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    author_id: row.get(1)?,
                    author_name: row.get(2)?,
                    body: row.get(3)?,
                    is_internal: row.get::<_, i64>(4)? != 0,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(comments)
    }

    fn get_attachments(&self, ticket_id: &str) -> Result<Vec<Attachment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, size_bytes, mime_type, url FROM attachments WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let attachments = stmt
            .query_map([ticket_id], |row| {
                Ok(Attachment {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    size_bytes: row.get(2)?,
                    mime_type: row.get(3)?,
                    url: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(attachments)
    }
}

const TICKET_COLUMNS: &str = "id, requester_id, requester_name, app_id, ticket_type, issue_code, \
     issue_name, summary, description, status, priority, assignee_id, created_at, assigned_at, \
     updated_at, work_started_at, resolved_at, closed_at, sla_hours, sla_level, is_escalated";

fn insert_comment(conn: &Connection, ticket_id: &str, comment: &Comment) -> Result<()> {
    conn.execute(
        "INSERT INTO comments (ticket_id, author_id, author_name, body, is_internal, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ticket_id,
            comment.author_id,
            comment.author_name,
            comment.body,
            comment.is_internal as i64,
            comment.created_at.to_rfc3339()
        ],
    )?;
    Ok(())
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: parse_role(3, &row.get::<_, String>(3)?)?,
        department: row.get(4)?,
        location: row.get(5)?,
        manager_id: row.get(6)?,
    })
}

fn map_issue(row: &rusqlite::Row<'_>) -> rusqlite::Result<IssueDefinition> {
    let assignee_ids: String = row.get(5)?;
    Ok(IssueDefinition {
        code: row.get(0)?,
        name: row.get(1)?,
        app_id: row.get(2)?,
        category: parse_ticket_type(3, &row.get::<_, String>(3)?)?,
        priority: parse_priority(4, &row.get::<_, String>(4)?)?,
        assignee_ids: serde_json::from_str(&assignee_ids).unwrap_or_default(),
        sla_hours: row.get(6)?,
        active: row.get::<_, i64>(7)? != 0,
    })
}

fn map_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        requester_id: row.get(1)?,
        requester_name: row.get(2)?,
        app_id: row.get(3)?,
        ticket_type: parse_ticket_type(4, &row.get::<_, String>(4)?)?,
        issue_code: row.get(5)?,
        issue_name: row.get(6)?,
        summary: row.get(7)?,
        description: row.get(8)?,
        status: parse_status(9, &row.get::<_, String>(9)?)?,
        priority: parse_priority(10, &row.get::<_, String>(10)?)?,
        assignee_id: row.get(11)?,
        created_at: parse_datetime(row.get::<_, String>(12)?),
        assigned_at: row.get::<_, Option<String>>(13)?.map(parse_datetime),
        updated_at: parse_datetime(row.get::<_, String>(14)?),
        work_started_at: row.get::<_, Option<String>>(15)?.map(parse_datetime),
        resolved_at: row.get::<_, Option<String>>(16)?.map(parse_datetime),
        closed_at: row.get::<_, Option<String>>(17)?.map(parse_datetime),
        sla_hours: row.get(18)?,
        sla_level: row.get::<_, i64>(19)? as u8,
        is_escalated: row.get::<_, i64>(20)? != 0,
        comments: vec![],
        attachments: vec![],
    })
}

fn conversion_error(idx: usize, what: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        format!("unknown {} '{}'", what, value).into(),
    )
}

fn parse_status(idx: usize, s: &str) -> rusqlite::Result<TicketStatus> {
    TicketStatus::parse(s).ok_or_else(|| conversion_error(idx, "ticket status", s))
}

fn parse_priority(idx: usize, s: &str) -> rusqlite::Result<Priority> {
    Priority::parse(s).ok_or_else(|| conversion_error(idx, "priority", s))
}

fn parse_ticket_type(idx: usize, s: &str) -> rusqlite::Result<TicketType> {
    TicketType::parse(s).ok_or_else(|| conversion_error(idx, "ticket type", s))
}

fn parse_role(idx: usize, s: &str) -> rusqlite::Result<UserRole> {
    UserRole::parse(s).ok_or_else(|| conversion_error(idx, "user role", s))
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
