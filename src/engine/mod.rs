//! The ticket lifecycle and assignment engine.
//!
//! Everything in this module is pure: functions take the current ticket and
//! read-only reference data (catalog, roster, SLA table) as explicit
//! parameters and perform no I/O. Persistence, concurrency control, and
//! rendering live with the callers.

pub mod assign;
pub mod eligibility;
pub mod error;
pub mod lifecycle;
pub mod matcher;
pub mod sla;

pub use error::EngineError;
pub use lifecycle::{CreateTicketRequest, CreatedTicket, TicketAction};
pub use sla::SlaStanding;
