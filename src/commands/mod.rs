pub mod comment;
pub mod create;
pub mod eligible;
pub mod init;
pub mod issues;
pub mod list;
pub mod show;
pub mod sla;
pub mod sweep;
pub mod transfer;
pub mod transition;
pub mod triage;
pub mod users;
