use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

use helixdesk::commands;
use helixdesk::daemon;
use helixdesk::db::Database;

#[derive(Parser)]
#[command(name = "helixdesk")]
#[command(about = "Helpdesk ticket lifecycle and assignment engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize helixdesk in the current directory
    Init {
        /// Load demo users, applications, and issue catalog
        #[arg(long)]
        seed: bool,
    },

    /// Create a new ticket
    Create {
        /// Requester user ID
        requester: String,
        /// Application ID
        app: String,
        /// Ticket summary
        summary: String,
        /// Free-text problem description (drives issue matching)
        #[arg(short, long)]
        description: Option<String>,
        /// Extra triage text to match against
        #[arg(long)]
        ai_summary: Option<String>,
        /// Override ticket type (incident, service_request, change, other)
        #[arg(short, long)]
        ticket_type: Option<String>,
        /// Override priority (low, medium, high, critical)
        #[arg(short, long)]
        priority: Option<String>,
        /// Attach a file (repeatable)
        #[arg(long = "attach")]
        attach: Vec<PathBuf>,
    },

    /// List tickets
    List {
        /// Filter by status (new, assigned, in_progress, pending_user, resolved, closed, all)
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Filter by assignee user ID
        #[arg(short, long)]
        assignee: Option<String>,
        /// Only escalated tickets
        #[arg(short, long)]
        escalated: bool,
    },

    /// Show ticket details
    Show {
        /// Ticket ID
        id: String,
    },

    /// Start work on a ticket
    Start {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
    },

    /// Mark a ticket as resolved
    Resolve {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
        /// Resolution note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Confirm a resolution and close the ticket
    Confirm {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
    },

    /// Reject a resolution and send the ticket back to work
    Reject {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
        /// Why the resolution is not acceptable
        reason: String,
    },

    /// Reopen a resolved ticket for more work
    Reopen {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
    },

    /// Transfer a ticket to another assignee
    Transfer {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
        /// New assignee user ID
        to: String,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID
        id: String,
        /// Acting user ID
        #[arg(short, long)]
        user: String,
        /// Comment text
        text: String,
    },

    /// SLA standing for one ticket, or a report over all open tickets
    Sla {
        /// Ticket ID
        id: Option<String>,
    },

    /// Run one SLA escalation sweep now
    Sweep,

    /// Dry-run intake: show the matched issue and routing for a description
    Triage {
        /// Application ID
        app: String,
        /// Problem description
        description: String,
        /// Extra triage text to match against
        #[arg(long)]
        ai_summary: Option<String>,
    },

    /// List department-eligible assignees for an application
    Eligible {
        /// Application ID
        app: String,
    },

    /// List users
    Users,

    /// List the issue catalog
    Issues {
        /// Filter by application ID
        #[arg(short, long)]
        app: Option<String>,
    },

    /// Daemon management
    Daemon {
        #[command(subcommand)]
        action: DaemonCommands,
    },
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Start the background SLA sweeper
    Start,
    /// Stop the background SLA sweeper
    Stop,
    /// Check daemon status
    Status,
    /// Internal: run the daemon loop (used by start)
    #[command(hide = true)]
    Run {
        #[arg(long)]
        dir: PathBuf,
    },
}

fn find_helixdesk_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(".helixdesk");
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a helixdesk directory (or any parent). Run 'helixdesk init' first.");
        }
    }
}

fn get_db() -> Result<Database> {
    let data_dir = find_helixdesk_dir()?;
    let db_path = data_dir.join("helixdesk.db");
    Database::open(&db_path).context("Failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { seed } => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd, seed)
        }

        Commands::Create {
            requester,
            app,
            summary,
            description,
            ai_summary,
            ticket_type,
            priority,
            attach,
        } => {
            let mut db = get_db()?;
            commands::create::run(
                &mut db,
                &requester,
                &app,
                &summary,
                description.as_deref(),
                ai_summary.as_deref(),
                ticket_type.as_deref(),
                priority.as_deref(),
                &attach,
            )
        }

        Commands::List {
            status,
            assignee,
            escalated,
        } => {
            let db = get_db()?;
            commands::list::run(&db, Some(&status), assignee.as_deref(), escalated)
        }

        Commands::Show { id } => {
            let db = get_db()?;
            commands::show::run(&db, &id)
        }

        Commands::Start { id, user } => {
            let mut db = get_db()?;
            commands::transition::start(&mut db, &id, &user)
        }

        Commands::Resolve { id, user, note } => {
            let mut db = get_db()?;
            commands::transition::resolve(&mut db, &id, &user, note.as_deref())
        }

        Commands::Confirm { id, user } => {
            let mut db = get_db()?;
            commands::transition::confirm(&mut db, &id, &user)
        }

        Commands::Reject { id, user, reason } => {
            let mut db = get_db()?;
            commands::transition::reject(&mut db, &id, &user, &reason)
        }

        Commands::Reopen { id, user } => {
            let mut db = get_db()?;
            commands::transition::reopen(&mut db, &id, &user)
        }

        Commands::Transfer { id, user, to } => {
            let mut db = get_db()?;
            commands::transfer::run(&mut db, &id, &user, &to)
        }

        Commands::Comment { id, user, text } => {
            let mut db = get_db()?;
            commands::comment::run(&mut db, &id, &user, &text)
        }

        Commands::Sla { id } => {
            let db = get_db()?;
            commands::sla::run(&db, id.as_deref())
        }

        Commands::Sweep => {
            let db = get_db()?;
            commands::sweep::run(&db)
        }

        Commands::Triage {
            app,
            description,
            ai_summary,
        } => {
            let db = get_db()?;
            commands::triage::run(&db, &app, &description, ai_summary.as_deref())
        }

        Commands::Eligible { app } => {
            let db = get_db()?;
            commands::eligible::run(&db, &app)
        }

        Commands::Users => {
            let db = get_db()?;
            commands::users::run(&db)
        }

        Commands::Issues { app } => {
            let db = get_db()?;
            commands::issues::run(&db, app.as_deref())
        }

        Commands::Daemon { action } => match action {
            DaemonCommands::Start => {
                let data_dir = find_helixdesk_dir()?;
                daemon::start(&data_dir)
            }
            DaemonCommands::Stop => {
                let data_dir = find_helixdesk_dir()?;
                daemon::stop(&data_dir)
            }
            DaemonCommands::Status => {
                let data_dir = find_helixdesk_dir()?;
                daemon::status(&data_dir)
            }
            DaemonCommands::Run { dir } => daemon::run_daemon(&dir),
        },
    }
}
