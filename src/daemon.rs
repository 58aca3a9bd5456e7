//! Background SLA sweeper.
//!
//! `start` re-executes the current binary with the hidden `daemon run`
//! subcommand, detached, with logs going to `.helixdesk/daemon.log`. The
//! loop re-runs the SLA sweep on a fixed interval until it sees SIGTERM,
//! SIGINT, or the stop sentinel file that `stop` drops next to the pid file.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use crate::commands::sweep;
use crate::db::Database;

const PID_FILE: &str = "daemon.pid";
const STOP_FILE: &str = "daemon.stop";
const LOG_FILE: &str = "daemon.log";
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn start(data_dir: &Path) -> Result<()> {
    if let Some(pid) = read_live_pid(data_dir) {
        println!("Daemon already running (pid {}).", pid);
        return Ok(());
    }

    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let log = File::create(data_dir.join(LOG_FILE)).context("Failed to create daemon log")?;

    let child = Command::new(exe)
        .args(["daemon", "run", "--dir"])
        .arg(data_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(log))
        .spawn()
        .context("Failed to spawn daemon process")?;

    fs::write(data_dir.join(PID_FILE), child.id().to_string())?;
    println!("Daemon started (pid {}).", child.id());
    Ok(())
}

pub fn stop(data_dir: &Path) -> Result<()> {
    match read_live_pid(data_dir) {
        Some(pid) => {
            fs::write(data_dir.join(STOP_FILE), "")?;
            println!("Stop requested for daemon (pid {}).", pid);
            println!("It exits at the next sweep tick.");
            Ok(())
        }
        None => {
            let _ = fs::remove_file(data_dir.join(PID_FILE));
            println!("Daemon is not running.");
            Ok(())
        }
    }
}

pub fn status(data_dir: &Path) -> Result<()> {
    match read_live_pid(data_dir) {
        Some(pid) => println!("Daemon running (pid {}).", pid),
        None => println!("Daemon is not running."),
    }
    Ok(())
}

pub fn run_daemon(data_dir: &Path) -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let db_path = data_dir.join("helixdesk.db");
    if !db_path.exists() {
        bail!("No database at {}; run 'helixdesk init' first", db_path.display());
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    flag::register(SIGTERM, Arc::clone(&stop_flag))?;
    flag::register(SIGINT, Arc::clone(&stop_flag))?;

    let stop_sentinel = data_dir.join(STOP_FILE);
    let _ = fs::remove_file(&stop_sentinel);
    fs::write(data_dir.join(PID_FILE), std::process::id().to_string())?;

    info!(dir = %data_dir.display(), "SLA sweep daemon started");

    while !stop_flag.load(Ordering::Relaxed) && !stop_sentinel.exists() {
        match Database::open(&db_path) {
            Ok(db) => match sweep::sweep(&db, Utc::now()) {
                Ok(outcome) => {
                    if !outcome.escalated.is_empty() {
                        info!(count = outcome.escalated.len(), "escalations applied");
                    }
                }
                Err(e) => error!(error = %e, "sweep failed"),
            },
            Err(e) => error!(error = %e, "could not open database"),
        }

        // Sleep in short slices so a stop request lands promptly.
        let mut slept = Duration::ZERO;
        while slept < SWEEP_INTERVAL {
            if stop_flag.load(Ordering::Relaxed) || stop_sentinel.exists() {
                break;
            }
            thread::sleep(Duration::from_millis(500));
            slept += Duration::from_millis(500);
        }
    }

    info!("SLA sweep daemon stopping");
    let _ = fs::remove_file(data_dir.join(PID_FILE));
    let _ = fs::remove_file(&stop_sentinel);
    Ok(())
}

fn read_live_pid(data_dir: &Path) -> Option<u32> {
    let pid: u32 = fs::read_to_string(data_dir.join(PID_FILE))
        .ok()?
        .trim()
        .parse()
        .ok()?;
    // Stale pid files happen after a crash or reboot.
    if Path::new(&format!("/proc/{}", pid)).exists() {
        Some(pid)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_status_without_pid_file() {
        let dir = tempdir().unwrap();
        status(dir.path()).unwrap();
        assert!(read_live_pid(dir.path()).is_none());
    }

    #[test]
    fn test_stale_pid_is_ignored() {
        let dir = tempdir().unwrap();
        // Pid values this large are not allocated on Linux.
        fs::write(dir.path().join(PID_FILE), "4194304999").unwrap();
        assert!(read_live_pid(dir.path()).is_none());
    }

    #[test]
    fn test_stop_clears_stale_pid_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(PID_FILE), "4194304999").unwrap();
        stop(dir.path()).unwrap();
        assert!(!dir.path().join(PID_FILE).exists());
    }

    #[test]
    fn test_run_daemon_requires_database() {
        let dir = tempdir().unwrap();
        assert!(run_daemon(dir.path()).is_err());
    }
}
