//! `harvest status` and `harvest logout`: inspect or discard the stored session.

use crate::cli::output;
use crate::config::resolve_auth_file;
use crate::credentials::{FileSessionProvider, SessionStatus, DEFAULT_MAX_AGE_DAYS};
use anyhow::Result;
use chrono::Utc;

/// Show where the session bundle lives and whether it is still usable.
pub async fn run(auth_file: Option<&str>, json: bool) -> Result<()> {
    let provider = FileSessionProvider::new(resolve_auth_file(auth_file));
    let status = provider.status(Utc::now(), DEFAULT_MAX_AGE_DAYS);

    if json {
        output::print_json(&status);
    } else {
        print!("{}", describe(&status));
    }
    Ok(())
}

/// Remove the stored session bundle.
pub async fn run_logout(auth_file: Option<&str>, json: bool) -> Result<()> {
    let provider = FileSessionProvider::new(resolve_auth_file(auth_file));
    let removed = provider.clear()?;

    if json {
        output::print_json(&serde_json::json!({
            "path": provider.path(),
            "removed": removed,
        }));
    } else if removed {
        println!("Removed session bundle {}", provider.path().display());
    } else {
        println!("No session bundle at {}", provider.path().display());
    }
    Ok(())
}

pub(crate) fn describe(status: &SessionStatus) -> String {
    let mut out = format!("Session: {}\n", status.path.display());
    match (status.captured_at, status.age_days) {
        (Some(captured), Some(age)) => {
            out.push_str(&format!(
                "  captured {} ({age} day(s) ago), {} cookie(s)\n",
                captured.format("%Y-%m-%d %H:%M UTC"),
                status.cookie_count
            ));
            if status.valid {
                out.push_str("  [OK] valid\n");
            } else {
                out.push_str(&format!(
                    "  [!!] expired (older than {DEFAULT_MAX_AGE_DAYS} days); capture a fresh session\n"
                ));
            }
        }
        _ if status.present => out.push_str("  [!!] present but unreadable\n"),
        _ => out.push_str("  [!!] not found\n"),
    }
    out
}
