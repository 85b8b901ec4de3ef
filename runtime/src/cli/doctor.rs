//! Environment readiness check.

use crate::cli::output;
use crate::cli::status::describe;
use crate::config::resolve_auth_file;
use crate::credentials::{FileSessionProvider, DEFAULT_MAX_AGE_DAYS};
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use chrono::Utc;

/// Check Chromium availability and the stored session.
pub async fn run(auth_file: Option<&str>, json: bool) -> Result<()> {
    let chromium_path = find_chromium();
    let status = FileSessionProvider::new(resolve_auth_file(auth_file))
        .status(Utc::now(), DEFAULT_MAX_AGE_DAYS);
    let ready = chromium_path.is_some() && status.valid;

    if json {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium_path,
            "session": status,
            "ready": ready,
        }));
        return Ok(());
    }

    println!("Harvest Doctor");
    println!("==============");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Set CORTEX_CHROMIUM_PATH or install Chrome."
        ),
    }
    print!("{}", describe(&status));

    println!();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
