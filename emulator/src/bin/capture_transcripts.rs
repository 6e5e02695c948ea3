use std::fs;
use std::io;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "../command.rs"]
mod command;

#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use session::{Session, SessionOptions};

const TRANSCRIPT_DIR: &str = "transcripts";

fn main() -> io::Result<()> {
    record("deficit", None, &[
        "date 2025-06-15",
        "status",
        "tap single",
        "tick 3",
        "tick 2",
        "tap double",
        "tick",
        "history",
    ])?;
    record("hold", None, &[
        "hold primary 3",
        "hold primary 6",
        "hold alarm 2",
        "status",
        "history",
    ])?;
    record("goals", None, &[
        "tap triple",
        "up primary",
        "up primary",
        "up secondary",
        "tap triple",
        "up primary",
        "up secondary",
        "up mode",
        "up mode",
        "status",
    ])?;

    let backup = PathBuf::from(TRANSCRIPT_DIR).join("power-cycle.bin");
    let _ = fs::remove_file(&backup);
    record("power-cycle", Some(backup), &[
        "hold primary 2",
        "hold secondary 2",
        "tap triple",
        "up primary",
        "reboot",
        "status",
    ])?;
    Ok(())
}

fn record(name: &str, backup_path: Option<PathBuf>, commands: &[&str]) -> io::Result<()> {
    let mut session = Session::new(SessionOptions {
        backup_path,
        transcript_path: PathBuf::from(TRANSCRIPT_DIR).join(format!("{name}.log")),
        header: format!("Tally Face Emulator transcript: {name}"),
        ..SessionOptions::default()
    })?;
    for line in commands {
        let _ = session.handle_command(line)?;
    }
    Ok(())
}
