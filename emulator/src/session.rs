use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant as HostInstant};

use tally_core::config::Counter;
use tally_core::deficit::CalendarDate;
use tally_core::face::{FaceEvent, FaceParts, FaceSettings, LoopOutcome, TallyFace, dispatch};
use tally_core::gesture::TapFlags;
use tally_core::hal::{FixedCalendar, HeldButtons, HoldButton, LatchedTaps};
use tally_core::persistence::{BACKUP_LEN, MemoryBackup};
use tally_core::render::write_status_line;
use tally_core::tracker::ButtonEdge;

use crate::command::{Command, TapPattern, parse_command};

/// Face wired to simulated collaborators.
pub type HostFace = TallyFace<MemoryBackup, HeldButtons, LatchedTaps, FixedCalendar>;

pub const DEFAULT_TRANSCRIPT: &str = "transcripts/emulator-session.log";

pub const HELP_TOPICS: &[(&str, &str)] = &[
    ("tick", "tick [seconds]                 - advance whole-second ticks"),
    (
        "press",
        "press|release <primary|secondary> - change a button level",
    ),
    (
        "hold",
        "hold <primary|secondary> <seconds> - press, tick, release",
    ),
    ("tap", "tap <single|double|triple>     - inject accelerometer taps"),
    ("up", "up <primary|secondary|mode>    - deliver a button-up edge"),
    ("date", "date <YYYY-MM-DD|none>         - set the simulated calendar"),
    ("clock", "clock <12|24>                  - choose the clock format"),
    ("reboot", "reboot                         - power-cycle from the backup region"),
    ("status", "status                         - show counters and the display"),
    ("history", "history                        - list journaled events"),
    ("help", "help [topic]                   - show help for a command"),
];

/// Start-up configuration for a session.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// File mirroring the 8-byte backup region between runs.
    pub backup_path: Option<PathBuf>,
    pub date: Option<CalendarDate>,
    pub clock_24h: bool,
    pub transcript_path: PathBuf,
    pub header: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            backup_path: None,
            date: None,
            clock_24h: false,
            transcript_path: PathBuf::from(DEFAULT_TRANSCRIPT),
            header: "Tally Face Emulator transcript".to_string(),
        }
    }
}

pub struct Session {
    face: Option<HostFace>,
    options: SessionOptions,
    transcript: TranscriptLogger,
    started_at: HostInstant,
    saved: [u8; BACKUP_LEN],
    journal_mark: u32,
}

impl Session {
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(&options.transcript_path, &options.header)?;
        let saved = match &options.backup_path {
            Some(path) => load_backup(path)?,
            None => [0; BACKUP_LEN],
        };

        let mut session = Self {
            face: None,
            options,
            transcript,
            started_at: HostInstant::now(),
            saved,
            journal_mark: 0,
        };
        let lines = session.boot();
        session.record_output(Duration::ZERO, &lines)?;
        Ok(session)
    }

    pub fn face(&self) -> Option<&HostFace> {
        self.face.as_ref()
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.started_at.elapsed();
        self.transcript
            .append_line(elapsed, TranscriptRole::Host, trimmed)?;

        let lines = match parse_command(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => err
                .lines()
                .map(|detail| format!("ERR syntax {detail}"))
                .collect(),
        };

        self.persist()?;
        self.record_output(elapsed, &lines)?;
        Ok(lines)
    }

    fn execute(&mut self, command: Command) -> Vec<String> {
        let mut lines = Vec::new();
        match command {
            Command::Help(topic) => return help_lines(topic.as_deref()),
            Command::Tick { seconds } => self.run_ticks(seconds, &mut lines),
            Command::Press(button) => self.set_button(button, true, &mut lines),
            Command::Release(button) => self.set_button(button, false, &mut lines),
            Command::Hold { button, seconds } => {
                self.set_button(button, true, &mut lines);
                self.run_ticks(seconds, &mut lines);
                self.set_button(button, false, &mut lines);
            }
            Command::Tap(pattern) => self.tap(pattern, &mut lines),
            Command::Up(edge) => {
                let event = match edge {
                    ButtonEdge::Primary => FaceEvent::PrimaryUp,
                    ButtonEdge::Secondary => FaceEvent::SecondaryUp,
                    ButtonEdge::Mode => FaceEvent::ModeUp,
                };
                let outcome = self.dispatch(event);
                self.drain_journal(&mut lines);
                describe_outcome(&outcome, &mut lines);
            }
            Command::Date(date) => self.set_date(date, &mut lines),
            Command::Clock { twenty_four_hour } => self.set_clock(twenty_four_hour, &mut lines),
            Command::Activate => {
                if let Some(face) = self.face.as_mut() {
                    let hz = face.activate();
                    lines.push(format!("OK activated tick={hz}Hz"));
                }
            }
            Command::Resign => {
                let outcome = self.dispatch(FaceEvent::Resign);
                describe_outcome(&outcome, &mut lines);
            }
            Command::Reboot => {
                self.face = None;
                self.journal_mark = 0;
                lines.push("OK power cycle".to_string());
                lines.append(&mut self.boot());
            }
            Command::Status => self.status(&mut lines),
            Command::History => self.history(&mut lines),
        }

        if self.face.is_none() {
            lines.push("ERR face inert".to_string());
        }
        lines
    }

    fn run_ticks(&mut self, seconds: u32, lines: &mut Vec<String>) {
        let mut last = None;
        for _ in 0..seconds {
            last = Some(self.dispatch(FaceEvent::Tick { subsecond: 0 }));
            self.drain_journal(lines);
        }
        if let Some(outcome) = last {
            describe_outcome(&outcome, lines);
        }
    }

    fn set_button(&mut self, button: HoldButton, pressed: bool, lines: &mut Vec<String>) {
        let Some(face) = self.face.as_mut() else {
            return;
        };
        face.buttons_mut().set(button, pressed);
        let level = if pressed { "pressed" } else { "released" };
        lines.push(format!("OK {} {level}", button_name(button)));
    }

    fn set_date(&mut self, date: Option<CalendarDate>, lines: &mut Vec<String>) {
        self.options.date = date;
        if let Some(face) = self.face.as_mut() {
            face.calendar_mut().set(date);
        }
        match date {
            Some(date) => lines.push(format!(
                "OK date {:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            )),
            None => lines.push("OK date unavailable".to_string()),
        }
    }

    fn set_clock(&mut self, twenty_four_hour: bool, lines: &mut Vec<String>) {
        self.options.clock_24h = twenty_four_hour;
        if let Some(face) = self.face.as_mut() {
            face.set_settings(FaceSettings {
                clock_24h: twenty_four_hour,
            });
        }
        let label = if twenty_four_hour { "24h" } else { "12h" };
        lines.push(format!("OK clock {label}"));
    }

    fn status(&self, lines: &mut Vec<String>) {
        let Some(face) = self.face.as_ref() else {
            return;
        };
        let mut status = String::new();
        let _ = write_status_line(face.state(), &mut status);
        lines.push(status);
        lines.push(format!("display {}", face.frame()));
    }

    fn history(&self, lines: &mut Vec<String>) {
        let Some(face) = self.face.as_ref() else {
            return;
        };
        if face.journal().is_empty() {
            lines.push("history empty".to_string());
        }
        for entry in face.journal().oldest_first() {
            lines.push(format!(
                "#{:<4} [+{:>7} ms] {}",
                entry.seq, entry.at_ms, entry.event
            ));
        }
    }

    fn tap(&mut self, pattern: TapPattern, lines: &mut Vec<String>) {
        let flags = match pattern {
            TapPattern::Single | TapPattern::Triple => TapFlags::SINGLE,
            TapPattern::Double => TapFlags::DOUBLE,
        };
        match pattern {
            TapPattern::Single | TapPattern::Double => {
                if let Some(face) = self.face.as_mut() {
                    face.taps_mut().inject(flags);
                }
                lines.push("OK tap latched for next tick".to_string());
            }
            TapPattern::Triple => {
                for _ in 0..3 {
                    if let Some(face) = self.face.as_mut() {
                        face.taps_mut().inject(flags);
                    }
                    let outcome = self.dispatch(FaceEvent::Tick { subsecond: 0 });
                    self.drain_journal(lines);
                    describe_outcome(&outcome, lines);
                }
            }
        }
    }

    fn dispatch(&mut self, event: FaceEvent) -> LoopOutcome {
        dispatch(&mut self.face, event)
    }

    /// Builds the face from the saved backup bytes.
    fn boot(&mut self) -> Vec<String> {
        let backup = MemoryBackup::from_bytes(self.saved);
        let date = self.options.date;
        let clock_24h = self.options.clock_24h;

        let mut lines = Vec::new();
        let setup = TallyFace::setup(&mut self.face, || FaceParts {
            settings: FaceSettings { clock_24h },
            ..FaceParts::new(
                backup,
                HeldButtons::released(),
                LatchedTaps::new(),
                FixedCalendar::new(date),
            )
        });
        if let Err(err) = setup {
            lines.push(format!("ERR setup {err}"));
            return lines;
        }

        if let Some(face) = self.face.as_mut() {
            let hz = face.activate();
            let state = face.state();
            lines.push(format!(
                "face ready tick={hz}Hz a={}/{} b={}/{}",
                state.tally(Counter::A),
                state.goal(Counter::A),
                state.tally(Counter::B),
                state.goal(Counter::B),
            ));
        }
        lines
    }

    fn drain_journal(&mut self, lines: &mut Vec<String>) {
        let Some(face) = self.face.as_ref() else {
            return;
        };
        for entry in face.journal().since(self.journal_mark) {
            lines.push(format!("  [+{:>7} ms] {}", entry.at_ms, entry.event));
        }
        self.journal_mark = face.journal().next_seq();
    }

    /// Mirrors the backup region to disk when it changed.
    fn persist(&mut self) -> io::Result<()> {
        let Some(face) = self.face.as_ref() else {
            return Ok(());
        };
        let bytes = face.backup().bytes();
        if bytes == self.saved {
            return Ok(());
        }
        self.saved = bytes;
        match &self.options.backup_path {
            Some(path) => store_backup(path, &bytes),
            None => Ok(()),
        }
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.transcript
                .append_line(elapsed, TranscriptRole::Emulator, line)?;
        }
        Ok(())
    }
}

fn describe_outcome(outcome: &LoopOutcome, lines: &mut Vec<String>) {
    if let Some(frame) = &outcome.frame {
        lines.push(format!("display {frame}"));
    }
    if !outcome.keep_active {
        lines.push("face released focus".to_string());
    }
}

fn button_name(button: HoldButton) -> &'static str {
    match button {
        HoldButton::Primary => "primary",
        HoldButton::Secondary => "secondary",
    }
}

fn help_lines(topic: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match topic {
        Some(target) if !target.is_empty() => {
            if let Some((_, detail)) = HELP_TOPICS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(target))
            {
                lines.push((*detail).to_string());
            } else {
                lines.push(format!("No help available for `{target}`."));
                lines.push(format!("Available topics: {}", help_topic_list()));
            }
        }
        _ => {
            lines.push("Available commands:".to_string());
            for (_, detail) in HELP_TOPICS {
                lines.push(format!("  {detail}"));
            }
            lines.push("Type `help <topic>` for a specific command.".to_string());
        }
    }
    lines
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, (name, _)) in HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(name);
    }
    buffer
}

fn load_backup(path: &Path) -> io::Result<[u8; BACKUP_LEN]> {
    match fs::read(path) {
        // A file of the wrong size is treated like fresh storage.
        Ok(bytes) => Ok(<[u8; BACKUP_LEN]>::try_from(bytes.as_slice()).unwrap_or([0; BACKUP_LEN])),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok([0; BACKUP_LEN]),
        Err(err) => Err(err),
    }
}

fn store_backup(path: &Path, bytes: &[u8; BACKUP_LEN]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(path: &Path, header: &str) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut logger = Self {
            writer: BufWriter::new(file),
        };
        logger.write_header(header)?;
        Ok(logger)
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        writeln!(self.writer, "# {header}")?;
        writeln!(
            self.writer,
            "# Timestamps are milliseconds since session start"
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tally-emulator-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    fn session(name: &str, backup: Option<PathBuf>) -> Session {
        Session::new(SessionOptions {
            backup_path: backup,
            transcript_path: scratch(&format!("{name}.log")),
            ..SessionOptions::default()
        })
        .unwrap()
    }

    #[test]
    fn hold_reports_the_increment_and_frame() {
        let mut session = session("hold", None);
        let lines = session.handle_command("hold primary 2").unwrap();

        assert_eq!(lines[0], "OK primary pressed");
        assert!(lines.iter().any(|line| line.contains("tally A -> 1")));
        assert!(lines.contains(&"display [A:001 B:00] [<clock 12h>]".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("OK primary released")
        );
        let face = session.face().unwrap();
        assert_eq!(face.state().tally(Counter::A), 1);
    }

    #[test]
    fn reboot_restores_values_from_the_backup_file() {
        let backup = scratch("reboot.bin");
        let _ = fs::remove_file(&backup);

        let mut first = session("reboot-a", Some(backup.clone()));
        let _ = first.handle_command("hold secondary 2").unwrap();
        let _ = first.handle_command("tap triple").unwrap();
        let _ = first.handle_command("up primary").unwrap();
        drop(first);

        let stored = fs::read(&backup).unwrap();
        // Goal B was never edited, so its bytes are still blank.
        assert_eq!(stored, vec![0, 0, 1, 0, 13, 0, 0, 0]);

        let second = session("reboot-b", Some(backup));
        let state = second.face().unwrap().state();
        assert_eq!(state.tally(Counter::B), 1);
        assert_eq!(state.goal(Counter::A), 13);
    }

    #[test]
    fn single_tap_shows_the_deficit() {
        let mut session = session("deficit", None);
        let _ = session.handle_command("date 2025-06-15").unwrap();
        let _ = session.handle_command("tap single").unwrap();
        let lines = session.handle_command("tick 3").unwrap();

        assert!(lines.iter().any(|line| line.contains("gesture single-tap")));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("display [GET A] [ 6.00]")
        );
    }

    #[test]
    fn mode_button_releases_focus_in_normal_mode() {
        let mut session = session("mode", None);
        let lines = session.handle_command("up mode").unwrap();
        assert!(lines.contains(&"face released focus".to_string()));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let mut session = session("syntax", None);
        let lines = session.handle_command("launch rockets").unwrap();
        assert!(lines[0].starts_with("ERR syntax"));
    }
}
