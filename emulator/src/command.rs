//! Console grammar for the emulator.
//!
//! Commands are short, case-insensitive words. Buttons accept both the
//! logical names (`primary`, `secondary`, `mode`) and the watch labels
//! (`light`, `alarm`).

use tally_core::deficit::CalendarDate;
use tally_core::hal::HoldButton;
use tally_core::tracker::ButtonEdge;
use winnow::ascii::{Caseless, dec_uint, space1};
use winnow::combinator::{alt, opt, preceded, separated_pair};
use winnow::prelude::*;
use winnow::token::rest;

/// Tap patterns the console can inject.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TapPattern {
    /// Latch the single-tap bit for the next tick.
    Single,
    /// Latch the double-tap bit for the next tick.
    Double,
    /// Three single taps on three consecutive ticks.
    Triple,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Tick { seconds: u32 },
    Press(HoldButton),
    Release(HoldButton),
    Hold { button: HoldButton, seconds: u32 },
    Tap(TapPattern),
    Up(ButtonEdge),
    Date(Option<CalendarDate>),
    Clock { twenty_four_hour: bool },
    Activate,
    Resign,
    Reboot,
    Status,
    History,
    Help(Option<String>),
}

/// Parses one console line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    command.parse(line.trim()).map_err(|err| err.to_string())
}

/// Parses a `YYYY-MM-DD` date, rejecting days that do not exist.
pub fn parse_date(text: &str) -> Result<CalendarDate, String> {
    calendar_date
        .parse(text.trim())
        .map_err(|err| err.to_string())
}

fn command(input: &mut &str) -> ModalResult<Command> {
    alt((
        tick,
        press,
        release,
        hold,
        tap,
        up,
        date,
        clock,
        Caseless("activate").value(Command::Activate),
        Caseless("resign").value(Command::Resign),
        Caseless("reboot").value(Command::Reboot),
        Caseless("status").value(Command::Status),
        Caseless("history").value(Command::History),
        help,
    ))
    .parse_next(input)
}

fn tick(input: &mut &str) -> ModalResult<Command> {
    preceded(Caseless("tick"), opt(preceded(space1, dec_uint)))
        .map(|seconds: Option<u32>| Command::Tick {
            seconds: seconds.unwrap_or(1),
        })
        .parse_next(input)
}

fn press(input: &mut &str) -> ModalResult<Command> {
    preceded((Caseless("press"), space1), hold_button)
        .map(Command::Press)
        .parse_next(input)
}

fn release(input: &mut &str) -> ModalResult<Command> {
    preceded((Caseless("release"), space1), hold_button)
        .map(Command::Release)
        .parse_next(input)
}

fn hold(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (Caseless("hold"), space1),
        separated_pair(hold_button, space1, dec_uint),
    )
    .map(|(button, seconds)| Command::Hold { button, seconds })
    .parse_next(input)
}

fn tap(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (Caseless("tap"), space1),
        alt((
            Caseless("single").value(TapPattern::Single),
            Caseless("double").value(TapPattern::Double),
            Caseless("triple").value(TapPattern::Triple),
        )),
    )
    .map(Command::Tap)
    .parse_next(input)
}

fn up(input: &mut &str) -> ModalResult<Command> {
    preceded((Caseless("up"), space1), button_edge)
        .map(Command::Up)
        .parse_next(input)
}

fn date(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (Caseless("date"), space1),
        alt((Caseless("none").value(None), calendar_date.map(Some))),
    )
    .map(Command::Date)
    .parse_next(input)
}

fn clock(input: &mut &str) -> ModalResult<Command> {
    preceded(
        (Caseless("clock"), space1),
        alt(("24".value(true), "12".value(false))),
    )
    .map(|twenty_four_hour| Command::Clock { twenty_four_hour })
    .parse_next(input)
}

fn help(input: &mut &str) -> ModalResult<Command> {
    preceded(Caseless("help"), opt(preceded(space1, rest)))
        .map(|topic: Option<&str>| Command::Help(topic.map(|text| text.trim().to_owned())))
        .parse_next(input)
}

fn hold_button(input: &mut &str) -> ModalResult<HoldButton> {
    alt((
        alt((Caseless("primary"), Caseless("light"))).value(HoldButton::Primary),
        alt((Caseless("secondary"), Caseless("alarm"))).value(HoldButton::Secondary),
    ))
    .parse_next(input)
}

fn button_edge(input: &mut &str) -> ModalResult<ButtonEdge> {
    alt((
        hold_button.map(|button| match button {
            HoldButton::Primary => ButtonEdge::Primary,
            HoldButton::Secondary => ButtonEdge::Secondary,
        }),
        Caseless("mode").value(ButtonEdge::Mode),
    ))
    .parse_next(input)
}

fn calendar_date(input: &mut &str) -> ModalResult<CalendarDate> {
    (
        dec_uint::<_, u16, _>,
        '-',
        dec_uint::<_, u8, _>,
        '-',
        dec_uint::<_, u8, _>,
    )
        .verify_map(|(year, _, month, _, day)| CalendarDate::new(year, month, day))
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command_family() {
        assert_eq!(parse_command("tick"), Ok(Command::Tick { seconds: 1 }));
        assert_eq!(parse_command("TICK 5"), Ok(Command::Tick { seconds: 5 }));
        assert_eq!(
            parse_command("press light"),
            Ok(Command::Press(HoldButton::Primary))
        );
        assert_eq!(
            parse_command("release alarm"),
            Ok(Command::Release(HoldButton::Secondary))
        );
        assert_eq!(
            parse_command("hold secondary 5"),
            Ok(Command::Hold {
                button: HoldButton::Secondary,
                seconds: 5
            })
        );
        assert_eq!(
            parse_command("tap triple"),
            Ok(Command::Tap(TapPattern::Triple))
        );
        assert_eq!(
            parse_command("up mode"),
            Ok(Command::Up(ButtonEdge::Mode))
        );
        assert_eq!(
            parse_command("clock 24"),
            Ok(Command::Clock {
                twenty_four_hour: true
            })
        );
        assert_eq!(parse_command("  status  "), Ok(Command::Status));
        assert_eq!(
            parse_command("help tap"),
            Ok(Command::Help(Some("tap".to_owned())))
        );
        assert_eq!(parse_command("help"), Ok(Command::Help(None)));
    }

    #[test]
    fn dates_are_validated_while_parsing() {
        assert_eq!(
            parse_command("date 2024-02-29"),
            Ok(Command::Date(CalendarDate::new(2024, 2, 29)))
        );
        assert_eq!(parse_command("date none"), Ok(Command::Date(None)));
        assert!(parse_command("date 2025-02-29").is_err());
        assert!(parse_date("2025-13-01").is_err());
        assert_eq!(parse_date("2025-06-15").ok(), CalendarDate::new(2025, 6, 15));
    }

    #[test]
    fn rejects_trailing_garbage_and_unknown_words() {
        assert!(parse_command("tick5").is_err());
        assert!(parse_command("press middle").is_err());
        assert!(parse_command("tap quadruple").is_err());
        assert!(parse_command("launch").is_err());
    }
}
