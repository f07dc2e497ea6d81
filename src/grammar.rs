//! Parser for the control-channel command grammar.
//!
//! [`parse`] scans free text for the first embedded command and returns the
//! matching [`Command`] with its validated [`CommandInput`]. The grammar has
//! four top-level families (`SYSTEM`, `LASER`, `ACQUISITION`,
//! `TRANSMISSION`), each introduced by a `"<FAMILY> : "` marker. Matching is
//! family-exclusive: the leftmost marker in the text decides the family, and
//! only that family's sub-alternatives are tried.
//!
//! Implemented as a small hand-written tokenizer: literal suffixes are
//! matched directly, numeric parameters are split off as one
//! whitespace-delimited token, converted to the declared numeric type and
//! passed through the input type's validation gate. Surrounding text is
//! ignored, so `"as LASER : SET .4123 asdfasfasdsa"` parses to `LaserSet`
//! with a pump current of 0.4123.
//!
//! ```
//! use teraflash::command::{Command, CommandInput};
//! use teraflash::grammar::parse;
//!
//! let (command, input) = parse("LASER : SET 45.5")?;
//! assert_eq!(command, Command::LaserSet);
//! match input {
//!     CommandInput::LaserSet(set) => assert_eq!(set.pump_current(), 45.5),
//!     other => panic!("unexpected input: {other:?}"),
//! }
//! # Ok::<(), teraflash::error::TeraflashError>(())
//! ```

use crate::command::{
    AcquisitionAverageInput, AcquisitionBeginInput, AcquisitionRangeInput, Command, CommandInput,
    LaserSetInput, MonitorCode, SystemMonitorInput,
};
use crate::error::{Result, TeraflashError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    System,
    Laser,
    Acquisition,
    Transmission,
}

const MARKERS: [(&str, Family); 4] = [
    ("SYSTEM : ", Family::System),
    ("LASER : ", Family::Laser),
    ("ACQUISITION : ", Family::Acquisition),
    ("TRANSMISSION : ", Family::Transmission),
];

/// Parse free text into a command and its validated input.
///
/// # Errors
/// - [`TeraflashError::UnparseableCommand`] when no family marker occurs in
///   the text, or the identified family's alternatives all fail to match.
/// - [`TeraflashError::InvalidParameter`] when a numeric token converts but
///   violates its bound or step rule.
pub fn parse(text: &str) -> Result<(Command, CommandInput)> {
    let (family, rest) = find_family(text).ok_or_else(|| unparseable(text))?;
    match family {
        Family::System => parse_system(rest, text),
        Family::Laser => parse_laser(rest, text),
        Family::Acquisition => parse_acquisition(rest, text),
        Family::Transmission => parse_transmission(rest, text),
    }
}

/// Locate the leftmost family marker; returns the family and the text after
/// its marker.
fn find_family(text: &str) -> Option<(Family, &str)> {
    MARKERS
        .iter()
        .filter_map(|(marker, family)| {
            text.find(marker)
                .map(|at| (at, *family, &text[at + marker.len()..]))
        })
        .min_by_key(|(at, _, _)| *at)
        .map(|(_, family, rest)| (family, rest))
}

fn parse_system(rest: &str, text: &str) -> Result<(Command, CommandInput)> {
    if rest.starts_with("TELL STATUS") {
        return Ok((Command::SystemTellStatus, CommandInput::None));
    }
    if rest.starts_with("STOP") {
        return Ok((Command::SystemStop, CommandInput::None));
    }
    if rest.starts_with("TIA FULL") {
        return Ok((Command::SystemTiaFull, CommandInput::None));
    }
    if rest.starts_with("TIA ATN1") {
        return Ok((Command::SystemTiaAtn1, CommandInput::None));
    }
    if rest.starts_with("TIA ATN2") {
        return Ok((Command::SystemTiaAtn2, CommandInput::None));
    }
    if let Some(arg) = rest.strip_prefix("MONITOR ") {
        let code = int_token(arg, text)?;
        let input = SystemMonitorInput::new(MonitorCode::from_code(code)?);
        return Ok((Command::SystemMonitor, CommandInput::SystemMonitor(input)));
    }
    Err(unparseable(text))
}

fn parse_laser(rest: &str, text: &str) -> Result<(Command, CommandInput)> {
    if rest.starts_with("OFF") {
        return Ok((Command::LaserOff, CommandInput::None));
    }
    if rest.starts_with("ON") {
        return Ok((Command::LaserOn, CommandInput::None));
    }
    if let Some(arg) = rest.strip_prefix("SET ") {
        let input = LaserSetInput::new(float_token(arg, text)?)?;
        return Ok((Command::LaserSet, CommandInput::LaserSet(input)));
    }
    Err(unparseable(text))
}

fn parse_acquisition(rest: &str, text: &str) -> Result<(Command, CommandInput)> {
    if let Some(arg) = rest.strip_prefix("BEGIN ") {
        let input = AcquisitionBeginInput::new(float_token(arg, text)?)?;
        return Ok((Command::AcquisitionBegin, CommandInput::AcquisitionBegin(input)));
    }
    if let Some(arg) = rest.strip_prefix("RANGE ") {
        let input = AcquisitionRangeInput::new(int_token(arg, text)?)?;
        return Ok((Command::AcquisitionRange, CommandInput::AcquisitionRange(input)));
    }
    if rest.starts_with("STOP") {
        return Ok((Command::AcquisitionStop, CommandInput::None));
    }
    if rest.starts_with("START") {
        return Ok((Command::AcquisitionStart, CommandInput::None));
    }
    if let Some(arg) = rest.strip_prefix("AVERAGE ") {
        let input = AcquisitionAverageInput::new(int_token(arg, text)?)?;
        return Ok((
            Command::AcquisitionAverage,
            CommandInput::AcquisitionAverage(input),
        ));
    }
    if rest.starts_with("RESET AVG") {
        return Ok((Command::AcquisitionResetAvg, CommandInput::None));
    }
    Err(unparseable(text))
}

fn parse_transmission(rest: &str, text: &str) -> Result<(Command, CommandInput)> {
    if rest.starts_with("SLIDING") {
        return Ok((Command::TransmissionSliding, CommandInput::None));
    }
    if rest.starts_with("BLOCK") {
        return Ok((Command::TransmissionBlock, CommandInput::None));
    }
    Err(unparseable(text))
}

/// First whitespace-delimited token of `arg`, parsed as a float.
fn float_token(arg: &str, text: &str) -> Result<f64> {
    let token = arg.split_whitespace().next().ok_or_else(|| unparseable(text))?;
    token.parse().map_err(|_| unparseable(text))
}

/// First whitespace-delimited token of `arg`, parsed as an integer.
fn int_token(arg: &str, text: &str) -> Result<i64> {
    let token = arg.split_whitespace().next().ok_or_else(|| unparseable(text))?;
    token.parse().map_err(|_| unparseable(text))
}

fn unparseable(text: &str) -> TeraflashError {
    TeraflashError::UnparseableCommand {
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::serialize;

    #[test]
    fn parses_reference_example() {
        let (command, input) = parse("LASER : SET 45.5").unwrap();
        assert_eq!(command, Command::LaserSet);
        match input {
            CommandInput::LaserSet(set) => assert_eq!(set.pump_current(), 45.5),
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn parses_command_embedded_in_noise() {
        let (command, input) = parse("as LASER : SET .4123 asdfasfasdsa").unwrap();
        assert_eq!(command, Command::LaserSet);
        match input {
            CommandInput::LaserSet(set) => assert!((set.pump_current() - 0.4123).abs() < 1e-12),
            other => panic!("unexpected input: {other:?}"),
        }
    }

    #[test]
    fn garbage_is_unparseable() {
        let err = parse("garbage").unwrap_err();
        assert!(matches!(err, TeraflashError::UnparseableCommand { .. }));
    }

    #[test]
    fn leftmost_family_wins() {
        let (command, _) = parse("x TRANSMISSION : SLIDING then LASER : ON").unwrap();
        assert_eq!(command, Command::TransmissionSliding);
    }

    #[test]
    fn family_match_is_exclusive() {
        // LASER is identified first; its alternatives fail, and the later
        // ACQUISITION command is never considered.
        let err = parse("LASER : RANGE 50 ACQUISITION : RANGE 50").unwrap_err();
        assert!(matches!(err, TeraflashError::UnparseableCommand { .. }));
    }

    #[test]
    fn out_of_bounds_parameter_is_invalid_not_unparseable() {
        let err = parse("LASER : SET 150.0").unwrap_err();
        assert!(matches!(err, TeraflashError::InvalidParameter { .. }));

        let err = parse("ACQUISITION : BEGIN 45.55").unwrap_err();
        assert!(matches!(err, TeraflashError::InvalidParameter { .. }));

        let err = parse("SYSTEM : MONITOR 3").unwrap_err();
        assert!(matches!(err, TeraflashError::InvalidParameter { .. }));
    }

    #[test]
    fn tell_status_is_not_shadowed_by_stop() {
        let (command, _) = parse("SYSTEM : TELL STATUS").unwrap();
        assert_eq!(command, Command::SystemTellStatus);
        let (command, _) = parse("SYSTEM : STOP").unwrap();
        assert_eq!(command, Command::SystemStop);
    }

    #[test]
    fn acquisition_start_and_stop_are_distinct() {
        assert_eq!(parse("ACQUISITION : START").unwrap().0, Command::AcquisitionStart);
        assert_eq!(parse("ACQUISITION : STOP").unwrap().0, Command::AcquisitionStop);
        assert_eq!(
            parse("ACQUISITION : RESET AVG").unwrap().0,
            Command::AcquisitionResetAvg
        );
    }

    #[test]
    fn round_trips_every_command() {
        let pairs: Vec<(Command, CommandInput)> = vec![
            (Command::SystemStop, CommandInput::None),
            (Command::SystemTellStatus, CommandInput::None),
            (
                Command::SystemMonitor,
                CommandInput::SystemMonitor(SystemMonitorInput::new(MonitorCode::TransferBlock)),
            ),
            (Command::SystemTiaFull, CommandInput::None),
            (Command::SystemTiaAtn1, CommandInput::None),
            (Command::SystemTiaAtn2, CommandInput::None),
            (Command::LaserOff, CommandInput::None),
            (Command::LaserOn, CommandInput::None),
            (
                Command::LaserSet,
                CommandInput::LaserSet(LaserSetInput::new(45.5).unwrap()),
            ),
            (
                Command::AcquisitionBegin,
                CommandInput::AcquisitionBegin(AcquisitionBeginInput::new(120.3).unwrap()),
            ),
            (
                Command::AcquisitionRange,
                CommandInput::AcquisitionRange(AcquisitionRangeInput::new(70).unwrap()),
            ),
            (Command::AcquisitionStop, CommandInput::None),
            (Command::AcquisitionStart, CommandInput::None),
            (
                Command::AcquisitionAverage,
                CommandInput::AcquisitionAverage(AcquisitionAverageInput::new(1000).unwrap()),
            ),
            (Command::AcquisitionResetAvg, CommandInput::None),
            (Command::TransmissionSliding, CommandInput::None),
            (Command::TransmissionBlock, CommandInput::None),
        ];
        assert_eq!(pairs.len(), Command::all().len());

        for (command, input) in pairs {
            let wire = serialize(command, &input).unwrap();
            let (parsed_command, parsed_input) = parse(&wire).unwrap();
            assert_eq!(parsed_command, command, "command mismatch for {wire:?}");
            assert_eq!(parsed_input, input, "input mismatch for {wire:?}");
        }
    }

    #[test]
    fn integer_grid_positions_round_trip_through_display() {
        // 45 renders as "45" and must parse back as the same position.
        let input = CommandInput::AcquisitionBegin(AcquisitionBeginInput::new(45.0).unwrap());
        let wire = serialize(Command::AcquisitionBegin, &input).unwrap();
        assert_eq!(wire, "ACQUISITION : BEGIN 45");
        assert_eq!(parse(&wire).unwrap().1, input);
    }
}
