//! Command vocabulary of the OEM firmware variant.
//!
//! OEM builds of the instrument speak a parallel control vocabulary:
//! `RC-`-prefixed set/action commands and `RD-`-prefixed readback queries.
//! Replies use the same `OK`/`ERROR` classification as the standard channel
//! ([`crate::command::CommandResponse`]), so [`crate::control::ControlClient`]
//! can carry serialized OEM text unchanged.
//!
//! Only serialization is provided; the OEM vocabulary has no free-text
//! grammar.

use crate::error::{Result, TeraflashError};

/// An OEM set/action command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RcCommand {
    /// Switch off laser and emitter voltage.
    LaserOff,
    /// Switch on laser and emitter voltage.
    LaserOn,
    /// Switch off emitter voltage.
    VoltageOff,
    /// Switch on emitter voltage; works only if the laser is already on.
    VoltageOn,
    /// Stop measurement.
    RunOff,
    /// Start measurement.
    RunOn,
    /// Set start point in ps.
    Begin,
    /// Set measuring range in ps.
    Range,
    /// Set averaging number.
    Average,
    /// Set data transfer to: continuously.
    TransferSliding,
    /// Set data transfer to: not until complete averaging.
    TransferBlock,
    /// Set data analysis to: block by block.
    AnalysisReduced,
    /// Set data analysis to: full rate.
    AnalysisFullRate,
    /// Set measurement to: internal TIA.
    TiaIntern,
    /// Set measurement to: external TIA.
    TiaExtern,
    /// Set TIA measuring range in nA (100, 300, 1000).
    TiaSensitivity,
    /// Set file path for saving pulse data.
    FilePath,
    /// Switch on WAIT state.
    WaitOn,
    /// Switch off WAIT state.
    WaitOff,
    /// Switch on AUTO-WAIT.
    AutoOn,
    /// Switch off AUTO-WAIT.
    AutoOff,
    /// Save pulse data with spectrum.
    SaveWithSpectrum,
    /// Save pulse data without spectrum.
    SaveWithoutSpectrum,
    /// Switch on REVERSE mode.
    ReverseOn,
    /// Switch off REVERSE mode.
    ReverseOff,
    /// Set current measurement as reference.
    SetRef,
    /// Delete a present reference, re-normalize frequency spectra.
    DeleteRef,
    /// Set current measurement as background.
    SetBackground,
    /// Delete a present background.
    DeleteBackground,
}

impl RcCommand {
    /// Wire template of this command.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            RcCommand::LaserOff => "RC-LASER : OFF",
            RcCommand::LaserOn => "RC-LASER : ON",
            RcCommand::VoltageOff => "RC-VOLTAGE : OFF",
            RcCommand::VoltageOn => "RC-VOLTAGE : ON",
            RcCommand::RunOff => "RC-RUN : OFF",
            RcCommand::RunOn => "RC-RUN : ON",
            RcCommand::Begin => "RC-BEGIN %.1f",
            RcCommand::Range => "RC-RANGE %d",
            RcCommand::Average => "RC-AVERAGE %d",
            RcCommand::TransferSliding => "RC-TRANSFER : SLIDING",
            RcCommand::TransferBlock => "RC-TRANSFER : BLOCK",
            RcCommand::AnalysisReduced => "RC-ANALYSIS : REDUCED",
            RcCommand::AnalysisFullRate => "RC-ANALYSIS : FULL RATE",
            RcCommand::TiaIntern => "RC-TIA : INTERN",
            RcCommand::TiaExtern => "RC-TIA : EXTERN",
            RcCommand::TiaSensitivity => "RC-TIA : SENSITIVITY %d",
            RcCommand::FilePath => "RC-FILEPATH %s",
            RcCommand::WaitOn => "RC-WAIT : ON",
            RcCommand::WaitOff => "RC-WAIT : OFF",
            RcCommand::AutoOn => "RC-AUTO : ON",
            RcCommand::AutoOff => "RC-AUTO : OFF",
            RcCommand::SaveWithSpectrum => "RC-SAVE W-S",
            RcCommand::SaveWithoutSpectrum => "RC-SAVE WO-S",
            RcCommand::ReverseOn => "RC-REVERSE : ON",
            RcCommand::ReverseOff => "RC-REVERSE : OFF",
            RcCommand::SetRef => "RC-REF",
            RcCommand::DeleteRef => "RC-CLR",
            RcCommand::SetBackground => "RC-BGR",
            RcCommand::DeleteBackground => "RC-BCL",
        }
    }
}

/// An OEM readback query. All queries are parameterless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdCommand {
    /// Read amplitude in nA.
    Amplitude,
    /// Read total acquisition time in s.
    TotalAcquisitionTime,
    /// Read relative acquisition time.
    RelativeAcquisitionTime,
    /// Read laser state.
    LaserState,
    /// Read emitter supply state.
    EmitterSupplyState,
    /// Read acquisition state.
    AcquisitionState,
    /// Read measuring start point in ps.
    MeasuringStartPoint,
    /// Read measuring range in ps.
    MeasuringRange,
    /// Read desired average.
    DesiredAverage,
    /// Read transfer mode.
    TransferMode,
    /// Read analysis mode.
    AnalysisMode,
    /// Read TIA mode.
    TiaMode,
    /// Read TIA sensitivity.
    TiaSensitivity,
    /// Read WAIT button state.
    WaitButtonState,
    /// Read AUTO button state.
    AutoButtonState,
    /// Read REVERSE button state.
    ReverseButtonState,
}

impl RdCommand {
    /// Wire text of this query.
    #[must_use]
    pub fn wire(self) -> &'static str {
        match self {
            RdCommand::Amplitude => "RD-AMPLITUDE",
            RdCommand::TotalAcquisitionTime => "RD-TAC.TIME",
            RdCommand::RelativeAcquisitionTime => "RD-XAC.TIME",
            RdCommand::LaserState => "RD-LASER",
            RdCommand::EmitterSupplyState => "RD-VOLTAGE",
            RdCommand::AcquisitionState => "RD-RUN",
            RdCommand::MeasuringStartPoint => "RD-BEGIN",
            RdCommand::MeasuringRange => "RD-RANGE",
            RdCommand::DesiredAverage => "RD-AVERAGE",
            RdCommand::TransferMode => "RD-TRANSFER",
            RdCommand::AnalysisMode => "RD-ANALYSIS",
            RdCommand::TiaMode => "RD-TIA-MODE",
            RdCommand::TiaSensitivity => "RD-TIA-SENSITIVITY",
            RdCommand::WaitButtonState => "RD-WAIT",
            RdCommand::AutoButtonState => "RD-AUTO",
            RdCommand::ReverseButtonState => "RD-REVERSE",
        }
    }
}

/// TIA measuring range of the OEM firmware, in nA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiaSensitivity {
    /// 100 nA full scale.
    Na100,
    /// 300 nA full scale.
    Na300,
    /// 1000 nA full scale.
    Na1000,
}

impl TiaSensitivity {
    /// Decimal value sent on the wire.
    #[must_use]
    pub fn nanoamps(self) -> i64 {
        match self {
            TiaSensitivity::Na100 => 100,
            TiaSensitivity::Na300 => 300,
            TiaSensitivity::Na1000 => 1000,
        }
    }
}

/// Validated parameter of an [`RcCommand`].
#[derive(Debug, Clone, PartialEq)]
pub enum RcInput {
    /// Parameterless command.
    None,
    /// `RC-BEGIN %.1f`: start point in ps.
    Begin(f64),
    /// `RC-RANGE %d`: measuring range in ps.
    Range(i64),
    /// `RC-AVERAGE %d`: averaging number.
    Average(i64),
    /// `RC-TIA : SENSITIVITY %d`: discrete measuring range.
    TiaSensitivity(TiaSensitivity),
    /// `RC-FILEPATH %s`: path for saved pulse data.
    FilePath(String),
}

/// Render an OEM command and its input to wire text.
///
/// # Errors
/// [`TeraflashError::InputMismatch`] when the input shape does not belong to
/// the command.
pub fn serialize(command: RcCommand, input: &RcInput) -> Result<String> {
    let text = match (command, input) {
        (RcCommand::Begin, RcInput::Begin(start_point)) => {
            format!("RC-BEGIN {start_point:.1}")
        }
        (RcCommand::Range, RcInput::Range(range)) => format!("RC-RANGE {range}"),
        (RcCommand::Average, RcInput::Average(averages)) => format!("RC-AVERAGE {averages}"),
        (RcCommand::TiaSensitivity, RcInput::TiaSensitivity(level)) => {
            format!("RC-TIA : SENSITIVITY {}", level.nanoamps())
        }
        (RcCommand::FilePath, RcInput::FilePath(path)) => format!("RC-FILEPATH {path}"),
        (
            RcCommand::LaserOff
            | RcCommand::LaserOn
            | RcCommand::VoltageOff
            | RcCommand::VoltageOn
            | RcCommand::RunOff
            | RcCommand::RunOn
            | RcCommand::TransferSliding
            | RcCommand::TransferBlock
            | RcCommand::AnalysisReduced
            | RcCommand::AnalysisFullRate
            | RcCommand::TiaIntern
            | RcCommand::TiaExtern
            | RcCommand::WaitOn
            | RcCommand::WaitOff
            | RcCommand::AutoOn
            | RcCommand::AutoOff
            | RcCommand::SaveWithSpectrum
            | RcCommand::SaveWithoutSpectrum
            | RcCommand::ReverseOn
            | RcCommand::ReverseOff
            | RcCommand::SetRef
            | RcCommand::DeleteRef
            | RcCommand::SetBackground
            | RcCommand::DeleteBackground,
            RcInput::None,
        ) => command.template().to_string(),
        _ => {
            return Err(TeraflashError::InputMismatch {
                command: command.template(),
            })
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_renders_with_one_decimal() {
        let text = serialize(RcCommand::Begin, &RcInput::Begin(120.0)).unwrap();
        assert_eq!(text, "RC-BEGIN 120.0");
        let text = serialize(RcCommand::Begin, &RcInput::Begin(45.5)).unwrap();
        assert_eq!(text, "RC-BEGIN 45.5");
    }

    #[test]
    fn parameterless_commands_render_their_template() {
        assert_eq!(
            serialize(RcCommand::LaserOn, &RcInput::None).unwrap(),
            "RC-LASER : ON"
        );
        assert_eq!(
            serialize(RcCommand::SaveWithoutSpectrum, &RcInput::None).unwrap(),
            "RC-SAVE WO-S"
        );
    }

    #[test]
    fn tia_sensitivity_uses_discrete_levels() {
        let text = serialize(
            RcCommand::TiaSensitivity,
            &RcInput::TiaSensitivity(TiaSensitivity::Na300),
        )
        .unwrap();
        assert_eq!(text, "RC-TIA : SENSITIVITY 300");
    }

    #[test]
    fn mismatched_input_is_rejected() {
        let err = serialize(RcCommand::LaserOn, &RcInput::Range(50)).unwrap_err();
        assert!(matches!(err, TeraflashError::InputMismatch { .. }));
        let err = serialize(RcCommand::Range, &RcInput::None).unwrap_err();
        assert!(matches!(err, TeraflashError::InputMismatch { .. }));
    }

    #[test]
    fn readback_queries_are_fixed_strings() {
        assert_eq!(RdCommand::Amplitude.wire(), "RD-AMPLITUDE");
        assert_eq!(RdCommand::TotalAcquisitionTime.wire(), "RD-TAC.TIME");
        assert_eq!(RdCommand::TiaSensitivity.wire(), "RD-TIA-SENSITIVITY");
    }
}
