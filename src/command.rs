//! Command vocabulary of the control channel.
//!
//! The instrument accepts a fixed set of ASCII command strings with embedded
//! numeric parameters, grouped into four families (System, Laser,
//! Acquisition, Transmission). [`Command`] is the closed enumeration of that
//! vocabulary; each variant carries its wire template. Parameterized commands
//! take a validated input type whose constructor is the single validation
//! gate: a value outside its documented bounds cannot be constructed, so
//! everything downstream (serialization, the state machine, the control
//! client) handles only in-range parameters.
//!
//! [`serialize`] renders a `(Command, CommandInput)` pair to wire text; the
//! inverse lives in [`crate::grammar`].

use crate::error::{Result, TeraflashError};

/// A control-channel command.
///
/// Wire templates use `%d` for decimal and `%f` for floating-point
/// parameters, substituted by [`serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Shuts off the laser and stops the shaker action.
    SystemStop,
    /// Reports the system status.
    SystemTellStatus,
    /// Reads back or switches a monitor channel; see [`MonitorCode`].
    SystemMonitor,
    /// Switches TIA to full sensitivity.
    SystemTiaFull,
    /// Switches TIA to medium sensitivity.
    SystemTiaAtn1,
    /// Switches TIA to smallest sensitivity.
    SystemTiaAtn2,
    /// Switches laser off.
    LaserOff,
    /// Switches laser on.
    LaserOn,
    /// Sets laser pump current, floating number 0..100.
    LaserSet,
    /// Sets start position of pulse acquisition in ps, resolution 0.1.
    AcquisitionBegin,
    /// Sets measuring range in ps; only while the shaker is off.
    AcquisitionRange,
    /// Stops shaker; may last some seconds, since zero position is searched
    /// for.
    AcquisitionStop,
    /// Starts shaker; may last some seconds, since motion amplitude is to be
    /// stabilized.
    AcquisitionStart,
    /// Sets number of averages, decimal number 1..30000.
    AcquisitionAverage,
    /// Clears the average accumulator.
    AcquisitionResetAvg,
    /// Switches transfer to 'sliding' (only from TF5-xxxx up).
    TransmissionSliding,
    /// Switches transfer to 'block' (only from TF5-xxxx up).
    TransmissionBlock,
}

impl Command {
    /// Wire template of this command.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Command::SystemStop => "SYSTEM : STOP",
            Command::SystemTellStatus => "SYSTEM : TELL STATUS",
            Command::SystemMonitor => "SYSTEM : MONITOR %d",
            Command::SystemTiaFull => "SYSTEM : TIA FULL",
            Command::SystemTiaAtn1 => "SYSTEM : TIA ATN1",
            Command::SystemTiaAtn2 => "SYSTEM : TIA ATN2",
            Command::LaserOff => "LASER : OFF",
            Command::LaserOn => "LASER : ON",
            Command::LaserSet => "LASER : SET %f",
            Command::AcquisitionBegin => "ACQUISITION : BEGIN %f",
            Command::AcquisitionRange => "ACQUISITION : RANGE %d",
            Command::AcquisitionStop => "ACQUISITION : STOP",
            Command::AcquisitionStart => "ACQUISITION : START",
            Command::AcquisitionAverage => "ACQUISITION : AVERAGE %d",
            Command::AcquisitionResetAvg => "ACQUISITION : RESET AVG",
            Command::TransmissionSliding => "TRANSMISSION : SLIDING",
            Command::TransmissionBlock => "TRANSMISSION : BLOCK",
        }
    }

    /// All commands, in wire-vocabulary order.
    #[must_use]
    pub fn all() -> &'static [Command] {
        &[
            Command::SystemStop,
            Command::SystemTellStatus,
            Command::SystemMonitor,
            Command::SystemTiaFull,
            Command::SystemTiaAtn1,
            Command::SystemTiaAtn2,
            Command::LaserOff,
            Command::LaserOn,
            Command::LaserSet,
            Command::AcquisitionBegin,
            Command::AcquisitionRange,
            Command::AcquisitionStop,
            Command::AcquisitionStart,
            Command::AcquisitionAverage,
            Command::AcquisitionResetAvg,
            Command::TransmissionSliding,
            Command::TransmissionBlock,
        ]
    }
}

// --------------------------------------- CODES ---------------------------------------

/// Argument of `SYSTEM : MONITOR %d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorCode {
    /// Reports the actual receiver signal, averaged over 2 ms.
    ReceiverSignal,
    /// Reports the automatically generated offset of the TIA in a.u.
    TiaOffset,
    /// Reports the CPU load of the RT processor in %.
    RtProcessorCpuLoad,
    /// Reports effective delay position in ps and the signal value.
    EffectiveDelayPosition,
    /// Shuts off the automatic TIA offset control.
    OffsetControlOff,
    /// Shuts on the automatic TIA offset control.
    OffsetControlOn,
    /// Switches transfer to 'sliding'.
    TransferSliding,
    /// Switches transfer to 'block'.
    TransferBlock,
}

impl MonitorCode {
    /// Decimal value sent on the wire.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            MonitorCode::ReceiverSignal => 0,
            MonitorCode::TiaOffset => 1,
            MonitorCode::RtProcessorCpuLoad => 5,
            MonitorCode::EffectiveDelayPosition => 6,
            MonitorCode::OffsetControlOff => 15,
            MonitorCode::OffsetControlOn => 16,
            MonitorCode::TransferSliding => 25,
            MonitorCode::TransferBlock => 26,
        }
    }

    /// Map a wire code back to its variant.
    ///
    /// # Errors
    /// [`TeraflashError::InvalidParameter`] for codes outside the documented
    /// set.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(MonitorCode::ReceiverSignal),
            1 => Ok(MonitorCode::TiaOffset),
            5 => Ok(MonitorCode::RtProcessorCpuLoad),
            6 => Ok(MonitorCode::EffectiveDelayPosition),
            15 => Ok(MonitorCode::OffsetControlOff),
            16 => Ok(MonitorCode::OffsetControlOn),
            25 => Ok(MonitorCode::TransferSliding),
            26 => Ok(MonitorCode::TransferBlock),
            other => Err(TeraflashError::InvalidParameter {
                reason: format!("monitor code {other} is not one of 0, 1, 5, 6, 15, 16, 25, 26"),
            }),
        }
    }
}

// --------------------------------------- INPUTS ---------------------------------------

/// Input of [`Command::SystemMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMonitorInput {
    code: MonitorCode,
}

impl SystemMonitorInput {
    /// Wrap a monitor code.
    #[must_use]
    pub fn new(code: MonitorCode) -> Self {
        Self { code }
    }

    /// The monitor channel to address.
    #[must_use]
    pub fn code(self) -> MonitorCode {
        self.code
    }
}

/// Input of [`Command::LaserSet`]: pump current in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSetInput {
    pump_current: f64,
}

impl LaserSetInput {
    /// Validate a pump current, `0 <= x <= 100`.
    ///
    /// # Errors
    /// [`TeraflashError::InvalidParameter`] outside the bound.
    pub fn new(pump_current: f64) -> Result<Self> {
        if !(0.0..=100.0).contains(&pump_current) {
            return Err(TeraflashError::InvalidParameter {
                reason: format!("pump current {pump_current} outside 0..=100"),
            });
        }
        Ok(Self { pump_current })
    }

    /// Pump current in percent.
    #[must_use]
    pub fn pump_current(self) -> f64 {
        self.pump_current
    }
}

/// Input of [`Command::AcquisitionBegin`]: start position in ps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionBeginInput {
    start_position: f64,
}

impl AcquisitionBeginInput {
    /// Validate a start position, `0 <= x <= 3000` and an exact multiple of
    /// the 0.1 ps resolution (within floating-point tolerance).
    ///
    /// # Errors
    /// [`TeraflashError::InvalidParameter`] outside the bound or off-grid.
    pub fn new(start_position: f64) -> Result<Self> {
        if !(0.0..=3000.0).contains(&start_position) {
            return Err(TeraflashError::InvalidParameter {
                reason: format!("start position {start_position} outside 0..=3000"),
            });
        }
        if !is_tenth_multiple(start_position) {
            return Err(TeraflashError::InvalidParameter {
                reason: format!("start position {start_position} is not a multiple of 0.1"),
            });
        }
        Ok(Self { start_position })
    }

    /// Start position in ps.
    #[must_use]
    pub fn start_position(self) -> f64 {
        self.start_position
    }
}

/// Whether `x` sits on the instrument's 0.1 ps grid.
fn is_tenth_multiple(x: f64) -> bool {
    let scaled = x * 10.0;
    (scaled - scaled.round()).abs() < 1e-6
}

/// Input of [`Command::AcquisitionRange`]: measuring range in ps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionRangeInput {
    measuring_range: i64,
}

impl AcquisitionRangeInput {
    /// Validate a measuring range, `20 <= x <= 200`.
    ///
    /// # Errors
    /// [`TeraflashError::InvalidParameter`] outside the bound.
    pub fn new(measuring_range: i64) -> Result<Self> {
        if !(20..=200).contains(&measuring_range) {
            return Err(TeraflashError::InvalidParameter {
                reason: format!("measuring range {measuring_range} outside 20..=200"),
            });
        }
        Ok(Self { measuring_range })
    }

    /// Measuring range in ps.
    #[must_use]
    pub fn measuring_range(self) -> i64 {
        self.measuring_range
    }
}

/// Input of [`Command::AcquisitionAverage`]: number of averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionAverageInput {
    num_averages: i64,
}

impl AcquisitionAverageInput {
    /// Validate an averaging number, `1 <= x <= 30000`.
    ///
    /// # Errors
    /// [`TeraflashError::InvalidParameter`] outside the bound.
    pub fn new(num_averages: i64) -> Result<Self> {
        if !(1..=30000).contains(&num_averages) {
            return Err(TeraflashError::InvalidParameter {
                reason: format!("number of averages {num_averages} outside 1..=30000"),
            });
        }
        Ok(Self { num_averages })
    }

    /// Number of averages.
    #[must_use]
    pub fn num_averages(self) -> i64 {
        self.num_averages
    }
}

/// Validated parameter of a command, one shape per parameterized command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandInput {
    /// Parameterless command.
    None,
    /// `SYSTEM : MONITOR %d`.
    SystemMonitor(SystemMonitorInput),
    /// `LASER : SET %f`.
    LaserSet(LaserSetInput),
    /// `ACQUISITION : BEGIN %f`.
    AcquisitionBegin(AcquisitionBeginInput),
    /// `ACQUISITION : RANGE %d`.
    AcquisitionRange(AcquisitionRangeInput),
    /// `ACQUISITION : AVERAGE %d`.
    AcquisitionAverage(AcquisitionAverageInput),
}

// ------------------------------------ SERIALIZE ------------------------------------

/// Render a command and its validated input to wire text.
///
/// The inverse of [`crate::grammar::parse`] for well-formed inputs.
///
/// # Errors
/// [`TeraflashError::InputMismatch`] when the input shape does not belong to
/// the command.
pub fn serialize(command: Command, input: &CommandInput) -> Result<String> {
    let text = match (command, input) {
        (Command::SystemMonitor, CommandInput::SystemMonitor(input)) => {
            format!("SYSTEM : MONITOR {}", input.code().code())
        }
        (Command::LaserSet, CommandInput::LaserSet(input)) => {
            format!("LASER : SET {}", input.pump_current())
        }
        (Command::AcquisitionBegin, CommandInput::AcquisitionBegin(input)) => {
            format!("ACQUISITION : BEGIN {}", input.start_position())
        }
        (Command::AcquisitionRange, CommandInput::AcquisitionRange(input)) => {
            format!("ACQUISITION : RANGE {}", input.measuring_range())
        }
        (Command::AcquisitionAverage, CommandInput::AcquisitionAverage(input)) => {
            format!("ACQUISITION : AVERAGE {}", input.num_averages())
        }
        (
            Command::SystemStop
            | Command::SystemTellStatus
            | Command::SystemTiaFull
            | Command::SystemTiaAtn1
            | Command::SystemTiaAtn2
            | Command::LaserOff
            | Command::LaserOn
            | Command::AcquisitionStop
            | Command::AcquisitionStart
            | Command::AcquisitionResetAvg
            | Command::TransmissionSliding
            | Command::TransmissionBlock,
            CommandInput::None,
        ) => command.template().to_string(),
        _ => {
            return Err(TeraflashError::InputMismatch {
                command: command.template(),
            })
        }
    };
    Ok(text)
}

// ------------------------------------ RESPONSES ------------------------------------

/// Status word of an instrument reply on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Command accepted.
    Ok,
    /// Command rejected by the instrument.
    Error,
    /// Reply carries a requested parameter value.
    Parameter,
}

/// One classified reply line from the control channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Accepted, rejected, or a parameter readback.
    pub status: ResponseStatus,
    /// The reply line with the status word stripped.
    pub payload: String,
}

impl CommandResponse {
    /// Classify one trimmed reply line.
    ///
    /// Replies start with `OK`, `ERROR` or `PARAM`; anything else is treated
    /// as a parameter payload, since monitor readbacks answer with the bare
    /// value.
    #[must_use]
    pub fn classify(line: &str) -> Self {
        let line = line.trim();
        for (word, status) in [
            ("OK", ResponseStatus::Ok),
            ("ERROR", ResponseStatus::Error),
            ("PARAM", ResponseStatus::Parameter),
        ] {
            if let Some(rest) = line.strip_prefix(word) {
                return Self {
                    status,
                    payload: rest.trim().to_string(),
                };
            }
        }
        Self {
            status: ResponseStatus::Parameter,
            payload: line.to_string(),
        }
    }
}
