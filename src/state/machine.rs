//! Command execution against the client-side state model.
//!
//! [`apply`] is a pure transition function: it never mutates the input state,
//! and a rejected command (`CommandResult::Error`) is a returned value the
//! caller can inspect, not an abort. Every declared command has a transition;
//! monitor readbacks and `RESET AVG` legitimately leave the state unchanged
//! because they address device internals the client does not mirror.

use crate::command::{Command, CommandInput, MonitorCode};
use crate::error::{Result, TeraflashError};
use crate::state::{AcquisitionStatus, LaserStatus, SystemState, SystemStatus, TiaStatus, TransferStatus};

/// Outcome of applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command accepted; the returned state reflects it.
    Ok,
    /// Command rejected by a precondition; the returned state is unchanged.
    Error(String),
}

/// Value produced by a readback command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusReport {
    /// Full status snapshot (`SYSTEM : TELL STATUS`).
    System(SystemState),
    /// Monitor channel whose device readback was requested
    /// (`SYSTEM : MONITOR` with a reporting code).
    Monitor(MonitorCode),
}

/// Result of one [`apply`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Accepted or rejected.
    pub result: CommandResult,
    /// The successor state (equal to the input state on rejection).
    pub state: SystemState,
    /// Readback value, when the command produces one.
    pub value: Option<StatusReport>,
}

impl Transition {
    fn ok(state: SystemState) -> Self {
        Self {
            result: CommandResult::Ok,
            state,
            value: None,
        }
    }

    fn ok_with(state: SystemState, value: StatusReport) -> Self {
        Self {
            result: CommandResult::Ok,
            state,
            value: Some(value),
        }
    }

    fn rejected(state: SystemState, reason: impl Into<String>) -> Self {
        Self {
            result: CommandResult::Error(reason.into()),
            state,
            value: None,
        }
    }
}

/// Apply a command to a state, producing `(result, new state, value)`.
///
/// # Errors
/// [`TeraflashError::InputMismatch`] when the input shape does not belong to
/// the command; no transition is computed in that case. Precondition
/// failures are **not** errors: they come back as
/// [`CommandResult::Error`] inside the transition.
pub fn apply(state: &SystemState, command: Command, input: &CommandInput) -> Result<Transition> {
    let mut next = *state;
    let transition = match (command, input) {
        (Command::SystemStop, CommandInput::None) => {
            next.status = SystemStatus::Off;
            Transition::ok(next)
        }
        (Command::SystemTellStatus, CommandInput::None) => {
            Transition::ok_with(next, StatusReport::System(*state))
        }
        (Command::SystemMonitor, CommandInput::SystemMonitor(input)) => match input.code() {
            MonitorCode::TransferSliding => {
                next.laser.transfer_status = TransferStatus::Sliding;
                Transition::ok(next)
            }
            MonitorCode::TransferBlock => {
                next.laser.transfer_status = TransferStatus::Block;
                Transition::ok(next)
            }
            // The automatic offset control loop lives in the instrument and
            // is not mirrored client-side.
            MonitorCode::OffsetControlOff | MonitorCode::OffsetControlOn => Transition::ok(next),
            code @ (MonitorCode::ReceiverSignal
            | MonitorCode::TiaOffset
            | MonitorCode::RtProcessorCpuLoad
            | MonitorCode::EffectiveDelayPosition) => {
                Transition::ok_with(next, StatusReport::Monitor(code))
            }
        },
        (Command::SystemTiaFull, CommandInput::None) => {
            next.laser.tia_status = TiaStatus::Full;
            Transition::ok(next)
        }
        (Command::SystemTiaAtn1, CommandInput::None) => {
            next.laser.tia_status = TiaStatus::Atn1;
            Transition::ok(next)
        }
        (Command::SystemTiaAtn2, CommandInput::None) => {
            next.laser.tia_status = TiaStatus::Atn2;
            Transition::ok(next)
        }
        (Command::LaserOff, CommandInput::None) => {
            next.laser.status = LaserStatus::Off;
            Transition::ok(next)
        }
        (Command::LaserOn, CommandInput::None) => {
            next.laser.status = LaserStatus::On;
            Transition::ok(next)
        }
        (Command::LaserSet, CommandInput::LaserSet(input)) => {
            next.laser.pump_current = input.pump_current();
            Transition::ok(next)
        }
        (Command::AcquisitionBegin, CommandInput::AcquisitionBegin(input)) => {
            next.acquisition.start_position = input.start_position();
            Transition::ok(next)
        }
        (Command::AcquisitionRange, CommandInput::AcquisitionRange(input)) => {
            // May only be set when the shaker is off.
            if state.acquisition.status == AcquisitionStatus::On {
                Transition::rejected(
                    next,
                    "measuring range may only be set while acquisition is stopped",
                )
            } else {
                next.acquisition.measuring_range = input.measuring_range();
                Transition::ok(next)
            }
        }
        (Command::AcquisitionStop, CommandInput::None) => {
            next.acquisition.status = AcquisitionStatus::Off;
            Transition::ok(next)
        }
        (Command::AcquisitionStart, CommandInput::None) => {
            next.acquisition.status = AcquisitionStatus::On;
            Transition::ok(next)
        }
        (Command::AcquisitionAverage, CommandInput::AcquisitionAverage(input)) => {
            next.acquisition.num_averages = input.num_averages();
            Transition::ok(next)
        }
        // Clears the device-side accumulator only.
        (Command::AcquisitionResetAvg, CommandInput::None) => Transition::ok(next),
        (Command::TransmissionSliding, CommandInput::None) => {
            next.laser.transfer_status = TransferStatus::Sliding;
            Transition::ok(next)
        }
        (Command::TransmissionBlock, CommandInput::None) => {
            next.laser.transfer_status = TransferStatus::Block;
            Transition::ok(next)
        }
        _ => {
            return Err(TeraflashError::InputMismatch {
                command: command.template(),
            })
        }
    };
    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{
        AcquisitionRangeInput, LaserSetInput, SystemMonitorInput,
    };

    fn running_state() -> SystemState {
        SystemState {
            status: SystemStatus::On,
            ..SystemState::default()
        }
    }

    #[test]
    fn system_stop_converges_to_off_from_any_status() {
        for status in [SystemStatus::Off, SystemStatus::On] {
            let state = SystemState {
                status,
                ..SystemState::default()
            };
            let t = apply(&state, Command::SystemStop, &CommandInput::None).unwrap();
            assert_eq!(t.result, CommandResult::Ok);
            assert_eq!(t.state.status, SystemStatus::Off);
            // Laser substate untouched.
            assert_eq!(t.state.laser, state.laser);
        }
    }

    #[test]
    fn tell_status_reports_without_changing_state() {
        let state = running_state();
        let t = apply(&state, Command::SystemTellStatus, &CommandInput::None).unwrap();
        assert_eq!(t.state, state);
        assert_eq!(t.value, Some(StatusReport::System(state)));
    }

    #[test]
    fn apply_never_mutates_its_input() {
        let state = running_state();
        let before = state;
        let _ = apply(&state, Command::LaserOn, &CommandInput::None).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn laser_commands_drive_laser_substate() {
        let state = running_state();
        let t = apply(&state, Command::LaserOn, &CommandInput::None).unwrap();
        assert_eq!(t.state.laser.status, LaserStatus::On);

        let input = CommandInput::LaserSet(LaserSetInput::new(72.5).unwrap());
        let t = apply(&t.state, Command::LaserSet, &input).unwrap();
        assert_eq!(t.state.laser.pump_current, 72.5);

        let t = apply(&t.state, Command::LaserOff, &CommandInput::None).unwrap();
        assert_eq!(t.state.laser.status, LaserStatus::Off);
        // Pump current survives the off switch.
        assert_eq!(t.state.laser.pump_current, 72.5);
    }

    #[test]
    fn tia_commands_select_sensitivity() {
        let state = running_state();
        for (command, expected) in [
            (Command::SystemTiaFull, TiaStatus::Full),
            (Command::SystemTiaAtn1, TiaStatus::Atn1),
            (Command::SystemTiaAtn2, TiaStatus::Atn2),
        ] {
            let t = apply(&state, command, &CommandInput::None).unwrap();
            assert_eq!(t.state.laser.tia_status, expected);
        }
    }

    #[test]
    fn monitor_transfer_codes_mirror_into_state() {
        let state = running_state();
        let sliding = CommandInput::SystemMonitor(SystemMonitorInput::new(
            MonitorCode::TransferSliding,
        ));
        let t = apply(&state, Command::SystemMonitor, &sliding).unwrap();
        assert_eq!(t.state.laser.transfer_status, TransferStatus::Sliding);
        assert_eq!(t.value, None);
    }

    #[test]
    fn monitor_readback_codes_echo_without_state_change() {
        let state = running_state();
        let query =
            CommandInput::SystemMonitor(SystemMonitorInput::new(MonitorCode::ReceiverSignal));
        let t = apply(&state, Command::SystemMonitor, &query).unwrap();
        assert_eq!(t.state, state);
        assert_eq!(t.value, Some(StatusReport::Monitor(MonitorCode::ReceiverSignal)));
    }

    #[test]
    fn range_is_rejected_while_shaker_runs() {
        let state = running_state();
        let t = apply(&state, Command::AcquisitionStart, &CommandInput::None).unwrap();
        assert_eq!(t.state.acquisition.status, AcquisitionStatus::On);

        let input = CommandInput::AcquisitionRange(AcquisitionRangeInput::new(50).unwrap());
        let rejected = apply(&t.state, Command::AcquisitionRange, &input).unwrap();
        assert!(matches!(rejected.result, CommandResult::Error(_)));
        // State unchanged by the rejected command.
        assert_eq!(rejected.state, t.state);

        let stopped = apply(&t.state, Command::AcquisitionStop, &CommandInput::None).unwrap();
        let accepted = apply(&stopped.state, Command::AcquisitionRange, &input).unwrap();
        assert_eq!(accepted.result, CommandResult::Ok);
        assert_eq!(accepted.state.acquisition.measuring_range, 50);
    }

    #[test]
    fn reset_avg_is_accepted_and_leaves_state_alone() {
        let state = running_state();
        let t = apply(&state, Command::AcquisitionResetAvg, &CommandInput::None).unwrap();
        assert_eq!(t.result, CommandResult::Ok);
        assert_eq!(t.state, state);
    }

    #[test]
    fn transmission_commands_set_transfer_mode() {
        let state = running_state();
        let t = apply(&state, Command::TransmissionSliding, &CommandInput::None).unwrap();
        assert_eq!(t.state.laser.transfer_status, TransferStatus::Sliding);
        let t = apply(&t.state, Command::TransmissionBlock, &CommandInput::None).unwrap();
        assert_eq!(t.state.laser.transfer_status, TransferStatus::Block);
    }

    #[test]
    fn mismatched_input_shape_is_an_error_not_a_transition() {
        let state = running_state();
        let input = CommandInput::LaserSet(LaserSetInput::new(10.0).unwrap());
        let err = apply(&state, Command::SystemStop, &input).unwrap_err();
        assert!(matches!(err, TeraflashError::InputMismatch { .. }));

        let err = apply(&state, Command::LaserSet, &CommandInput::None).unwrap_err();
        assert!(matches!(err, TeraflashError::InputMismatch { .. }));
    }
}
