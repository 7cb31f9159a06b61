//! High-level control facade for VG grippers.
//!
//! [`Vg`] is the command surface: per-channel and all-channel control
//! writes, the duration-bounded vacuum poll, the settle-delayed release,
//! read-only telemetry accessors, and explicit close. It is generic over
//! the [`ModbusMaster`] so the same facade drives a real link or a
//! recording mock in tests.
//!
//! The facade tracks the last *commanded* mode per channel; the device
//! never reports its mode back, only the actual vacuum level, so channel
//! states are bookkeeping of intent, not device-confirmed fact.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use onrobot_vg::{ChannelId, ChannelSelect, Vg};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut vg = Vg::connect(Some("192.168.1.1"), Some(502), None).await?;
//!
//!     // Grip on both channels and watch the vacuum build for 5 seconds.
//!     vg.vacuum_on(ChannelSelect::All, Duration::from_secs(5)).await?;
//!     vg.release(ChannelSelect::All).await?;
//!
//!     // Channel A alone.
//!     vg.vacuum_on(ChannelId::A, Duration::from_secs(5)).await?;
//!     vg.release(ChannelId::A).await?;
//!
//!     vg.close().await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::info;

use crate::error::{ConnectResult, ControlError, ControlResult};
use crate::master::{ModbusLink, ModbusMaster};
use crate::registers::{
    decode_vacuum_level, decode_vacuum_limit, encode_control, ChannelId, ControlMode,
    GripperModel, FULL_VACUUM, REG_CONTROL_A, REG_VACUUM_LIMIT, VG_UNIT_ID,
};
use crate::transport::Transport;

/// Settle delay after a release command, while the pump spins down.
pub const RELEASE_SETTLE: Duration = Duration::from_secs(1);

/// Last commanded state of a channel.
///
/// `Unknown` until the first command after construction. Transitions follow
/// commands, not device feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Unknown,
    Releasing,
    Gripping,
    Idling,
}

impl From<ControlMode> for ChannelState {
    fn from(mode: ControlMode) -> Self {
        match mode {
            ControlMode::Release => Self::Releasing,
            ControlMode::Grip => Self::Gripping,
            ControlMode::Idle => Self::Idling,
        }
    }
}

/// Target of a command: one channel or every channel the model has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelect {
    One(ChannelId),
    All,
}

impl From<ChannelId> for ChannelSelect {
    fn from(channel: ChannelId) -> Self {
        Self::One(channel)
    }
}

/// One on-demand telemetry snapshot. Nothing here is cached; every call to
/// [`Vg::read_telemetry`] issues fresh register reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Telemetry {
    /// Vacuum pump current limit in milliamperes.
    pub vacuum_limit_ma: u16,
    /// Channel A actual vacuum, 1/1000 of relative vacuum.
    pub vacuum_a: u16,
    /// Channel B actual vacuum; `None` on single-channel models.
    pub vacuum_b: Option<u16>,
}

/// A connected VG gripper.
///
/// Owns exactly one master handle built from exactly one transport. There
/// is no reconnection logic: once the link drops, operations keep failing
/// with [`ControlError::IoFailure`] and the caller reconstructs the
/// gripper.
pub struct Vg<M = ModbusLink> {
    master: M,
    model: GripperModel,
    transport: Option<Transport>,
    states: [ChannelState; 2],
}

impl Vg<ModbusLink> {
    /// Connect to a dual-channel VG10.
    ///
    /// At least one of `address` and `device` must be supplied; when both
    /// are, the network address wins (see
    /// [`Transport::select`](crate::transport::Transport::select)). The
    /// connection is opened before this returns.
    pub async fn connect(
        address: Option<&str>,
        port: Option<u16>,
        device: Option<&str>,
    ) -> ConnectResult<Self> {
        Self::connect_model(GripperModel::Vg10, address, port, device).await
    }

    /// Connect to a single-channel VGC10.
    pub async fn connect_single(
        address: Option<&str>,
        port: Option<u16>,
        device: Option<&str>,
    ) -> ConnectResult<Self> {
        Self::connect_model(GripperModel::Vgc10, address, port, device).await
    }

    /// Connect to an explicit gripper model.
    pub async fn connect_model(
        model: GripperModel,
        address: Option<&str>,
        port: Option<u16>,
        device: Option<&str>,
    ) -> ConnectResult<Self> {
        let transport = Transport::select(address, port, device)?;
        let master = transport.open().await?;

        let mut vg = Self::with_master(master, model);
        vg.transport = Some(transport);
        Ok(vg)
    }

    /// The transport this gripper was connected over.
    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }
}

impl<M: ModbusMaster> Vg<M> {
    /// Build a facade over an already-connected master.
    ///
    /// This is the seam the tests use; production code goes through
    /// [`Vg::connect`].
    pub fn with_master(master: M, model: GripperModel) -> Self {
        Self {
            master,
            model,
            transport: None,
            states: [ChannelState::Unknown; 2],
        }
    }

    /// The gripper model this facade commands.
    pub fn model(&self) -> GripperModel {
        self.model
    }

    /// Reference to the underlying master.
    pub fn master(&self) -> &M {
        &self.master
    }

    /// Mutable reference to the underlying master.
    pub fn master_mut(&mut self) -> &mut M {
        &mut self.master
    }

    /// Last commanded state of a channel.
    pub fn channel_state(&self, channel: ChannelId) -> ChannelState {
        self.states[Self::slot(channel)]
    }

    fn slot(channel: ChannelId) -> usize {
        match channel {
            ChannelId::A => 0,
            ChannelId::B => 1,
        }
    }

    fn ensure_channel(&self, channel: ChannelId) -> ControlResult<()> {
        if self.model.has_channel(channel) {
            Ok(())
        } else {
            Err(ControlError::ChannelUnavailable(channel))
        }
    }

    // ========================================================================
    // Channel control
    // ========================================================================

    /// Command one channel: a single encoded write at the channel's control
    /// address.
    ///
    /// The target is a percentage; the device uses it only in
    /// [`ControlMode::Grip`] and should never be commanded above
    /// [`MAX_TARGET_VACUUM`](crate::registers::MAX_TARGET_VACUUM); the
    /// codec encodes whatever is supplied, keeping that contract with the
    /// caller.
    pub async fn set_channel(
        &mut self,
        channel: ChannelId,
        mode: ControlMode,
        target: u8,
    ) -> ControlResult<()> {
        self.ensure_channel(channel)?;
        let value = encode_control(mode, target);
        self.master
            .write_register(channel.control_address(), value, VG_UNIT_ID)
            .await?;
        self.states[Self::slot(channel)] = mode.into();
        Ok(())
    }

    /// Command every channel of the model in a single batched write.
    ///
    /// Dual-channel models get one multi-register write covering both
    /// control registers; single-channel models degenerate to one
    /// single-register write.
    pub async fn set_all(&mut self, mode: ControlMode, target: u8) -> ControlResult<()> {
        let value = encode_control(mode, target);
        let channels = self.model.channels();

        if channels.len() == 1 {
            self.master
                .write_register(REG_CONTROL_A, value, VG_UNIT_ID)
                .await?;
        } else {
            let values = vec![value; channels.len()];
            self.master
                .write_registers(REG_CONTROL_A, &values, VG_UNIT_ID)
                .await?;
        }

        for &channel in channels {
            self.states[Self::slot(channel)] = mode.into();
        }
        Ok(())
    }

    /// Grip at full target on every channel.
    pub async fn grip_all(&mut self) -> ControlResult<()> {
        self.set_all(ControlMode::Grip, FULL_VACUUM).await
    }

    /// Release every channel, then wait out the settle delay.
    pub async fn release_all(&mut self) -> ControlResult<()> {
        self.release(ChannelSelect::All).await
    }

    /// Grip at full target on the selection, then poll and report the
    /// relevant vacuum level(s) for `duration`.
    ///
    /// The poll is bounded by elapsed wall-clock time, not iteration count:
    /// the first reading is unconditional, and the loop ends once elapsed
    /// time reaches `duration`, so at least one reading always occurs,
    /// even with a zero duration.
    pub async fn vacuum_on(
        &mut self,
        selection: impl Into<ChannelSelect>,
        duration: Duration,
    ) -> ControlResult<()> {
        let selection = selection.into();
        self.command(selection, ControlMode::Grip, FULL_VACUUM)
            .await?;

        let start = Instant::now();
        loop {
            self.report_vacuum(selection).await?;
            if start.elapsed() >= duration {
                break;
            }
        }
        Ok(())
    }

    /// Release the selection, then hold for the fixed 1-second settle delay
    /// while the pump spins down. The delay is not cancelable.
    pub async fn release(&mut self, selection: impl Into<ChannelSelect>) -> ControlResult<()> {
        self.command(selection.into(), ControlMode::Release, 0)
            .await?;
        sleep(RELEASE_SETTLE).await;
        Ok(())
    }

    async fn command(
        &mut self,
        selection: ChannelSelect,
        mode: ControlMode,
        target: u8,
    ) -> ControlResult<()> {
        match selection {
            ChannelSelect::One(channel) => self.set_channel(channel, mode, target).await,
            ChannelSelect::All => self.set_all(mode, target).await,
        }
    }

    async fn report_vacuum(&mut self, selection: ChannelSelect) -> ControlResult<()> {
        match selection {
            ChannelSelect::One(channel) => {
                let vacuum = self.read_channel_vacuum(channel).await?;
                info!("channel {} vacuum: {}", channel, vacuum);
            }
            ChannelSelect::All => {
                if self.model.has_channel(ChannelId::B) {
                    let a = self.read_channel_vacuum(ChannelId::A).await?;
                    let b = self.read_channel_vacuum(ChannelId::B).await?;
                    info!("channel A vacuum: {}, channel B vacuum: {}", a, b);
                } else {
                    let a = self.read_channel_vacuum(ChannelId::A).await?;
                    info!("channel A vacuum: {}", a);
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Telemetry
    // ========================================================================

    /// Read the vacuum pump current limit in milliamperes.
    ///
    /// The limit is 500 mA by default and should never be set above
    /// 1000 mA.
    pub async fn read_vacuum_limit(&mut self) -> ControlResult<u16> {
        let registers = self
            .master
            .read_holding_registers(REG_VACUUM_LIMIT, 1, VG_UNIT_ID)
            .await?;
        Ok(decode_vacuum_limit(Self::single(registers)?))
    }

    /// Read the actual vacuum on a channel, in 1/1000 of relative vacuum.
    ///
    /// Finer-grained than the percent setpoint; extra accuracy is desirable
    /// on the actual vacuum.
    pub async fn read_channel_vacuum(&mut self, channel: ChannelId) -> ControlResult<u16> {
        self.ensure_channel(channel)?;
        let registers = self
            .master
            .read_holding_registers(channel.vacuum_address(), 1, VG_UNIT_ID)
            .await?;
        Ok(decode_vacuum_level(Self::single(registers)?))
    }

    /// Take one fresh telemetry snapshot: current limit plus per-channel
    /// vacuum.
    pub async fn read_telemetry(&mut self) -> ControlResult<Telemetry> {
        let vacuum_limit_ma = self.read_vacuum_limit().await?;
        let vacuum_a = self.read_channel_vacuum(ChannelId::A).await?;
        let vacuum_b = if self.model.has_channel(ChannelId::B) {
            Some(self.read_channel_vacuum(ChannelId::B).await?)
        } else {
            None
        };
        Ok(Telemetry {
            vacuum_limit_ma,
            vacuum_a,
            vacuum_b,
        })
    }

    fn single(registers: Vec<u16>) -> ControlResult<u16> {
        registers
            .first()
            .copied()
            .ok_or_else(|| ControlError::io("empty register response"))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Close the connection with the gripper.
    ///
    /// Close exactly once: a second close fails with
    /// [`ConnectError::AlreadyClosed`](crate::error::ConnectError::AlreadyClosed).
    pub async fn close(&mut self) -> ConnectResult<()> {
        self.master.close().await
    }

    /// Whether the underlying link still holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.master.is_connected()
    }
}

// ============================================================================
// Tests
// ============================================================================
