//! # OnRobot VG - Vacuum Gripper Control over Modbus
//!
//! **Author:** Evan Liu <liuyifanz.1996@gmail.com>
//! **License:** MIT
//!
//! Control library for OnRobot VG-series vacuum grippers (dual-channel
//! VG10, single-channel VGC10) over a Modbus register interface, reachable
//! via Modbus TCP or a serial line speaking RTU.
//!
//! ## Features
//!
//! - **Two Transports, One Facade**: TCP (compute box) or serial RTU,
//!   selected once at construction with deterministic precedence
//! - **Register-Exact Protocol**: the gripper's control and telemetry
//!   register map, bit-exact (`mode << 8 | target`, unit id 65)
//! - **Pure Codec**: encode/decode functions with no I/O, property-tested
//! - **Bounded Waits**: duration-bounded vacuum polling and a fixed
//!   1-second release settle, nothing unbounded
//! - **Typed Failures**: every transport failure surfaces as a typed
//!   result; no retries, no silent reconnection
//!
//! ## Register Map
//!
//! | Address | Unit | Meaning | Access |
//! |---------|------|---------|--------|
//! | 0 | 65 | Channel A control (`mode << 8 \| target %`) | write |
//! | 1 | 65 | Channel B control | write |
//! | 2 | 65 | Vacuum current limit (mA) | read |
//! | 258 | 65 | Channel A vacuum (1/1000 relative) | read |
//! | 259 | 65 | Channel B vacuum | read |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use onrobot_vg::{ChannelSelect, Vg};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect over TCP (a serial device path works the same way)
//!     let mut vg = Vg::connect(Some("192.168.1.1"), Some(502), None).await?;
//!
//!     // Check the pump current limit
//!     let limit = vg.read_vacuum_limit().await?;
//!     println!("Vacuum current limit: {limit} mA");
//!
//!     // Grip on all channels, watch the vacuum build for 5 seconds
//!     vg.vacuum_on(ChannelSelect::All, Duration::from_secs(5)).await?;
//!     vg.release(ChannelSelect::All).await?;
//!
//!     vg.close().await?;
//!     Ok(())
//! }
//! ```

// ============================================================================
// Core modules
// ============================================================================

/// Error types for connection and control operations
pub mod error;

/// Register map and pure encode/decode codec
pub mod registers;

/// Transport selection (TCP / serial RTU) and connection establishment
pub mod transport;

/// The Modbus master boundary: trait contract and tokio-modbus backed link
pub mod master;

/// High-level gripper control facade and telemetry reader
pub mod gripper;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// === Async runtime (users can use onrobot_vg::tokio) ===
pub use tokio;

// === Core gripper API ===
pub use gripper::{ChannelSelect, ChannelState, Telemetry, Vg, RELEASE_SETTLE};

// === Error handling ===
pub use error::{ConnectError, ConnectResult, ControlError, ControlResult};

// === Core types ===
pub use registers::{ChannelId, ControlMode, GripperModel};

// === Codec (advanced usage) ===
pub use registers::{
    decode_vacuum_level, decode_vacuum_limit, encode_control, FULL_VACUUM, MAX_TARGET_VACUUM,
    VG_UNIT_ID,
};

// === Transport and master boundary ===
pub use master::{ModbusLink, ModbusMaster};
pub use transport::{Endpoint, SerialLineConfig, Transport};

/// Modbus TCP default port
pub const DEFAULT_TCP_PORT: u16 = 502;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn info() -> String {
    format!(
        "OnRobot VG v{} - Modbus control library for VG-series vacuum grippers",
        VERSION
    )
}
