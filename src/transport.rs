//! Transport selection and connection establishment.
//!
//! A gripper is reachable either over Modbus TCP (the compute box gateway)
//! or over a serial line speaking Modbus RTU. Exactly one transport is
//! active per gripper instance; the choice is made once, at construction,
//! by [`Transport::select`], a pure function of the two optional inputs.
//! When both a network address and a serial device are supplied, the
//! network address wins and the serial selection is reported, not rejected.
//!
//! Whatever the variant, the transport carries the gripper's fixed serial
//! line parameters (1 stop bit, 8 data bits, even parity, 115200 baud,
//! 1 second timeout). They are applied to the serial port when RTU is
//! selected; in the TCP case the gateway hardware fixes the physical line
//! itself and only the timeout applies.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::time::timeout;
use tokio_modbus::prelude::*;
use tokio_serial::{DataBits, Parity, SerialStream, StopBits};
use tracing::info;

use crate::error::{ConnectError, ConnectResult};
use crate::master::ModbusLink;
use crate::registers::VG_UNIT_ID;
use crate::DEFAULT_TCP_PORT;

/// Fixed serial line parameters of the VG gripper family.
///
/// These mirror the device's hardware line settings and are not
/// configurable per connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SerialLineConfig {
    /// Baud rate (115200).
    pub baud_rate: u32,
    /// Data bits per character (8).
    pub data_bits: DataBits,
    /// Stop bits (1).
    pub stop_bits: StopBits,
    /// Parity (even).
    pub parity: Parity,
    /// Per-request timeout (1 second).
    pub timeout: Duration,
}

impl Default for SerialLineConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::Even,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Where the gripper is reached.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// Modbus TCP via the compute box.
    Tcp { address: String, port: u16 },
    /// Modbus RTU over a local serial device.
    Serial { device: String },
}

/// The selected transport: one endpoint plus the fixed line parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub endpoint: Endpoint,
    pub line: SerialLineConfig,
}

impl Transport {
    /// Select a transport from the optional address and device inputs.
    ///
    /// Precedence is deterministic: a network address always wins over a
    /// serial device; the discarded serial selection is reported as an
    /// info event, not an error. With neither input this fails with
    /// [`ConnectError::NoTransportSpecified`]. A missing port defaults to
    /// the Modbus TCP port 502.
    pub fn select(
        address: Option<&str>,
        port: Option<u16>,
        device: Option<&str>,
    ) -> ConnectResult<Self> {
        // An empty address string counts as absent.
        let address = address.filter(|a| !a.is_empty());

        let endpoint = match (address, device) {
            (None, None) => return Err(ConnectError::NoTransportSpecified),
            (Some(address), device) => {
                if device.is_some() {
                    info!(
                        "both a network address and a serial device supplied, \
                         using the network address"
                    );
                }
                Endpoint::Tcp {
                    address: address.to_string(),
                    port: port.unwrap_or(DEFAULT_TCP_PORT),
                }
            }
            (None, Some(device)) => Endpoint::Serial {
                device: device.to_string(),
            },
        };

        Ok(Self {
            endpoint,
            line: SerialLineConfig::default(),
        })
    }

    /// Build the Modbus master for this transport and open the connection.
    ///
    /// TCP: the address is parsed ([`ConnectError::TransportInitFailed`] on
    /// a bad address or port string) and the socket connected within the
    /// fixed timeout ([`ConnectError::OpenFailed`] on refusal or timeout).
    /// Serial: the device is opened with the fixed line parameters
    /// ([`ConnectError::OpenFailed`] when the port cannot be opened).
    pub async fn open(&self) -> ConnectResult<ModbusLink> {
        let io_timeout = self.line.timeout;

        match &self.endpoint {
            Endpoint::Tcp { address, port } => {
                let socket: SocketAddr =
                    format!("{address}:{port}").parse().map_err(|e| {
                        ConnectError::init(format!("invalid address {address}:{port}: {e}"))
                    })?;

                let ctx = timeout(io_timeout, tcp::connect_slave(socket, Slave(VG_UNIT_ID)))
                    .await
                    .map_err(|_| ConnectError::open(format!("connect to {socket} timed out")))?
                    .map_err(|e| ConnectError::open(format!("connect to {socket} failed: {e}")))?;

                info!("connected to gripper at {} over TCP", socket);
                Ok(ModbusLink::new(ctx, io_timeout))
            }
            Endpoint::Serial { device } => {
                let builder = tokio_serial::new(device.as_str(), self.line.baud_rate)
                    .data_bits(self.line.data_bits)
                    .stop_bits(self.line.stop_bits)
                    .parity(self.line.parity)
                    .timeout(io_timeout);

                let port = SerialStream::open(&builder).map_err(|e| {
                    ConnectError::open(format!("failed to open serial device {device}: {e}"))
                })?;

                let ctx = rtu::attach_slave(port, Slave(VG_UNIT_ID));
                info!("connected to gripper at {} over RTU", device);
                Ok(ModbusLink::new(ctx, io_timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_requires_a_transport() {
        let result = Transport::select(None, Some(502), None);
        assert!(matches!(result, Err(ConnectError::NoTransportSpecified)));
    }

    #[test]
    fn test_select_address_wins_over_device() {
        let transport =
            Transport::select(Some("192.168.1.1"), Some(502), Some("/dev/ttyUSB0")).unwrap();
        assert_eq!(
            transport.endpoint,
            Endpoint::Tcp {
                address: "192.168.1.1".to_string(),
                port: 502,
            }
        );
    }

    #[test]
    fn test_select_defaults_tcp_port() {
        let transport = Transport::select(Some("10.0.0.5"), None, None).unwrap();
        assert_eq!(
            transport.endpoint,
            Endpoint::Tcp {
                address: "10.0.0.5".to_string(),
                port: DEFAULT_TCP_PORT,
            }
        );
    }

    #[test]
    fn test_select_serial_when_no_address() {
        let transport = Transport::select(None, None, Some("/dev/ttyUSB0")).unwrap();
        assert_eq!(
            transport.endpoint,
            Endpoint::Serial {
                device: "/dev/ttyUSB0".to_string(),
            }
        );
    }

    #[test]
    fn test_select_empty_address_counts_as_absent() {
        let transport = Transport::select(Some(""), None, Some("/dev/ttyUSB0")).unwrap();
        assert!(matches!(transport.endpoint, Endpoint::Serial { .. }));

        let result = Transport::select(Some(""), None, None);
        assert!(matches!(result, Err(ConnectError::NoTransportSpecified)));
    }

    #[test]
    fn test_fixed_line_configuration() {
        let line = SerialLineConfig::default();
        assert_eq!(line.baud_rate, 115_200);
        assert_eq!(line.data_bits, DataBits::Eight);
        assert_eq!(line.stop_bits, StopBits::One);
        assert_eq!(line.parity, Parity::Even);
        assert_eq!(line.timeout, Duration::from_secs(1));

        // Every selected transport carries the same fixed configuration.
        let transport = Transport::select(Some("192.168.1.1"), None, None).unwrap();
        assert_eq!(transport.line, line);
    }

    #[tokio::test]
    async fn test_open_rejects_bad_address() {
        let transport = Transport::select(Some("not an address"), None, None).unwrap();
        let result = transport.open().await;
        assert!(matches!(
            result,
            Err(ConnectError::TransportInitFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_surfaces_connect_failure() {
        // Nothing listens on the discard port of loopback; the connect is
        // either refused immediately or capped by the 1 second timeout.
        let transport = Transport::select(Some("127.0.0.1"), Some(9), None).unwrap();
        let result = transport.open().await;
        assert!(matches!(result, Err(ConnectError::OpenFailed { .. })));
    }

    #[tokio::test]
    async fn test_open_surfaces_missing_serial_device() {
        let transport = Transport::select(None, None, Some("/dev/does-not-exist")).unwrap();
        let result = transport.open().await;
        assert!(matches!(result, Err(ConnectError::OpenFailed { .. })));
    }
}
