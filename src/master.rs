//! The Modbus master boundary.
//!
//! The gripper facade never speaks wire framing itself; it drives a Modbus
//! master through the [`ModbusMaster`] trait: single/multiple register
//! writes, holding register reads, and close. [`ModbusLink`] is the
//! production implementation, wrapping a `tokio-modbus` client context
//! (TCP or RTU, the framing is the context's concern) with the gripper's
//! fixed 1-second per-request timeout.
//!
//! One request is in flight at a time: every operation is awaited to
//! completion before the next is issued, the classic Modbus master
//! constraint. There is no retry and no reconnection here; a failed
//! operation surfaces immediately and the caller decides what to do.

use std::time::Duration;

use tokio::time::timeout;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;

use crate::error::{ConnectError, ConnectResult, ControlError, ControlResult};

/// Register-level interface of a connected Modbus master.
///
/// Implemented by [`ModbusLink`] for real devices and by recording mocks in
/// tests. All operations address a unit (sub-device) on the link.
pub trait ModbusMaster: Send {
    /// Read `count` holding registers starting at `address`.
    fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> impl std::future::Future<Output = ControlResult<Vec<u16>>> + Send;

    /// Write a single holding register.
    fn write_register(
        &mut self,
        address: u16,
        value: u16,
        unit: u8,
    ) -> impl std::future::Future<Output = ControlResult<()>> + Send;

    /// Write a contiguous block of holding registers in one request.
    fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> impl std::future::Future<Output = ControlResult<()>> + Send;

    /// Close the connection. Closing twice fails with
    /// [`ConnectError::AlreadyClosed`]; close exactly once.
    fn close(&mut self) -> impl std::future::Future<Output = ConnectResult<()>> + Send;

    /// Whether the link still holds an open connection.
    fn is_connected(&self) -> bool;
}

/// A connected Modbus master handle.
///
/// Owns the `tokio-modbus` client context produced by
/// [`Transport::open`](crate::transport::Transport::open). Every register
/// operation is bounded by the fixed per-request timeout; a timeout or
/// transport error yields a failed result without tearing the link down.
/// A genuinely dropped connection simply keeps failing until the caller
/// reconstructs the handle.
pub struct ModbusLink {
    ctx: Option<Context>,
    timeout: Duration,
}

impl ModbusLink {
    pub(crate) fn new(ctx: Context, timeout: Duration) -> Self {
        Self {
            ctx: Some(ctx),
            timeout,
        }
    }

    /// Per-request timeout applied to every register operation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn ctx(&mut self) -> ControlResult<&mut Context> {
        self.ctx
            .as_mut()
            .ok_or_else(|| ControlError::io("connection closed"))
    }
}

impl ModbusMaster for ModbusLink {
    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
        unit: u8,
    ) -> ControlResult<Vec<u16>> {
        let io_timeout = self.timeout;
        let ctx = self.ctx()?;
        ctx.set_slave(Slave(unit));

        let registers = timeout(io_timeout, ctx.read_holding_registers(address, count))
            .await
            .map_err(|_| {
                ControlError::io(format!(
                    "read of register {address} timed out after {}ms",
                    io_timeout.as_millis()
                ))
            })?
            .map_err(|e| ControlError::io(format!("read of register {address} failed: {e}")))?
            .map_err(|e| {
                ControlError::io(format!("device exception reading register {address}: {e}"))
            })?;

        Ok(registers)
    }

    async fn write_register(&mut self, address: u16, value: u16, unit: u8) -> ControlResult<()> {
        let io_timeout = self.timeout;
        let ctx = self.ctx()?;
        ctx.set_slave(Slave(unit));

        timeout(io_timeout, ctx.write_single_register(address, value))
            .await
            .map_err(|_| {
                ControlError::io(format!(
                    "write of register {address} timed out after {}ms",
                    io_timeout.as_millis()
                ))
            })?
            .map_err(|e| ControlError::io(format!("write of register {address} failed: {e}")))?
            .map_err(|e| {
                ControlError::io(format!("device exception writing register {address}: {e}"))
            })?;

        Ok(())
    }

    async fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
        unit: u8,
    ) -> ControlResult<()> {
        let io_timeout = self.timeout;
        let ctx = self.ctx()?;
        ctx.set_slave(Slave(unit));

        timeout(io_timeout, ctx.write_multiple_registers(address, values))
            .await
            .map_err(|_| {
                ControlError::io(format!(
                    "write of {} registers at {address} timed out after {}ms",
                    values.len(),
                    io_timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                ControlError::io(format!(
                    "write of {} registers at {address} failed: {e}",
                    values.len()
                ))
            })?
            .map_err(|e| {
                ControlError::io(format!("device exception writing register {address}: {e}"))
            })?;

        Ok(())
    }

    async fn close(&mut self) -> ConnectResult<()> {
        let io_timeout = self.timeout;
        let mut ctx = self.ctx.take().ok_or(ConnectError::AlreadyClosed)?;

        timeout(io_timeout, ctx.disconnect())
            .await
            .map_err(|_| ConnectError::close("disconnect timed out"))?
            .map_err(|e| ConnectError::close(format!("disconnect failed: {e}")))?;

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_link() -> ModbusLink {
        ModbusLink {
            ctx: None,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_operations_on_closed_link_fail() {
        let mut link = closed_link();
        assert!(!link.is_connected());

        let result = link.read_holding_registers(2, 1, 65).await;
        assert!(matches!(result, Err(ControlError::IoFailure { .. })));

        let result = link.write_register(0, 0x0114, 65).await;
        assert!(matches!(result, Err(ControlError::IoFailure { .. })));

        let result = link.write_registers(0, &[0, 0], 65).await;
        assert!(matches!(result, Err(ControlError::IoFailure { .. })));
    }

    #[tokio::test]
    async fn test_close_on_closed_link_is_already_closed() {
        let mut link = closed_link();
        let result = link.close().await;
        assert!(matches!(result, Err(ConnectError::AlreadyClosed)));
    }
}
