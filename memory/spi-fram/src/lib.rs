#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod bus;
mod device;
mod driver;
mod error;
#[cfg(test)]
mod fake;
mod frame;
#[cfg(feature = "embedded-io")]
pub mod io;
mod opcode;

pub use self::{
    device::{lookup, DeviceDescriptor, DeviceId, DEVICES},
    driver::{Driver, PowerState, StatusRegister},
    error::DriverError,
    frame::AddressWidth,
    opcode::Opcode,
};
