//! A library for reading the Apple System Management Controller (SMC).
//!
//! The SMC exposes temperatures, fan speeds and other hardware parameters
//! under four character keys such as `TC0D`. This crate packs keys and
//! requests into the record the `AppleSMC` driver expects, runs the
//! key-info / read-key exchange and decodes the returned bytes.
//!
//! Only the IOKit connection in [`io`] is macOS specific. Everything else
//! works on any platform against a custom [`io::Transport`].
//!
//! ```no_run
//! use smc_sensors::{keys, smc::Smc, value::TemperatureUnit};
//!
//! let smc = Smc::open().unwrap();
//! println!(
//!     "CPU: {}{}",
//!     smc.get_temperature(keys::CPU_0_DIODE, TemperatureUnit::Celsius),
//!     TemperatureUnit::Celsius
//! );
//! println!("Fan 0: {} RPM", smc.get_fan_rpm(0));
//! ```

#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod io;
pub mod key;
pub mod keys;
pub mod protocol;
pub mod smc;
pub mod structs;
pub mod value;

pub use config::SmcConfig;
pub use error::{Result, SmcError};
pub use key::SensorKey;
pub use smc::Smc;
pub use value::TemperatureUnit;
