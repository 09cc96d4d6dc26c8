use thiserror::Error;

/// Raw `kern_return_t`/`IOReturn` value as returned by IOKit.
pub type KernReturn = i32;

/// Mask applied to IOKit return codes, the same as the `err_get_code` macro.
pub const ERR_CODE_MASK: u32 = 0x3fff;

/// Strip the system and subsystem bits from an IOKit return code.
///
/// `kIOReturnNotPrivileged` (`0xe00002c1`) becomes `0x2c1`.
pub const fn err_get_code(kr: KernReturn) -> u32 {
    (kr as u32) & ERR_CODE_MASK
}

/// A key could not be packed into its 32-bit form.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEncodingError {
    #[error("SMC key must be exactly 4 bytes, got {len}")]
    InvalidLength { len: usize },
    #[error("SMC key must be ASCII")]
    NotAscii,
}

/// Failures opening or closing the driver connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("can not get IO main port (code {code:#x})")]
    MainPort { code: KernReturn },
    #[error("service {service} not found")]
    ServiceNotFound { service: String },
    #[error("IOServiceOpen() = {code:#010x}")]
    OpenFailed { code: KernReturn },
    #[error("IOServiceClose() = {code:#010x}")]
    CloseFailed { code: KernReturn },
}

/// A single driver round trip failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// The struct method call itself failed; `code` is already normalized
    /// with [`err_get_code`].
    #[error("SMC call failed (code {code:#x})")]
    Kernel { code: u32 },
    /// The call went through but the SMC reported a non-zero result byte.
    #[error("SMC returned result {result:#04x}")]
    Smc { result: u8 },
}

impl ProtocolError {
    /// Build from a raw failing `kern_return_t`.
    pub const fn from_kern(kr: KernReturn) -> Self {
        Self::Kernel {
            code: err_get_code(kr),
        }
    }

    /// `true` when the SMC does not know the key.
    pub const fn is_key_not_found(&self) -> bool {
        matches!(
            self,
            Self::Smc {
                result: crate::structs::SMC_RESULT_KEY_NOT_FOUND
            }
        )
    }
}

/// A value was read but can not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized data type '{data_type}'")]
    UnrecognizedType { data_type: String },
    #[error("key holds no data")]
    NoData,
    #[error("'{data_type}' value truncated to {size} bytes")]
    Truncated { data_type: String, size: u32 },
}

/// Umbrella error returned by [`crate::smc::Smc`], wrapping each layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmcError {
    #[error(transparent)]
    Key(#[from] KeyEncodingError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, SmcError>;
