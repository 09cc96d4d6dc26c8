use std::{borrow::Cow, fmt, str::FromStr};

use crate::error::KeyEncodingError;

/// Length of every SMC key and data type code.
pub const SMC_KEY_SIZE: usize = 4;

/// Pack a 4-character key into the big-endian `u32` the SMC expects.
///
/// Byte 0 lands in bits 31..24, byte 3 in bits 7..0.
pub fn encode(key: &str) -> Result<u32, KeyEncodingError> {
    SensorKey::new(key).map(|k| k.as_u32())
}

/// Unpack a `u32` (a key or a data type code) into its 4 characters.
///
/// Non UTF-8 lanes are replaced, so the result always has 4 chars when the
/// input is printable ASCII.
pub fn decode(value: u32) -> String {
    String::from_utf8_lossy(&value.to_be_bytes()).into_owned()
}

/// A validated four byte SMC key such as `TC0D`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SensorKey([u8; SMC_KEY_SIZE]);

impl SensorKey {
    pub fn new(key: &str) -> Result<Self, KeyEncodingError> {
        Self::from_bytes(key.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyEncodingError> {
        let Ok(raw) = <[u8; SMC_KEY_SIZE]>::try_from(bytes) else {
            return Err(KeyEncodingError::InvalidLength { len: bytes.len() });
        };
        if !raw.is_ascii() {
            return Err(KeyEncodingError::NotAscii);
        }
        Ok(Self(raw))
    }

    /// Keys reported by the driver are taken as-is.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; SMC_KEY_SIZE] {
        &self.0
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl fmt::Debug for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorKey({:?})", self.as_str())
    }
}

impl FromStr for SensorKey {
    type Err = KeyEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for SensorKey {
    type Error = KeyEncodingError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SensorKey> for u32 {
    fn from(key: SensorKey) -> Self {
        key.as_u32()
    }
}
