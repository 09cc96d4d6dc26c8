use std::{borrow::Cow, fmt, str::FromStr};

use crate::{error::DecodeError, structs::SMCVal};

pub const DATATYPE_SP78: &str = "sp78";
pub const DATATYPE_FPE2: &str = "fpe2";
pub const DATATYPE_FLT: &str = "flt ";
pub const DATATYPE_UINT8: &str = "ui8 ";

/// Decode a fixed-point SMC value.
///
/// - `sp78`: only the integer byte is used, so the result has whole-degree
///   precision. The fraction byte is ignored.
/// - `fpe2`: `(b0 << 6) + (b1 << 2)`.
///
/// Any other type tag, or a buffer too short for the tag, gives `None`.
pub fn decode_fixed_point(buffer: &[u8], type_tag: &str) -> Option<f64> {
    match type_tag {
        DATATYPE_SP78 => buffer.first().map(|&b| f64::from(b)),
        DATATYPE_FPE2 => match buffer {
            [b0, b1, ..] => Some(f64::from((u32::from(*b0) << 6) + (u32::from(*b1) << 2))),
            _ => None,
        },
        _ => None,
    }
}

/// Unit for temperature readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(Self::Celsius),
            "f" | "fahrenheit" => Ok(Self::Fahrenheit),
            "k" | "kelvin" => Ok(Self::Kelvin),
            _ => Err(format!("unknown temperature unit '{s}'")),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Convert a Celsius reading to `unit`.
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 1.8 + 32.0,
        TemperatureUnit::Kelvin => celsius + 273.15,
    }
}

impl fmt::Display for SMCVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data_size == 0 {
            return write!(f, "{} no data", self.key_str());
        }
        write!(
            f,
            "{} {} size: {}(bytes",
            self.key_str(),
            self.data_type_str(),
            self.data_size
        )?;
        for c in self.valid_bytes() {
            write!(f, " {:02x}", c)?;
        }
        write!(f, ")")?;
        if let Some(val) = self.data_value() {
            write!(f, " value: {}", val)?;
        }
        Ok(())
    }
}

impl SMCVal {
    /// Returns the valid portion of the byte data.
    ///
    /// SMC values have a declared size that may be less than the full 32-byte buffer.
    /// This method returns only the bytes that contain actual data.
    pub fn valid_bytes(&self) -> &[u8] {
        let size = std::cmp::min(self.data_size as usize, self.bytes.len());
        &self.bytes[..size]
    }

    pub fn key_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    /// Returns the data type code as a string.
    ///
    /// For type name that is shorter than 4 bytes, the string will include a tail space.
    /// This is designed intentionally, to keep the name length same.
    ///
    /// See [AsahiLinux Docs](https://asahilinux.org/docs/hw/soc/smc) for common data types.
    pub fn data_type_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data_type)
    }

    /// Decode the value as `sp78` or `fpe2`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NoData`] when the key reported a zero size,
    /// [`DecodeError::Truncated`] when it reported fewer bytes than the tag
    /// needs, [`DecodeError::UnrecognizedType`] for any other type tag.
    pub fn fixed_point(&self) -> Result<f64, DecodeError> {
        if self.data_size == 0 {
            return Err(DecodeError::NoData);
        }
        let data_type = self.data_type_str();
        match decode_fixed_point(self.valid_bytes(), &data_type) {
            Some(v) => Ok(v),
            None if matches!(&*data_type, DATATYPE_SP78 | DATATYPE_FPE2) => {
                Err(DecodeError::Truncated {
                    data_type: data_type.into_owned(),
                    size: self.data_size,
                })
            }
            None => Err(DecodeError::UnrecognizedType {
                data_type: data_type.into_owned(),
            }),
        }
    }

    /// Parses the raw bytes into a typed value.
    ///
    /// Returns `None` if the data type is not recognized, or the key reported
    /// fewer bytes than the type needs.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use smc_sensors::smc::Smc;
    ///
    /// let smc = Smc::open().unwrap();
    /// let val = smc.read_key("TC0D").unwrap();
    ///
    /// if let Some(parsed) = val.data_value() {
    ///     println!("Parsed temperature: {}", parsed);
    /// } else {
    ///     println!("Not supported data type: {}", val.data_type_str());
    /// }
    /// ```
    pub fn data_value(&self) -> Option<SmcValue> {
        let type_code = SmcTypeCode::from_bytes(&self.data_type)?;
        if (self.data_size as usize) < type_code.min_size() {
            return None;
        }
        Some(parse_smc_value(type_code, &self.bytes))
    }
}

/// Represents a parsed SMC value in its typed form.
///
/// `flt` is represented as both little endian and big endian number,
/// because we are not sure.
///
/// According to [AsahiLinux Docs](https://asahilinux.org/docs/hw/soc/smc),
/// > flt: a 32-bit single-precision IEEE float. In at least one case, the byte order is actually reversed.
#[derive(Debug, Clone, PartialEq)]
pub enum SmcValue {
    /// Floating point value (both little and big endian interpretations)
    F32 { le: f32, be: f32 },
    U8(u8),
    I8(i8),
    I16(i16),
    U16(u16),
    U32(u32),
    I32(i32),
    I64(i64),
    U64(u64),
    Bool(bool),
    /// Maybe ascii string
    Chars(String),
    /// Fixed-point value (48.16 format)
    Ioft48_16(u64),
    /// Whole-degree temperature
    Sp78(f64),
    /// Fan speed in RPM
    Fpe2(f64),
}

impl fmt::Display for SmcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmcValue::F32 { le, be } => {
                if le.to_bits() == be.to_bits() {
                    write!(f, "{}", le)
                } else {
                    write!(f, "le={}, be={}", le, be)
                }
            }

            SmcValue::U8(v) => write!(f, "{}", v),
            SmcValue::I8(v) => write!(f, "{}", v),
            SmcValue::I16(v) => write!(f, "{}", v),
            SmcValue::U16(v) => write!(f, "{}", v),
            SmcValue::U32(v) => write!(f, "{}", v),
            SmcValue::I32(v) => write!(f, "{}", v),
            SmcValue::I64(v) => write!(f, "{}", v),
            SmcValue::U64(v) => write!(f, "{}", v),
            SmcValue::Bool(v) => write!(f, "{}", v),

            SmcValue::Chars(s) => write!(f, "{}", s),

            SmcValue::Ioft48_16(raw) => {
                let decoded = ((raw >> 16) as f64) + ((raw & 0xFFFF) as f64 / 65536.0);
                write!(f, "{}", decoded)
            }

            SmcValue::Sp78(v) => write!(f, "{}{}", v, TemperatureUnit::Celsius),
            SmcValue::Fpe2(v) => write!(f, "{} rpm", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmcTypeCode {
    Flt,
    Ui8,
    Si8,
    Si16,
    Ui16,
    Ui32,
    Si32,
    Si64,
    Ui64,
    Chars,
    Flag,
    Ioft,
    Sp78,
    Fpe2,
}

trait TakeN {
    /// # Panic
    /// May panic if N is out of bounds.
    fn take<const N: usize>(&self) -> [u8; N];
}

impl TakeN for [u8] {
    fn take<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self[..N]);
        out
    }
}

impl SmcTypeCode {
    fn from_bytes(code: &[u8; 4]) -> Option<Self> {
        let code = match code {
            b"flt " => Self::Flt,
            b"ui8 " => Self::Ui8,
            b"si8 " => Self::Si8,
            b"si16" => Self::Si16,
            b"ui16" => Self::Ui16,
            b"ui32" => Self::Ui32,
            b"si32" => Self::Si32,
            b"si64" => Self::Si64,
            b"ui64" => Self::Ui64,
            b"ch8*" => Self::Chars,
            b"flag" => Self::Flag,
            b"ioft" => Self::Ioft,
            b"sp78" => Self::Sp78,
            b"fpe2" => Self::Fpe2,
            _ => return None,
        };
        Some(code)
    }

    const fn min_size(&self) -> usize {
        match self {
            Self::Ui8 | Self::Si8 | Self::Flag | Self::Sp78 => 1,
            Self::Si16 | Self::Ui16 | Self::Fpe2 => 2,
            Self::Flt | Self::Ui32 | Self::Si32 => 4,
            Self::Si64 | Self::Ui64 | Self::Ioft => 8,
            Self::Chars => 0,
        }
    }
}

fn parse_smc_value(type_code: SmcTypeCode, data: &[u8; 32]) -> SmcValue {
    match type_code {
        SmcTypeCode::Flt => {
            let b = data.take::<4>();
            SmcValue::F32 {
                le: f32::from_bits(u32::from_le_bytes(b)),
                be: f32::from_bits(u32::from_be_bytes(b)),
            }
        }

        SmcTypeCode::Ui8 => SmcValue::U8(data[0]),
        SmcTypeCode::Si8 => SmcValue::I8(data[0] as i8),
        SmcTypeCode::Si16 => SmcValue::I16(i16::from_be_bytes(data.take::<2>())),
        SmcTypeCode::Ui16 => SmcValue::U16(u16::from_be_bytes(data.take::<2>())),
        SmcTypeCode::Ui32 => SmcValue::U32(u32::from_be_bytes(data.take::<4>())),
        SmcTypeCode::Si32 => SmcValue::I32(i32::from_be_bytes(data.take::<4>())),
        SmcTypeCode::Si64 => SmcValue::I64(i64::from_be_bytes(data.take::<8>())),
        SmcTypeCode::Ui64 => SmcValue::U64(u64::from_be_bytes(data.take::<8>())),
        SmcTypeCode::Flag => SmcValue::Bool(data[0] != 0),

        SmcTypeCode::Chars => {
            // Treat as ASCII; trim at first NUL if present.
            let end = data.iter().position(|&c| c == 0).unwrap_or(data.len());
            SmcValue::Chars(String::from_utf8_lossy(&data[..end]).into_owned())
        }

        // ioft is the one integer type the SMC stores little endian
        SmcTypeCode::Ioft => SmcValue::Ioft48_16(u64::from_le_bytes(data.take::<8>())),

        SmcTypeCode::Sp78 => SmcValue::Sp78(f64::from(data[0])),
        SmcTypeCode::Fpe2 => {
            SmcValue::Fpe2(f64::from((u32::from(data[0]) << 6) + (u32::from(data[1]) << 2)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn val(data_type: &[u8; 4], bytes: &[u8]) -> SMCVal {
        let mut v = SMCVal {
            key: *b"TEST",
            data_size: bytes.len() as u32,
            data_type: *data_type,
            bytes: [0; 32],
        };
        v.bytes[..bytes.len()].copy_from_slice(bytes);
        v
    }

    #[test]
    fn fpe2_uses_both_bytes() {
        assert_eq!(decode_fixed_point(&[0x19, 0x00], "fpe2"), Some(1600.0));
        assert_eq!(decode_fixed_point(&[0x19, 0x01], "fpe2"), Some(1604.0));
        assert_eq!(decode_fixed_point(&[0x19], "fpe2"), None);
    }

    #[test]
    fn sp78_is_whole_degrees() {
        assert_eq!(decode_fixed_point(&[50], "sp78"), Some(50.0));
        // fraction byte is dropped
        assert_eq!(decode_fixed_point(&[50, 0x80], "sp78"), Some(50.0));
        assert_eq!(decode_fixed_point(&[], "sp78"), None);
    }

    #[test]
    fn unknown_tags_decline() {
        assert_eq!(decode_fixed_point(&[1, 2, 3, 4], "ui8 "), None);
        assert_eq!(decode_fixed_point(&[1, 2, 3, 4], "flt "), None);
        assert_eq!(decode_fixed_point(&[1, 2], "SP78"), None);
    }

    #[test]
    fn temperature_conversions() {
        assert_eq!(convert_temperature(0.0, TemperatureUnit::Fahrenheit), 32.0);
        assert_eq!(convert_temperature(100.0, TemperatureUnit::Fahrenheit), 212.0);
        assert_eq!(convert_temperature(0.0, TemperatureUnit::Kelvin), 273.15);
        assert_eq!(convert_temperature(45.0, TemperatureUnit::Celsius), 45.0);
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("F".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Fahrenheit));
        assert_eq!("kelvin".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Kelvin));
        assert_eq!("Celsius".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Celsius));
        assert!("rankine".parse::<TemperatureUnit>().is_err());
    }

    #[test]
    fn fixed_point_errors() {
        assert_eq!(val(b"sp78", &[45]).fixed_point(), Ok(45.0));
        assert_eq!(val(b"sp78", &[]).fixed_point(), Err(DecodeError::NoData));
        assert_eq!(
            val(b"ui8 ", &[3]).fixed_point(),
            Err(DecodeError::UnrecognizedType {
                data_type: "ui8 ".into()
            })
        );
        assert_eq!(
            val(b"fpe2", &[0x19]).fixed_point(),
            Err(DecodeError::Truncated {
                data_type: "fpe2".into(),
                size: 1
            })
        );
    }

    #[test]
    fn typed_values() {
        assert_eq!(val(b"ui8 ", &[2]).data_value(), Some(SmcValue::U8(2)));
        assert_eq!(
            val(b"ui16", &[0x12, 0x34]).data_value(),
            Some(SmcValue::U16(0x1234))
        );
        assert_eq!(
            val(b"ui32", &[0, 0, 0x04, 0xd2]).data_value(),
            Some(SmcValue::U32(1234))
        );
        assert_eq!(
            val(b"si16", &[0xff, 0xfe]).data_value(),
            Some(SmcValue::I16(-2))
        );
        assert_eq!(val(b"flag", &[1]).data_value(), Some(SmcValue::Bool(true)));
        assert_eq!(
            val(b"ch8*", b"abc").data_value(),
            Some(SmcValue::Chars("abc".into()))
        );
        assert_eq!(
            val(b"fpe2", &[0x19, 0x00]).data_value(),
            Some(SmcValue::Fpe2(1600.0))
        );
        // declared size too small for the type
        assert_eq!(val(b"ui32", &[1, 2]).data_value(), None);
        assert_eq!(val(b"????", &[1]).data_value(), None);
    }

    #[test]
    fn flt_keeps_both_byte_orders() {
        let bytes = 1500.0f32.to_le_bytes();
        let Some(SmcValue::F32 { le, .. }) = val(b"flt ", &bytes).data_value() else {
            panic!("expected flt");
        };
        assert_eq!(le, 1500.0);
    }

    #[test]
    fn display() {
        assert_eq!(
            val(b"sp78", &[45, 0]).to_string(),
            "TEST sp78 size: 2(bytes 2d 00) value: 45°C"
        );
        assert_eq!(val(b"sp78", &[]).to_string(), "TEST no data");
        assert_eq!(SmcValue::Fpe2(1600.0).to_string(), "1600 rpm");
    }
}
