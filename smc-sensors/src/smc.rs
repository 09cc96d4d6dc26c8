use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    config::SmcConfig,
    error::{ConnectionError, DecodeError, Result, SmcError},
    io::{IOService, Transport},
    key::SensorKey,
    keys,
    protocol::{ProtocolClient, ValError},
    structs::{KERNEL_INDEX_SMC, KeyInfo, SMCVal},
    value::{
        DATATYPE_FLT, DATATYPE_FPE2, DATATYPE_SP78, DATATYPE_UINT8, SmcValue,
        TemperatureUnit, convert_temperature,
    },
};

/// A connection to the SMC.
///
/// Every operation holds the internal lock for its whole duration, so the two
/// round trips of one read never interleave with another thread's. The
/// `get_*` methods return `0` on any failure, like the classic C SMC API.
///
/// # Example
///
/// ```no_run
/// use smc_sensors::{keys, smc::Smc, value::TemperatureUnit};
///
/// let smc = Smc::open().unwrap();
/// let cpu = smc.temperature(keys::CPU_0_DIODE, TemperatureUnit::Celsius);
/// println!("CPU: {cpu:?}");
/// smc.close().unwrap();
/// ```
pub struct Smc<T: Transport = IOService> {
    transport: T,
    selector: u32,
    lock: Mutex<()>,
}

impl Smc<IOService> {
    /// Connect to `AppleSMC`.
    pub fn open() -> std::result::Result<Self, ConnectionError> {
        Self::open_with(&SmcConfig::default())
    }

    pub fn open_with(config: &SmcConfig) -> std::result::Result<Self, ConnectionError> {
        let service = IOService::open(config)?;
        Ok(Self::with_selector(service, config.selector))
    }

    /// Release the connection. Dropping the value closes it too, but
    /// ignores failures.
    pub fn close(self) -> std::result::Result<(), ConnectionError> {
        self.transport.close()
    }
}

impl<T: Transport> Smc<T> {
    /// Use an already connected transport.
    pub fn with_transport(transport: T) -> Self {
        Self::with_selector(transport, KERNEL_INDEX_SMC)
    }

    pub fn with_selector(transport: T, selector: u32) -> Self {
        Self {
            transport,
            selector,
            lock: Mutex::new(()),
        }
    }

    fn client(&self) -> ProtocolClient<'_, T> {
        ProtocolClient::new(&self.transport, self.selector)
    }

    pub fn key_info(&self, key: &str) -> Result<KeyInfo> {
        let key = SensorKey::new(key)?;
        let _guard = self.lock.lock();
        Ok(self.client().get_key_info(key)?)
    }

    /// Read the raw value of any key.
    pub fn read_key(&self, key: &str) -> Result<SMCVal> {
        let key = SensorKey::new(key)?;
        let _guard = self.lock.lock();
        Ok(self.client().read_key(key)?)
    }

    /// `true` when the key is well formed and known to this machine's SMC.
    pub fn is_key_valid(&self, key: &str) -> bool {
        self.key_info(key).is_ok()
    }

    /// Read an `sp78` temperature sensor.
    ///
    /// # Errors
    ///
    /// Any key, protocol or decode failure. Keys of another type than `sp78`
    /// give [`DecodeError::UnrecognizedType`].
    pub fn temperature(&self, key: &str, unit: TemperatureUnit) -> Result<f64> {
        let val = self.read_key(key)?;
        if val.data_size == 0 {
            return Err(DecodeError::NoData.into());
        }
        if val.data_type_str() != DATATYPE_SP78 {
            return Err(DecodeError::UnrecognizedType {
                data_type: val.data_type_str().into_owned(),
            }
            .into());
        }
        let celsius = val.fixed_point()?;
        Ok(convert_temperature(celsius, unit))
    }

    /// Like [`Self::temperature`], but `0.0` on failure.
    pub fn get_temperature(&self, key: &str, unit: TemperatureUnit) -> f64 {
        self.temperature(key, unit).unwrap_or_else(|err| {
            warn!(key, %err, "temperature read failed");
            0.0
        })
    }

    /// Current speed of fan `index` in RPM.
    ///
    /// Intel Macs report `fpe2`, Apple silicon a little-endian `flt`.
    pub fn fan_rpm(&self, index: u8) -> Result<f64> {
        let key = keys::fan_actual_speed(index)?;
        let val = {
            let _guard = self.lock.lock();
            self.client().read_key(key)?
        };
        if val.data_size == 0 {
            return Err(DecodeError::NoData.into());
        }
        let data_type = val.data_type_str();
        match data_type.as_ref() {
            DATATYPE_FPE2 => Ok(val.fixed_point()?),
            DATATYPE_FLT => match val.data_value() {
                Some(SmcValue::F32 { le, .. }) => Ok(f64::from(le)),
                _ => Err(DecodeError::Truncated {
                    data_type: data_type.into_owned(),
                    size: val.data_size,
                }
                .into()),
            },
            _ => Err(DecodeError::UnrecognizedType {
                data_type: data_type.into_owned(),
            }
            .into()),
        }
    }

    /// Like [`Self::fan_rpm`], but `0.0` on failure.
    pub fn get_fan_rpm(&self, index: u8) -> f64 {
        self.fan_rpm(index).unwrap_or_else(|err| {
            warn!(index, %err, "fan speed read failed");
            0.0
        })
    }

    /// Number of fans, from `FNum`.
    pub fn num_fans(&self) -> Result<u8> {
        let val = self.read_key(keys::NUM_FANS)?;
        if val.data_size == 0 {
            return Err(DecodeError::NoData.into());
        }
        match val.data_value() {
            Some(SmcValue::U8(n)) if val.data_type_str() == DATATYPE_UINT8 => Ok(n),
            _ => Err(DecodeError::UnrecognizedType {
                data_type: val.data_type_str().into_owned(),
            }
            .into()),
        }
    }

    /// Like [`Self::num_fans`], but `0` on failure.
    pub fn get_num_fans(&self) -> u8 {
        self.num_fans().unwrap_or_else(|err| {
            warn!(%err, "fan count read failed");
            0
        })
    }

    /// Writing fan speeds is not supported.
    ///
    /// Always fails with [`SmcError::Unimplemented`] without touching the SMC.
    pub fn set_fan_rpm(&self, index: u8, rpm: u32, authenticate: bool) -> Result<()> {
        debug!(index, rpm, authenticate, "refusing fan speed write");
        Err(SmcError::Unimplemented("set_fan_rpm"))
    }

    pub fn key_count(&self) -> Result<u32> {
        let _guard = self.lock.lock();
        self.client().key_count()
    }

    /// Read every key by index. Each item is read under the lock, other
    /// threads may run between items.
    pub fn values(
        &self,
    ) -> Result<impl Iterator<Item = std::result::Result<SMCVal, ValError>> + '_> {
        let total = self.key_count()?;
        Ok((0..total).map(move |index| {
            let _guard = self.lock.lock();
            self.client().read_index(index)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{KernReturn, KeyEncodingError, ProtocolError},
        structs::{ParamBytes, SMC_CMD_READ_BYTES, SmcParams},
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows one key and counts calls.
    struct OneKey {
        key: &'static [u8; 4],
        data_type: &'static [u8; 4],
        bytes: Vec<u8>,
        calls: AtomicUsize,
    }

    impl OneKey {
        fn new(key: &'static [u8; 4], data_type: &'static [u8; 4], bytes: &[u8]) -> Self {
            Self {
                key,
                data_type,
                bytes: bytes.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for OneKey {
        fn call(
            &self,
            _selector: u32,
            input: &ParamBytes,
            output: &mut ParamBytes,
        ) -> std::result::Result<(), KernReturn> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let input = SmcParams::decode(input);
            if input.key != u32::from_be_bytes(*self.key) {
                return Err(0xe00002f0_u32 as KernReturn);
            }
            let mut reply = SmcParams::default();
            reply.key_info.data_size = self.bytes.len() as u32;
            reply.key_info.data_type = u32::from_be_bytes(*self.data_type);
            if input.data8 == SMC_CMD_READ_BYTES {
                reply.bytes[..self.bytes.len()].copy_from_slice(&self.bytes);
            }
            *output = reply.encode();
            Ok(())
        }
    }

    #[test]
    fn temperature_units() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"sp78", &[45, 0]));
        assert_eq!(smc.temperature("TC0D", TemperatureUnit::Celsius), Ok(45.0));
        assert_eq!(smc.temperature("TC0D", TemperatureUnit::Fahrenheit), Ok(113.0));
        let kelvin = smc.get_temperature("TC0D", TemperatureUnit::Kelvin);
        assert!((kelvin - 318.15).abs() < 1e-9);
    }

    #[test]
    fn temperature_rejects_other_types() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"flt ", &[0, 0, 0x34, 0x42]));
        assert!(matches!(
            smc.temperature("TC0D", TemperatureUnit::Celsius),
            Err(SmcError::Decode(DecodeError::UnrecognizedType { .. }))
        ));
        assert_eq!(smc.get_temperature("TC0D", TemperatureUnit::Celsius), 0.0);
    }

    #[test]
    fn zero_size_is_no_data() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"sp78", &[]));
        assert_eq!(
            smc.temperature("TC0D", TemperatureUnit::Celsius),
            Err(SmcError::Decode(DecodeError::NoData))
        );
        assert_eq!(smc.get_temperature("TC0D", TemperatureUnit::Celsius), 0.0);
    }

    #[test]
    fn bad_key_never_reaches_driver() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"sp78", &[45]));
        assert_eq!(
            smc.temperature("TC0", TemperatureUnit::Celsius),
            Err(SmcError::Key(KeyEncodingError::InvalidLength { len: 3 }))
        );
        assert!(!smc.is_key_valid("TC0DD"));
        assert_eq!(smc.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn key_validity_checks_key_info() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"sp78", &[45]));
        assert!(smc.is_key_valid("TC0D"));
        assert!(!smc.is_key_valid("TC1D"));
        assert_eq!(smc.transport.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fan_rpm_fpe2_and_flt() {
        let smc = Smc::with_transport(OneKey::new(b"F0Ac", b"fpe2", &[0x19, 0x00]));
        assert_eq!(smc.fan_rpm(0), Ok(1600.0));
        assert_eq!(smc.get_fan_rpm(1), 0.0);

        let smc = Smc::with_transport(OneKey::new(b"F1Ac", b"flt ", &1250.5f32.to_le_bytes()));
        assert_eq!(smc.fan_rpm(1), Ok(1250.5));

        assert!(matches!(smc.fan_rpm(12), Err(SmcError::Key(_))));
    }

    #[test]
    fn short_fan_reading_is_truncated() {
        let smc = Smc::with_transport(OneKey::new(b"F0Ac", b"fpe2", &[0x19]));
        assert_eq!(
            smc.fan_rpm(0),
            Err(SmcError::Decode(DecodeError::Truncated {
                data_type: "fpe2".into(),
                size: 1
            }))
        );
        assert_eq!(smc.get_fan_rpm(0), 0.0);

        let smc = Smc::with_transport(OneKey::new(b"F0Ac", b"flt ", &[0, 0]));
        assert!(matches!(
            smc.fan_rpm(0),
            Err(SmcError::Decode(DecodeError::Truncated { size: 2, .. }))
        ));
    }

    #[test]
    fn fan_count() {
        let smc = Smc::with_transport(OneKey::new(b"FNum", b"ui8 ", &[2]));
        assert_eq!(smc.num_fans(), Ok(2));
        assert_eq!(smc.get_num_fans(), 2);

        let smc = Smc::with_transport(OneKey::new(b"FNum", b"flag", &[1]));
        assert_eq!(
            smc.num_fans(),
            Err(SmcError::Decode(DecodeError::UnrecognizedType {
                data_type: "flag".into()
            }))
        );

        let smc = Smc::with_transport(OneKey::new(b"F0Ac", b"fpe2", &[1, 0]));
        assert_eq!(
            smc.num_fans(),
            Err(SmcError::Protocol(ProtocolError::Kernel { code: 0x2f0 }))
        );
        assert_eq!(smc.get_num_fans(), 0);
    }

    #[test]
    fn set_fan_rpm_is_unimplemented() {
        let smc = Smc::with_transport(OneKey::new(b"F0Ac", b"fpe2", &[1, 0]));
        assert_eq!(
            smc.set_fan_rpm(0, 2000, true),
            Err(SmcError::Unimplemented("set_fan_rpm"))
        );
        assert_eq!(smc.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn shared_between_threads() {
        let smc = Smc::with_transport(OneKey::new(b"TC0D", b"sp78", &[60]));
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..50 {
                        assert_eq!(smc.get_temperature("TC0D", TemperatureUnit::Celsius), 60.0);
                    }
                });
            }
        });
        assert_eq!(smc.transport.calls.load(Ordering::SeqCst), 4 * 50 * 2);
    }
}
