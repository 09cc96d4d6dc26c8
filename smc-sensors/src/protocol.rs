use std::fmt;

use tracing::{debug, trace};

use crate::{
    error::{DecodeError, ProtocolError, SmcError},
    io::Transport,
    key::SensorKey,
    structs::{
        KeyInfo, SMC_CMD_READ_BYTES, SMC_CMD_READ_INDEX, SMC_CMD_READ_KEYINFO,
        SMC_RESULT_SUCCESS, SMCVal, SmcParams,
    },
    value::SmcValue,
};

/// Key holding the number of keys the SMC exposes.
pub const KEY_COUNT_KEY: SensorKey = SensorKey::from_u32(u32::from_be_bytes(*b"#KEY"));

/// Issues SMC requests over a borrowed [`Transport`].
///
/// Reading a key takes two round trips: key info returns the size and type,
/// and the read must carry both back unchanged. A failure in either step
/// ends the read. Holds no state between calls.
pub struct ProtocolClient<'a, T: Transport + ?Sized> {
    transport: &'a T,
    selector: u32,
}

impl<'a, T: Transport + ?Sized> ProtocolClient<'a, T> {
    pub fn new(transport: &'a T, selector: u32) -> Self {
        Self {
            transport,
            selector,
        }
    }

    fn call(&self, input: &SmcParams) -> Result<SmcParams, ProtocolError> {
        let request = input.encode();
        let mut response = [0u8; crate::structs::PARAM_STRUCT_LEN];
        trace!(request = ?request, "smc call");
        if let Err(kr) = self.transport.call(self.selector, &request, &mut response) {
            let err = ProtocolError::from_kern(kr);
            debug!(key = %SensorKey::from_u32(input.key), cmd = input.data8, %err, "smc call failed");
            return Err(err);
        }
        trace!(response = ?response, "smc reply");
        let output = SmcParams::decode(&response);
        if output.result != SMC_RESULT_SUCCESS {
            let err = ProtocolError::Smc {
                result: output.result,
            };
            debug!(key = %SensorKey::from_u32(input.key), cmd = input.data8, %err, "smc rejected request");
            return Err(err);
        }
        Ok(output)
    }

    pub fn get_key_info(&self, key: SensorKey) -> Result<KeyInfo, ProtocolError> {
        let output = self.call(&SmcParams::request(key, SMC_CMD_READ_KEYINFO))?;
        debug!(
            %key,
            data_size = output.key_info.data_size,
            data_type = %output.key_info.data_type_str(),
            "key info"
        );
        Ok(output.key_info)
    }

    /// Second half of a read, `info` must come from [`Self::get_key_info`].
    pub fn read_key_with_info(
        &self,
        key: SensorKey,
        info: KeyInfo,
    ) -> Result<SMCVal, ProtocolError> {
        let mut input = SmcParams::request(key, SMC_CMD_READ_BYTES);
        input.key_info.data_size = info.data_size;
        input.key_info.data_type = info.data_type;
        let output = self.call(&input)?;
        Ok(SMCVal {
            key: *key.as_bytes(),
            data_size: info.data_size,
            data_type: info.data_type.to_be_bytes(),
            bytes: output.bytes,
        })
    }

    pub fn read_key(&self, key: SensorKey) -> Result<SMCVal, ProtocolError> {
        let info = self.get_key_info(key)?;
        self.read_key_with_info(key, info)
    }

    /// Number of keys, read from `#KEY`.
    pub fn key_count(&self) -> Result<u32, SmcError> {
        let val = self.read_key(KEY_COUNT_KEY)?;
        match val.data_value() {
            Some(SmcValue::U32(count)) => Ok(count),
            _ if val.data_size == 0 => Err(DecodeError::NoData.into()),
            _ => Err(DecodeError::UnrecognizedType {
                data_type: val.data_type_str().into_owned(),
            }
            .into()),
        }
    }

    pub fn key_at_index(&self, index: u32) -> Result<SensorKey, ProtocolError> {
        let input = SmcParams {
            data8: SMC_CMD_READ_INDEX,
            data32: index,
            ..Default::default()
        };
        let output = self.call(&input)?;
        Ok(SensorKey::from_u32(output.key))
    }

    /// Look up the key at `index` and read it.
    pub fn read_index(&self, index: u32) -> Result<SMCVal, ValError> {
        let key = self.key_at_index(index).map_err(|err| ValError {
            err,
            index,
            key: None,
            key_info: None,
        })?;
        let info = self.get_key_info(key).map_err(|err| ValError {
            err,
            index,
            key: Some(key),
            key_info: None,
        })?;
        self.read_key_with_info(key, info).map_err(|err| ValError {
            err,
            index,
            key: Some(key),
            key_info: Some(info),
        })
    }
}

/// Reading the key at `index` failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValError {
    pub err: ProtocolError,
    pub index: u32,
    pub key: Option<SensorKey>,
    pub key_info: Option<KeyInfo>,
}

impl fmt::Display for ValError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = self.key {
            write!(f, "{} ", key)?;
        }
        if let Some(info) = self.key_info {
            write!(f, "{} size: {} ", info.data_type_str(), info.data_size)?;
        }
        write!(f, "index: {}, error: {}", self.index, self.err)
    }
}

impl std::error::Error for ValError {}
