use crate::key::SensorKey;

/// Struct method index of `kSMCHandleYPCEvent`.
pub const KERNEL_INDEX_SMC: u32 = 2;

/// Operation codes carried in [`SmcParams::data8`].
pub const SMC_CMD_READ_BYTES: u8 = 5;
pub const SMC_CMD_READ_INDEX: u8 = 8;
pub const SMC_CMD_READ_KEYINFO: u8 = 9;

/// Values of [`SmcParams::result`].
pub const SMC_RESULT_SUCCESS: u8 = 0;
pub const SMC_RESULT_KEY_NOT_FOUND: u8 = 0x84;

/// Maximum size in bytes for SMC data.
pub const SMC_BYTES_LEN: usize = 32;

/// Byte array type for SMC data.
///
/// SMC values are stored as byte arrays with a maximum length of [`SMC_BYTES_LEN`].
pub type SMCBytes = [u8; SMC_BYTES_LEN];

/// Size of the serialized record.
pub const PARAM_STRUCT_LEN: usize = 80;

/// A serialized [`SmcParams`].
pub type ParamBytes = [u8; PARAM_STRUCT_LEN];

mod offset {
    pub const KEY: usize = 0;
    pub const VERS_MAJOR: usize = 4;
    pub const VERS_MINOR: usize = 5;
    pub const VERS_BUILD: usize = 6;
    pub const VERS_RESERVED: usize = 7;
    pub const VERS_RELEASE: usize = 8;
    // 10..12 padding
    pub const PLIMIT_VERSION: usize = 12;
    pub const PLIMIT_LENGTH: usize = 14;
    pub const PLIMIT_CPU: usize = 16;
    pub const PLIMIT_GPU: usize = 20;
    pub const PLIMIT_MEM: usize = 24;
    pub const DATA_SIZE: usize = 28;
    pub const DATA_TYPE: usize = 32;
    pub const DATA_ATTRIBUTES: usize = 36;
    // 37..40 padding
    pub const RESULT: usize = 40;
    pub const STATUS: usize = 41;
    pub const DATA8: usize = 42;
    // 43 padding
    pub const DATA32: usize = 44;
    pub const BYTES: usize = 48;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SmcVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SmcPLimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_plimit: u32,
    pub gpu_plimit: u32,
    pub mem_plimit: u32,
}

/// Metadata about a SMC key.
///
/// Contains information about the data type, size, and attributes
/// of a SMC key without including the actual value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyInfo {
    pub data_size: u32,
    /// the data type
    ///
    /// convert it to human readable str with [`crate::key::decode`]
    pub data_type: u32,
    pub data_attributes: u8,
}

impl KeyInfo {
    pub fn data_type_str(&self) -> String {
        crate::key::decode(self.data_type)
    }
}

/// One request or response record, the 80 byte `SMCParamStruct`.
///
/// Serialized field by field at fixed little-endian offsets rather than
/// relying on `#[repr(C)]` padding. Requests always start from `Default`
/// (all zero) so that unused sub-records are zero-filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmcParams {
    pub key: u32,
    pub vers: SmcVersion,
    pub plimit_data: SmcPLimitData,
    pub key_info: KeyInfo,
    pub result: u8,
    pub status: u8,
    /// operation code, one of the `SMC_CMD_*` constants
    pub data8: u8,
    /// key index for [`SMC_CMD_READ_INDEX`]
    pub data32: u32,
    pub bytes: SMCBytes,
}

impl Default for SmcParams {
    fn default() -> Self {
        Self {
            key: 0,
            vers: SmcVersion::default(),
            plimit_data: SmcPLimitData::default(),
            key_info: KeyInfo::default(),
            result: 0,
            status: 0,
            data8: 0,
            data32: 0,
            bytes: [0; SMC_BYTES_LEN],
        }
    }
}

fn put_u16(buf: &mut ParamBytes, at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut ParamBytes, at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

fn get_u16(buf: &ParamBytes, at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn get_u32(buf: &ParamBytes, at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

impl SmcParams {
    /// A zeroed request for `key` with operation code `cmd`.
    pub fn request(key: SensorKey, cmd: u8) -> Self {
        Self {
            key: key.as_u32(),
            data8: cmd,
            ..Default::default()
        }
    }

    pub fn encode(&self) -> ParamBytes {
        use offset::*;
        let mut buf = [0u8; PARAM_STRUCT_LEN];
        put_u32(&mut buf, KEY, self.key);

        buf[VERS_MAJOR] = self.vers.major;
        buf[VERS_MINOR] = self.vers.minor;
        buf[VERS_BUILD] = self.vers.build;
        buf[VERS_RESERVED] = self.vers.reserved;
        put_u16(&mut buf, VERS_RELEASE, self.vers.release);

        put_u16(&mut buf, PLIMIT_VERSION, self.plimit_data.version);
        put_u16(&mut buf, PLIMIT_LENGTH, self.plimit_data.length);
        put_u32(&mut buf, PLIMIT_CPU, self.plimit_data.cpu_plimit);
        put_u32(&mut buf, PLIMIT_GPU, self.plimit_data.gpu_plimit);
        put_u32(&mut buf, PLIMIT_MEM, self.plimit_data.mem_plimit);

        put_u32(&mut buf, DATA_SIZE, self.key_info.data_size);
        put_u32(&mut buf, DATA_TYPE, self.key_info.data_type);
        buf[DATA_ATTRIBUTES] = self.key_info.data_attributes;

        buf[RESULT] = self.result;
        buf[STATUS] = self.status;
        buf[DATA8] = self.data8;
        put_u32(&mut buf, DATA32, self.data32);
        buf[BYTES..BYTES + SMC_BYTES_LEN].copy_from_slice(&self.bytes);
        buf
    }

    /// Padding bytes are ignored.
    pub fn decode(buf: &ParamBytes) -> Self {
        use offset::*;
        let mut bytes = [0u8; SMC_BYTES_LEN];
        bytes.copy_from_slice(&buf[BYTES..BYTES + SMC_BYTES_LEN]);
        Self {
            key: get_u32(buf, KEY),
            vers: SmcVersion {
                major: buf[VERS_MAJOR],
                minor: buf[VERS_MINOR],
                build: buf[VERS_BUILD],
                reserved: buf[VERS_RESERVED],
                release: get_u16(buf, VERS_RELEASE),
            },
            plimit_data: SmcPLimitData {
                version: get_u16(buf, PLIMIT_VERSION),
                length: get_u16(buf, PLIMIT_LENGTH),
                cpu_plimit: get_u32(buf, PLIMIT_CPU),
                gpu_plimit: get_u32(buf, PLIMIT_GPU),
                mem_plimit: get_u32(buf, PLIMIT_MEM),
            },
            key_info: KeyInfo {
                data_size: get_u32(buf, DATA_SIZE),
                data_type: get_u32(buf, DATA_TYPE),
                data_attributes: buf[DATA_ATTRIBUTES],
            },
            result: buf[RESULT],
            status: buf[STATUS],
            data8: buf[DATA8],
            data32: get_u32(buf, DATA32),
            bytes,
        }
    }
}

/// Represents a SMC key-value pair.
///
/// This structure contains the key name, data type, size, and raw byte data
/// for a SMC value. Use the methods in the [`crate::value`] module to parse the
/// raw bytes into typed values.
///
/// # Example
///
/// ```no_run
/// use smc_sensors::smc::Smc;
///
/// let smc = Smc::open().unwrap();
/// let val = smc.read_key("TC0D").unwrap();
///
/// println!("Key: {}", val.key_str());
/// println!("Data type: {}", val.data_type_str());
/// println!("Size: {} bytes", val.data_size);
///
/// if let Some(parsed) = val.data_value() {
///     println!("Parsed value: {}", parsed);
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SMCVal {
    pub key: [u8; 4],
    pub data_size: u32,
    pub data_type: [u8; 4],
    pub bytes: SMCBytes,
}

impl SMCVal {
    pub fn key(&self) -> SensorKey {
        SensorKey::from_u32(u32::from_be_bytes(self.key))
    }
}
