use crate::{
    config::SmcConfig,
    error::{ConnectionError, KernReturn},
    structs::ParamBytes,
};

/// `KERN_SUCCESS` / `kIOReturnSuccess`.
pub const KERN_SUCCESS: KernReturn = 0;
/// `kIOReturnError`, used when a call fails without a more precise code.
pub const IO_RETURN_ERROR: KernReturn = 0xe00002bc_u32 as KernReturn;

/// Synchronous struct-method call against an open SMC connection.
///
/// On macOS [`IOService`] implements it with `IOConnectCallStructMethod`.
/// Elsewhere `IOService::open` always reports the service as missing.
pub trait Transport {
    /// Submit `input` with `selector`, the driver fills `output`.
    ///
    /// Returns the raw failing `kern_return_t` on error.
    fn call(
        &self,
        selector: u32,
        input: &ParamBytes,
        output: &mut ParamBytes,
    ) -> Result<(), KernReturn>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(
        &self,
        selector: u32,
        input: &ParamBytes,
        output: &mut ParamBytes,
    ) -> Result<(), KernReturn> {
        (**self).call(selector, input, output)
    }
}

#[cfg(target_os = "macos")]
pub use macos::{IOService, err_str};

#[cfg(not(target_os = "macos"))]
pub use fallback::{IOService, err_str};

#[cfg(target_os = "macos")]
mod macos {
    use super::{KERN_SUCCESS, Transport};
    use crate::{
        config::SmcConfig,
        error::{ConnectionError, KernReturn},
        structs::{PARAM_STRUCT_LEN, ParamBytes},
    };
    use libc::mach_error_string;
    use objc2_io_kit::{
        IOConnectCallStructMethod, IOIteratorNext, IOMainPort, IOObjectRelease, IOServiceClose,
        IOServiceGetMatchingServices, IOServiceMatching, IOServiceOpen, io_connect_t,
    };
    use std::{
        borrow::Cow,
        ffi::{CStr, CString, c_void},
    };
    use tracing::debug;

    unsafe extern "C" {
        static mach_task_self_: libc::mach_port_t;
    }

    fn mach_task_self() -> libc::mach_port_t {
        // SAFETY: mach_task_self_ is initialized by the runtime before main.
        unsafe { mach_task_self_ }
    }

    pub fn err_str(error_value: KernReturn) -> Cow<'static, str> {
        // SAFETY: mach_error_string returns a static NUL-terminated string.
        unsafe { CStr::from_ptr(mach_error_string(error_value)).to_string_lossy() }
    }

    /// An open user client connection to the SMC.
    ///
    /// Closed when dropped unless [`IOService::close`] was called.
    pub struct IOService {
        conn: io_connect_t,
    }

    impl IOService {
        pub fn open(config: &SmcConfig) -> Result<Self, ConnectionError> {
            let service_name = CString::new(config.service_name.as_str()).map_err(|_| {
                ConnectionError::ServiceNotFound {
                    service: config.service_name.clone(),
                }
            })?;
            unsafe {
                let mut main_port = 0;
                let res = IOMainPort(0, &raw mut main_port);
                if res != KERN_SUCCESS {
                    return Err(ConnectionError::MainPort { code: res });
                }
                let matching_dict =
                    IOServiceMatching(service_name.as_ptr()).and_then(|d| d.downcast().ok());
                let mut iterator = 0;
                let res =
                    IOServiceGetMatchingServices(main_port, matching_dict, &raw mut iterator);
                if res != KERN_SUCCESS {
                    debug!(service = %config.service_name, code = res, "no matching service");
                    return Err(ConnectionError::ServiceNotFound {
                        service: config.service_name.clone(),
                    });
                }
                let device = IOIteratorNext(iterator);
                IOObjectRelease(iterator);
                if device == 0 {
                    return Err(ConnectionError::ServiceNotFound {
                        service: config.service_name.clone(),
                    });
                }
                let mut conn = 0;
                let res = IOServiceOpen(device, mach_task_self(), 0, &raw mut conn);
                IOObjectRelease(device);
                if res != KERN_SUCCESS {
                    debug!(code = res, error = %err_str(res), "IOServiceOpen failed");
                    return Err(ConnectionError::OpenFailed { code: res });
                }
                debug!(service = %config.service_name, conn, "SMC connection opened");
                Ok(Self { conn })
            }
        }

        pub fn close(self) -> Result<(), ConnectionError> {
            let conn = self.conn;
            std::mem::forget(self);
            let res = IOServiceClose(conn);
            debug!(conn, code = res, "SMC connection closed");
            if res == KERN_SUCCESS {
                Ok(())
            } else {
                Err(ConnectionError::CloseFailed { code: res })
            }
        }
    }

    impl Transport for IOService {
        fn call(
            &self,
            selector: u32,
            input: &ParamBytes,
            output: &mut ParamBytes,
        ) -> Result<(), KernReturn> {
            let mut output_cnt = PARAM_STRUCT_LEN;
            // SAFETY: both buffers are PARAM_STRUCT_LEN bytes long and live for the call.
            let res = unsafe {
                IOConnectCallStructMethod(
                    self.conn,
                    selector,
                    input.as_ptr() as *const c_void,
                    PARAM_STRUCT_LEN,
                    output.as_mut_ptr() as *mut c_void,
                    &raw mut output_cnt,
                )
            };
            if res == KERN_SUCCESS {
                Ok(())
            } else {
                Err(res)
            }
        }
    }

    impl Drop for IOService {
        fn drop(&mut self) {
            IOServiceClose(self.conn);
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod fallback {
    use super::{IO_RETURN_ERROR, Transport};
    use crate::{
        config::SmcConfig,
        error::{ConnectionError, KernReturn},
        structs::ParamBytes,
    };
    use std::borrow::Cow;

    pub fn err_str(error_value: KernReturn) -> Cow<'static, str> {
        format!("IOKit error {error_value:#010x}").into()
    }

    /// There is no SMC outside macOS; this type can never be opened.
    pub struct IOService {
        _private: (),
    }

    impl IOService {
        pub fn open(config: &SmcConfig) -> Result<Self, ConnectionError> {
            Err(ConnectionError::ServiceNotFound {
                service: config.service_name.clone(),
            })
        }

        pub fn close(self) -> Result<(), ConnectionError> {
            Ok(())
        }
    }

    impl Transport for IOService {
        fn call(
            &self,
            _selector: u32,
            _input: &ParamBytes,
            _output: &mut ParamBytes,
        ) -> Result<(), KernReturn> {
            Err(IO_RETURN_ERROR)
        }
    }
}

/// Open the default `AppleSMC` connection.
pub fn acquire_handle() -> Result<IOService, ConnectionError> {
    IOService::open(&SmcConfig::default())
}

pub fn release_handle(handle: IOService) -> Result<(), ConnectionError> {
    handle.close()
}
