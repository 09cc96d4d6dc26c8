use crate::structs::KERNEL_INDEX_SMC;

/// IOKit class name of the SMC driver.
pub const IOSERVICE_SMC: &str = "AppleSMC";

/// Where to find the SMC and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmcConfig {
    /// IOKit service class to match
    pub service_name: String,
    /// Struct method index used for every call
    pub selector: u32,
}

impl Default for SmcConfig {
    fn default() -> Self {
        Self {
            service_name: IOSERVICE_SMC.to_string(),
            selector: KERNEL_INDEX_SMC,
        }
    }
}

impl SmcConfig {
    pub fn builder() -> SmcConfigBuilder {
        SmcConfigBuilder::default()
    }
}

/// Builder for [`SmcConfig`]
#[derive(Default)]
pub struct SmcConfigBuilder {
    config: SmcConfig,
}

impl SmcConfigBuilder {
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    pub fn selector(mut self, selector: u32) -> Self {
        self.config.selector = selector;
        self
    }

    pub fn build(self) -> SmcConfig {
        self.config
    }
}
