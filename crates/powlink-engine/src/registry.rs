use std::path::PathBuf;

use crate::error::{EngineError, Result};
use crate::gateway::PowEngine;
use crate::pow::CurlPow;

/// Engine-specific configuration, opaque to the broker core.
///
/// Hardware engines consume the device and firmware paths; the software
/// engine ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub device_path: Option<PathBuf>,
    pub firmware_file: Option<PathBuf>,
}

/// Instantiate the engine selected by the `engine.type` configuration key.
///
/// Only the software engine is built into this tree; hardware variants
/// (FPGA, USB, FTDI) and remote bridges register under their own names in
/// downstream builds.
pub fn create_engine(engine_type: &str, _options: &EngineOptions) -> Result<Box<dyn PowEngine>> {
    match engine_type {
        "curl" => Ok(Box::new(CurlPow::new())),
        other => Err(EngineError::UnknownEngineType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curl_is_built_in() {
        let engine = create_engine("curl", &EngineOptions::default()).unwrap();
        assert_eq!(engine.engine_type(), "Curl");
    }

    #[test]
    fn unknown_type_is_refused() {
        let err = create_engine("pidiver", &EngineOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownEngineType(_)));
    }
}
