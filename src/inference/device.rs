use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::InferenceError;

/// Which compute device the local relevance model should run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DevicePreference {
    /// First compiled GPU backend that initializes, else CPU.
    #[default]
    Auto,
    /// Always CPU, even when a GPU backend is compiled in.
    Cpu,
}

impl FromStr for DevicePreference {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            other => Err(InferenceError::InvalidConfig {
                reason: format!("unknown device preference '{other}' (expected auto or cpu)"),
            }),
        }
    }
}

/// Selects the compute device for `preference`, falling back to CPU.
pub fn select_device(preference: DevicePreference) -> Device {
    if preference == DevicePreference::Cpu {
        debug!("CPU device requested");
        return Device::Cpu;
    }

    let mut failures: Vec<String> = Vec::new();

    if cfg!(feature = "metal") {
        match Device::new_metal(0) {
            Ok(device) => {
                info!("Running relevance model on Metal");
                return device;
            }
            Err(e) => {
                warn!(error = %e, "Metal device unavailable");
                failures.push(format!("metal: {e}"));
            }
        }
    }

    if cfg!(feature = "cuda") {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!("Running relevance model on CUDA");
                return device;
            }
            Err(e) => {
                warn!(error = %e, "CUDA device unavailable");
                failures.push(format!("cuda: {e}"));
            }
        }
    }

    let reason = if failures.is_empty() {
        "no GPU backend compiled".to_string()
    } else {
        failures.join("; ")
    };

    info!(reason = %reason, "Running relevance model on CPU");
    Device::Cpu
}
