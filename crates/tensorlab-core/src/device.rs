use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{TensorError, TensorResult};

/// Compute device for tensor storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }

    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda(_))
    }

    pub fn cuda_index(&self) -> Option<usize> {
        match self {
            Device::Cuda(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Number of accelerators this build can drive. Only the host backend is
    /// compiled in, so there are none.
    pub fn cuda_device_count() -> usize {
        0
    }

    pub fn cuda_is_available() -> bool {
        Self::cuda_device_count() > 0
    }

    /// First accelerator if there is one, otherwise the host.
    pub fn best_available() -> Device {
        let device = if Self::cuda_is_available() {
            Device::Cuda(0)
        } else {
            Device::Cpu
        };
        debug!("best available device: {device}");
        device
    }

    /// Check that tensors can actually be placed on this device.
    pub fn ensure_available(self) -> TensorResult<Device> {
        match self {
            Device::Cpu => Ok(self),
            Device::Cuda(idx) if idx < Self::cuda_device_count() => Ok(self),
            Device::Cuda(_) => Err(TensorError::DeviceUnavailable(self)),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(idx) => write!(f, "cuda:{idx}"),
        }
    }
}

impl FromStr for Device {
    type Err = TensorError;

    fn from_str(s: &str) -> TensorResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|idx| idx.parse().ok())
                .map(Device::Cuda)
                .ok_or_else(|| TensorError::InvalidDevice(s.clone())),
        }
    }
}

impl From<Device> for String {
    fn from(device: Device) -> Self {
        device.to_string()
    }
}

impl TryFrom<String> for Device {
    type Error = TensorError;

    fn try_from(s: String) -> TensorResult<Self> {
        s.parse()
    }
}

/// Which device the caller asked for, before checking what exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DevicePreference {
    /// Accelerator when present, host otherwise.
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl DevicePreference {
    pub fn resolve(self) -> TensorResult<Device> {
        let device = match self {
            DevicePreference::Auto => Device::best_available(),
            DevicePreference::Cpu => Device::Cpu,
            DevicePreference::Cuda(idx) => Device::Cuda(idx).ensure_available()?,
        };
        info!("using device {device} (requested {self})");
        Ok(device)
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevicePreference::Auto => write!(f, "auto"),
            DevicePreference::Cpu => write!(f, "cpu"),
            DevicePreference::Cuda(idx) => write!(f, "cuda:{idx}"),
        }
    }
}

impl FromStr for DevicePreference {
    type Err = TensorError;

    fn from_str(s: &str) -> TensorResult<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(DevicePreference::Auto);
        }
        Ok(match s.parse::<Device>()? {
            Device::Cpu => DevicePreference::Cpu,
            Device::Cuda(idx) => DevicePreference::Cuda(idx),
        })
    }
}

impl From<DevicePreference> for String {
    fn from(pref: DevicePreference) -> Self {
        pref.to_string()
    }
}

impl TryFrom<String> for DevicePreference {
    type Error = TensorError;

    fn try_from(s: String) -> TensorResult<Self> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda(0));
        assert_eq!("cuda:2".parse::<Device>().unwrap(), Device::Cuda(2));
        assert!("tpu".parse::<Device>().is_err());
        assert!("cuda:x".parse::<Device>().is_err());
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
    }

    #[test]
    fn test_host_only_build() {
        assert!(!Device::cuda_is_available());
        assert_eq!(Device::best_available(), Device::Cpu);
        assert_eq!(Device::Cpu.ensure_available().unwrap(), Device::Cpu);
        assert_eq!(
            Device::Cuda(0).ensure_available(),
            Err(TensorError::DeviceUnavailable(Device::Cuda(0)))
        );
    }

    #[test]
    fn test_preference_resolution() {
        assert_eq!(DevicePreference::Auto.resolve().unwrap(), Device::Cpu);
        assert_eq!(DevicePreference::Cpu.resolve().unwrap(), Device::Cpu);
        assert!(DevicePreference::Cuda(0).resolve().is_err());
        assert_eq!("auto".parse::<DevicePreference>().unwrap(), DevicePreference::Auto);
        assert_eq!("cuda".parse::<DevicePreference>().unwrap(), DevicePreference::Cuda(0));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Device::Cuda(3)).unwrap();
        assert_eq!(json, "\"cuda:3\"");
        let back: Device = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Device::Cuda(3));

        let pref: DevicePreference = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(pref, DevicePreference::Auto);
    }
}
