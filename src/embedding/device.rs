use std::fmt;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Compute backend the CLIP encoder runs on; reported by `/ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Cpu,
    Metal,
    Cuda,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Metal => "metal",
            DeviceKind::Cuda => "cuda",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GPU backends compiled into this build, in preference order.
pub fn gpu_candidates() -> Vec<DeviceKind> {
    let mut candidates = Vec::new();
    if cfg!(feature = "metal") {
        candidates.push(DeviceKind::Metal);
    }
    if cfg!(feature = "cuda") {
        candidates.push(DeviceKind::Cuda);
    }
    candidates
}

fn open(kind: DeviceKind) -> Result<Device, EmbeddingError> {
    let opened = match kind {
        DeviceKind::Cpu => return Ok(Device::Cpu),
        DeviceKind::Metal => Device::new_metal(0),
        DeviceKind::Cuda => Device::new_cuda(0),
    };
    opened.map_err(|e| EmbeddingError::DeviceUnavailable {
        device: kind.to_string(),
        reason: e.to_string(),
    })
}

/// Picks the first compiled-in GPU that opens, else the CPU.
///
/// A missing GPU is never fatal: the image tower runs acceptably on CPU, and
/// reference embeddings stay comparable across devices.
pub fn select_device() -> (Device, DeviceKind) {
    let candidates = gpu_candidates();
    if candidates.is_empty() {
        debug!("No GPU backends compiled in");
        return (Device::Cpu, DeviceKind::Cpu);
    }

    let mut failures = Vec::new();
    for kind in candidates {
        match open(kind) {
            Ok(device) => {
                info!(device = %kind, "Image encoder using GPU");
                return (device, kind);
            }
            Err(e) => {
                warn!(error = %e, "GPU backend unavailable");
                failures.push(e.to_string());
            }
        }
    }

    warn!(reason = %failures.join("; "), "Falling back to CPU device");
    (Device::Cpu, DeviceKind::Cpu)
}
