// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Mesoscopic model
//!
//! Coarse-grained companion of the spiking simulation: each of the four
//! modules is reduced to a firing-rate variable `x` and a synaptic-resource
//! variable `m`, coupled on the square module grid. Directed gates between
//! modules open and close stochastically; a gate closes more readily while
//! the source module's resources are depleted, which shapes inter-module
//! burst propagation.
//!
//! Integration is the Milstein scheme under the Itô interpretation. A fixed
//! seed reproduces the trace exactly.

mod model;

pub use model::{
    gate_deactivation_response, MesoscopicModel, MesoscopicParams, MesoscopicTrace, NUM_MODULES,
};

use std::path::Path;
use thiserror::Error;

/// Mesoscopic I/O errors.
#[derive(Debug, Error)]
pub enum MesoscopicError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trace format error: {0}")]
    Format(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MesoscopicError>;

impl MesoscopicTrace {
    /// Write the trace as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        tracing::info!(samples = self.time.len(), "saved mesoscopic trace to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_roundtrip_through_json() {
        let trace = MesoscopicModel::new(MesoscopicParams::default(), 11).simulate(2.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meso/trace.json");
        trace.save(&path).unwrap();

        let loaded = MesoscopicTrace::load(&path).unwrap();
        assert_eq!(loaded, trace);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MesoscopicTrace::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, MesoscopicError::Io(_)));
    }
}
