// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for modular-cultures
//!
//! Console logging through `tracing`, with optional per-run log files under a
//! timestamped directory. Long cluster runs log to file; interactive runs get
//! console output only.

mod init;

pub use init::{init_logging, LoggingGuard};
