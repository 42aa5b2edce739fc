// Copyright 2026 Modular Cultures Contributors
// SPDX-License-Identifier: Apache-2.0

pub mod analyze;
pub mod mesoscopic;
pub mod simulate;
pub mod sweep;
