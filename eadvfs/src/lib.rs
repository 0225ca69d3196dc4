/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! EADVFS – energy-aware DVFS scheduling simulator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── job          – job spec + runtime state (remaining / start / finish)
//! ├── power        – frequency level table, idle power, level selection
//! ├── policy/      – governors: frequency heuristic + SRTF job selection
//! ├── engine/      – discrete-event loop, run interval planning, errors
//! ├── report       – turnaround / waiting / energy statistics and summary
//! ├── workload     – sample jobset and "arrival burst" job files
//! └── config/      – YAML simulator configuration
//! ```

pub mod config;
pub mod engine;
pub mod job;
pub mod policy;
pub mod power;
pub mod report;
pub mod workload;
