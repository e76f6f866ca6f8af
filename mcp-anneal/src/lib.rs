/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! mcp-anneal – laxity-driven placement of periodic real-time tasks onto the
//! cores of one or more multi-core platforms (MCPs).
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task          – periodic task model
//! ├── analysis/     – response-time recurrence + utilisation diagnostics
//! ├── processor     – Core: owned task set, cached WCRT / laxity
//! ├── platform      – Mcp: group of cores
//! ├── optimizer/    – cost function, neighbour moves, simulated annealing
//! ├── config/       – YAML system description loader
//! └── export        – YAML result writer
//! ```

pub mod analysis;
pub mod config;
pub mod export;
pub mod optimizer;
pub mod platform;
pub mod processor;
pub mod task;
