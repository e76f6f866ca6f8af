/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Multi-core platform (MCP): a named group of [`Core`]s.
//!
//! Pure aggregation.  Cores are kept in input order and looked up by a linear
//! scan; topologies are small enough that an index buys nothing.

use crate::processor::{Core, CoreId};

/// Platform identifier.
pub type McpId = u32;

/// A multi-core platform.
#[derive(Debug, Clone)]
pub struct Mcp {
    id: McpId,
    cores: Vec<Core>,
}

impl Mcp {
    /// Create a platform with no cores.
    pub fn new(id: McpId) -> Self {
        Self {
            id,
            cores: Vec::new(),
        }
    }

    /// Create a platform owning `cores`.
    pub fn with_cores(id: McpId, cores: Vec<Core>) -> Self {
        Self { id, cores }
    }

    pub fn id(&self) -> McpId {
        self.id
    }

    pub fn add_core(&mut self, core: Core) {
        self.cores.push(core);
    }

    /// Core with identifier `id`, if present.
    pub fn core(&self, id: CoreId) -> Option<&Core> {
        self.cores.iter().find(|c| c.id() == id)
    }

    pub fn core_mut(&mut self, id: CoreId) -> Option<&mut Core> {
        self.cores.iter_mut().find(|c| c.id() == id)
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub fn cores_mut(&mut self) -> &mut [Core] {
        &mut self.cores
    }

    /// Number of tasks over all cores of this platform.
    pub fn task_count(&self) -> usize {
        self.cores.iter().map(Core::len).sum()
    }
}
