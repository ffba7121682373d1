//! Manifest synthesis
//!
//! The deployment description is assembled in dependency order and written
//! out as one JSON document per stack. Synthesis is the whole runtime of
//! this crate: once the manifests are on disk, everything else is the
//! deployment engine's job.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::schema::RootSchema;
use tracing::info;

use crate::stack::Stack;
use crate::{Error, Result};

/// An ordered collection of stacks headed for synthesis
///
/// Order is the deployment dependency order: the shared infrastructure
/// stack first, then the stacks built on its handles.
#[derive(Clone, Debug, Default)]
pub struct App {
    out_dir: PathBuf,
    stacks: Vec<Stack>,
}

impl App {
    /// Create an app writing manifests into `out_dir`
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stacks: Vec::new(),
        }
    }

    /// Append a stack; call in dependency order
    pub fn add_stack(&mut self, stack: Stack) {
        self.stacks.push(stack);
    }

    /// The stacks queued for synthesis, in order
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    /// Serialize every stack to `<out_dir>/<stack>.manifest.json`
    ///
    /// Returns the written paths in dependency order.
    pub fn synth(&self) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir)?;

        let mut written = Vec::with_capacity(self.stacks.len());
        for stack in &self.stacks {
            let path = self.manifest_path(&stack.name);
            let json = serde_json::to_string_pretty(stack).map_err(|e| {
                Error::serialization(format!("failed to serialize stack '{}': {e}", stack.name))
            })?;
            fs::write(&path, json + "\n")?;
            info!(
                stack = %stack.name,
                resources = stack.resource_count(),
                path = %path.display(),
                "synthesized stack manifest"
            );
            written.push(path);
        }
        Ok(written)
    }

    /// Path a stack's manifest is written to
    pub fn manifest_path(&self, stack_name: &str) -> PathBuf {
        self.out_dir.join(format!("{stack_name}.manifest.json"))
    }

    /// Directory manifests are written into
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// JSON schema of a stack manifest document
    pub fn manifest_schema() -> RootSchema {
        schemars::schema_for!(Stack)
    }
}
