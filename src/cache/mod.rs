//! Remote cache interface types.
//!
//! The core produces `(ExecutableAction, ExecutableActionResult)` pairs and
//! [`UploadManifest`] payloads; the transport that stores them is an external
//! collaborator behind the [`CacheClient`] trait.

pub mod upload;

pub use upload::{UploadManifest, UploadManifestBuilder};

use crate::digest::{self, Digest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// An executable action identified by the digest of its command and
/// environment.
#[derive(Debug, Clone)]
pub struct ExecutableAction {
    command: Vec<String>,
    environment: BTreeMap<String, String>,
    action_digest: Digest,
}

/// Canonical serialized form of an action. The BTreeMap keeps environment
/// keys in stable order.
#[derive(Serialize)]
struct ActionFingerprint<'a> {
    command: &'a [String],
    environment: &'a BTreeMap<String, String>,
}

impl ExecutableAction {
    /// Create an action, computing its digest over the canonical form of the
    /// command and environment.
    pub fn create(
        command: impl IntoIterator<Item = String>,
        environment: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let command: Vec<String> = command.into_iter().collect();
        let environment: BTreeMap<String, String> = environment.into_iter().collect();
        let action_digest = digest::compute_canonical(&ActionFingerprint {
            command: &command,
            environment: &environment,
        });
        ExecutableAction {
            command,
            environment,
            action_digest,
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn action_digest(&self) -> &Digest {
        &self.action_digest
    }
}

/// The stored outcome of an executed action.
#[derive(Debug, Clone)]
pub struct ExecutableActionResult {
    pub exit_code: i32,
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
}

/// External collaborator storing and retrieving cached action results.
///
/// Implementations own the transport (and its retries and timeouts); the
/// core only supplies the digest and payload data.
pub trait CacheClient {
    /// Store or update the cached result for an action.
    fn upload_cache(
        &self,
        action: &ExecutableAction,
        result: &ExecutableActionResult,
    ) -> anyhow::Result<()>;

    /// Fetch the cached result for an action. `None` is a cache miss.
    fn lookup_cache(
        &self,
        action: &ExecutableAction,
    ) -> anyhow::Result<Option<ExecutableActionResult>>;
}
