//! Aggregate digests for a device image footprint.
//!
//! Folds an artifact's manifest descriptors into a single directory-node
//! digest, so two device snapshots compare as two scalars instead of two
//! descriptor lists.

use crate::content::artifact_details::{ArtifactDetails, ArtifactFileDescriptor};
use crate::content::context::ContentAnalysisContext;
use crate::digest::{self, Digest};
use crate::error::ManifestError;
use crate::tree::{DirectoryNode, FileNode};
use tracing::debug;

/// Which manifest of the context's [`ContentInformation`] to fold.
///
/// [`ContentInformation`]: crate::content::context::ContentInformation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestSide {
    Base,
    Current,
}

/// Paths that churn on every build without representing a device change.
const NOISE_SUFFIXES: [&str; 2] = ["/build.prop", "/prop.default"];
const NOISE_PREFIXES: [&str; 4] = ["IMAGES/", "META/", "PREBUILT_IMAGES/", "RADIO/"];

/// Build the aggregate digest of the context's artifact on one side.
///
/// Descriptors are filtered (ignored paths, noise paths), sorted by path, and
/// folded into a single-level directory node whose file digests come straight
/// from the manifest. The node is then digested with the same canonical
/// discipline as a filesystem Merkle tree.
pub fn build_from_context(
    context: &ContentAnalysisContext,
    side: ManifestSide,
) -> Result<Digest, ManifestError> {
    let manifest = match side {
        ManifestSide::Base => context.information().base_manifest(),
        ManifestSide::Current => context.information().current_manifest(),
    };
    let content = ArtifactDetails::parse_file(manifest, context.content_entry())?;
    let mut descriptors: Vec<ArtifactFileDescriptor> = content
        .details
        .into_iter()
        .filter(|d| !context.ignored_changes().contains(&d.path))
        .filter(|d| !is_noise_path(&d.path))
        .collect();
    descriptors.sort_by(|a, b| a.path.cmp(&b.path));

    let mut root = DirectoryNode::new();
    for descriptor in descriptors {
        root.insert_file(FileNode {
            name: descriptor.path,
            digest: Digest::new(descriptor.digest, descriptor.size),
            is_executable: false,
        });
    }
    let root_digest = digest::compute_directory(&root);
    debug!(
        artifact = context.content_entry(),
        side = ?side,
        digest = %root_digest,
        "built device footprint digest"
    );
    Ok(root_digest)
}

fn is_noise_path(path: &str) -> bool {
    NOISE_SUFFIXES.iter().any(|s| path.ends_with(s))
        || NOISE_PREFIXES.iter().any(|p| path.starts_with(p))
}
