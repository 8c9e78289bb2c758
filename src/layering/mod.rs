//! Layered templates.
//!
//! A layered template stores only its difference from a parent:
//!
//! 1. The author edits a full copy of the parent in `work/`
//! 2. [`create_layer`] diffs `work/` against the resolved parent and writes
//!    `layer.patch`
//! 3. [`materialize`] rebuilds the concrete tree by copying the root base
//!    template and applying every patch down the chain
//!
//! Patches are plain unified diffs, readable and reviewable in version control.

pub mod check;
pub mod diff;
pub mod layer;
pub mod materialize;
pub mod patch;
pub mod tree;
pub mod versioning;

pub use check::{check_template, CheckReport};
pub use diff::{apply_hunks, diff_lines, join_lines, split_lines, Hunk, HunkLine, Line};
pub use layer::{create_layer, LayerOptions, LayerResult};
pub use materialize::materialize;
pub use patch::{FilePatch, PatchArtifact, PatchSummary};
pub use tree::{copy_tree, snapshot, TreeSnapshot};
pub use versioning::{create_version, VersionOptions, VersionResult};
