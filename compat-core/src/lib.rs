//! compat core - backward-compatibility break detection engine.
//!
//! This crate compares the public surface of two revisions of a library and
//! reports every structural change that can break a consumer who does not
//! change their own code.
//!
//! # Features
//!
//! - **Snapshots**: self-contained JSON symbol tables with precomputed
//!   ancestor sets
//! - **Rule library**: class, member and signature checks with type variance
//! - **Composable policies**: combinators build the per-kind rule sets
//! - **Parallel comparison**: symbol pairs are compared concurrently using Rayon
//! - **Fault isolation**: symbols that cannot be analyzed are reported as
//!   skipped instead of aborting the run
//!
//! # Usage
//!
//! ```no_run
//! use compat_core::{compare, Snapshot};
//! use std::path::Path;
//!
//! let old = Snapshot::load(Path::new("v1.json"))?;
//! let new = Snapshot::load(Path::new("v2.json"))?;
//!
//! let changes = compare(&old, &new);
//! if changes.has_bc_breaks() {
//!     eprintln!("{} findings", changes.len());
//! }
//! # Ok::<(), compat_core::error::SnapshotError>(())
//! ```

pub mod differ;
pub mod error;
pub mod snapshot;
pub mod types;

pub use differ::{compare, Change, ChangeKind, ChangeSummary, Changes, Comparator};
pub use error::{AnalysisError, SnapshotError};
pub use snapshot::{Snapshot, SymbolTable};
