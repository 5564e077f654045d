//! Backward-compatibility diff engine.
//!
//! Compares the symbols of two [`Snapshot`]s and reports structural changes
//! that can break consumers of the library.
//!
//! # Features
//!
//! - **Atomic rules**: small, independent checks per descriptor kind
//! - **Variance checks**: parameter and return types judged against each
//!   revision's own class hierarchy
//! - **Combinators**: gating, pairing and fault isolation compose the rules
//!   into per-kind policies
//! - **Parallel processing**: symbol pairs are compared concurrently via Rayon
//!
//! # Example
//!
//! ```
//! use compat_core::differ::compare;
//! use compat_core::snapshot::Snapshot;
//!
//! let old = Snapshot::from_json_str("old", r#"{ "classes": [ { "name": "Gone" } ] }"#).unwrap();
//! let new = Snapshot::from_json_str("new", "{}").unwrap();
//!
//! let changes = compare(&old, &new);
//! assert!(changes.has_bc_breaks());
//! for change in &changes {
//!     println!("{}", change);
//! }
//! ```
//!
//! [`Snapshot`]: crate::snapshot::Snapshot

pub mod changes;
pub mod combinators;
pub mod comparator;
pub mod policy;
pub mod rules;
pub mod variance;

pub use changes::{Change, ChangeKind, ChangeSummary, Changes};
pub use comparator::{compare, Comparator};
pub use policy::Policies;
pub use rules::{rule, BoxedRule, Rule, RuleResult, Scope};
pub use variance::{is_contravariant, is_covariant, ScopedType};
