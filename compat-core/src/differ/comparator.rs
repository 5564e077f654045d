//! Walks two snapshots and reports every BC-relevant difference.
//!
//! Each old symbol is compared with the new symbol of the same name on the
//! rayon pool. Results are collected in the old snapshot's declaration order,
//! so the output does not depend on scheduling.

use rayon::prelude::*;
use std::time::Instant;

use crate::differ::changes::{Change, Changes};
use crate::differ::policy::Policies;
use crate::differ::rules::Scope;
use crate::snapshot::Snapshot;
use crate::types::{ClassLike, FunctionLike, Symbol};

/// Compare two snapshots with the standard policies.
pub fn compare(old: &Snapshot, new: &Snapshot) -> Changes {
    Comparator::new().compare(old, new)
}

/// Configurable comparison run.
#[derive(Debug, Default)]
pub struct Comparator {
    policies: Policies,
    num_threads: Option<usize>,
}

impl Comparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policies(mut self, policies: Policies) -> Self {
        self.policies = policies;
        self
    }

    /// Size of a dedicated thread pool; `None` or `0` uses the global pool.
    pub fn with_threads(mut self, num_threads: Option<usize>) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn compare(&self, old: &Snapshot, new: &Snapshot) -> Changes {
        let start = Instant::now();
        let scope = Scope::new(old, new);

        let pool = match self.num_threads {
            Some(n) if n > 0 => rayon::ThreadPoolBuilder::new().num_threads(n).build().ok(),
            _ => None,
        };

        let run = || {
            let classes: Vec<Changes> = old
                .classes()
                .par_iter()
                .map(|class| self.compare_class_like(scope, class))
                .collect();
            let functions: Vec<Changes> = old
                .functions()
                .par_iter()
                .map(|function| self.compare_function(scope, function))
                .collect();

            classes
                .into_iter()
                .chain(functions)
                .fold(Changes::empty(), Changes::merge)
        };

        let changes = match pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        tracing::debug!(
            old = old.label(),
            new = new.label(),
            changes = changes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "comparison finished"
        );
        changes
    }

    fn compare_class_like(&self, scope: Scope<'_>, old: &ClassLike) -> Changes {
        match scope.new.class(&old.name) {
            Some(new) => {
                tracing::trace!(symbol = %old.name, "comparing class-like");
                self.policies.check_class_like(scope, old, new)
            }
            None if old.is_anonymous || old.is_internal => Changes::empty(),
            None => {
                let message = format!("{} {} has been deleted", old.kind.label(), old.name);
                Change::removed(message, true)
                    .with_location(old.location())
                    .into()
            }
        }
    }

    fn compare_function(&self, scope: Scope<'_>, old: &FunctionLike) -> Changes {
        match scope.new.function(&old.name) {
            Some(new) => {
                tracing::trace!(symbol = %old.name, "comparing function");
                self.policies.check_function(scope, old, new)
            }
            None if old.is_internal => Changes::empty(),
            None => {
                let message = format!("Function {} has been deleted", old.display_name());
                Change::removed(message, true)
                    .with_location(old.location())
                    .into()
            }
        }
    }
}
