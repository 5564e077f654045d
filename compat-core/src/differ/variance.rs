//! Parameter and return type substitution checks.
//!
//! Each side of a comparison is a [`ScopedType`]: the declared type together
//! with the snapshot it was read from, so class relationships are resolved
//! against the hierarchy of that revision.

use crate::error::AnalysisError;
use crate::snapshot::{Snapshot, ITERABLE_ROOT};
use crate::types::{Scalar, TypeDecl, TypeName};

/// A declared type (or its absence) bound to its snapshot.
#[derive(Clone, Copy, Debug)]
pub struct ScopedType<'a> {
    pub ty: Option<&'a TypeDecl>,
    pub snapshot: &'a Snapshot,
}

impl<'a> ScopedType<'a> {
    pub fn new(ty: Option<&'a TypeDecl>, snapshot: &'a Snapshot) -> Self {
        Self { ty, snapshot }
    }
}

/// Whether `new` is an acceptable parameter type in place of `old`.
///
/// The new type has to accept at least every value the old one accepted.
/// Class ancestry is resolved against the old snapshot.
pub fn is_contravariant(
    old: ScopedType<'_>,
    new: ScopedType<'_>,
) -> Result<bool, AnalysisError> {
    let (old_ty, new_ty) = match (old.ty, new.ty) {
        (None, None) => return Ok(true),
        (Some(o), Some(n)) if o == n => return Ok(true),
        (Some(o), _) if o.is_void() => return Ok(true),
        (Some(_), None) => return Ok(true),
        (None, Some(_)) => return Ok(false),
        (Some(o), Some(n)) => (o, n),
    };

    if old_ty.allows_null() && !new_ty.allows_null() {
        return Ok(false);
    }
    if new_ty.is_void() {
        return Ok(false);
    }

    match (old_ty.name(), new_ty.name()) {
        (TypeName::Class(old_class), TypeName::Class(new_class)) => {
            if old_class == new_class {
                return Ok(true);
            }
            let class = old.snapshot.resolve_class(old_class)?;
            Ok(class.ancestors().contains(new_class.as_str()))
        }
        (TypeName::Class(_), TypeName::Scalar(Scalar::Object)) => Ok(true),
        (TypeName::Scalar(Scalar::Array), TypeName::Scalar(Scalar::Iterable)) => Ok(true),
        (old_name, new_name) => Ok(old_name == new_name),
    }
}

/// Whether `new` is an acceptable return type in place of `old`.
///
/// The new type may only produce values the old one could produce. Class
/// ancestry is resolved against the new snapshot.
pub fn is_covariant(old: ScopedType<'_>, new: ScopedType<'_>) -> Result<bool, AnalysisError> {
    let (old_ty, new_ty) = match (old.ty, new.ty) {
        (None, _) => return Ok(true),
        (Some(_), None) => return Ok(false),
        (Some(o), Some(n)) => (o, n),
    };

    if !old_ty.allows_null() && new_ty.allows_null() {
        return Ok(false);
    }
    if old_ty.name() == new_ty.name() {
        return Ok(true);
    }
    if old_ty.is_void() || new_ty.is_void() {
        return Ok(false);
    }

    match (old_ty.name(), new_ty.name()) {
        (TypeName::Scalar(Scalar::Iterable), TypeName::Scalar(Scalar::Array)) => Ok(true),
        (TypeName::Scalar(Scalar::Iterable), TypeName::Class(new_class)) => {
            if new_class == ITERABLE_ROOT {
                return Ok(true);
            }
            let class = new.snapshot.resolve_class(new_class)?;
            Ok(class.is_a(ITERABLE_ROOT))
        }
        (TypeName::Scalar(Scalar::Object), TypeName::Class(_)) => Ok(true),
        (TypeName::Class(old_class), TypeName::Class(new_class)) => {
            let class = new.snapshot.resolve_class(new_class)?;
            Ok(class.ancestors().contains(old_class.as_str()))
        }
        _ => Ok(false),
    }
}
