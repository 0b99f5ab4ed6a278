//! Reconciles annotations with the identifiers that currently exist on the host.

use std::{
	collections::{HashMap, HashSet},
	hash::BuildHasher,
};

use tracing::debug;

use crate::{
	annotation::{AnnotationSet, Identifier},
	settings::Settings,
};

/// Supplies the identifiers of the subjects currently installed on the host.
pub trait LiveIdentifiers: Send + Sync {
	fn live_identifiers(&self) -> HashSet<Identifier>;
}

impl<S: BuildHasher + Send + Sync> LiveIdentifiers for HashSet<Identifier, S> {
	fn live_identifiers(&self) -> HashSet<Identifier> {
		self.iter().cloned().collect()
	}
}

impl<S: BuildHasher + Send + Sync> LiveIdentifiers for HashMap<Identifier, String, S> {
	fn live_identifiers(&self) -> HashSet<Identifier> {
		self.keys().cloned().collect()
	}
}

impl LiveIdentifiers for [Identifier] {
	fn live_identifiers(&self) -> HashSet<Identifier> {
		self.iter().cloned().collect()
	}
}

/// Annotations whose subject is not live anymore.
#[must_use]
pub fn orphans<S: BuildHasher>(
	annotations: &AnnotationSet,
	live: &HashSet<Identifier, S>,
) -> AnnotationSet {
	annotations
		.iter()
		.filter(|(id, _)| !live.contains(*id))
		.map(|(id, annotation)| (id.clone(), annotation.clone()))
		.collect()
}

/// Removes exactly the keys of `orphans`, keeping the order of what remains.
pub fn prune(annotations: &mut AnnotationSet, orphans: &AnnotationSet) {
	for id in orphans.keys() {
		if annotations.shift_remove(id).is_some() {
			debug!(%id, "Pruned orphaned annotation");
		}
	}
}

/// Drops annotations left without text. Returns how many were dropped.
pub fn prune_empty(annotations: &mut AnnotationSet) -> usize {
	let before = annotations.len();
	annotations.retain(|_, annotation| !annotation.is_empty());
	before - annotations.len()
}

/// Result of checking the annotations against a fresh set of live identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
	/// `automatic_remove` was on and these orphans are gone.
	Pruned(AnnotationSet),
	/// These orphans were kept for the user to deal with.
	Retained(AnnotationSet),
}

impl Reconciliation {
	#[must_use]
	pub const fn orphans(&self) -> &AnnotationSet {
		match self {
			Self::Pruned(orphans) | Self::Retained(orphans) => orphans,
		}
	}

	/// Whether the settings were modified.
	#[must_use]
	pub fn changed(&self) -> bool {
		matches!(self, Self::Pruned(orphans) if !orphans.is_empty())
	}
}

/// Applies the `automatic_remove` policy for a refreshed live identifier set.
pub fn reconcile<S: BuildHasher>(
	settings: &mut Settings,
	live: &HashSet<Identifier, S>,
) -> Reconciliation {
	let orphaned = orphans(&settings.annotations, live);

	if settings.automatic_remove {
		prune(&mut settings.annotations, &orphaned);
		Reconciliation::Pruned(orphaned)
	} else {
		Reconciliation::Retained(orphaned)
	}
}
