//! Inheritance chains and cycle detection.
//!
//! A layered template names its parent in `template.json`. Before anything is
//! materialized the whole chain is resolved up front, so a missing parent or a
//! loop is reported before any file is touched.

use crate::error::{Result, StrataError};
use crate::registry::discovery::CatalogEntry;
use crate::registry::resolver::Registry;
use std::collections::HashSet;
use tracing::debug;

impl Registry {
    /// Follow the parent chain from `reference`, reporting whether any
    /// template is reached twice.
    ///
    /// `visited` holds `name@version` ids seen so far. A reference or parent
    /// that does not resolve ends the walk without a cycle.
    pub fn detect_cycle(&self, reference: &str, visited: &mut HashSet<String>) -> bool {
        let Some(entry) = self.find(reference) else {
            return false;
        };

        if !visited.insert(entry.id()) {
            return true;
        }

        match &entry.descriptor.parent {
            Some(parent) => self.detect_cycle(&parent.reference(), visited),
            None => false,
        }
    }

    /// Resolve every ancestor of `entry`, root first and `entry` last.
    pub fn ancestor_chain<'a>(&'a self, entry: &'a CatalogEntry) -> Result<Vec<&'a CatalogEntry>> {
        let mut chain = vec![entry];
        let mut seen: HashSet<String> = HashSet::from([entry.id()]);
        let mut current = entry;

        while let Some(parent) = &current.descriptor.parent {
            let reference = parent.reference();
            let next = self
                .find(&reference)
                .ok_or_else(|| StrataError::ParentNotFound {
                    reference: reference.clone(),
                    child: current.id(),
                })?;

            if !seen.insert(next.id()) {
                let mut ids: Vec<String> = chain.iter().map(|e| e.id()).collect();
                ids.push(next.id());
                return Err(StrataError::CycleDetected {
                    chain: ids.join(" → "),
                });
            }

            debug!("{} extends {}", current.id(), next.id());
            chain.push(next);
            current = next;
        }

        chain.reverse();
        Ok(chain)
    }
}
