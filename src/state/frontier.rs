//! Frontier manager: one seen-set plus FIFO queue per entity kind
//!
//! The seen-set is the only discovery gate. An ID that was ever discovered is
//! never queued again, even if it has not been fetched yet.

use super::ids::{EntityId, EntityKind};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Returned by [`Frontier::next`] when nothing is pending
///
/// This is the expected way a traversal runs dry, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} frontier is empty")]
pub struct EmptyFrontier {
    pub kind: EntityKind,
}

/// Seen-set and pending queue for a single entity kind
#[derive(Debug, Clone)]
pub struct Frontier<T: EntityId> {
    seen: HashSet<T>,
    pending: VecDeque<T>,
}

impl<T: EntityId> Frontier<T> {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            pending: VecDeque::new(),
        }
    }

    /// Creates a frontier with a single root ID marked seen and queued
    pub fn seeded(root: T) -> Self {
        let mut frontier = Self::new();
        frontier.discover(root);
        frontier
    }

    /// Marks `id` seen and queues it if it was never seen before
    ///
    /// Returns `true` only for a first-time discovery.
    pub fn discover(&mut self, id: T) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.pending.push_back(id);
        true
    }

    /// Marks `id` seen without queueing it
    ///
    /// Used when rebuilding state from artifacts that are already on disk.
    pub fn mark_seen(&mut self, id: T) -> bool {
        self.seen.insert(id)
    }

    /// Dequeues the oldest pending ID
    pub fn next(&mut self) -> Result<T, EmptyFrontier> {
        self.pending
            .pop_front()
            .ok_or(EmptyFrontier { kind: T::KIND })
    }

    /// Whether `id` was ever discovered
    pub fn contains(&self, id: &T) -> bool {
        self.seen.contains(id)
    }

    /// Number of IDs ever discovered
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Number of IDs waiting to be processed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterates over pending IDs in dequeue order
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.pending.iter()
    }

    /// Iterates over every ID ever discovered, in no particular order
    pub fn seen(&self) -> impl Iterator<Item = &T> {
        self.seen.iter()
    }
}

impl<T: EntityId> Default for Frontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
