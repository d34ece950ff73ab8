//! Triage priority queue
//!
//! Waiting patients are ordered by severity (1 first), then by the order
//! they were enqueued. Sequence numbers come from a counter that only ever
//! increases for the life of the queue, so two entries can never compare
//! equal and patients of the same severity are served strictly FIFO.

use crate::models::patient::{Patient, PatientId, Severity};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One waiting patient
///
/// Field order matters: the derived `Ord` compares severity, then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TriageEntry {
    pub severity: Severity,
    pub seq: u64,
    pub patient: PatientId,
}

/// Severity-then-FIFO queue of waiting patients
///
/// # Example
/// ```
/// use er_simulator_core::models::{Patient, PatientId, Severity};
/// use er_simulator_core::triage::TriageQueue;
///
/// let mut queue = TriageQueue::new();
/// queue.enqueue(&Patient::new(PatientId(1), Severity::new(4).unwrap(), 0.0));
/// queue.enqueue(&Patient::new(PatientId(2), Severity::new(1).unwrap(), 1.0));
///
/// assert_eq!(queue.dequeue(), Some(PatientId(2)));
/// assert_eq!(queue.dequeue(), Some(PatientId(1)));
/// assert_eq!(queue.dequeue(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TriageQueue {
    heap: BinaryHeap<Reverse<TriageEntry>>,
    next_seq: u64,
}

impl TriageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a patient, assigning the next sequence number
    ///
    /// Returns the sequence number given to this entry.
    pub fn enqueue(&mut self, patient: &Patient) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(TriageEntry {
            severity: patient.severity(),
            seq,
            patient: patient.id(),
        }));
        seq
    }

    /// Remove the most urgent, earliest-enqueued patient
    pub fn dequeue(&mut self) -> Option<PatientId> {
        self.heap.pop().map(|Reverse(entry)| entry.patient)
    }

    /// Entry that `dequeue` would return next
    pub fn peek(&self) -> Option<&TriageEntry> {
        self.heap.peek().map(|Reverse(entry)| entry)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Number of sequence numbers handed out so far
    pub fn issued(&self) -> u64 {
        self.next_seq
    }

    /// Drop all waiting entries
    ///
    /// The sequence counter is kept; numbers are never reused.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: u64, severity: u8) -> Patient {
        Patient::new(PatientId(id), Severity::new(severity).unwrap(), id as f64)
    }

    #[test]
    fn test_fifo_within_severity() {
        let mut queue = TriageQueue::new();
        for id in 1..=4 {
            queue.enqueue(&patient(id, 3));
        }
        let order: Vec<u64> = std::iter::from_fn(|| queue.dequeue()).map(|p| p.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_severity_beats_arrival_order() {
        let mut queue = TriageQueue::new();
        queue.enqueue(&patient(1, 5));
        queue.enqueue(&patient(2, 3));
        queue.enqueue(&patient(3, 1));
        queue.enqueue(&patient(4, 3));

        assert_eq!(queue.peek().map(|e| e.patient), Some(PatientId(3)));
        let order: Vec<u64> = std::iter::from_fn(|| queue.dequeue()).map(|p| p.0).collect();
        assert_eq!(order, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_sequence_not_reused_after_clear() {
        let mut queue = TriageQueue::new();
        assert_eq!(queue.enqueue(&patient(1, 2)), 0);
        assert_eq!(queue.enqueue(&patient(2, 2)), 1);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.enqueue(&patient(3, 2)), 2);
        assert_eq!(queue.issued(), 3);
    }
}
