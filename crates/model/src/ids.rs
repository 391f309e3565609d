//! Numeric entity ids and the allocator handing them out.

pub type TemplateId = u64;
pub type HeaderFieldId = u64;
pub type SectionId = u64;
pub type FieldId = u64;
pub type RecordId = u64;
pub type UserId = u64;
pub type MachineId = u64;
pub type ProductId = u64;
pub type ProductInstanceId = u64;
pub type ProductionStepId = u64;
pub type AssignmentId = u64;
pub type ScheduleId = u64;

/// Monotonic id allocator.
///
/// The store owns the persistent sequence; this type exists so the sync
/// routine and tests can allocate ids without touching storage. Seeding
/// past the highest id already in use is the caller's responsibility.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new(seed: u64) -> Self {
        IdSequence { next: seed }
    }

    /// Hand out the next id and advance the sequence.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` would return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_from_seed() {
        let mut seq = IdSequence::new(100);
        assert_eq!(seq.next_id(), 100);
        assert_eq!(seq.next_id(), 101);
        assert_eq!(seq.peek(), 102);
    }
}
