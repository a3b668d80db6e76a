//! Sequence Numbers - Creation Order of Computation Nodes
//!
//! Each node records a sequence number from the counter of the thread that
//! created it. Counters are seeded from a shared 16-bit generator placed in
//! the top bits, so numbers from different threads are unlikely to collide
//! while each thread's numbers increase monotonically.
//!
//! Collisions remain possible once more than 2^16 counters have been seeded
//! or a single counter issues more than 2^48 numbers.
//!
//! @version 0.1.0
//! @author Tessera Development Team

use std::cell::RefCell;
use std::sync::atomic::{AtomicU16, Ordering};

/// Bit position of the per-counter seed inside a sequence number.
pub const SEED_SHIFT: u32 = u64::BITS - u16::BITS;

// =============================================================================
// Sequence Generator
// =============================================================================

/// Shared source of counter seeds.
#[derive(Debug)]
pub struct SequenceGenerator {
    seeds: AtomicU16,
}

impl SequenceGenerator {
    /// Creates a generator whose first counter starts at zero.
    pub const fn new() -> Self {
        Self {
            seeds: AtomicU16::new(0),
        }
    }

    /// Seeds a fresh counter with the next unused seed.
    pub fn counter(&self) -> SequenceCounter {
        let seed = self.seeds.fetch_add(1, Ordering::Relaxed);
        SequenceCounter::starting_at(u64::from(seed) << SEED_SHIFT)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_GENERATOR: SequenceGenerator = SequenceGenerator::new();

/// Returns the process-wide generator used to seed thread counters.
pub fn global_generator() -> &'static SequenceGenerator {
    &GLOBAL_GENERATOR
}

// =============================================================================
// Sequence Counter
// =============================================================================

/// Monotonic counter owned by one thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    /// Creates a counter whose next number is `start`.
    pub const fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// Returns the next sequence number and advances the counter.
    pub fn next(&mut self) -> u64 {
        let nr = self.next;
        self.next = self.next.wrapping_add(1);
        nr
    }

    /// Returns the number the next call to `next` will hand out.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Returns the seed this counter was created with.
    pub fn seed(&self) -> u16 {
        (self.next >> SEED_SHIFT) as u16
    }
}

// =============================================================================
// Thread-Local Context
// =============================================================================

thread_local! {
    /// Counter for nodes created on this thread, seeded on first use.
    static THREAD_COUNTER: RefCell<Option<SequenceCounter>> = const { RefCell::new(None) };
}

fn with_thread_counter<F, R>(f: F) -> R
where
    F: FnOnce(&mut SequenceCounter) -> R,
{
    THREAD_COUNTER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let counter = slot.get_or_insert_with(|| global_generator().counter());
        f(counter)
    })
}

/// Returns the next sequence number for this thread.
pub fn next_sequence_nr() -> u64 {
    with_thread_counter(SequenceCounter::next)
}

/// Returns the next sequence number for this thread without consuming it.
pub fn peek_next_sequence_nr() -> u64 {
    with_thread_counter(|c| c.peek())
}

/// Installs an explicit counter for this thread, returning the previous one.
///
/// Worker pools seed one counter per worker from their own generator at
/// startup and install it here before running any graph construction.
pub fn install_thread_counter(counter: SequenceCounter) -> Option<SequenceCounter> {
    THREAD_COUNTER.with(|cell| cell.borrow_mut().replace(counter))
}

// =============================================================================
// Tests
// =============================================================================
