use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use nix::unistd::Pid;

/// Bounded single-producer/single-consumer FIFO of exited pids.
///
/// The producer is the SIGCHLD handler, the consumer is the main loop. Pushing
/// touches only preallocated slots and two atomic indices, so it is safe to
/// call from a signal handler. The indices count up forever and are reduced
/// modulo `N` on access; `tail - head` is the current length.
pub struct CompletionQueue<const N: usize> {
    slots: [AtomicI32; N],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<const N: usize> CompletionQueue<N> {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: AtomicI32 = AtomicI32::new(0);
        CompletionQueue {
            slots: [EMPTY; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Producer side. Returns false and drops `pid` when the queue is full.
    pub fn push(&self, pid: Pid) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= N {
            return false;
        }
        self.slots[tail % N].store(pid.as_raw(), Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    /// Consumer side.
    pub fn pop(&self) -> Option<Pid> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let raw = self.slots[head % N].swap(0, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(Pid::from_raw(raw))
    }

    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
