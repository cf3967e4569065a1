use std::sync::{Condvar, Mutex, PoisonError};

/// FIFO gate letting one writer through at a time.
///
/// Built on `Mutex` + `Condvar` like a plain lock, but callers take a numbered
/// ticket and are admitted strictly in arrival order.
#[derive(Default)]
pub(crate) struct WriteQueue {
    tickets: Mutex<Tickets>,
    turn: Condvar,
}

#[derive(Default)]
struct Tickets {
    next: u64,
    serving: u64,
}

/// Held for the duration of one write; the next ticket is admitted on drop.
pub(crate) struct WriteTurn<'a> {
    queue: &'a WriteQueue,
}

impl WriteQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until every earlier caller has finished.
    ///
    /// The counters stay consistent even if a holder panicked, so poisoning is
    /// ignored.
    pub(crate) fn enter(&self) -> WriteTurn<'_> {
        let mut tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        let ticket = tickets.next;
        tickets.next += 1;
        while tickets.serving != ticket {
            tickets = self
                .turn
                .wait(tickets)
                .unwrap_or_else(PoisonError::into_inner);
        }
        WriteTurn { queue: self }
    }

    /// Callers waiting or writing.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> u64 {
        let tickets = self.tickets.lock().unwrap_or_else(PoisonError::into_inner);
        tickets.next - tickets.serving
    }
}

impl Drop for WriteTurn<'_> {
    fn drop(&mut self) {
        let mut tickets = self
            .queue
            .tickets
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tickets.serving += 1;
        self.queue.turn.notify_all();
    }
}
