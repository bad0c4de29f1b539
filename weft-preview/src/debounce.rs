//! Debounce gate for full re-renders.
//!
//! Every content change bumps the generation and yields a ticket; after
//! the quiet delay the caller presents the ticket back, and only the
//! newest one wins. A superseded ticket simply loses — there is no
//! cancellation of a render already dispatched to the sandbox.

use std::time::Duration;

/// Claim on a pending re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    generation: u64,
}

#[derive(Debug)]
pub struct DebounceGate {
    delay: Duration,
    generation: u64,
}

impl DebounceGate {
    pub fn new(delay: Duration) -> Self {
        DebounceGate {
            delay,
            generation: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a change and claim the next render.
    pub fn schedule(&mut self) -> RenderTicket {
        self.generation += 1;
        RenderTicket {
            generation: self.generation,
        }
    }

    /// True when no later change has superseded this ticket.
    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Sleep out the quiet period. Callers must not hold session locks
    /// across this await.
    pub async fn wait(delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_wins() {
        let mut gate = DebounceGate::new(Duration::from_millis(300));
        let first = gate.schedule();
        let second = gate.schedule();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[tokio::test]
    async fn test_wait_elapses() {
        let start = std::time::Instant::now();
        DebounceGate::wait(Duration::from_millis(10)).await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
