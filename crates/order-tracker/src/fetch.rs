//! # Fetch Slots
//!
//! A [`FetchSlot`] is the tracker's private record for one fetch kind: the last
//! good value, the last error, and the bookkeeping that keeps polling honest.
//!
//! - **At most one in flight.** [`FetchSlot::try_begin`] refuses to issue a
//!   ticket while the previous one is outstanding, so a timer tick that lands
//!   during a slow fetch is simply skipped.
//! - **Last fetched wins.** Every ticket is numbered. A completion whose ticket
//!   is not newer than the last applied one is discarded as stale, so an old
//!   response can never overwrite a newer one and resurrect an old status.
//! - **Errors keep the data.** A failed fetch records the error next to the
//!   last good value instead of replacing it.

use crate::error::DirectoryError;

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchSlot<T> {
    next_ticket: u64,
    in_flight: Option<Ticket>,
    applied: u64,
    value: Option<T>,
    error: Option<DirectoryError>,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            next_ticket: 1,
            in_flight: None,
            applied: 0,
            value: None,
            error: None,
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket unless a fetch is already outstanding.
    pub fn try_begin(&mut self) -> Option<Ticket> {
        if self.in_flight.is_some() {
            return None;
        }
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Records the outcome of the fetch identified by `ticket`.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, DirectoryError>) -> Completion {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
        if ticket.0 <= self.applied {
            return Completion::Stale;
        }
        self.applied = ticket.0;
        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
            }
            Err(e) => self.error = Some(e),
        }
        Completion::Applied
    }

    /// Forgets all data and turns any outstanding fetch into a stale one.
    pub fn reset(&mut self) {
        self.applied = self.next_ticket - 1;
        self.in_flight = None;
        self.value = None;
        self.error = None;
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&DirectoryError> {
        self.error.as_ref()
    }
}
