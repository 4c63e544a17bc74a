
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use tokio::sync::mpsc;

use crate::error::*;
use crate::message::*;

// Handler handles state changes of transaction.
//
// The event is delivered over an unbounded channel, so dispatch never
// blocks the agent. Usage of the event's message is valid only until the
// receiver drops it.
pub type Handler = Option<Arc<mpsc::UnboundedSender<Event>>>;

// noop_handler just discards any event.
pub fn noop_handler() -> Handler {
    None
}

#[derive(PartialEq, Eq, Hash, Copy, Clone, Default, Debug)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    // new returns a fresh random transaction ID drawn from a
    // cryptographically secure source.
    pub fn new() -> Self {
        let mut b = TransactionId([0u8; TRANSACTION_ID_SIZE]);
        rand::thread_rng().fill(&mut b.0);
        b
    }
}

impl Setter for TransactionId {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.transaction_id = *self;
        m.write_transaction_id();
        Ok(())
    }
}

// Event is passed to Handler describing the transaction outcome: the
// matched message, or the error that terminated the transaction
// (ErrTransactionStopped, ErrTransactionTimeOut, ErrAgentClosed).
#[derive(Debug)]
pub struct Event {
    pub transaction_id: TransactionId,
    pub body: Result<Message>,
}

// AgentTransaction represents a transaction in progress. Identity is the
// id alone; an agent never holds two transactions with one id.
struct AgentTransaction {
    id: TransactionId,
    // None means the transaction never expires.
    deadline: Option<Instant>,
    handler: Handler,
}

// AGENT_COLLECT_CAP is initial capacity for Agent::collect slices,
// sufficient to make the sweep allocation-free in most cases.
const AGENT_COLLECT_CAP: usize = 100;

// Agent is a low-level abstraction over a transaction list that handles
// concurrency and deadlines (via collect calls).
//
// Event dispatch is done by unregistering the transaction before touching
// its handler, so each handler sees exactly one event: the matched
// response, stop, timeout, or agent close.
pub struct Agent {
    transactions: HashMap<TransactionId, AgentTransaction>,
    closed: bool, // all calls except close are invalid if true
    // Default sink for messages that match no registered transaction,
    // e.g. TURN Data indications.
    handler: Handler,
}

impl Agent {
    // new initializes an Agent. h receives events for messages with no
    // registered transaction; pass noop_handler() to discard them.
    pub fn new(handler: Handler) -> Self {
        Agent {
            transactions: HashMap::new(),
            closed: false,
            handler,
        }
    }

    // start registers a transaction with the provided id, deadline and
    // handler. A deadline of None never expires. Could return
    // ErrAgentClosed, ErrTransactionExists.
    //
    // The handler is guaranteed to eventually receive exactly one event.
    pub fn start(
        &mut self,
        id: TransactionId,
        deadline: Option<Instant>,
        handler: Handler,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        if self.transactions.contains_key(&id) {
            return Err(Error::ErrTransactionExists);
        }

        self.transactions.insert(
            id,
            AgentTransaction {
                id,
                deadline,
                handler,
            },
        );

        Ok(())
    }

    // stop stops the transaction by id, delivering ErrTransactionStopped to
    // its handler. Can return ErrTransactionNotExists and ErrAgentClosed.
    pub fn stop(&mut self, id: TransactionId) -> Result<()> {
        self.stop_with_error(id, Error::ErrTransactionStopped)
    }

    // stop_with_error removes the transaction from the list and delivers
    // the provided error to its handler.
    pub fn stop_with_error(&mut self, id: TransactionId, error: Error) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }

        let t = self
            .transactions
            .remove(&id)
            .ok_or(Error::ErrTransactionNotExists)?;
        if let Some(handler) = &t.handler {
            handler.send(Event {
                transaction_id: t.id,
                body: Err(error),
            })?;
        }
        Ok(())
    }

    // process dispatches an incoming message to the matching transaction's
    // handler, unregistering it. A message that matches nothing goes to the
    // default handler, if one is set.
    pub fn process(&mut self, message: Message) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }

        let id = message.transaction_id;
        let handler = match self.transactions.remove(&id) {
            Some(t) => t.handler,
            None => self.handler.clone(),
        };

        if let Some(handler) = &handler {
            handler.send(Event {
                transaction_id: id,
                body: Ok(message),
            })?;
        }

        Ok(())
    }

    // collect terminates all transactions with a deadline before gc_time,
    // delivering ErrTransactionTimeOut to each handler. Transactions with
    // no deadline are left alone. Does nothing if the agent is closed (all
    // transactions were already terminated during close).
    //
    // It is safe to call collect concurrently but makes no sense.
    pub fn collect(&mut self, gc_time: Instant) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        let mut to_remove: Vec<TransactionId> = Vec::with_capacity(AGENT_COLLECT_CAP);

        // Adding all expired transactions to the to_remove list. No allocs
        // if there are less than AGENT_COLLECT_CAP timed out transactions.
        for (id, t) in &self.transactions {
            if let Some(deadline) = t.deadline {
                if deadline < gc_time {
                    to_remove.push(*id);
                }
            }
        }

        // Unregistering timed out transactions, then notifying each
        // handler. Sending on the event channel never blocks, so the sweep
        // completes regardless of receiver progress.
        for id in to_remove {
            if let Some(t) = self.transactions.remove(&id) {
                if let Some(handler) = &t.handler {
                    let _ = handler.send(Event {
                        transaction_id: id,
                        body: Err(Error::ErrTransactionTimeOut),
                    });
                }
            }
        }

        Ok(())
    }

    // set_handler sets the default handler to h.
    pub fn set_handler(&mut self, h: Handler) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }
        self.handler = h;

        Ok(())
    }

    // close terminates all remaining transactions with ErrAgentClosed and
    // renders the agent closed. Repeat calls return ErrAgentClosed.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ErrAgentClosed);
        }

        for (id, t) in self.transactions.drain() {
            if let Some(handler) = &t.handler {
                let _ = handler.send(Event {
                    transaction_id: id,
                    body: Err(Error::ErrAgentClosed),
                });
            }
        }
        self.closed = true;
        self.handler = noop_handler();

        Ok(())
    }
}
