
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use util::Conn;

use crate::agent::*;
use crate::error::*;
use crate::message::*;

/// MAX_MESSAGE_SIZE is the hard cap on the size of one inbound datagram.
pub const MAX_MESSAGE_SIZE: usize = 2048;

/// DEFAULT_BUFFER_SIZE is the reader scratch-buffer size, sized for the
/// expected MTU.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// DEFAULT_TIMEOUT_RATE is the cadence of the deadline sweep. It bounds
/// how late after its deadline a transaction may time out.
pub const DEFAULT_TIMEOUT_RATE: Duration = Duration::from_millis(100);

/// Collector drives the agent's deadline sweep at a constant rate.
///
/// The default collector is a ticker that sweeps on each tick.
pub trait Collector {
    fn start(&mut self, rate: Duration, agent: Arc<Mutex<Agent>>) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

#[derive(Default)]
struct TickerCollector {
    close_tx: Option<mpsc::Sender<()>>,
}

impl Collector for TickerCollector {
    fn start(&mut self, rate: Duration, agent: Arc<Mutex<Agent>>) -> Result<()> {
        let (close_tx, mut close_rx) = mpsc::channel(1);
        self.close_tx = Some(close_tx);

        tokio::spawn(async move {
            let mut interval = time::interval(rate);

            loop {
                tokio::select! {
                    _ = close_rx.recv() => break,
                    _ = interval.tick() => {
                        let mut a = agent.lock().await;
                        let _ = a.collect(Instant::now());
                    }
                }
            }
            trace!("collector exited");
        });

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.close_tx.is_none() {
            return Err(Error::ErrCollectorClosed);
        }
        self.close_tx.take();
        Ok(())
    }
}

struct ClientSettings {
    buffer_size: usize,
    timeout_rate: Duration,
    handler: Handler,
    collector: Option<Box<dyn Collector + Send>>,
    conn: Option<Arc<dyn Conn + Send + Sync>>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            buffer_size: DEFAULT_BUFFER_SIZE,
            timeout_rate: DEFAULT_TIMEOUT_RATE,
            handler: None,
            collector: None,
            conn: None,
        }
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    settings: ClientSettings,
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder {
            settings: ClientSettings::default(),
        }
    }

    /// with_handler sets the default handler, which receives events whose
    /// transaction ID is not currently registered. Useful for handling
    /// Data indications from a TURN server.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.settings.handler = handler;
        self
    }

    /// with_timeout_rate sets the deadline sweep cadence.
    pub fn with_timeout_rate(mut self, d: Duration) -> Self {
        self.settings.timeout_rate = d;
        self
    }

    /// with_buffer_size sets the reader scratch-buffer size. Values above
    /// MAX_MESSAGE_SIZE are clamped.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.settings.buffer_size = buffer_size;
        self
    }

    /// with_collector replaces the default ticker collector.
    pub fn with_collector(mut self, coll: Box<dyn Collector + Send>) -> Self {
        self.settings.collector = Some(coll);
        self
    }

    /// with_conn sets the transport connection.
    pub fn with_conn(mut self, conn: Arc<dyn Conn + Send + Sync>) -> Self {
        self.settings.conn = Some(conn);
        self
    }

    /// build spawns the reader and collector tasks and returns the running
    /// Client. Must be called within a tokio runtime.
    pub fn build(self) -> Result<Client> {
        let settings = self.settings;
        let conn = settings.conn.ok_or(Error::ErrNoConnection)?;

        let agent = Arc::new(Mutex::new(Agent::new(settings.handler)));
        let (close_tx, close_rx) = mpsc::channel(1);

        let buffer_size = settings.buffer_size.min(MAX_MESSAGE_SIZE);
        let reader_conn = Arc::clone(&conn);
        let reader_agent = Arc::clone(&agent);
        let reader_handle = tokio::spawn(async move {
            Client::read_until_closed(close_rx, reader_conn, reader_agent, buffer_size).await;
        });

        let mut collector = settings
            .collector
            .unwrap_or_else(|| Box::<TickerCollector>::default());
        collector.start(settings.timeout_rate, Arc::clone(&agent))?;

        Ok(Client {
            conn,
            agent,
            collector: Some(collector),
            close_tx: Some(close_tx),
            reader_handle: Some(reader_handle),
            closed: false,
        })
    }
}

/// Client simulates a "connection" to a STUN server: it couples an Agent
/// with a full-duplex byte connection, reads and decodes inbound packets
/// in a background task, and sweeps transaction deadlines on a timer.
pub struct Client {
    conn: Arc<dyn Conn + Send + Sync>,
    agent: Arc<Mutex<Agent>>,
    collector: Option<Box<dyn Collector + Send>>,
    close_tx: Option<mpsc::Sender<()>>,
    reader_handle: Option<JoinHandle<()>>,
    closed: bool,
}

impl Client {
    async fn read_until_closed(
        mut close_rx: mpsc::Receiver<()>,
        conn: Arc<dyn Conn + Send + Sync>,
        agent: Arc<Mutex<Agent>>,
        buffer_size: usize,
    ) {
        let mut msg = Message::new();
        let mut buf = vec![0; buffer_size];

        loop {
            tokio::select! {
                _ = close_rx.recv() => break,
                res = conn.recv(&mut buf) => {
                    let n = match res {
                        Ok(n) => n,
                        Err(_) => break,
                    };
                    if !is_message(&buf[..n]) {
                        trace!("dropping {n}B packet: not a STUN message");
                        continue;
                    }
                    // Malformed packets are dropped, not surfaced.
                    if let Err(err) = msg.write(&buf[..n]) {
                        debug!("dropping malformed STUN message: {err}");
                        continue;
                    }

                    let mut a = agent.lock().await;
                    if let Err(Error::ErrAgentClosed) = a.process(msg.clone()) {
                        break;
                    }
                }
            }
        }
        trace!("client reader exited");
    }

    /// indicate writes a fire-and-forget message: no transaction is
    /// registered and no completion is signaled.
    pub async fn indicate(&self, m: &Message) -> Result<()> {
        self.start(m, None, noop_handler()).await
    }

    /// start registers a transaction for m (when a handler is supplied)
    /// and writes the raw bytes to the connection.
    ///
    /// On write failure the transaction is stopped so the handler still
    /// sees exactly one event; if that stop fails too, both errors are
    /// wrapped into ErrStop.
    pub async fn start(
        &self,
        m: &Message,
        deadline: Option<Instant>,
        handler: Handler,
    ) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClientClosed);
        }

        let has_handler = handler.is_some();
        if has_handler {
            let mut a = self.agent.lock().await;
            a.start(m.transaction_id, deadline, handler)?;
        }

        if let Err(err) = self.conn.send(&m.raw).await {
            let cause = Error::from(err);
            if has_handler {
                let mut a = self.agent.lock().await;
                if let Err(stop_err) = a.stop(m.transaction_id) {
                    return Err(Error::ErrStop {
                        cause: Box::new(cause),
                        err: Box::new(stop_err),
                    });
                }
            }
            return Err(cause);
        }

        Ok(())
    }

    /// request is the blocking variant of start: it sends m and waits for
    /// the transaction's single event (response, timeout, stop or close).
    pub async fn request(&self, m: &Message, deadline: Option<Instant>) -> Result<Event> {
        let (handler_tx, mut handler_rx) = mpsc::unbounded_channel();
        self.start(m, deadline, Some(Arc::new(handler_tx))).await?;

        match handler_rx.recv().await {
            Some(e) => Ok(e),
            None => Err(Error::ErrClientClosed),
        }
    }

    /// close stops the collector, closes the agent (terminating pending
    /// transactions with ErrAgentClosed), closes the connection and joins
    /// the reader. Repeat calls return ErrClientClosed.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClientClosed);
        }
        self.closed = true;

        if let Some(collector) = &mut self.collector {
            let _ = collector.close();
        }
        self.collector.take();

        let agent_err = {
            let mut a = self.agent.lock().await;
            a.close().err()
        };

        self.close_tx.take(); // unblocks the reader select
        let connection_err = self.conn.close().await.err().map(Error::from);

        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.await;
        }

        if agent_err.is_none() && connection_err.is_none() {
            Ok(())
        } else {
            Err(Error::ErrClose {
                agent: agent_err.map(Box::new),
                connection: connection_err.map(Box::new),
            })
        }
    }
}
