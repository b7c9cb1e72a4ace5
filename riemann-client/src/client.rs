//! High-level client API.

use crate::backoff::{Backoff, Clock, SystemClock};
use crate::connection::ConnectionConfig;
use crate::error::ConnectError;
use crate::transport::{Connect, NetConnector, Transport};
use riemann_protocol::{Event, Message, ProtocolError};
use serde_json::Value;
use std::time::Instant;

/// Client for a Riemann server.
///
/// Holds at most one connection, opened lazily by the first request and
/// dropped on any transport failure. Failures never surface as errors:
/// [`Client::transmit`] returns an empty [`Message`] instead and the client
/// backs off before trying again. Only a response that arrives but cannot be
/// decoded is reported as an error.
///
/// All operations take `&mut self`; share a client between tasks by wrapping
/// it in a mutex.
pub struct Client<C: Connect = NetConnector, K: Clock = SystemClock> {
    connector: C,
    connection: Option<C::Transport>,
    backoff: Backoff<K>,
}

impl Client {
    /// Creates a client for the given configuration. Does not connect.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(NetConnector::new(config), SystemClock)
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &ConnectionConfig {
        self.connector.config()
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(ConnectionConfig::default())
    }
}

impl<C: Connect, K: Clock> Client<C, K> {
    /// Creates a client with a custom connector and clock.
    pub fn with_connector(connector: C, clock: K) -> Self {
        Self::with_backoff(connector, Backoff::new(clock))
    }

    /// Creates a client with a custom connector and backoff state.
    pub fn with_backoff(connector: C, backoff: Backoff<K>) -> Self {
        Self {
            connector,
            connection: None,
            backoff,
        }
    }

    /// Opens a connection, replacing any existing one.
    pub async fn connect(&mut self) -> Result<(), ConnectError> {
        self.disconnect().await;
        self.connection = Some(self.connector.connect().await?);
        Ok(())
    }

    /// Closes the connection, if any.
    pub async fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            tracing::debug!("Closing connection");
            connection.close().await;
        }
    }

    /// Returns whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Consecutive failed attempts since the last success.
    pub fn attempts(&self) -> u32 {
        self.backoff.attempts()
    }

    /// Earliest instant at which the next attempt will be made.
    pub fn retry_after(&self) -> Option<Instant> {
        self.backoff.retry_after()
    }

    /// Returns whether requests are currently being suppressed.
    pub fn is_throttled(&self) -> bool {
        self.backoff.is_throttled()
    }

    pub fn backoff(&self) -> &Backoff<K> {
        &self.backoff
    }

    fn failed(&mut self) {
        let delay = self.backoff.record_failure();
        tracing::warn!(
            "Request failed (attempt {}), backing off for {:?}",
            self.backoff.attempts(),
            delay
        );
    }

    /// Sends a message and returns the decoded response.
    ///
    /// Returns an empty message without doing any I/O while backing off, and
    /// an empty message when connecting or the exchange fails. Datagram
    /// transports always yield an empty message.
    ///
    /// A successful connect and a completed exchange both reset the retry
    /// state.
    pub async fn transmit(&mut self, message: &Message) -> Result<Message, ProtocolError> {
        if self.backoff.is_throttled() {
            tracing::debug!("Throttled, dropping request");
            return Ok(Message::new());
        }

        if self.connection.is_none() {
            match self.connector.connect().await {
                Ok(connection) => {
                    self.connection = Some(connection);
                    self.backoff.reset();
                }
                Err(e) => {
                    tracing::debug!("Connect failed: {}", e);
                    self.failed();
                    return Ok(Message::new());
                }
            }
        }

        let Some(connection) = self.connection.as_mut() else {
            return Ok(Message::new());
        };

        let result = connection.write(message.raw()).await;
        match result {
            Ok(Some(raw)) => {
                self.backoff.reset();
                Message::from_raw(&raw)
            }
            Ok(None) => {
                self.backoff.reset();
                Ok(Message::new())
            }
            Err(e) => {
                tracing::debug!("Transport error: {}", e);
                self.failed();
                self.disconnect().await;
                Ok(Message::new())
            }
        }
    }

    /// Sends one event. Returns whether the server acknowledged it.
    pub async fn send(&mut self, event: Event) -> Result<bool, ProtocolError> {
        self.send_many(std::iter::once(event)).await
    }

    /// Sends several events in one message.
    pub async fn send_many<I>(&mut self, events: I) -> Result<bool, ProtocolError>
    where
        I: IntoIterator<Item = Event>,
    {
        let message = Message::from_events(events);
        let response = self.transmit(&message).await?;
        Ok(response.ok())
    }

    /// Builds an event from a parameter object and sends it.
    ///
    /// Fails, without sending, if the parameters are not a valid event.
    pub async fn send_params(&mut self, params: &Value) -> Result<bool, ProtocolError> {
        let event = Event::from_params(params)?;
        self.send(event).await
    }

    /// Runs a query and returns the matching events.
    pub async fn query(&mut self, query: impl Into<String>) -> Result<Vec<Event>, ProtocolError> {
        let message = Message::from_query(query);
        let response = self.transmit(&message).await?;
        Ok(response.events())
    }
}
