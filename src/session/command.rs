//! Session command loop.
//!
//! Button presses arrive as [`SessionCommand`]s on an unbounded channel and
//! are processed one at a time by a tokio task that owns the [`Session`].
//! Network work is fire-and-forget through the library, so no command
//! blocks the loop.

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

use super::core::Session;

// ============================================================================
// SessionCommand
// ============================================================================

/// Commands processed by the session loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Connect button.
    Connect,
    /// Disconnect button.
    Disconnect,
    /// Client-event button; the outcome is sent back if a reply channel is given.
    TriggerClientEvent {
        /// Receives the trigger outcome.
        reply: Option<oneshot::Sender<Result<bool>>>,
    },
    /// Close the session and stop the loop.
    Shutdown,
}

// ============================================================================
// SessionHandle
// ============================================================================

/// Cloneable sender side of a running session loop.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Queues a connect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the loop has stopped.
    pub fn connect(&self) -> Result<()> {
        self.send(SessionCommand::Connect)
    }

    /// Queues a disconnect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the loop has stopped.
    pub fn disconnect(&self) -> Result<()> {
        self.send(SessionCommand::Disconnect)
    }

    /// Triggers the client event and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the loop stops first, or the
    /// trigger error itself.
    pub async fn trigger_client_event(&self) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::TriggerClientEvent {
            reply: Some(reply_tx),
        })?;
        reply_rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Asks the loop to close the session and stop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the loop has already stopped.
    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionCommand::Shutdown)
    }

    /// Returns `true` once the loop has stopped.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Queues a raw command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SessionClosed`] if the loop has stopped.
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::SessionClosed)
    }
}

// ============================================================================
// Session Loop
// ============================================================================

impl Session {
    /// Moves the session into a command loop task.
    ///
    /// The task returns the closed session after [`SessionCommand::Shutdown`]
    /// or once every handle is dropped. Must be called within a tokio
    /// runtime.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<Session>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_command_loop(self, command_rx));
        (SessionHandle { command_tx }, task)
    }
}

async fn run_command_loop(
    mut session: Session,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
) -> Session {
    debug!("Session command loop started");

    while let Some(command) = command_rx.recv().await {
        trace!(?command, "Session command received");
        match command {
            SessionCommand::Connect => session.connect(),

            SessionCommand::Disconnect => session.disconnect(),

            SessionCommand::TriggerClientEvent { reply } => {
                let outcome = session.trigger_client_event();
                if let Err(e) = &outcome {
                    warn!(error = %e, "Client event not sent");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }

            SessionCommand::Shutdown => {
                debug!("Shutdown command received");
                break;
            }
        }
    }

    command_rx.close();
    session.close();
    debug!("Session command loop stopped");
    session
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use crate::config::SessionConfig;
    use crate::library::SimulatedLibrary;
    use crate::session::MemorySurface;
    use crate::version::Version;

    type Spawned = (Arc<SimulatedLibrary>, MemorySurface, SessionHandle, JoinHandle<Session>);

    fn spawn(version: Version) -> Spawned {
        let library = Arc::new(SimulatedLibrary::new(version).with_default_transports());
        let surface = MemorySurface::standard();
        let config = SessionConfig::new("k").with_name("n").with_transport("ws");
        let session = Session::start(config, library.clone(), surface.surface()).expect("start");
        let (handle, task) = session.spawn();
        (library, surface, handle, task)
    }

    #[tokio::test]
    async fn test_commands_processed_in_order() {
        let (library, surface, handle, task) = spawn(Version::new(2, 0, 0));

        assert_ok!(handle.connect());
        assert_ok!(handle.disconnect());
        assert_ok!(handle.connect());
        assert_ok!(handle.shutdown());

        let session = task.await.expect("join");
        assert!(session.is_closed());
        assert_eq!(library.client().expect("client").state(), "connected");
        assert_eq!(
            surface.status.history(),
            vec!["connecting", "connected", "disconnected", "connecting", "connected"]
        );
    }

    #[tokio::test]
    async fn test_trigger_reply() {
        let (library, _surface, handle, task) = spawn(Version::new(2, 0, 0));

        assert!(handle.trigger_client_event().await.expect("trigger"));
        let channel = library
            .client()
            .expect("client")
            .channel("presence-channel")
            .expect("channel");
        assert_eq!(channel.triggered().len(), 1);

        handle.shutdown().expect("shutdown");
        task.await.expect("join");
    }

    #[tokio::test]
    async fn test_trigger_error_reported_on_legacy() {
        let (_library, _surface, handle, task) = spawn(Version::new(1, 3, 0));

        let outcome = handle.trigger_client_event().await;
        assert!(matches!(outcome, Err(Error::NoChannel)));

        handle.shutdown().expect("shutdown");
        task.await.expect("join");
    }

    #[tokio::test]
    async fn test_commands_after_shutdown_fail() {
        let (_library, _surface, handle, task) = spawn(Version::new(2, 0, 0));

        handle.shutdown().expect("shutdown");
        let session = task.await.expect("join");

        assert!(handle.is_closed());
        assert_err!(handle.disconnect());
        assert!(matches!(handle.connect(), Err(Error::SessionClosed)));
        assert!(matches!(
            handle.trigger_client_event().await,
            Err(Error::SessionClosed)
        ));
        assert_eq!(session.bus().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_loop_stops_when_handles_dropped() {
        let (_library, _surface, handle, task) = spawn(Version::new(2, 0, 0));

        drop(handle);
        let session = task.await.expect("join");
        assert!(session.is_closed());
    }
}
