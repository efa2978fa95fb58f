// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The connected-shell surface the exec loop drives.
//!
//! A link owns the write half of the shell and a bounded queue fed by a
//! background reader task. The reader is the only producer and the owning
//! host loop the only consumer.

use crate::error::CollectError;
use async_trait::async_trait;
use picket_core::{Credential, HostProtocol};
use russh::client::{self, Handle};
use russh::{ChannelStream, Disconnect, Pty};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Reader chunk size in bytes.
pub const READ_CHUNK: usize = 512;
/// Bounded queue depth between the reader task and the exec loop.
pub const READER_QUEUE_CHUNKS: usize = 1024;

/// An established interactive shell.
#[async_trait]
pub trait ShellLink: Send + Sync {
    async fn write(&mut self, data: &[u8]) -> Result<(), CollectError>;

    /// Pop one queued output chunk without waiting.
    fn try_read(&mut self) -> Option<Vec<u8>>;

    async fn close(&mut self);

    /// Drop everything queued so a new command starts from a clean buffer.
    fn clear(&mut self) {
        while self.try_read().is_some() {}
    }
}

/// Accepts any server key; device fleets are addressed by inventory, not
/// by pinned host keys.
struct AcceptAll;

#[async_trait]
impl client::Handler for AcceptAll {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// [`ShellLink`] over a russh session with a PTY-backed shell.
pub struct RusshLink {
    session: Handle<AcceptAll>,
    writer: WriteHalf<ChannelStream<client::Msg>>,
    chunks: mpsc::Receiver<Vec<u8>>,
    running: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl RusshLink {
    /// Dial, authenticate, open a shell, and start the reader task.
    pub async fn connect(config: &HostProtocol, cred: &Credential) -> Result<Self, CollectError> {
        let target = format!("{}:{}", config.addr, config.port);
        let ssh_config = Arc::new(client::Config::default());
        let mut session = client::connect(ssh_config, (config.addr.as_str(), config.port), AcceptAll)
            .await
            .map_err(|e| CollectError::Io(format!("ssh {target}: dial: {e}")))?;

        let authed = session
            .authenticate_password(&cred.user, &cred.secret)
            .await
            .map_err(|e| CollectError::Io(format!("ssh {target}: auth: {e}")))?;
        if !authed {
            return Err(CollectError::Protocol(format!("ssh {target}: authentication rejected")));
        }

        let channel = session
            .channel_open_session()
            .await
            .map_err(|e| CollectError::Io(format!("ssh {target}: session: {e}")))?;

        if let Some(terminal) = &config.terminal {
            // Echo and output-CRNL translation off so frames carry only
            // device output.
            channel
                .request_pty(false, terminal, 0, 0, 0, 0, &[(Pty::ECHO, 0), (Pty::ONLCR, 0)])
                .await
                .map_err(|e| CollectError::Io(format!("ssh {target}: pty: {e}")))?;
        }
        channel
            .request_shell(false)
            .await
            .map_err(|e| CollectError::Io(format!("ssh {target}: shell: {e}")))?;

        let (read_half, writer) = tokio::io::split(channel.into_stream());
        let (tx, chunks) = mpsc::channel(READER_QUEUE_CHUNKS);
        let running = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(read_half, tx, Arc::clone(&running)));

        Ok(Self { session, writer, chunks, running, reader })
    }
}

async fn read_loop(
    mut read_half: ReadHalf<ChannelStream<client::Msg>>,
    tx: mpsc::Sender<Vec<u8>>,
    running: Arc<AtomicBool>,
) {
    let mut buf = [0u8; READ_CHUNK];
    while running.load(Ordering::SeqCst) {
        match read_half.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl ShellLink for RusshLink {
    async fn write(&mut self, data: &[u8]) -> Result<(), CollectError> {
        self.writer
            .write_all(data)
            .await
            .map_err(|e| CollectError::Io(format!("ssh write: {e}")))?;
        self.writer.flush().await.map_err(|e| CollectError::Io(format!("ssh flush: {e}")))
    }

    fn try_read(&mut self) -> Option<Vec<u8>> {
        self.chunks.try_recv().ok()
    }

    async fn close(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.writer.shutdown().await;
        self.reader.abort();
        let _ = self
            .session
            .disconnect(Disconnect::ByApplication, "collection finished", "en")
            .await;
    }
}
