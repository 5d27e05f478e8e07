//! TCP server for the duel
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking; every coordinator call runs under one
//! async mutex so pairing, moves and cleanup never interleave.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::core::{Connection, Notice, SessionCoordinator};
use crate::protocol::{
    create_error, parse_request, ClientRequest, ErrorCode, ProtocolError, ServerMessage,
};
use crate::types::ParticipantId;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Fixed seed for participant codes and boards; randomly seeded when unset.
    pub seed: Option<u32>,
    /// Append every inbound and outbound line to this file.
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            seed: None,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    ///
    /// - `SLIDE_DUEL_HOST` (default "127.0.0.1")
    /// - `SLIDE_DUEL_PORT`, then `PORT` (default 3000)
    /// - `SLIDE_DUEL_SEED`
    /// - `SLIDE_DUEL_LOG_PATH`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let host = non_empty("SLIDE_DUEL_HOST").unwrap_or(defaults.host);
        let port = non_empty("SLIDE_DUEL_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let seed = non_empty("SLIDE_DUEL_SEED").and_then(|s| s.parse().ok());
        let log_path = non_empty("SLIDE_DUEL_LOG_PATH");

        Self {
            host,
            port,
            seed,
            log_path,
        }
    }
}

/// Handle to a connected client, stored in the coordinator.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    addr: SocketAddr,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ClientHandle {
    pub fn new(addr: SocketAddr, tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { addr, tx }
    }
}

impl Connection for ClientHandle {
    fn deliver(&self, notice: Notice) -> bool {
        if self.tx.send(notice.into()).is_err() {
            debug!(addr = %self.addr, "client channel closed, notice dropped");
            return false;
        }
        true
    }
}

/// The process-wide coordinator behind its single lock.
pub type SharedCoordinator = Arc<Mutex<SessionCoordinator<ClientHandle>>>;

#[derive(Debug, Clone)]
enum WireRecord {
    Bytes(Vec<u8>),
    Message(ServerMessage),
}

/// Fail fast if `host:port` cannot be bound.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(drop)
}

/// Start the TCP server
///
/// Only returns on a bind failure. When `ready_tx` is given, the bound
/// address is sent through it once the server accepts connections.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let coordinator = match config.seed {
        Some(seed) => SessionCoordinator::with_seed(seed),
        None => SessionCoordinator::new(),
    };
    run_server_with(config, coordinator, ready_tx).await
}

/// Same as [`run_server`] around a caller-built coordinator.
///
/// `config.seed` is ignored; the coordinator already owns its generators.
pub async fn run_server_with(
    config: ServerConfig,
    coordinator: SessionCoordinator<ClientHandle>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "duel server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let coordinator: SharedCoordinator = Arc::new(Mutex::new(coordinator));

    // Accept incoming connections
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        debug!(%addr, "connection accepted");

        let coordinator = Arc::clone(&coordinator);
        let wire_log_tx = wire_log_tx.clone();

        // Spawn task to handle this client
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, coordinator, wire_log_tx).await {
                warn!(%addr, error = %e, "client connection failed");
            }
        });
    }
}

fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(%path, error = %e, "wire log disabled");
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Some(rec) = rx.recv().await {
            buf.clear();
            match rec {
                WireRecord::Bytes(b) => buf.extend_from_slice(&b),
                WireRecord::Message(msg) => {
                    if serde_json::to_writer(&mut buf, &msg).is_err() {
                        continue;
                    }
                }
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() {
                break;
            }
        }

        let _ = file.flush().await;
    });
    tx
}

/// Handle a single client connection
///
/// The participant is always unregistered on the way out, whether the peer
/// closed the socket or the read failed.
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    coordinator: SharedCoordinator,
    wire_log_tx: Option<mpsc::UnboundedSender<WireRecord>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let participant = coordinator
        .lock()
        .await
        .register_connection(ClientHandle::new(addr, tx.clone()));

    let wire_log_tx_out = wire_log_tx.clone();

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(512);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
            if let Some(tx) = wire_log_tx_out.as_ref() {
                let _ = tx.send(WireRecord::Message(msg));
            }
        }
    });

    let result = read_requests(
        &mut reader,
        participant,
        &coordinator,
        &tx,
        wire_log_tx.as_ref(),
    )
    .await;

    coordinator.lock().await.handle_disconnect(participant);

    // The coordinator dropped its handle; dropping ours closes the writer.
    drop(tx);
    let _ = write_task.await;

    result
}

async fn read_requests(
    reader: &mut BufReader<OwnedReadHalf>,
    participant: ParticipantId,
    coordinator: &SharedCoordinator,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    wire_log_tx: Option<&mpsc::UnboundedSender<WireRecord>>,
) -> anyhow::Result<()> {
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    loop {
        buf.clear();
        let bytes_read = reader.read_until(b'\n', &mut buf).await?;

        if bytes_read == 0 {
            // Client disconnected
            return Ok(());
        }

        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        if let Some(tx) = wire_log_tx {
            let _ = tx.send(WireRecord::Bytes(buf.clone()));
        }

        // A bad line is answered, never fatal to the connection.
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                debug!(%participant, error = %e, "message rejected");
                let _ = tx.send(create_error(
                    ErrorCode::InvalidMessage,
                    "message is not valid UTF-8",
                ));
                continue;
            }
        };

        match parse_request(line) {
            Ok(request) => dispatch(coordinator, participant, request).await,
            Err(err @ ProtocolError::OutOfRange { .. }) => {
                debug!(%participant, error = %err, "move ignored");
            }
            Err(err) => {
                debug!(%participant, error = %err, "message rejected");
                if let Some(reply) = err.reply() {
                    let _ = tx.send(reply);
                }
            }
        }
    }
}

async fn dispatch(
    coordinator: &SharedCoordinator,
    participant: ParticipantId,
    request: ClientRequest,
) {
    let mut coord = coordinator.lock().await;
    match request {
        ClientRequest::Play(target) => {
            // Refusals were already sent to the requester.
            let _ = coord.request_pairing(participant, target);
        }
        ClientRequest::MoveTile(pos) => {
            coord.handle_move(participant, pos);
        }
        ClientRequest::TestWin => {
            coord.handle_win_probe(participant);
        }
    }
}
