//! The chat session: four workers, two queues, one socket.
//!
//! A session owns a bound UDP socket and the address of the peer. Running it
//! spawns the four worker tasks of the pipeline:
//!
//! - the **keyboard reader** turns console lines into messages on the send
//!   queue;
//! - the **network sender** drains the send queue into datagrams;
//! - the **network receiver** turns datagrams into messages on the receive
//!   queue;
//! - the **screen printer** drains the receive queue onto the console.
//!
//! Both queues draw from one shared arena, so the per-process message
//! capacity is a single pool no matter which direction is busier.
//!
//! Every worker pairs its blocking point with the shutdown signal in a
//! `select!`. When either consumer meets the sentinel it fires the signal,
//! the other three workers fall out of their loops at their next suspension
//! point, and the session joins them and tears the queues down.

use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{lookup_host, UdpSocket},
    select,
};
use tracing::{debug, info, warn};

use crate::{
    arena::Arena,
    message::{clamp_line, decode_datagram, is_sentinel, MSG_MAX_LEN, SHUTDOWN_SENTINEL},
    queue::{MessageQueue, SharedArena},
    shutdown::{ShutdownController, ShutdownSignal},
};

/// Pool sizes fixed at session start, shared by both queues.
const LIST_POOL_CAPACITY: usize = 10;
const NODE_POOL_CAPACITY: usize = 100;

type Queue = Arc<MessageQueue<String>>;

/// Where to bind and who to talk to.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local UDP port; 0 asks the OS for an ephemeral one.
    pub local_port: u16,
    /// Peer host name or address.
    pub peer_host: String,
    /// Peer UDP port.
    pub peer_port: u16,
}

/// A bound, peer-resolved chat endpoint, ready to run.
pub struct Session {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl Session {
    /// Resolves the peer and binds the local socket. Both failures are
    /// setup errors and abort the program.
    pub async fn bind(config: &SessionConfig) -> Result<Self> {
        let peer = resolve_peer(&config.peer_host, config.peer_port).await?;
        let bind_addr: SocketAddr = if peer.is_ipv6() {
            (Ipv6Addr::UNSPECIFIED, config.local_port).into()
        } else {
            (Ipv4Addr::UNSPECIFIED, config.local_port).into()
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind UDP port {}", config.local_port))?;
        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    /// Builds a session from an already-bound socket. Tests use this to
    /// wire two endpoints whose ports are only known after binding.
    pub fn from_socket(socket: UdpSocket, peer: SocketAddr) -> Self {
        Self {
            socket: Arc::new(socket),
            peer,
        }
    }

    /// The locally bound address; the port is the interesting part when the
    /// configuration asked for port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Runs the session against the real console.
    pub async fn run(self) -> Result<()> {
        self.run_with_console(tokio::io::stdin(), tokio::io::stdout())
            .await
    }

    /// Runs the session against arbitrary console streams. Tests drive this
    /// with in-memory pipes; [`Session::run`] passes stdin and stdout.
    pub async fn run_with_console<R, W>(self, input: R, output: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let arena: SharedArena<String> = Arc::new(Mutex::new(Arena::new(
            LIST_POOL_CAPACITY,
            NODE_POOL_CAPACITY,
        )));
        let outgoing: Queue = Arc::new(
            MessageQueue::new(Arc::clone(&arena)).context("failed to create the send queue")?,
        );
        let incoming: Queue = Arc::new(
            MessageQueue::new(Arc::clone(&arena)).context("failed to create the receive queue")?,
        );
        let control = ShutdownController::new();

        let keyboard = tokio::spawn(read_keyboard(
            input,
            Arc::clone(&outgoing),
            control.signal(),
        ));
        let sender = tokio::spawn(send_to_peer(
            Arc::clone(&self.socket),
            self.peer,
            Arc::clone(&outgoing),
            control.clone(),
            control.signal(),
        ));
        let receiver = tokio::spawn(receive_from_peer(
            Arc::clone(&self.socket),
            Arc::clone(&incoming),
            control.signal(),
        ));
        let printer = tokio::spawn(print_messages(
            output,
            Arc::clone(&incoming),
            control.clone(),
            control.signal(),
        ));

        control.triggered().await;
        debug!("termination signal observed; joining workers");

        for (name, task) in [
            ("keyboard", keyboard),
            ("sender", sender),
            ("receiver", receiver),
            ("printer", printer),
        ] {
            if let Err(error) = task.await {
                warn!(worker = name, %error, "worker did not shut down cleanly");
            }
        }

        teardown_queue("send", outgoing);
        teardown_queue("receive", incoming);
        Ok(())
    }
}

/// Returns a queue's list and any undelivered messages to the arena. Runs
/// after the workers are joined, so the session should hold the last handle.
fn teardown_queue(name: &str, queue: Queue) {
    match Arc::into_inner(queue) {
        Some(queue) => {
            let mut undelivered = 0usize;
            queue.shutdown(&mut |_message: String| undelivered += 1);
            if undelivered > 0 {
                debug!(queue = name, undelivered, "discarded undelivered messages");
            }
        }
        None => warn!(queue = name, "queue still shared at teardown"),
    }
}

/// Producer: console lines onto the send queue. Exits after queueing the
/// sentinel, whether the user typed it or closed the console.
async fn read_keyboard<R>(input: R, queue: Queue, mut shutdown: ShutdownSignal)
where
    R: AsyncRead + Unpin,
{
    let mut input = BufReader::new(input);
    let mut line = String::new();
    loop {
        line.clear();
        let read = select! {
            _ = shutdown.cancelled() => break,
            read = input.read_line(&mut line) => read,
        };
        match read {
            Ok(0) => {
                // Console closed: hang up as if the user typed the sentinel.
                push_or_report(&queue, SHUTDOWN_SENTINEL.to_string());
                break;
            }
            Ok(_) => {
                let message = clamp_line(std::mem::take(&mut line));
                let hang_up = is_sentinel(&message);
                push_or_report(&queue, message);
                if hang_up {
                    break;
                }
            }
            Err(error) => warn!(%error, "failed to read console input"),
        }
    }
    debug!("keyboard reader finished");
}

/// Consumer: send queue onto the wire. The sentinel is still transmitted so
/// the peer learns about the hang-up, then this side terminates.
async fn send_to_peer(
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    queue: Queue,
    control: ShutdownController,
    mut shutdown: ShutdownSignal,
) {
    loop {
        let message = select! {
            _ = shutdown.cancelled() => break,
            popped = queue.pop() => match popped {
                Some(message) => message,
                None => break,
            },
        };
        if let Err(error) = socket.send_to(message.as_bytes(), peer).await {
            warn!(%error, "failed to send message to peer");
        }
        if is_sentinel(&message) {
            if control.trigger() {
                info!("hung up; goodbye sent to peer");
            }
            break;
        }
    }
    debug!("network sender finished");
}

/// Producer: datagrams onto the receive queue. Exits after queueing the
/// sentinel; the printer takes the session down from there.
async fn receive_from_peer(socket: Arc<UdpSocket>, queue: Queue, mut shutdown: ShutdownSignal) {
    let mut payload = [0u8; MSG_MAX_LEN];
    loop {
        let received = select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut payload) => received,
        };
        match received {
            Ok((len, _peer)) => {
                let message = decode_datagram(&payload[..len]);
                let hang_up = is_sentinel(&message);
                push_or_report(&queue, message);
                if hang_up {
                    break;
                }
            }
            Err(error) => warn!(%error, "failed to receive from peer"),
        }
    }
    debug!("network receiver finished");
}

/// Consumer: receive queue onto the console. The sentinel itself is not
/// displayed; it terminates the session instead.
async fn print_messages<W>(
    output: W,
    queue: Queue,
    control: ShutdownController,
    mut shutdown: ShutdownSignal,
) where
    W: AsyncWrite + Unpin,
{
    let mut output = output;
    loop {
        let message = select! {
            _ = shutdown.cancelled() => break,
            popped = queue.pop() => match popped {
                Some(message) => message,
                None => break,
            },
        };
        if is_sentinel(&message) {
            if control.trigger() {
                info!("peer hung up");
            }
            break;
        }
        if let Err(error) = write_message(&mut output, &message).await {
            warn!(%error, "failed to display message");
        }
    }
    if let Err(error) = write_message(&mut output, "\nPROGRAM TERMINATED\n").await {
        warn!(%error, "failed to display termination notice");
    }
    debug!("screen printer finished");
}

/// Display failures are reported but never fatal.
async fn write_message<W>(output: &mut W, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(message.as_bytes()).await?;
    output.flush().await
}

fn push_or_report(queue: &MessageQueue<String>, message: String) {
    if let Err(rejected) = queue.push(message) {
        warn!(
            bytes = rejected.into_inner().len(),
            "message pool exhausted; dropping message"
        );
    }
}

/// Picks the first IPv4 address the peer name resolves to, falling back to
/// whatever came first.
async fn resolve_peer(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve peer host '{host}'"))?
        .collect();
    addrs
        .iter()
        .copied()
        .find(SocketAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .with_context(|| format!("peer host '{host}' resolved to no addresses"))
}
