//! A small anonymous FTP server running inside the test process.
//!
//! Speaks just enough of the protocol for the client: USER, PASS, TYPE,
//! SIZE, PASV, RETR and QUIT. Passive listeners bind to 127.0.0.1.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Behaviour switches of the mock server.
#[derive(Debug, Clone, Default)]
pub struct MockFtpOptions {
    /// Answer PASS with 530.
    pub reject_login: bool,
    /// Answer SIZE with 502.
    pub size_unsupported: bool,
    /// Send only this many bytes of each file, then abort with 426.
    pub fail_after: Option<usize>,
    /// Pause before sending each file's bytes.
    pub latency: Duration,
}

#[derive(Default)]
struct Counters {
    active: AtomicUsize,
    max_active: AtomicUsize,
    sessions: AtomicUsize,
    retrievals: AtomicUsize,
}

impl Counters {
    fn enter(&self) {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct MockFtpServer {
    addr: SocketAddr,
    counters: Arc<Counters>,
    handle: JoinHandle<()>,
}

impl MockFtpServer {
    /// Serve `files`, keyed by path without a leading slash.
    pub async fn start(files: HashMap<String, Vec<u8>>, options: MockFtpOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock FTP server");
        let addr = listener.local_addr().expect("Failed to get local address");
        let counters = Arc::new(Counters::default());
        let files = Arc::new(files);

        let shared = counters.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                shared.enter();
                let session = Session {
                    files: files.clone(),
                    options: options.clone(),
                    counters: shared.clone(),
                };
                tokio::spawn(session.serve(stream));
            }
        });

        Self {
            addr,
            counters,
            handle,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Highest number of control connections open at the same time.
    pub fn max_concurrent_sessions(&self) -> usize {
        self.counters.max_active.load(Ordering::SeqCst)
    }

    /// Number of control connections accepted so far.
    pub fn sessions(&self) -> usize {
        self.counters.sessions.load(Ordering::SeqCst)
    }

    /// Number of RETR commands that started sending data.
    pub fn retrievals(&self) -> usize {
        self.counters.retrievals.load(Ordering::SeqCst)
    }
}

impl Drop for MockFtpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Session {
    files: Arc<HashMap<String, Vec<u8>>>,
    options: MockFtpOptions,
    counters: Arc<Counters>,
}

async fn reply(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

impl Session {
    async fn serve(self, stream: TcpStream) {
        let mut left = false;
        let _ = self.converse(stream, &mut left).await;
        if !left {
            self.counters.leave();
        }
    }

    async fn converse(&self, stream: TcpStream, left: &mut bool) -> std::io::Result<()> {
        let (read, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read);
        let mut passive: Option<TcpListener> = None;

        reply(&mut writer, "220 mock ftp ready").await?;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }
            let trimmed = line.trim_end();
            let (verb, arg) = match trimmed.split_once(' ') {
                Some((verb, arg)) => (verb.to_ascii_uppercase(), arg.to_string()),
                None => (trimmed.to_ascii_uppercase(), String::new()),
            };

            match verb.as_str() {
                "USER" => reply(&mut writer, "331 password required").await?,
                "PASS" if self.options.reject_login => {
                    reply(&mut writer, "530 login incorrect").await?
                }
                "PASS" => reply(&mut writer, "230 logged in").await?,
                "TYPE" => reply(&mut writer, "200 type set to I").await?,
                "SIZE" if self.options.size_unsupported => {
                    reply(&mut writer, "502 command not implemented").await?
                }
                "SIZE" => match self.files.get(arg.as_str()) {
                    Some(data) => reply(&mut writer, &format!("213 {}", data.len())).await?,
                    None => reply(&mut writer, "550 no such file").await?,
                },
                "PASV" => {
                    let listener = TcpListener::bind("127.0.0.1:0").await?;
                    let port = listener.local_addr()?.port();
                    passive = Some(listener);
                    let message = format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{})",
                        port >> 8,
                        port & 0xff
                    );
                    reply(&mut writer, &message).await?;
                }
                "RETR" => {
                    let Some(listener) = passive.take() else {
                        reply(&mut writer, "425 use PASV first").await?;
                        continue;
                    };
                    let Some(data) = self.files.get(arg.as_str()) else {
                        reply(&mut writer, "550 no such file").await?;
                        continue;
                    };
                    reply(&mut writer, "150 opening binary mode data connection").await?;
                    let (mut data_stream, _) = listener.accept().await?;
                    self.counters.retrievals.fetch_add(1, Ordering::SeqCst);
                    if !self.options.latency.is_zero() {
                        tokio::time::sleep(self.options.latency).await;
                    }

                    match self.options.fail_after {
                        Some(limit) => {
                            let limit = limit.min(data.len());
                            data_stream.write_all(&data[..limit]).await?;
                            data_stream.shutdown().await?;
                            drop(data_stream);
                            reply(&mut writer, "426 connection closed; transfer aborted").await?;
                        }
                        None => {
                            for chunk in data.chunks(16 * 1024) {
                                data_stream.write_all(chunk).await?;
                            }
                            data_stream.shutdown().await?;
                            drop(data_stream);
                            reply(&mut writer, "226 transfer complete").await?;
                        }
                    }
                }
                "QUIT" => {
                    // Counted out before answering, so a client that already
                    // got 221 never sees this session as open.
                    *left = true;
                    self.counters.leave();
                    reply(&mut writer, "221 bye").await?;
                    return Ok(());
                }
                _ => reply(&mut writer, "502 command not implemented").await?,
            }
        }
    }
}
