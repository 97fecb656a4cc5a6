//! Anonymous FTP sessions over tokio TCP streams.
//!
//! Only what a download needs is spoken: login, binary type, `SIZE`, passive
//! mode and `RETR`. The data connection always goes to the control
//! connection's peer address; the address inside the `227` reply is ignored
//! because archive servers behind NAT often advertise a private one.
//!
//! ```rust,no_run
//! use srafetch::session::{Connector, FtpConnector};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), srafetch::Error> {
//! let connector = FtpConnector::new();
//! let mut session = connector.open("ftp.sra.ebi.ac.uk", Duration::from_secs(5)).await?;
//! let size = session.size("vol1/fastq/SRR000/SRR000001/SRR000001_1.fastq.gz").await?;
//! println!("{} bytes", size);
//! session.close().await;
//! # Ok(())
//! # }
//! ```

use super::reply::{self, Reply};
use super::{Connector, DataStream, TransferSession};
use crate::error::{Error, Result};

use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default FTP control port.
pub const DEFAULT_PORT: u16 = 21;
/// User name and password used for every login.
pub const ANONYMOUS: &str = "anonymous";

/// Opens anonymous FTP sessions.
#[derive(Debug, Clone)]
pub struct FtpConnector {
    port: u16,
}

impl Default for FtpConnector {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl FtpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a control port other than 21.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl Connector for FtpConnector {
    async fn open(&self, server: &str, connect_timeout: Duration) -> Result<Box<dyn TransferSession>> {
        let session = FtpSession::connect(server, self.port, connect_timeout).await?;
        Ok(Box::new(session))
    }
}

/// One FTP control connection.
pub struct FtpSession {
    server: String,
    control: BufReader<TcpStream>,
    peer: IpAddr,
    connect_timeout: Duration,
    /// A `RETR` was accepted and its final reply has not been read yet.
    transfer_pending: bool,
}

impl FtpSession {
    /// Dial, read the greeting, log in anonymously and switch to binary mode.
    pub async fn connect(server: &str, port: u16, connect_timeout: Duration) -> Result<Self> {
        let connect_error = |reason: String| Error::Connect {
            server: server.to_string(),
            reason,
        };

        debug!("Connecting to {}:{}", server, port);
        let stream = match timeout(connect_timeout, TcpStream::connect((server, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(connect_error(e.to_string())),
            Err(_) => {
                return Err(connect_error(format!(
                    "timed out after {:?}",
                    connect_timeout
                )))
            }
        };
        let peer = stream
            .peer_addr()
            .map_err(|e| connect_error(e.to_string()))?
            .ip();

        let mut session = FtpSession {
            server: server.to_string(),
            control: BufReader::new(stream),
            peer,
            connect_timeout,
            transfer_pending: false,
        };

        let greeting = match timeout(connect_timeout, session.read_reply()).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return Err(connect_error(e.to_string())),
            Err(_) => return Err(connect_error("no greeting from server".into())),
        };
        if greeting.code != 220 {
            return Err(connect_error(format!("unexpected greeting: {}", greeting)));
        }

        session.login().await?;

        let reply = session
            .command("TYPE I")
            .await
            .map_err(|e| connect_error(e.to_string()))?;
        if !reply.is_completion() {
            return Err(connect_error(format!("binary mode refused: {}", reply)));
        }

        Ok(session)
    }

    async fn login(&mut self) -> Result<()> {
        let auth_error = |server: &str, reason: String| Error::Auth {
            server: server.to_string(),
            reason,
        };

        let reply = self
            .command(&format!("USER {}", ANONYMOUS))
            .await
            .map_err(|e| auth_error(&self.server, e.to_string()))?;
        let reply = if reply.is_intermediate() {
            self.command(&format!("PASS {}", ANONYMOUS))
                .await
                .map_err(|e| auth_error(&self.server, e.to_string()))?
        } else {
            reply
        };

        if reply.is_completion() {
            debug!("Logged in to {}", self.server);
            Ok(())
        } else {
            Err(auth_error(&self.server, reply.to_string()))
        }
    }

    async fn read_reply(&mut self) -> io::Result<Reply> {
        let reply = reply::read_reply(&mut self.control).await?;
        debug!("{} <- {}", self.server, reply);
        Ok(reply)
    }

    async fn command(&mut self, command: &str) -> io::Result<Reply> {
        if command.starts_with("PASS ") {
            debug!("{} -> PASS ****", self.server);
        } else {
            debug!("{} -> {}", self.server, command);
        }
        let stream = self.control.get_mut();
        stream.write_all(command.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        stream.flush().await?;
        self.read_reply().await
    }

    /// Ask for a passive data endpoint and connect to it.
    async fn open_data_connection(&mut self) -> io::Result<TcpStream> {
        let reply = self.command("PASV").await?;
        if reply.code != 227 {
            return Err(io::Error::other(format!("passive mode refused: {}", reply)));
        }
        let (_, port) = reply::parse_pasv(&reply.message).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("cannot parse passive reply: {}", reply),
            )
        })?;

        let address = SocketAddr::new(self.peer, port);
        match timeout(self.connect_timeout, TcpStream::connect(address)).await {
            Ok(stream) => stream,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("data connection to {} timed out", address),
            )),
        }
    }
}

#[async_trait]
impl TransferSession for FtpSession {
    async fn size(&mut self, path: &str) -> Result<u64> {
        let size_error = |reason: String| Error::SizeQuery {
            path: path.to_string(),
            reason,
        };

        let reply = self
            .command(&format!("SIZE {}", path))
            .await
            .map_err(|e| size_error(e.to_string()))?;
        if reply.code != 213 {
            return Err(size_error(reply.to_string()));
        }
        reply
            .message
            .trim()
            .parse::<u64>()
            .map_err(|_| size_error(format!("not a size: {}", reply)))
    }

    async fn retrieve(&mut self, path: &str) -> Result<DataStream> {
        let retrieve_error = |reason: String| Error::Retrieve {
            path: path.to_string(),
            reason,
        };

        let data = self
            .open_data_connection()
            .await
            .map_err(|e| retrieve_error(e.to_string()))?;
        let reply = self
            .command(&format!("RETR {}", path))
            .await
            .map_err(|e| retrieve_error(e.to_string()))?;
        if !reply.is_preliminary() {
            return Err(retrieve_error(reply.to_string()));
        }

        self.transfer_pending = true;
        Ok(Box::new(data))
    }

    async fn finish_retrieve(&mut self) -> Result<()> {
        if !self.transfer_pending {
            return Ok(());
        }
        self.transfer_pending = false;

        let reply = self.read_reply().await.map_err(Error::Stream)?;
        if reply.is_completion() {
            Ok(())
        } else {
            Err(Error::Stream(io::Error::other(format!(
                "server aborted the transfer: {}",
                reply
            ))))
        }
    }

    async fn close(&mut self) {
        let limit = self.connect_timeout;
        let quit = async {
            if self.transfer_pending {
                self.transfer_pending = false;
                self.read_reply().await?;
            }
            self.command("QUIT").await?;
            self.control.get_mut().shutdown().await
        };
        let outcome = timeout(limit, quit).await;

        match outcome {
            Ok(Ok(())) => debug!("Closed session with {}", self.server),
            Ok(Err(e)) => debug!("Closing session with {} failed: {}", self.server, e),
            Err(_) => debug!("Closing session with {} timed out", self.server),
        }
    }
}
