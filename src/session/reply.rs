//! FTP control-channel replies.
//!
//! A reply is a three digit code followed by a message. Multi-line replies
//! start with `123-` and end with a line starting with `123 `.

use std::io;
use std::net::Ipv4Addr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// A complete control-channel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
}

impl Reply {
    /// 1xx: the action was started, expect another reply.
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// 2xx: the action completed.
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 3xx: more input is needed, e.g. a password.
    pub fn is_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Split a reply line into its code, whether more lines follow, and the text.
fn parse_line(line: &str) -> Option<(u16, bool, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let code = line.get(..3)?.parse::<u16>().ok()?;
    if !(100..600).contains(&code) {
        return None;
    }
    match line.as_bytes().get(3) {
        None => Some((code, false, "")),
        Some(b' ') => Some((code, false, &line[4..])),
        Some(b'-') => Some((code, true, &line[4..])),
        Some(_) => None,
    }
}

fn invalid(line: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed reply line: {:?}", line),
    )
}

async fn next_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<String> {
    let mut raw = Vec::new();
    let read = reader.read_until(b'\n', &mut raw).await?;
    if read == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "control connection closed",
        ));
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Read one full reply, joining continuation lines with `\n`.
pub async fn read_reply<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<Reply> {
    let first = next_line(reader).await?;
    let (code, mut more, text) = parse_line(&first).ok_or_else(|| invalid(&first))?;
    let mut message = text.to_string();

    while more {
        let line = next_line(reader).await?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        match parse_line(&line) {
            Some((end, false, text)) if end == code => {
                message.push('\n');
                message.push_str(text);
                more = false;
            }
            _ => {
                message.push('\n');
                message.push_str(trimmed);
            }
        }
    }

    Ok(Reply { code, message })
}

/// Extract the data endpoint from a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply.
pub fn parse_pasv(message: &str) -> Option<(Ipv4Addr, u16)> {
    let start = message.find('(')?;
    let end = message[start..].find(')')? + start;
    let numbers = message[start + 1..end]
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match numbers.as_slice() {
        [a, b, c, d, hi, lo] => Some((
            Ipv4Addr::new(*a, *b, *c, *d),
            (u16::from(*hi) << 8) | u16::from(*lo),
        )),
        _ => None,
    }
}
