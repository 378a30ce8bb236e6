//! CRLF line framing with `{n}` literals.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::MailError;

const DEFAULT_BUFFER_SIZE: usize = 8192;

const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest message we are willing to buffer.
const MAX_LITERAL_SIZE: usize = 64 * 1024 * 1024;

/// One server response. `segments[i]` is a CRLF-terminated text run and,
/// when it announced one, is followed by `literals[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub segments: Vec<Vec<u8>>,
    pub literals: Vec<Vec<u8>>,
}

impl Response {
    pub fn first_line(&self) -> &[u8] {
        self.segments.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_tagged(&self, tag: &str) -> bool {
        let line = self.first_line();
        line.starts_with(tag.as_bytes()) && line.get(tag.len()) == Some(&b' ')
    }
}

pub struct FramedStream<S> {
    reader: BufReader<S>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
        }
    }

    /// Read one complete response, following any literals it announces.
    pub async fn read_response(&mut self) -> Result<Response, MailError> {
        let mut response = Response::default();
        loop {
            let line = self.read_line().await?;
            let literal_len = parse_literal_length(&line);
            response.segments.push(line);

            let Some(literal_len) = literal_len else {
                break;
            };
            if literal_len > MAX_LITERAL_SIZE {
                return Err(MailError::Protocol(format!(
                    "literal too large: {literal_len} bytes (max {MAX_LITERAL_SIZE})"
                )));
            }
            let mut literal = vec![0u8; literal_len];
            self.reader.read_exact(&mut literal).await?;
            response.literals.push(literal);
        }
        Ok(response)
    }

    async fn read_line(&mut self) -> Result<Vec<u8>, MailError> {
        let mut line = Vec::new();
        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                return Err(MailError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )));
            }

            // A CR may end one buffer and its LF start the next.
            let search_from = usize::from(line.last() == Some(&b'\r') && buf[0] == b'\n');
            if search_from == 1 {
                line.push(b'\n');
                self.reader.consume(1);
                break;
            }
            if let Some(pos) = find_crlf(buf) {
                line.extend_from_slice(&buf[..pos + 2]);
                self.reader.consume(pos + 2);
                break;
            }

            let len = buf.len();
            line.extend_from_slice(buf);
            self.reader.consume(len);

            if line.len() > MAX_LINE_LENGTH {
                return Err(MailError::Protocol("line too long".to_string()));
            }
        }
        Ok(line)
    }

    pub async fn write_command(&mut self, data: &[u8]) -> Result<(), MailError> {
        let stream = self.reader.get_mut();
        stream.write_all(data).await?;
        stream.flush().await?;
        Ok(())
    }

    pub fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Length announced by a trailing `{123}` or `{123+}`.
pub fn parse_literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?;
    let line = line.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);
    let open = line.iter().rposition(|&b| b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
