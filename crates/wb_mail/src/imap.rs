//! The handful of IMAP4rev1 commands the reading-list bot issues.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::error::MailError;
use crate::framed::{FramedStream, Response};
use crate::mailbox::FetchedMessage;

pub struct ImapSession<S> {
    framed: FramedStream<S>,
    next_tag: u32,
}

impl<S> ImapSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a connected stream and consume the server greeting.
    pub async fn start(stream: S) -> Result<Self, MailError> {
        let mut framed = FramedStream::new(stream);
        let greeting = framed.read_response().await?;
        let line = String::from_utf8_lossy(greeting.first_line()).into_owned();
        if !line.starts_with("* OK") && !line.starts_with("* PREAUTH") {
            return Err(MailError::Protocol(format!(
                "unexpected greeting: {}",
                line.trim_end()
            )));
        }
        Ok(Self { framed, next_tag: 0 })
    }

    /// Send `command` and collect untagged responses up to its tagged
    /// completion. `NO` and `BAD` become [`MailError::Command`].
    pub async fn run(&mut self, command: &str) -> Result<Vec<Response>, MailError> {
        self.next_tag += 1;
        let tag = format!("A{:04}", self.next_tag);
        trace!(%tag, command = redact(command), "IMAP command");
        self.framed
            .write_command(format!("{tag} {command}\r\n").as_bytes())
            .await?;

        let mut untagged = Vec::new();
        loop {
            let response = self.framed.read_response().await?;
            if !response.is_tagged(&tag) {
                if response.first_line().starts_with(b"* BYE") {
                    return Err(MailError::Command {
                        text: line_text(&response),
                    });
                }
                untagged.push(response);
                continue;
            }
            let status = line_text(&response);
            let status = status[tag.len()..].trim_start().to_string();
            if status.starts_with("OK") {
                return Ok(untagged);
            }
            return Err(MailError::Command { text: status });
        }
    }

    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), MailError> {
        self.run(&format!("LOGIN {} {}", quote(user), quote(password)))
            .await?;
        Ok(())
    }

    /// Select `mailbox` and return its message count.
    pub async fn select(&mut self, mailbox: &str) -> Result<u32, MailError> {
        let responses = self.run(&format!("SELECT {}", quote(mailbox))).await?;
        let exists = responses
            .iter()
            .find_map(|r| parse_exists(&line_text(r)))
            .unwrap_or(0);
        debug!(mailbox, exists, "Mailbox selected");
        Ok(exists)
    }

    /// `FETCH 1:* (UID RFC822)` on the selected mailbox.
    pub async fn fetch_all(&mut self) -> Result<Vec<FetchedMessage>, MailError> {
        let responses = self.run("FETCH 1:* (UID RFC822)").await?;
        let mut messages = Vec::new();
        for response in responses {
            if let Some(message) = parse_fetch(response)? {
                messages.push(message);
            }
        }
        Ok(messages)
    }

    pub async fn uid_store_deleted(&mut self, uid: u32) -> Result<(), MailError> {
        self.run(&format!("UID STORE {uid} +FLAGS (\\Deleted)"))
            .await?;
        Ok(())
    }

    pub async fn expunge(&mut self) -> Result<(), MailError> {
        self.run("EXPUNGE").await?;
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), MailError> {
        // The server answers with BYE before the tagged OK.
        match self.run("LOGOUT").await {
            Ok(_) => Ok(()),
            Err(MailError::Command { text }) if text.starts_with("* BYE") => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn line_text(response: &Response) -> String {
    String::from_utf8_lossy(response.first_line())
        .trim_end()
        .to_string()
}

/// IMAP quoted string.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Keep passwords out of traces.
fn redact(command: &str) -> &str {
    if command.starts_with("LOGIN ") {
        "LOGIN [REDACTED]"
    } else {
        command
    }
}

/// `* 12 EXISTS`
fn parse_exists(line: &str) -> Option<u32> {
    let mut words = line.strip_prefix("* ")?.split_whitespace();
    let count = words.next()?.parse().ok()?;
    words
        .next()
        .filter(|w| w.eq_ignore_ascii_case("EXISTS"))
        .map(|_| count)
}

/// Decode `* n FETCH (UID u RFC822 {len}` + literal + `)`. Untagged
/// responses that are not FETCH yield `None`.
fn parse_fetch(response: Response) -> Result<Option<FetchedMessage>, MailError> {
    let header = line_text(&response);
    let mut words = header.split_whitespace();
    let (Some("*"), Some(_seq), Some(kind)) = (words.next(), words.next(), words.next()) else {
        return Ok(None);
    };
    if !kind.eq_ignore_ascii_case("FETCH") {
        return Ok(None);
    }

    let rest: Vec<&str> = words.collect();
    let [uid_key, uid, body_key, literal] = rest.as_slice() else {
        return Err(MailError::Protocol(format!("unexpected FETCH header: {header}")));
    };
    if !uid_key.eq_ignore_ascii_case("(UID") || !body_key.eq_ignore_ascii_case("RFC822") {
        return Err(MailError::Protocol(format!("unexpected FETCH header: {header}")));
    }
    let uid: u32 = uid
        .parse()
        .map_err(|_| MailError::Protocol(format!("bad UID in FETCH header: {header}")))?;

    let Response { segments, literals } = response;
    let [raw] = <[Vec<u8>; 1]>::try_from(literals)
        .map_err(|_| MailError::Protocol(format!("expected one literal for UID {uid}")))?;

    let announced = literal
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_end_matches('+');
    if announced.parse::<usize>().ok() != Some(raw.len()) {
        return Err(MailError::Protocol(format!(
            "literal length mismatch for UID {uid}: announced {literal}, got {}",
            raw.len()
        )));
    }

    match segments.get(1).map(Vec::as_slice) {
        Some(b")\r\n") => Ok(Some(FetchedMessage { uid, raw })),
        other => Err(MailError::Protocol(format!(
            "unexpected data after message UID {uid}: {:?}",
            other.map(String::from_utf8_lossy)
        ))),
    }
}
