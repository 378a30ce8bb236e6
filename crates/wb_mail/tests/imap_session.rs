//! `ImapMailbox` against an in-process IMAP server speaking plain TCP.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use wb_mail::error::MailError;
use wb_mail::mailbox::{ImapMailbox, Mailbox, MailboxConfig};

#[derive(Clone, Copy)]
enum Quirk {
    None,
    FetchFails,
    TrailingFlags,
}

struct FakeServer {
    port: u16,
    commands: Arc<Mutex<Vec<String>>>,
}

async fn start_server(messages: Vec<(u32, &'static [u8])>, quirk: Quirk) -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let commands = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&commands);

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut lines = BufReader::new(read).lines();
        write.write_all(b"* OK fake IMAP4rev1 ready\r\n").await.unwrap();

        let mut deleted: Vec<u32> = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            let (tag, command) = line.split_once(' ').unwrap();
            log.lock().unwrap().push(command.to_string());
            let verb = command.split_whitespace().next().unwrap_or("").to_uppercase();

            let mut reply: Vec<u8> = Vec::new();
            match verb.as_str() {
                "LOGIN" => {
                    reply.extend_from_slice(format!("{tag} OK LOGIN completed\r\n").as_bytes())
                }
                "SELECT" => {
                    reply.extend_from_slice(format!("* {} EXISTS\r\n", messages.len()).as_bytes());
                    reply.extend_from_slice(b"* OK [UIDVALIDITY 3857529045] UIDs valid\r\n");
                    reply.extend_from_slice(
                        format!("{tag} OK [READ-WRITE] SELECT completed\r\n").as_bytes(),
                    );
                }
                "FETCH" => {
                    if let Quirk::FetchFails = quirk {
                        reply.extend_from_slice(
                            format!("{tag} NO Mailbox was deleted under us, please relogin\r\n").as_bytes(),
                        );
                    } else {
                        for (seq, (uid, raw)) in messages.iter().enumerate() {
                            reply.extend_from_slice(
                                format!(
                                    "* {} FETCH (UID {uid} RFC822 {{{}}}\r\n",
                                    seq + 1,
                                    raw.len()
                                )
                                .as_bytes(),
                            );
                            reply.extend_from_slice(raw);
                            if let Quirk::TrailingFlags = quirk {
                                reply.extend_from_slice(b" FLAGS (\\Seen))\r\n");
                            } else {
                                reply.extend_from_slice(b")\r\n");
                            }
                        }
                        reply.extend_from_slice(format!("{tag} OK FETCH completed\r\n").as_bytes());
                    }
                }
                "UID" => {
                    let uid: u32 = command.split_whitespace().nth(2).unwrap().parse().unwrap();
                    deleted.push(uid);
                    reply.extend_from_slice(
                        format!("* 1 FETCH (FLAGS (\\Deleted) UID {uid})\r\n").as_bytes(),
                    );
                    reply.extend_from_slice(format!("{tag} OK STORE completed\r\n").as_bytes());
                }
                "EXPUNGE" => {
                    for _ in &deleted {
                        reply.extend_from_slice(b"* 1 EXPUNGE\r\n");
                    }
                    reply.extend_from_slice(format!("{tag} OK EXPUNGE completed\r\n").as_bytes());
                }
                "LOGOUT" => {
                    reply.extend_from_slice(b"* BYE logging out\r\n");
                    reply.extend_from_slice(format!("{tag} OK LOGOUT completed\r\n").as_bytes());
                    write.write_all(&reply).await.unwrap();
                    break;
                }
                _ => reply.extend_from_slice(format!("{tag} BAD unknown command\r\n").as_bytes()),
            }
            write.write_all(&reply).await.unwrap();
        }
    });

    FakeServer { port, commands }
}

fn config(port: u16) -> MailboxConfig {
    let mut config = MailboxConfig::new("127.0.0.1");
    config.port = port;
    config.tls = false;
    config.user = Some("reader".to_string());
    config.password = Some(secrecy::SecretString::new("hunter2".to_string().into()));
    config
}

const FIRST: &[u8] = b"Date: Mon, 28 Nov 2022 16:19:39 -0000\r\n\r\nhttps://example.org/one\r\n";
const SECOND: &[u8] = b"Date: Tue, 29 Nov 2022 09:00:00 +0000\r\n\r\nhttps://example.org/two\r\n";

#[tokio::test]
async fn test_fetch_delete_expunge_cycle() {
    let server = start_server(vec![(101, FIRST), (102, SECOND)], Quirk::None).await;
    let mut mailbox = ImapMailbox::connect(&config(server.port)).await.unwrap();

    let messages = mailbox.fetch_messages().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].uid, 101);
    assert_eq!(messages[0].raw, FIRST);
    assert_eq!(messages[1].uid, 102);
    assert_eq!(messages[1].raw, SECOND);

    mailbox.mark_deleted(101).await.unwrap();
    mailbox.expunge().await.unwrap();
    mailbox.logout().await.unwrap();

    let commands = server.commands.lock().unwrap().clone();
    assert_eq!(
        commands,
        vec![
            r#"LOGIN "reader" "hunter2""#.to_string(),
            r#"SELECT "INBOX""#.to_string(),
            "FETCH 1:* (UID RFC822)".to_string(),
            r"UID STORE 101 +FLAGS (\Deleted)".to_string(),
            "EXPUNGE".to_string(),
            "LOGOUT".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_empty_mailbox_skips_fetch() {
    let server = start_server(vec![], Quirk::None).await;
    let mut mailbox = ImapMailbox::connect(&config(server.port)).await.unwrap();

    assert!(mailbox.fetch_messages().await.unwrap().is_empty());
    mailbox.logout().await.unwrap();

    let commands = server.commands.lock().unwrap().clone();
    assert!(!commands.iter().any(|c| c.starts_with("FETCH")));
}

#[tokio::test]
async fn test_session_lost_is_reported() {
    let server = start_server(vec![(7, FIRST)], Quirk::FetchFails).await;
    let mut mailbox = ImapMailbox::connect(&config(server.port)).await.unwrap();

    let err = mailbox.fetch_messages().await.unwrap_err();
    assert!(matches!(err, MailError::Command { .. }));
    assert!(err.is_session_lost());
}

#[tokio::test]
async fn test_unexpected_fetch_items_are_a_protocol_error() {
    let server = start_server(vec![(7, FIRST)], Quirk::TrailingFlags).await;
    let mut mailbox = ImapMailbox::connect(&config(server.port)).await.unwrap();

    let err = mailbox.fetch_messages().await.unwrap_err();
    assert!(matches!(err, MailError::Protocol(_)));
    assert!(!err.is_session_lost());
}
