//! Wire protocol shared by the master and the chunk servers
//!
//! Transport is TCP, one command per connection. A request is a single
//! ASCII, space-delimited header line terminated by `\n`, optionally
//! followed by a binary payload of the exact length declared in the header.
//! Responses carry a structured status so binary payloads can never be
//! mistaken for an error sentinel:
//!
//! ```text
//! OK <len>\n<len body bytes>
//! ERR <code> <len>\n<len message bytes>
//! ```

use crate::common::{Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Maximum accepted header line length
pub const MAX_HEADER_LEN: usize = 4096;

/// A command accepted by the master
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MasterCommand {
    Create { filename: String, size: usize },
    List,
    GetChunks { filename: String },
    Download { filename: String },
}

impl MasterCommand {
    /// Parse a split header line. The command token is case-sensitive.
    pub fn parse(tokens: &[String]) -> Result<Self> {
        match tokens {
            [cmd, filename, size] if cmd == "CREATE" => Ok(MasterCommand::Create {
                filename: filename.clone(),
                size: parse_len(size)?,
            }),
            [cmd] if cmd == "LIST" => Ok(MasterCommand::List),
            [cmd, filename] if cmd == "GET_CHUNKS" => Ok(MasterCommand::GetChunks {
                filename: filename.clone(),
            }),
            [cmd, filename] if cmd == "DOWNLOAD" => Ok(MasterCommand::Download {
                filename: filename.clone(),
            }),
            [] => Err(Error::Protocol("empty command".into())),
            [cmd, ..] => Err(Error::Protocol(format!("unknown or malformed command: {}", cmd))),
        }
    }
}

/// A command accepted by a chunk server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkCommand {
    Store { key: String, len: usize },
    Retrieve { key: String },
}

impl ChunkCommand {
    pub fn parse(tokens: &[String]) -> Result<Self> {
        match tokens {
            [cmd, key, len] if cmd == "STORE" => Ok(ChunkCommand::Store {
                key: key.clone(),
                len: parse_len(len)?,
            }),
            [cmd, key] if cmd == "RETRIEVE" => Ok(ChunkCommand::Retrieve { key: key.clone() }),
            [] => Err(Error::Protocol("empty command".into())),
            [cmd, ..] => Err(Error::Protocol(format!("unknown or malformed command: {}", cmd))),
        }
    }
}

fn parse_len(token: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::Protocol(format!("invalid length: {}", token)))
}

/// Read one header line (capped at [`MAX_HEADER_LEN`]) and split it into
/// whitespace-delimited tokens.
pub async fn read_header<R>(reader: &mut BufReader<R>) -> Result<Vec<String>>
where
    R: AsyncReadExt + Unpin,
{
    let line = read_line_capped(reader, MAX_HEADER_LEN).await?;
    Ok(line.split_whitespace().map(|s| s.to_string()).collect())
}

/// Read exactly `len` payload bytes, tolerating fragmented delivery.
pub async fn read_payload<R>(reader: &mut R, len: usize, max: usize) -> Result<Vec<u8>>
where
    R: AsyncReadExt + Unpin,
{
    if len > max {
        return Err(Error::Protocol(format!(
            "declared payload of {} bytes exceeds limit of {}",
            len, max
        )));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Send a request: header line plus optional payload.
pub async fn write_request<W>(writer: &mut W, header: &str, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;
    Ok(())
}

/// Send a success frame with a length-prefixed body.
pub async fn write_ok<W>(writer: &mut W, body: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("OK {}\n", body.len()).as_bytes())
        .await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Send an error frame with a status code and a length-prefixed message.
pub async fn write_err<W>(writer: &mut W, code: &str, message: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("ERR {} {}\n", code, message.len()).as_bytes())
        .await?;
    writer.write_all(message.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read a response frame. OK frames yield the body; ERR frames are turned
/// back into an [`Error`] from their status code.
pub async fn read_response<R>(reader: &mut BufReader<R>, max_body: usize) -> Result<Vec<u8>>
where
    R: AsyncReadExt + Unpin,
{
    let line = read_line_capped(reader, MAX_HEADER_LEN).await?;
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.as_slice() {
        ["OK", len] => {
            let len = parse_len(len)?;
            read_payload(reader, len, max_body).await
        }
        ["ERR", code, len] => {
            let len = parse_len(len)?;
            let body = read_payload(reader, len, MAX_HEADER_LEN).await?;
            let message = String::from_utf8_lossy(&body).to_string();
            Err(Error::from_wire(code, message))
        }
        _ => Err(Error::Protocol(format!("malformed status line: {}", line))),
    }
}

/// Read a `\n`-terminated line, rejecting lines longer than `cap`. EOF
/// before the terminator is a protocol error.
async fn read_line_capped<R>(reader: &mut BufReader<R>, cap: usize) -> Result<String>
where
    R: AsyncReadExt + Unpin,
{
    let mut line = Vec::new();

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Err(Error::Protocol("connection closed mid-header".into()));
        }

        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                line.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                break;
            }
            None => {
                let taken = available.len();
                line.extend_from_slice(available);
                reader.consume(taken);
            }
        }

        if line.len() > cap {
            return Err(Error::Protocol("header line too long".into()));
        }
    }

    if line.len() > cap {
        return Err(Error::Protocol("header line too long".into()));
    }

    String::from_utf8(line).map_err(|_| Error::Protocol("header is not valid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_master_commands() {
        assert_eq!(
            MasterCommand::parse(&toks("CREATE a.txt 10")).unwrap(),
            MasterCommand::Create {
                filename: "a.txt".into(),
                size: 10
            }
        );
        assert_eq!(MasterCommand::parse(&toks("LIST")).unwrap(), MasterCommand::List);
        assert_eq!(
            MasterCommand::parse(&toks("GET_CHUNKS a.txt")).unwrap(),
            MasterCommand::GetChunks {
                filename: "a.txt".into()
            }
        );
        assert_eq!(
            MasterCommand::parse(&toks("DOWNLOAD a.txt")).unwrap(),
            MasterCommand::Download {
                filename: "a.txt".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(MasterCommand::parse(&[]).is_err());
        assert!(MasterCommand::parse(&toks("CREATE a.txt")).is_err());
        assert!(MasterCommand::parse(&toks("CREATE a.txt notanumber")).is_err());
        // Commands are case-sensitive
        assert!(MasterCommand::parse(&toks("list")).is_err());
        assert!(ChunkCommand::parse(&toks("STORE key")).is_err());
        assert!(ChunkCommand::parse(&toks("FETCH key")).is_err());
    }

    #[test]
    fn test_parse_chunk_commands() {
        assert_eq!(
            ChunkCommand::parse(&toks("STORE a.txt_chunk0 5")).unwrap(),
            ChunkCommand::Store {
                key: "a.txt_chunk0".into(),
                len: 5
            }
        );
        assert_eq!(
            ChunkCommand::parse(&toks("RETRIEVE a.txt_chunk0")).unwrap(),
            ChunkCommand::Retrieve {
                key: "a.txt_chunk0".into()
            }
        );
    }

    #[tokio::test]
    async fn test_ok_frame_round_trip() {
        let (client, server) = tokio::io::duplex(1024);
        let (server_rx, mut server_tx) = tokio::io::split(server);

        write_ok(&mut server_tx, b"HELLOWORLD").await.unwrap();
        drop(server_tx);
        drop(server_rx);

        let (client_rx, _client_tx) = tokio::io::split(client);
        let mut reader = BufReader::new(client_rx);
        let body = read_response(&mut reader, 1024).await.unwrap();
        assert_eq!(body, b"HELLOWORLD");
    }

    #[tokio::test]
    async fn test_err_frame_round_trip() {
        let (client, server) = tokio::io::duplex(1024);
        let (_server_rx, mut server_tx) = tokio::io::split(server);

        write_err(&mut server_tx, "not_found", "no such chunk").await.unwrap();
        drop(server_tx);

        let (client_rx, _client_tx) = tokio::io::split(client);
        let mut reader = BufReader::new(client_rx);
        let err = read_response(&mut reader, 1024).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ok_body_indistinguishable_prefix() {
        // A payload that happens to start with "ERR" must come through
        // verbatim under the length-prefixed framing.
        let (client, server) = tokio::io::duplex(1024);
        let (_server_rx, mut server_tx) = tokio::io::split(server);

        write_ok(&mut server_tx, b"ERR: this is file content").await.unwrap();
        drop(server_tx);

        let (client_rx, _client_tx) = tokio::io::split(client);
        let mut reader = BufReader::new(client_rx);
        let body = read_response(&mut reader, 1024).await.unwrap();
        assert_eq!(body, b"ERR: this is file content");
    }

    #[tokio::test]
    async fn test_request_header_and_payload() {
        let (client, server) = tokio::io::duplex(1024);
        let (_client_rx, mut client_tx) = tokio::io::split(client);

        write_request(&mut client_tx, "STORE a.txt_chunk0 5", b"HELLO")
            .await
            .unwrap();
        drop(client_tx);

        let (server_rx, _server_tx) = tokio::io::split(server);
        let mut reader = BufReader::new(server_rx);
        let tokens = read_header(&mut reader).await.unwrap();
        let cmd = ChunkCommand::parse(&tokens).unwrap();
        assert_eq!(
            cmd,
            ChunkCommand::Store {
                key: "a.txt_chunk0".into(),
                len: 5
            }
        );

        let payload = read_payload(&mut reader, 5, 1024).await.unwrap();
        assert_eq!(payload, b"HELLO");
    }

    #[tokio::test]
    async fn test_payload_over_limit_rejected() {
        let (client, _server) = tokio::io::duplex(64);
        let (client_rx, _client_tx) = tokio::io::split(client);
        let mut reader = BufReader::new(client_rx);
        let err = read_payload(&mut reader, 100, 10).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
