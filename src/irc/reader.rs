//! Bounded inbound line reader.
//!
//! Lines are split on `\n` with an optional preceding `\r` stripped, and
//! decoded lossily: bytes that are not valid UTF-8 become U+FFFD instead of
//! failing the read. A line longer than the cap is discarded up to its
//! terminator without ever being buffered whole.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Longest inbound line kept, terminator excluded. Leaves room for IRCv3
/// message tags on top of the 512-byte base line.
pub const MAX_INBOUND_LINE_LENGTH: usize = 8191;

/// One unit of inbound traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Line(String),
    /// A line over the cap was dropped; carries its length in bytes.
    Oversized(usize),
}

pub struct LineReader<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    limit: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_INBOUND_LINE_LENGTH)
    }

    pub fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            buf: Vec::new(),
            limit,
        }
    }

    /// Read the next line. `Ok(None)` at end of stream. A trailing line
    /// without a terminator is still returned.
    ///
    /// Not resumable: if the future is dropped mid-line, the partial line is
    /// lost.
    pub async fn next_line(&mut self) -> io::Result<Option<Inbound>> {
        self.buf.clear();
        let mut discarded = 0usize;

        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() && discarded == 0 {
                    return Ok(None);
                }
                break;
            }

            let (chunk, used, done) = match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (&available[..pos], pos + 1, true),
                None => (available, available.len(), false),
            };

            if discarded > 0 {
                discarded += chunk.len();
            } else if self.buf.len() + chunk.len() > self.limit {
                discarded = self.buf.len() + chunk.len();
                self.buf.clear();
            } else {
                self.buf.extend_from_slice(chunk);
            }

            self.reader.consume(used);
            if done {
                break;
            }
        }

        if discarded > 0 {
            return Ok(Some(Inbound::Oversized(discarded)));
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(Some(Inbound::Line(
            String::from_utf8_lossy(&self.buf).into_owned(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn read_all(input: &[u8], limit: usize) -> Vec<Inbound> {
        let mut reader = LineReader::with_limit(input, limit);
        let mut out = Vec::new();
        while let Some(item) = reader.next_line().await.unwrap() {
            out.push(item);
        }
        out
    }

    fn line(s: &str) -> Inbound {
        Inbound::Line(s.to_string())
    }

    #[tokio::test]
    async fn splits_on_crlf_and_bare_lf() {
        let got = read_all(b"PING :a\r\nNOTICE * :b\nlast", 64).await;
        assert_eq!(got, vec![line("PING :a"), line("NOTICE * :b"), line("last")]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let got = read_all(b":a!b PRIVMSG #c :caf\xe9\r\n:a!b PRIVMSG #c :after\r\n", 64).await;
        assert_eq!(
            got,
            vec![line(":a!b PRIVMSG #c :caf\u{FFFD}"), line(":a!b PRIVMSG #c :after")]
        );
    }

    #[tokio::test]
    async fn oversized_line_is_skipped() {
        let mut input = vec![b'x'; 100];
        input.extend_from_slice(b"\r\nshort\r\n");
        let got = read_all(&input, 16).await;
        // The `\r` belongs to the discarded line.
        assert_eq!(got, vec![Inbound::Oversized(101), line("short")]);
    }

    #[tokio::test]
    async fn limit_is_inclusive() {
        let got = read_all(b"0123456789\r\n", 10).await;
        assert_eq!(got, vec![line("0123456789")]);
    }

    #[tokio::test]
    async fn oversized_across_small_reads() {
        let (mut tx, rx) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(&[b'y'; 50]).await.unwrap();
            tx.write_all(b"\nok\n").await.unwrap();
        });
        let mut reader = LineReader::with_limit(rx, 20);
        assert_eq!(reader.next_line().await.unwrap(), Some(Inbound::Oversized(50)));
        assert_eq!(reader.next_line().await.unwrap(), Some(line("ok")));
        writer.await.unwrap();
        assert_eq!(reader.next_line().await.unwrap(), None);
    }
}
