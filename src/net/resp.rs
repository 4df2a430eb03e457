//! RESP2 wire codec.
//!
//! Commands are encoded as arrays of bulk strings. Replies are decoded
//! incrementally: `parse_reply` returns `Ok(None)` until the buffer holds a
//! complete frame.

use thiserror::Error;

/// A decoded server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `+OK`
    Simple(String),
    /// `-ERR ...`
    Error(String),
    /// `:42`
    Integer(i64),
    /// `$n` bulk string; `None` for the nil bulk `$-1`.
    Bulk(Option<Vec<u8>>),
    /// `*n` array; `None` for the nil array `*-1`.
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Text content of a simple or bulk string reply.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Reply::Simple(s) => Some(s.clone()),
            Reply::Bulk(Some(bytes)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// True for both nil encodings.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }
}

/// Largest bulk string accepted, matching the server's default `proto-max-bulk-len`.
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest array accepted; replies here never carry more than a few hundred items.
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Malformed frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("protocol error: {0}")]
pub struct ProtocolError(pub String);

/// Encode a command as a RESP array of bulk strings.
pub fn encode_command(args: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + args.iter().map(|a| a.len() + 16).sum::<usize>());
    out.extend_from_slice(format!("*{}\r\n", args.len()).as_bytes());
    for arg in args {
        out.extend_from_slice(format!("${}\r\n", arg.len()).as_bytes());
        out.extend_from_slice(arg);
        out.extend_from_slice(b"\r\n");
    }
    out
}

/// Try to decode one reply from the front of `buf`.
///
/// Returns the reply and the number of bytes it occupied.
pub fn parse_reply(buf: &[u8]) -> Result<Option<(Reply, usize)>, ProtocolError> {
    let Some(line_end) = find_crlf(buf) else {
        return Ok(None);
    };
    let line = &buf[1..line_end];
    let after = line_end + 2;

    match buf[0] {
        b'+' => Ok(Some((Reply::Simple(text(line)?), after))),
        b'-' => Ok(Some((Reply::Error(text(line)?), after))),
        b':' => Ok(Some((Reply::Integer(integer(line)?), after))),
        b'$' => {
            let len = integer(line)?;
            if len < 0 {
                return Ok(Some((Reply::Bulk(None), after)));
            }
            if len > MAX_BULK_LEN {
                return Err(ProtocolError(format!("bulk length {} exceeds limit", len)));
            }
            let len = len as usize;
            if buf.len() < after + len + 2 {
                return Ok(None);
            }
            if &buf[after + len..after + len + 2] != b"\r\n" {
                return Err(ProtocolError("bulk string not terminated by CRLF".into()));
            }
            let data = buf[after..after + len].to_vec();
            Ok(Some((Reply::Bulk(Some(data)), after + len + 2)))
        }
        b'*' => {
            let count = integer(line)?;
            if count < 0 {
                return Ok(Some((Reply::Array(None), after)));
            }
            if count > MAX_ARRAY_LEN {
                return Err(ProtocolError(format!("array length {} exceeds limit", count)));
            }
            // Each element takes at least three bytes on the wire.
            let mut items = Vec::with_capacity((count as usize).min(buf.len() / 3));
            let mut pos = after;
            for _ in 0..count {
                match parse_reply(&buf[pos..])? {
                    Some((item, used)) => {
                        items.push(item);
                        pos += used;
                    }
                    None => return Ok(None),
                }
            }
            Ok(Some((Reply::Array(Some(items)), pos)))
        }
        other => Err(ProtocolError(format!(
            "unexpected type byte {:?}",
            other as char
        ))),
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn text(line: &[u8]) -> Result<String, ProtocolError> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|e| ProtocolError(format!("invalid utf-8: {}", e)))
}

fn integer(line: &[u8]) -> Result<i64, ProtocolError> {
    text(line)?
        .parse()
        .map_err(|_| ProtocolError(format!("invalid integer {:?}", String::from_utf8_lossy(line))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_set_with_expiry() {
        let frame = encode_command(&[b"SET", b"monitor:heartbeat", b"v1", b"EX", b"300"]);
        assert_eq!(
            frame,
            b"*5\r\n$3\r\nSET\r\n$17\r\nmonitor:heartbeat\r\n$2\r\nv1\r\n$2\r\nEX\r\n$3\r\n300\r\n".to_vec()
        );
    }

    #[test]
    fn test_parse_simple_and_error() {
        assert_eq!(
            parse_reply(b"+OK\r\n").unwrap(),
            Some((Reply::Simple("OK".into()), 5))
        );
        let (reply, _) = parse_reply(b"-READONLY You can't write against a read only replica.\r\n")
            .unwrap()
            .unwrap();
        assert!(matches!(reply, Reply::Error(msg) if msg.starts_with("READONLY")));
    }

    #[test]
    fn test_parse_master_addr_array() {
        let buf = b"*2\r\n$8\r\n10.0.0.1\r\n$4\r\n6379\r\n";
        let (reply, used) = parse_reply(buf).unwrap().unwrap();
        assert_eq!(used, buf.len());
        assert_eq!(
            reply,
            Reply::Array(Some(vec![
                Reply::Bulk(Some(b"10.0.0.1".to_vec())),
                Reply::Bulk(Some(b"6379".to_vec())),
            ]))
        );
    }

    #[test]
    fn test_parse_nil_replies() {
        let (bulk, _) = parse_reply(b"$-1\r\n").unwrap().unwrap();
        let (array, _) = parse_reply(b"*-1\r\n").unwrap().unwrap();
        assert!(bulk.is_nil());
        assert!(array.is_nil());
    }

    #[test]
    fn test_parse_incomplete_frames() {
        assert_eq!(parse_reply(b"").unwrap(), None);
        assert_eq!(parse_reply(b"+PON").unwrap(), None);
        assert_eq!(parse_reply(b"$4\r\nPO").unwrap(), None);
        assert_eq!(parse_reply(b"*2\r\n$1\r\na\r\n").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_oversized_headers() {
        assert!(parse_reply(b"*9223372036854775807\r\n").is_err());
        assert!(parse_reply(b"$9223372036854775807\r\n").is_err());
        assert!(parse_reply(b"*1048577\r\n").is_err());
        assert!(parse_reply(b"$536870913\r\n").is_err());
    }

    #[test]
    fn test_large_but_legal_array_header_waits_for_data() {
        assert_eq!(parse_reply(b"*1048576\r\n:1\r\n").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_reply(b"?what\r\n").is_err());
        assert!(parse_reply(b":abc\r\n").is_err());
    }
}
