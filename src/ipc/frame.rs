// src/ipc/frame.rs - Length-prefixed text frames for the single-instance channel
//
// A frame is a 4-byte big-endian payload length followed by that many bytes
// of UTF-8. Each connection carries exactly one frame.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload accepted from a peer.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    TooLarge(usize),
    #[error("Frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Connection closed mid-frame")]
    ConnectionClosed,
}

pub fn encode_frame(text: &str) -> Result<Vec<u8>, FrameError> {
    let len = text.len();
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }
    let mut buf = Vec::with_capacity(4 + len);
    buf.extend_from_slice(&(len as u32).to_be_bytes());
    buf.extend_from_slice(text.as_bytes());
    Ok(buf)
}

pub async fn write_frame<W>(writer: &mut W, text: &str) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let buf = encode_frame(text)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame. `Ok(None)` means the peer hung up before sending anything,
/// which is what a liveness probe does.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<String>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(FrameError::ConnectionClosed)
            };
        }
        filled += n;
    }

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FrameError::ConnectionClosed
        } else {
            FrameError::Io(e)
        }
    })?;

    Ok(Some(String::from_utf8(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read() {
        let mut buf = Vec::new();
        write_frame(&mut buf, "file:///tmp/a%20b.txt").await.unwrap();
        assert_eq!(&buf[..4], &[0, 0, 0, 21]);

        let mut reader = buf.as_slice();
        let msg = read_frame(&mut reader).await.unwrap();
        assert_eq!(msg.as_deref(), Some("file:///tmp/a%20b.txt"));
    }

    #[tokio::test]
    async fn test_empty_stream_is_probe() {
        let mut reader: &[u8] = &[];
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_truncated_header_and_payload() {
        let mut reader: &[u8] = &[0, 0];
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(FrameError::ConnectionClosed)
        ));

        let mut reader: &[u8] = &[0, 0, 0, 5, b'a', b'b'];
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversize_header() {
        let len = (MAX_FRAME_LEN as u32 + 1).to_be_bytes();
        let mut reader: &[u8] = &len;
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(FrameError::TooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_utf8() {
        let mut reader: &[u8] = &[0, 0, 0, 2, 0xC3, 0x28];
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(FrameError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_encode_rejects_oversize_payload() {
        let big = "x".repeat(MAX_FRAME_LEN + 1);
        assert!(matches!(encode_frame(&big), Err(FrameError::TooLarge(_))));
    }
}
