// Length-prefixed frames: fixed header followed by an opaque payload.
use bytes::Buf;
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

/// "IDRP"
pub const MAGIC: u32 = 0x4944_5250;
pub const VERSION: u16 = 1;
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid magic number {0:#010x}")]
    InvalidMagic(u32),

    #[error("unsupported version {0}")]
    UnsupportedVersion(u16),

    #[error("frame of {length} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { length: usize, max: usize },

    #[error("incomplete frame header")]
    Incomplete,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u16,
    pub length: u32,
}

impl FrameHeader {
    pub const LEN: usize = 10;

    pub fn new(length: u32) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            length,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        // Network byte order.
        buf.put_u32(self.magic);
        buf.put_u16(self.version);
        buf.put_u32(self.length);
    }

    pub fn decode(mut buf: &[u8]) -> Result<Self, FrameError> {
        if buf.remaining() < Self::LEN {
            return Err(FrameError::Incomplete);
        }
        let magic = buf.get_u32();
        if magic != MAGIC {
            return Err(FrameError::InvalidMagic(magic));
        }
        let version = buf.get_u16();
        if version != VERSION {
            return Err(FrameError::UnsupportedVersion(version));
        }
        let length = buf.get_u32();
        Ok(Self {
            magic,
            version,
            length,
        })
    }
}

/// Encode a payload into a single contiguous frame.
pub fn encode_frame(payload: &[u8]) -> Result<Bytes, FrameError> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::FrameTooLarge {
        length: payload.len(),
        max: u32::MAX as usize,
    })?;

    let mut buf = BytesMut::with_capacity(FrameHeader::LEN + payload.len());
    FrameHeader::new(length).encode(&mut buf);
    buf.extend_from_slice(payload);
    Ok(buf.freeze())
}

/// Read one frame payload.
///
/// Returns `Ok(None)` when the peer closed the stream at a frame boundary. The declared length
/// is checked against `max_payload_bytes` before any payload byte is read.
pub async fn read_frame<R>(
    reader: &mut R,
    max_payload_bytes: usize,
) -> Result<Option<Bytes>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header_bytes = [0u8; FrameHeader::LEN];
    match reader.read_exact(&mut header_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let header = FrameHeader::decode(&header_bytes)?;
    let length = header.length as usize;
    if length > max_payload_bytes {
        return Err(FrameError::FrameTooLarge {
            length,
            max: max_payload_bytes,
        });
    }

    let mut payload = BytesMut::zeroed(length);
    reader.read_exact(&mut payload[..]).await?;
    Ok(Some(payload.freeze()))
}

/// Write one frame and flush it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(payload)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
