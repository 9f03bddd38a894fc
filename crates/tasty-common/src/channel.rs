//! Framed byte channel between the two parties.
//!
//! Every unit of data is a 4-byte big-endian length followed by that many bytes. A zero
//! length with no payload is the "no object" sentinel which terminates a round transmission.
//! Objects are encoded with `bincode`.

use std::io::{Error, ErrorKind};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream, ToSocketAddrs,
    },
};

use crate::EngineError;

/// Length of a frame header.
pub const HEADER_LEN: usize = 4;

/// A reliable, ordered, bidirectional byte stream to the peer.
pub trait Channel: Send {
    /// Reading half.
    type Reader: AsyncRead + Unpin + Send;
    /// Writing half.
    type Writer: AsyncWrite + Unpin + Send;

    /// Returns both halves so that reading and writing can progress concurrently.
    fn split_mut(&mut self) -> (&mut Self::Reader, &mut Self::Writer);
}

/// A [`Channel`] over a pair of tokio streams.
#[derive(Debug)]
pub struct FramedChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> FramedChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Creates a channel from its two halves.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the two halves.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> Channel for FramedChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    type Reader = R;
    type Writer = W;

    fn split_mut(&mut self) -> (&mut R, &mut W) {
        (&mut self.reader, &mut self.writer)
    }
}

/// In-memory channel.
pub type MemoryChannel = FramedChannel<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// Creates two connected in-memory channels, each direction buffering up to `buffer` bytes.
pub fn memory_pair(buffer: usize) -> (MemoryChannel, MemoryChannel) {
    let (a, b) = tokio::io::duplex(buffer);
    let (a_read, a_write) = tokio::io::split(a);
    let (b_read, b_write) = tokio::io::split(b);

    (
        FramedChannel::new(a_read, a_write),
        FramedChannel::new(b_read, b_write),
    )
}

/// TCP channel.
pub type TcpChannel = FramedChannel<OwnedReadHalf, OwnedWriteHalf>;

impl TcpChannel {
    /// Connects to a listening peer.
    pub async fn connect(addr: impl ToSocketAddrs) -> std::io::Result<Self> {
        Self::from_stream(TcpStream::connect(addr).await?)
    }

    /// Accepts the next peer connecting to `listener`.
    pub async fn accept(listener: &TcpListener) -> std::io::Result<Self> {
        let (stream, _) = listener.accept().await?;
        Self::from_stream(stream)
    }

    fn from_stream(stream: TcpStream) -> std::io::Result<Self> {
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self::new(reader, writer))
    }
}

/// Writes a frame, `None` writing the sentinel. Returns the number of bytes written.
///
/// An empty `Some` payload is rejected since it is indistinguishable from the sentinel.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: Option<&[u8]>,
) -> std::io::Result<usize> {
    let Some(payload) = payload else {
        writer.write_u32(0).await?;
        return Ok(HEADER_LEN);
    };

    if payload.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "empty payload would be read as the sentinel",
        ));
    }

    let len = u32::try_from(payload.len())
        .map_err(|_| Error::new(ErrorKind::InvalidInput, "frame too large"))?;

    writer.write_u32(len).await?;
    writer.write_all(payload).await?;

    Ok(HEADER_LEN + payload.len())
}

/// Reads a frame, returning `None` for the sentinel.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> std::io::Result<Option<Vec<u8>>> {
    let len = reader.read_u32().await? as usize;
    if len == 0 {
        return Ok(None);
    }

    if len > max_len {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds the limit of {max_len} bytes"),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    Ok(Some(payload))
}

/// Sends a single object.
pub async fn send<W, T>(writer: &mut W, value: &T) -> Result<(), EngineError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let bytes = bincode::serialize(value)?;
    write_frame(writer, Some(&bytes)).await?;
    writer.flush().await?;
    Ok(())
}

/// Receives a single object, failing on the sentinel.
pub async fn recv<R, T>(reader: &mut R, max_len: usize) -> Result<T, EngineError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let bytes = read_frame(reader, max_len)
        .await?
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "expected an object"))?;
    Ok(bincode::deserialize(&bytes)?)
}
