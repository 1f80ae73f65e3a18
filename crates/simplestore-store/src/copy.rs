use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Transfer chunk size for value bodies (4 KiB).
pub const CHUNK_SIZE: usize = 4 * 1024;

/// Copy `reader` into `writer` one chunk at a time and flush at end of stream.
///
/// Each chunk is written as soon as it is read, so peak memory is bounded by
/// [`CHUNK_SIZE`] regardless of how large the value is. Returns the number of
/// bytes copied.
pub async fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    writer.flush().await?;
    Ok(total)
}
