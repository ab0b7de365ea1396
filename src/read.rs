use futures_util::stream::{Stream, StreamExt};
use hyper::body::Bytes;
use std::{
    cmp,
    error::Error as StdError,
    io::{self, Read},
};
use tokio::runtime::Handle;

/*
 * Adapted from
 * https://github.com/ferristseng/rust-ipfs-api/blob/master/ipfs-api/src/read.rs
 * to drive a futures 0.3 stream from synchronous code.
 */

/// The state of a stream returning Chunks.
///
enum ReadState {
    /// A chunk is ready to be read from.
    ///
    Ready(Bytes, usize),

    /// The next chunk isn't ready yet.
    ///
    NotReady,
}

/// Reads from a stream of chunks, blocking the current thread until each chunk arrives.
///
/// Must be used off the runtime's worker threads, e.g. inside `spawn_blocking`.
pub struct StreamReader<S> {
    stream: S,
    state: ReadState,
    handle: Handle,
}

impl<S, E> StreamReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    #[inline]
    pub fn new(
        stream: S,
        handle: Handle,
    ) -> StreamReader<S> {
        StreamReader {
            stream,
            state: ReadState::NotReady,
            handle,
        }
    }
}

impl<S, E> Read for StreamReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        loop {
            match self.state {
                // A chunk is buffered, hand out as much of it as fits.
                //
                ReadState::Ready(ref chunk, ref mut pos) => {
                    let chunk_start = *pos;
                    let len = cmp::min(buf.len(), chunk.len() - chunk_start);
                    let chunk_end = chunk_start + len;

                    buf[..len].copy_from_slice(&chunk[chunk_start..chunk_end]);
                    *pos += len;

                    let drained = *pos == chunk.len();
                    if drained {
                        self.state = ReadState::NotReady;
                    }
                    return Ok(len);
                }
                // Nothing buffered, wait for the next chunk.
                //
                ReadState::NotReady => {
                    let stream = &mut self.stream;
                    match self.handle.block_on(stream.next()) {
                        // Empty chunks carry nothing, keep waiting.
                        //
                        Some(Ok(chunk)) if chunk.is_empty() => continue,
                        Some(Ok(chunk)) => {
                            self.state = ReadState::Ready(chunk, 0);
                            continue;
                        }
                        // Stream yielded EOF.
                        //
                        None => return Ok(0),
                        Some(Err(e)) => return Err(io::Error::new(io::ErrorKind::Other, e)),
                    }
                }
            }
        }
    }
}
