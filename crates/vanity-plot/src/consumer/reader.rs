use std::io::{self, Read};
use std::thread::{self, JoinHandle};

use super::Inbox;

const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks queued between the reader thread and the render loop.
pub const DEFAULT_QUEUE_CHUNKS: usize = 16;

/// Moves bytes from `source` into an `Inbox` on a background thread.
///
/// `wake` runs after every chunk and once more at end-of-stream so a
/// sleeping event loop notices. When the queue is full the thread blocks,
/// which in turn fills the pipe and stalls the producer.
pub fn spawn_reader<R, F>(mut source: R, capacity: usize, wake: F) -> io::Result<(Inbox, JoinHandle<()>)>
where
    R: Read + Send + 'static,
    F: Fn() + Send + 'static,
{
    let (tx, inbox) = Inbox::bounded(capacity);

    let handle = thread::Builder::new()
        .name("vanity-plot-reader".into())
        .spawn(move || {
            let mut buf = vec![0u8; CHUNK_SIZE];
            loop {
                match source.read(&mut buf) {
                    Ok(0) => {
                        log::debug!("command stream reached end of file");
                        break;
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            log::debug!("inbox dropped; reader stopping");
                            break;
                        }
                        wake();
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        log::warn!("command stream read failed: {e}");
                        break;
                    }
                }
            }
            drop(tx);
            wake();
        })?;

    Ok((inbox, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn reader_forwards_everything_then_closes() {
        let data: Vec<u8> = (0..=255u8).cycle().take(200_000).collect();
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);

        let (mut inbox, handle) = spawn_reader(Cursor::new(data.clone()), 2, move || {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();

        let mut out = vec![0u8; data.len()];
        assert!(inbox.read_exact(&mut out));
        assert_eq!(out, data);

        let mut one = [0u8; 1];
        assert!(!inbox.read_exact(&mut one));
        handle.join().unwrap();

        // one per chunk plus the end-of-stream wake
        assert!(wakes.load(Ordering::Relaxed) >= 2);
    }
}
