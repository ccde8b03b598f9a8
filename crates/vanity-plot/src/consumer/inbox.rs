use crossbeam_channel::{Receiver, Sender, TryRecvError};

/// Outcome of a non-blocking read.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReadStatus {
    /// Not enough bytes yet; nothing was consumed.
    Pending,
    Ready,
    /// The producer is gone and the request cannot be completed.
    Closed,
}

/// Consumer end of the byte channel.
///
/// Bytes arrive as chunks from the reader thread and are handed out in
/// exact-size pieces. A short read never consumes anything, so a header is
/// either taken whole or left for the next attempt.
pub struct Inbox {
    rx: Receiver<Vec<u8>>,
    buf: Vec<u8>,
    pos: usize,
    closed: bool,
}

impl Inbox {
    /// A bounded chunk channel: the sender blocks once `capacity` chunks
    /// are queued.
    pub fn bounded(capacity: usize) -> (Sender<Vec<u8>>, Inbox) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (
            tx,
            Inbox {
                rx,
                buf: Vec::new(),
                pos: 0,
                closed: false,
            },
        )
    }

    #[inline]
    fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn append(&mut self, chunk: Vec<u8>) {
        if self.pos > 0 && self.pos * 2 >= self.buf.len() {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        if self.buf.is_empty() {
            self.buf = chunk;
        } else {
            self.buf.extend_from_slice(&chunk);
        }
    }

    fn take(&mut self, out: &mut [u8]) {
        let end = self.pos + out.len();
        out.copy_from_slice(&self.buf[self.pos..end]);
        self.pos = end;
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }
    }

    /// Fills `out` from whatever has already arrived.
    pub fn try_read_exact(&mut self, out: &mut [u8]) -> ReadStatus {
        while self.available() < out.len() {
            if self.closed {
                return ReadStatus::Closed;
            }
            match self.rx.try_recv() {
                Ok(chunk) => self.append(chunk),
                Err(TryRecvError::Empty) => return ReadStatus::Pending,
                Err(TryRecvError::Disconnected) => self.closed = true,
            }
        }
        self.take(out);
        ReadStatus::Ready
    }

    /// Fills `out`, blocking for more chunks. Returns false if the stream
    /// ends first.
    pub fn read_exact(&mut self, out: &mut [u8]) -> bool {
        while self.available() < out.len() {
            if self.closed {
                return false;
            }
            match self.rx.recv() {
                Ok(chunk) => self.append(chunk),
                Err(_) => self.closed = true,
            }
        }
        self.take(out);
        true
    }

    /// True if bytes are waiting that no read has taken yet.
    pub fn has_buffered(&self) -> bool {
        self.available() > 0 || !self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_reads_consume_nothing() {
        let (tx, mut inbox) = Inbox::bounded(4);
        tx.send(vec![1, 2, 3]).unwrap();

        let mut out = [0u8; 4];
        assert_eq!(inbox.try_read_exact(&mut out), ReadStatus::Pending);

        tx.send(vec![4, 5]).unwrap();
        assert_eq!(inbox.try_read_exact(&mut out), ReadStatus::Ready);
        assert_eq!(out, [1, 2, 3, 4]);

        let mut one = [0u8; 1];
        assert_eq!(inbox.try_read_exact(&mut one), ReadStatus::Ready);
        assert_eq!(one, [5]);
    }

    #[test]
    fn hang_up_closes_incomplete_reads() {
        let (tx, mut inbox) = Inbox::bounded(4);
        tx.send(vec![9; 3]).unwrap();
        drop(tx);

        let mut out = [0u8; 4];
        assert_eq!(inbox.try_read_exact(&mut out), ReadStatus::Closed);
        assert!(!inbox.read_exact(&mut out));
        // The partial chunk is still there, just never enough.
        assert!(inbox.has_buffered());
    }

    #[test]
    fn buffered_counts_queued_chunks() {
        let (tx, mut inbox) = Inbox::bounded(4);
        assert!(!inbox.has_buffered());

        tx.send(vec![1, 2]).unwrap();
        assert!(inbox.has_buffered());

        let mut out = [0u8; 2];
        assert_eq!(inbox.try_read_exact(&mut out), ReadStatus::Ready);
        assert!(!inbox.has_buffered());
    }

    #[test]
    fn blocking_read_waits_for_the_sender() {
        let (tx, mut inbox) = Inbox::bounded(1);
        let sender = std::thread::spawn(move || {
            for b in 0..8u8 {
                tx.send(vec![b]).unwrap();
            }
        });

        let mut out = [0u8; 8];
        assert!(inbox.read_exact(&mut out));
        assert_eq!(out, [0, 1, 2, 3, 4, 5, 6, 7]);
        sender.join().unwrap();
    }
}
