use crate::wire::{split_blocks, Command, DecodeError, Header, HEADER_SIZE};

use super::inbox::{Inbox, ReadStatus};
use super::DisplayList;

/// Commands decoded per `drain` call before handing control back in
/// continuous mode.
pub(crate) const DECODE_LIMIT: usize = 1 << 16;

/// Array payloads are read in steps of this many bytes, so memory only
/// grows with bytes that actually arrived.
const PAYLOAD_STEP: usize = 64 * 1024;

/// Accumulation discipline.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Mode {
    /// Commands accumulate until cleared.
    #[default]
    Continuous,
    /// The list holds exactly one frame, delimited by begin/end markers.
    Batched,
}

/// Why `drain` returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Drain {
    /// No data left for now (or the per-call decode limit was hit); the list
    /// is renderable.
    Yield,
    /// A batched frame is open and waiting for more data.
    Pending,
    /// An end-of-frame marker completed the current frame.
    FrameReady,
    /// The producer hung up. Nothing more will arrive.
    Closed,
}

/// Decodes commands from an `Inbox` into the display list.
#[derive(Debug)]
pub struct Accumulator {
    list: DisplayList,
    /// Last completed batched frame, kept on screen while the next one is
    /// still arriving.
    shown: DisplayList,
    mode: Mode,
    frame_open: bool,
    changed: bool,
    header: [u8; HEADER_SIZE],
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            list: DisplayList::new(),
            shown: DisplayList::new(),
            mode: Mode::Continuous,
            frame_open: false,
            changed: false,
            header: [0; HEADER_SIZE],
        }
    }

    pub fn list(&self) -> &DisplayList {
        &self.list
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// What the renderer should draw: the list itself, or the previous
    /// complete frame while a batched frame is open.
    pub fn visible(&self) -> &DisplayList {
        if self.frame_open { &self.shown } else { &self.list }
    }

    /// Whether [`Accumulator::visible`] changed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Decodes everything currently available.
    ///
    /// Headers are read without blocking. Array payloads are read to
    /// completion with a blocking read, since the producer writes them
    /// right behind their header.
    pub fn drain(&mut self, inbox: &mut Inbox) -> Result<Drain, DecodeError> {
        let mut decoded = 0usize;
        loop {
            if !self.frame_open && decoded >= DECODE_LIMIT {
                return Ok(Drain::Yield);
            }

            match inbox.try_read_exact(&mut self.header) {
                ReadStatus::Ready => {}
                ReadStatus::Pending if self.frame_open => return Ok(Drain::Pending),
                ReadStatus::Pending => return Ok(Drain::Yield),
                ReadStatus::Closed => return Ok(Drain::Closed),
            }
            decoded += 1;

            let header = Header::decode(&self.header)?;
            log::trace!("decoded {header:?}");

            match header {
                Header::ContinuousMode => {
                    if self.mode == Mode::Batched {
                        self.shown.wipe();
                        self.list.wipe();
                        self.changed = true;
                    }
                    self.mode = Mode::Continuous;
                    self.frame_open = false;
                }
                Header::Clear => self.wipe(),
                Header::BeginFrame => {
                    if self.frame_open {
                        self.list.wipe();
                    } else if self.mode == Mode::Batched {
                        self.shown = std::mem::take(&mut self.list);
                    } else {
                        self.wipe();
                    }
                    self.mode = Mode::Batched;
                    self.frame_open = true;
                }
                Header::EndFrame => {
                    self.shown.wipe();
                    self.frame_open = false;
                    self.changed = true;
                    return Ok(Drain::FrameReady);
                }
                Header::PointArray { .. } | Header::PolyLine { .. } => {
                    let Some(payload) = read_payload(inbox, header.payload_len()) else {
                        log::warn!(
                            "stream closed inside a {:?} payload of {} points",
                            header.tag(),
                            header.count()
                        );
                        return Ok(Drain::Closed);
                    };
                    let (xs, ys) = split_blocks(&payload);
                    self.push(Command::from_parts(header, xs, ys));
                }
                _ => self.push(Command::from_parts(header, Vec::new(), Vec::new())),
            }
        }
    }

    fn push(&mut self, command: Command) {
        self.list.push(command);
        self.changed |= !self.frame_open;
    }

    fn wipe(&mut self) {
        self.list.wipe();
        self.changed |= !self.frame_open;
    }
}

/// Blocking read of `len` payload bytes. `None` if the stream ends first.
fn read_payload(inbox: &mut Inbox, len: usize) -> Option<Vec<u8>> {
    let mut payload = Vec::with_capacity(len.min(PAYLOAD_STEP));
    while payload.len() < len {
        let start = payload.len();
        payload.resize(start + (len - start).min(PAYLOAD_STEP), 0);
        if !inbox.read_exact(&mut payload[start..]) {
            return None;
        }
    }
    Some(payload)
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}
