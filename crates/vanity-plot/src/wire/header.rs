use bytemuck::{Pod, Zeroable};

use super::DecodeError;

/// Bytes in an encoded header: a `u32` tag followed by the payload union.
pub const HEADER_SIZE: usize = 36;

/// Bytes reserved for the payload union.
pub const PAYLOAD_SIZE: usize = 32;

/// Wire tag values.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Point = 1,
    PointArray = 2,
    Line = 3,
    PolyLine = 4,
    Color = 5,
    Bitmap = 6,
    ContinuousMode = 7,
    Clear = 8,
    BeginFrame = 9,
    EndFrame = 10,
}

impl TryFrom<u32> for Tag {
    type Error = DecodeError;

    fn try_from(raw: u32) -> Result<Self, DecodeError> {
        Ok(match raw {
            1 => Tag::Point,
            2 => Tag::PointArray,
            3 => Tag::Line,
            4 => Tag::PolyLine,
            5 => Tag::Color,
            6 => Tag::Bitmap,
            7 => Tag::ContinuousMode,
            8 => Tag::Clear,
            9 => Tag::BeginFrame,
            10 => Tag::EndFrame,
            other => return Err(DecodeError::UnknownTag(other)),
        })
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct RawHeader {
    tag: u32,
    payload: [u32; PAYLOAD_SIZE / 4],
}

const _: () = assert!(std::mem::size_of::<RawHeader>() == HEADER_SIZE);

/// Fixed-size command header.
///
/// Array variants only carry the element count; `count` floats of xs and
/// then `count` floats of ys follow the header on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Header {
    Point { x: f32, y: f32 },
    PointArray { count: u32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    PolyLine { count: u32 },
    Color { r: f32, g: f32, b: f32 },
    ContinuousMode,
    Clear,
    BeginFrame,
    EndFrame,
}

impl Header {
    pub fn tag(&self) -> Tag {
        match self {
            Header::Point { .. } => Tag::Point,
            Header::PointArray { .. } => Tag::PointArray,
            Header::Line { .. } => Tag::Line,
            Header::PolyLine { .. } => Tag::PolyLine,
            Header::Color { .. } => Tag::Color,
            Header::ContinuousMode => Tag::ContinuousMode,
            Header::Clear => Tag::Clear,
            Header::BeginFrame => Tag::BeginFrame,
            Header::EndFrame => Tag::EndFrame,
        }
    }

    /// Element count of an array command, zero otherwise.
    pub fn count(&self) -> usize {
        match *self {
            Header::PointArray { count } | Header::PolyLine { count } => count as usize,
            _ => 0,
        }
    }

    /// Payload bytes that follow this header on the wire.
    pub fn payload_len(&self) -> usize {
        2 * self.count() * std::mem::size_of::<f32>()
    }

    /// Encodes in native byte order; both ends run on the same machine.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut raw = RawHeader::zeroed();
        raw.tag = self.tag() as u32;

        let p = &mut raw.payload;
        match *self {
            Header::Point { x, y } => {
                p[0] = x.to_bits();
                p[1] = y.to_bits();
            }
            Header::Line { x1, y1, x2, y2 } => {
                p[0] = x1.to_bits();
                p[1] = y1.to_bits();
                p[2] = x2.to_bits();
                p[3] = y2.to_bits();
            }
            Header::PointArray { count } | Header::PolyLine { count } => {
                assert!(count <= i32::MAX as u32, "array count {count} exceeds i32");
                p[0] = count;
            }
            Header::Color { r, g, b } => {
                p[0] = r.to_bits();
                p[1] = g.to_bits();
                p[2] = b.to_bits();
            }
            Header::ContinuousMode | Header::Clear | Header::BeginFrame | Header::EndFrame => {}
        }

        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&raw));
        out
    }

    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Result<Header, DecodeError> {
        let raw: RawHeader = bytemuck::pod_read_unaligned(bytes);
        let p = raw.payload;
        let f = |i: usize| f32::from_bits(p[i]);
        let count = || {
            let n = p[0] as i32;
            if n < 0 {
                Err(DecodeError::NegativeCount(n))
            } else {
                Ok(n as u32)
            }
        };

        Ok(match Tag::try_from(raw.tag)? {
            Tag::Point => Header::Point { x: f(0), y: f(1) },
            Tag::PointArray => Header::PointArray { count: count()? },
            Tag::Line => Header::Line {
                x1: f(0),
                y1: f(1),
                x2: f(2),
                y2: f(3),
            },
            Tag::PolyLine => Header::PolyLine { count: count()? },
            Tag::Color => Header::Color {
                r: f(0),
                g: f(1),
                b: f(2),
            },
            Tag::Bitmap => return Err(DecodeError::ReservedTag(Tag::Bitmap as u32)),
            Tag::ContinuousMode => Header::ContinuousMode,
            Tag::Clear => Header::Clear,
            Tag::BeginFrame => Header::BeginFrame,
            Tag::EndFrame => Header::EndFrame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: u32, first: u32) -> [u8; HEADER_SIZE] {
        let mut r = RawHeader::zeroed();
        r.tag = tag;
        r.payload[0] = first;
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&r));
        out
    }

    #[test]
    fn header_fits_one_atomic_pipe_write() {
        // POSIX guarantees PIPE_BUF >= 512.
        assert!(HEADER_SIZE <= 512);
    }

    #[test]
    fn headers_round_trip() {
        let headers = [
            Header::Point { x: 1.5, y: -2.0 },
            Header::Line {
                x1: 0.0,
                y1: 1.0,
                x2: 0.0,
                y2: 25.0,
            },
            Header::Color { r: 1.0, g: 0.0, b: 0.0 },
            Header::PointArray { count: 5 },
            Header::PolyLine { count: 0 },
            Header::ContinuousMode,
            Header::Clear,
            Header::BeginFrame,
            Header::EndFrame,
        ];
        for h in headers {
            assert_eq!(Header::decode(&h.encode()), Ok(h));
        }
    }

    #[test]
    fn tag_is_first_word() {
        let bytes = Header::EndFrame.encode();
        assert_eq!(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 10);
    }

    #[test]
    fn unknown_tags_are_rejected() {
        assert_eq!(Header::decode(&raw(0, 0)), Err(DecodeError::UnknownTag(0)));
        assert_eq!(Header::decode(&raw(11, 0)), Err(DecodeError::UnknownTag(11)));
        assert_eq!(
            Header::decode(&raw(u32::MAX, 0)),
            Err(DecodeError::UnknownTag(u32::MAX))
        );
    }

    #[test]
    fn bitmap_tag_is_reserved() {
        assert_eq!(Header::decode(&raw(6, 0)), Err(DecodeError::ReservedTag(6)));
    }

    #[test]
    fn negative_count_is_rejected() {
        assert_eq!(
            Header::decode(&raw(Tag::PolyLine as u32, (-3i32) as u32)),
            Err(DecodeError::NegativeCount(-3))
        );
    }

    #[test]
    fn payload_len_covers_both_blocks() {
        assert_eq!(Header::PolyLine { count: 5 }.payload_len(), 40);
        assert_eq!(Header::Point { x: 0.0, y: 0.0 }.payload_len(), 0);
    }
}
