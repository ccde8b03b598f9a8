use super::{Header, HEADER_SIZE};

/// Fully decoded command with owned payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Point { x: f32, y: f32 },
    PointArray { xs: Vec<f32>, ys: Vec<f32> },
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    PolyLine { xs: Vec<f32>, ys: Vec<f32> },
    Color { r: f32, g: f32, b: f32 },
    ContinuousMode,
    Clear,
    BeginFrame,
    EndFrame,
}

impl Command {
    pub fn header(&self) -> Header {
        match self {
            &Command::Point { x, y } => Header::Point { x, y },
            Command::PointArray { xs, .. } => Header::PointArray {
                count: xs.len() as u32,
            },
            &Command::Line { x1, y1, x2, y2 } => Header::Line { x1, y1, x2, y2 },
            Command::PolyLine { xs, .. } => Header::PolyLine {
                count: xs.len() as u32,
            },
            &Command::Color { r, g, b } => Header::Color { r, g, b },
            Command::ContinuousMode => Header::ContinuousMode,
            Command::Clear => Header::Clear,
            Command::BeginFrame => Header::BeginFrame,
            Command::EndFrame => Header::EndFrame,
        }
    }

    /// Builds the owned command for `header` from its payload blocks.
    ///
    /// # Panics
    /// Panics if an array header's blocks do not both hold `count` floats.
    pub fn from_parts(header: Header, xs: Vec<f32>, ys: Vec<f32>) -> Command {
        if let Header::PointArray { .. } | Header::PolyLine { .. } = header {
            let n = header.count();
            assert!(
                xs.len() == n && ys.len() == n,
                "{:?} expects {n} xs and ys, got {} and {}",
                header.tag(),
                xs.len(),
                ys.len()
            );
        }

        match header {
            Header::Point { x, y } => Command::Point { x, y },
            Header::PointArray { .. } => Command::PointArray { xs, ys },
            Header::Line { x1, y1, x2, y2 } => Command::Line { x1, y1, x2, y2 },
            Header::PolyLine { .. } => Command::PolyLine { xs, ys },
            Header::Color { r, g, b } => Command::Color { r, g, b },
            Header::ContinuousMode => Command::ContinuousMode,
            Header::Clear => Command::Clear,
            Header::BeginFrame => Command::BeginFrame,
            Header::EndFrame => Command::EndFrame,
        }
    }

    /// Payload blocks (xs, ys) of an array command.
    pub fn blocks(&self) -> Option<(&[f32], &[f32])> {
        match self {
            Command::PointArray { xs, ys } | Command::PolyLine { xs, ys } => Some((xs, ys)),
            _ => None,
        }
    }

    /// Appends the bytes that follow the header: xs then ys, native order.
    pub fn encode_payload(&self, out: &mut Vec<u8>) {
        if let Some((xs, ys)) = self.blocks() {
            out.extend_from_slice(bytemuck::cast_slice(xs));
            out.extend_from_slice(bytemuck::cast_slice(ys));
        }
    }

    /// Header and payload as one buffer.
    pub fn encode(&self) -> Vec<u8> {
        let header = self.header();
        let mut out = Vec::with_capacity(HEADER_SIZE + header.payload_len());
        out.extend_from_slice(&header.encode());
        self.encode_payload(&mut out);
        out
    }

    /// Coordinates this command contributes to the view bounds.
    pub fn coordinates(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let (pairs, n) = match *self {
            Command::Point { x, y } => ([(x, y), (x, y)], 1),
            Command::Line { x1, y1, x2, y2 } => ([(x1, y1), (x2, y2)], 2),
            _ => ([(0.0, 0.0); 2], 0),
        };
        let (xs, ys) = self.blocks().unwrap_or((&[], &[]));

        pairs
            .into_iter()
            .take(n)
            .chain(xs.iter().copied().zip(ys.iter().copied()))
    }
}

/// Splits a payload of two equal float blocks.
pub(crate) fn split_blocks(payload: &[u8]) -> (Vec<f32>, Vec<f32>) {
    let half = payload.len() / 2;
    let floats = |bytes: &[u8]| -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    };
    (floats(&payload[..half]), floats(&payload[half..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Command {
        let mut head = [0u8; HEADER_SIZE];
        head.copy_from_slice(&bytes[..HEADER_SIZE]);
        let header = Header::decode(&head).unwrap();
        let payload = &bytes[HEADER_SIZE..];
        assert_eq!(payload.len(), header.payload_len());
        let (xs, ys) = split_blocks(payload);
        Command::from_parts(header, xs, ys)
    }

    fn bits(v: &[f32]) -> Vec<u32> {
        v.iter().map(|f| f.to_bits()).collect()
    }

    #[test]
    fn polyline_round_trip_is_bit_identical() {
        for n in [0usize, 1, 2, 5, 127, 1000] {
            let xs: Vec<f32> = (0..n).map(|i| i as f32 * 0.1 - 3.0).collect();
            let ys: Vec<f32> = (0..n).map(|i| (i as f32).sqrt() * -1.0e-7).collect();
            let cmd = Command::PolyLine {
                xs: xs.clone(),
                ys: ys.clone(),
            };

            let bytes = cmd.encode();
            assert_eq!(bytes.len(), HEADER_SIZE + 8 * n);

            let Command::PolyLine { xs: dx, ys: dy } = decode(&bytes) else {
                panic!("decoded a different command");
            };
            assert_eq!(bits(&dx), bits(&xs));
            assert_eq!(bits(&dy), bits(&ys));
        }
    }

    #[test]
    fn empty_array_is_header_only() {
        let cmd = Command::PointArray {
            xs: vec![],
            ys: vec![],
        };
        assert_eq!(cmd.encode().len(), HEADER_SIZE);
    }

    #[test]
    fn special_floats_survive() {
        let cmd = Command::PointArray {
            xs: vec![f32::NAN, -0.0, f32::INFINITY],
            ys: vec![f32::MIN_POSITIVE, f32::MAX, f32::NEG_INFINITY],
        };
        let Command::PointArray { xs, ys } = decode(&cmd.encode()) else {
            panic!("decoded a different command");
        };
        assert_eq!(bits(&xs), bits(&[f32::NAN, -0.0, f32::INFINITY]));
        assert_eq!(ys[2], f32::NEG_INFINITY);
    }

    #[test]
    #[should_panic(expected = "expects 2 xs and ys")]
    fn from_parts_checks_block_lengths() {
        Command::from_parts(Header::PolyLine { count: 2 }, vec![1.0], vec![1.0, 2.0]);
    }

    #[test]
    fn coordinates_cover_every_point() {
        let line = Command::Line {
            x1: 0.0,
            y1: 1.0,
            x2: 5.0,
            y2: 25.0,
        };
        assert_eq!(line.coordinates().collect::<Vec<_>>(), vec![(0.0, 1.0), (5.0, 25.0)]);

        let pts = Command::PointArray {
            xs: vec![1.0, 2.0],
            ys: vec![3.0, 4.0],
        };
        assert_eq!(pts.coordinates().count(), 2);
        assert_eq!(Command::Color { r: 1.0, g: 0.0, b: 0.0 }.coordinates().count(), 0);
    }
}
