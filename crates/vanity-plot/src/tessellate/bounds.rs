use glam::Vec2;

use crate::consumer::DisplayList;

/// Fraction of each span added on both sides by [`Bounds::padded`].
pub const MARGIN: f32 = 0.05;

/// Axis-aligned box in data coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Smallest box holding every finite coordinate of `list`.
    ///
    /// `None` when the list carries no coordinates at all.
    pub fn of(list: &DisplayList) -> Option<Bounds> {
        list.iter()
            .flat_map(|cmd| cmd.coordinates())
            .map(|(x, y)| Vec2::new(x, y))
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<Bounds>, p| {
                Some(match acc {
                    Some(b) => Bounds {
                        min: b.min.min(p),
                        max: b.max.max(p),
                    },
                    None => Bounds { min: p, max: p },
                })
            })
    }

    pub fn size(self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Widens a zero span to ±1 around its value, then adds [`MARGIN`] of
    /// the span on each side.
    pub fn padded(self) -> Bounds {
        let (min_x, max_x) = pad_axis(self.min.x, self.max.x);
        let (min_y, max_y) = pad_axis(self.min.y, self.max.y);
        Bounds {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }
}

fn pad_axis(mut lo: f32, mut hi: f32) -> (f32, f32) {
    if lo == hi {
        lo -= 1.0;
        hi += 1.0;
    }
    let margin = (hi - lo) * MARGIN;
    (lo - margin, hi + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Command;
    use approx::assert_relative_eq;

    #[test]
    fn empty_list_has_no_bounds() {
        assert_eq!(Bounds::of(&DisplayList::new()), None);

        let only_state: DisplayList = [
            Command::Color { r: 1.0, g: 0.0, b: 0.0 },
            Command::Clear,
            Command::PolyLine { xs: vec![], ys: vec![] },
        ]
        .into_iter()
        .collect();
        assert_eq!(Bounds::of(&only_state), None);
    }

    #[test]
    fn covers_every_coordinate() {
        let list: DisplayList = [
            Command::Point { x: 2.0, y: -3.0 },
            Command::Line { x1: 0.0, y1: 1.0, x2: 0.0, y2: 25.0 },
            Command::PolyLine {
                xs: vec![1.0, 5.0],
                ys: vec![1.0, 4.0],
            },
        ]
        .into_iter()
        .collect();

        let b = Bounds::of(&list).unwrap();
        assert_eq!(b.min, Vec2::new(0.0, -3.0));
        assert_eq!(b.max, Vec2::new(5.0, 25.0));
    }

    #[test]
    fn non_finite_coordinates_are_ignored() {
        let list: DisplayList = [
            Command::Point { x: f32::NAN, y: 1.0 },
            Command::Point { x: 3.0, y: f32::INFINITY },
            Command::Point { x: 1.0, y: 2.0 },
        ]
        .into_iter()
        .collect();

        let b = Bounds::of(&list).unwrap();
        assert_eq!(b.min, Vec2::new(1.0, 2.0));
        assert_eq!(b.max, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn degenerate_span_pads_by_one() {
        let b = Bounds {
            min: Vec2::new(3.0, -2.0),
            max: Vec2::new(3.0, -2.0),
        }
        .padded();

        assert_relative_eq!(b.min.x, 1.9);
        assert_relative_eq!(b.max.x, 4.1);
        assert_relative_eq!(b.min.y, -3.1);
        assert_relative_eq!(b.max.y, -0.9);
    }

    #[test]
    fn margin_is_symmetric() {
        let b = Bounds {
            min: Vec2::new(0.0, 10.0),
            max: Vec2::new(20.0, 30.0),
        }
        .padded();

        assert_relative_eq!(b.min.x, -1.0);
        assert_relative_eq!(b.max.x, 21.0);
        assert_relative_eq!(b.min.y, 9.0);
        assert_relative_eq!(b.max.y, 31.0);
        assert_relative_eq!(b.center().x, 10.0);
    }
}
