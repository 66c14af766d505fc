//! Placement policies for newly displayed vertices

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// An axis-aligned rectangle: origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    /// A canvas of the given size anchored at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Bounds::new(0.0, 0.0, width, height)
    }

    /// Inclusive on all edges.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Smallest rectangle enclosing every point, or `None` for no points.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Chooses where a vertex is first drawn.
///
/// Any `FnMut(&str, Bounds) -> Point` closure is a placement policy.
pub trait Placement {
    fn place(&mut self, key: &str, bounds: Bounds) -> Point;
}

impl<F> Placement for F
where
    F: FnMut(&str, Bounds) -> Point,
{
    fn place(&mut self, key: &str, bounds: Bounds) -> Point {
        self(key, bounds)
    }
}

/// Uniform random position inside the bounds.
pub struct RandomPlacement {
    rng: StdRng,
}

impl RandomPlacement {
    /// Seeded placement is reproducible; `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RandomPlacement { rng }
    }
}

impl Placement for RandomPlacement {
    fn place(&mut self, _key: &str, bounds: Bounds) -> Point {
        Point::new(
            bounds.x + self.rng.random::<f64>() * bounds.width,
            bounds.y + self.rng.random::<f64>() * bounds.height,
        )
    }
}

/// Row-major grid, one cell per placed vertex, wrapping at the bounds' width.
///
/// Once every cell that fits inside the bounds is taken, placement starts
/// over from the top-left cell, so points never leave the bounds.
#[derive(Debug, Clone)]
pub struct GridPlacement {
    spacing: f64,
    placed: usize,
}

impl GridPlacement {
    pub fn new(spacing: f64) -> Self {
        GridPlacement {
            spacing: spacing.max(f64::EPSILON),
            placed: 0,
        }
    }
}

impl Placement for GridPlacement {
    fn place(&mut self, _key: &str, bounds: Bounds) -> Point {
        let columns = ((bounds.width / self.spacing).floor() as usize).max(1);
        let rows = ((bounds.height / self.spacing).floor() as usize).max(1);
        let column = self.placed % columns;
        let row = (self.placed / columns) % rows;
        self.placed += 1;

        let half = self.spacing / 2.0;
        Point::new(
            bounds.x + half + column as f64 * self.spacing,
            bounds.y + half + row as f64 * self.spacing,
        )
    }
}
