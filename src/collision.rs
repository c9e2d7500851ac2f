/// Axis-aligned rectangle overlap.
///
/// Positions are top-left corners in screen pixels with y growing downward.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Bounds { x, y, width, height }
    }
}

/// Anything that occupies a box on screen.
pub trait Hitbox {
    fn bounds(&self) -> Bounds;
}

impl Hitbox for Bounds {
    fn bounds(&self) -> Bounds {
        *self
    }
}

/// True iff both boxes are present and intersect.
///
/// All four comparisons are strict, so boxes that only share an edge do not
/// overlap.
pub fn overlaps(a: Option<Bounds>, b: Option<Bounds>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            a.x < b.x + b.width
                && a.x + a.width > b.x
                && a.y < b.y + b.height
                && a.y + a.height > b.y
        }
        _ => false,
    }
}

pub fn collides<A: Hitbox + ?Sized, B: Hitbox + ?Sized>(a: &A, b: &B) -> bool {
    overlaps(Some(a.bounds()), Some(b.bounds()))
}
