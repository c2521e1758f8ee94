//! Geometry primitives on landmark positions
//!
//! All functions operate on normalized planar coordinates and ignore depth.
//! Remember the screen convention: y grows downward, so "p is above q" means
//! `p.y < q.y`. [`vertical_offset`] encodes exactly that contract.

use crate::landmark::Landmark;

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees within
/// [0, 180].
///
/// Computed from the normalized dot product of the two rays. A degenerate
/// ray (zero length, e.g. two coincident landmarks) returns 0.0 as a defined
/// sentinel; every angle criterion treats 0° as its lowest band, so the
/// sentinel can never inflate a score.
pub fn angle(a: Landmark, b: Landmark, c: Landmark) -> f32 {
    let (bax, bay) = (a.x - b.x, a.y - b.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);

    let len_ba = (bax * bax + bay * bay).sqrt();
    let len_bc = (bcx * bcx + bcy * bcy).sqrt();
    if len_ba == 0.0 || len_bc == 0.0 {
        return 0.0;
    }

    let cos = ((bax * bcx + bay * bcy) / (len_ba * len_bc)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Signed vertical offset `p.y - q.y`.
///
/// Positive means `p` is *lower on screen* than `q` (y grows downward).
/// Equivalently, `vertical_offset(hip, knee) > 0` means the knee sits above
/// the hip. This inverted reading is the most error-prone contract in the
/// engine; call sites should name the result for what it measures.
pub fn vertical_offset(p: Landmark, q: Landmark) -> f32 {
    p.y - q.y
}

/// Absolute horizontal distance `|p.x - q.x|`
pub fn horizontal_distance(p: Landmark, q: Landmark) -> f32 {
    (p.x - q.x).abs()
}

/// Planar Euclidean distance, ignoring depth
pub fn euclidean(p: Landmark, q: Landmark) -> f32 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    (dx * dx + dy * dy).sqrt()
}

/// Visibility gate. A landmark failing its threshold must never be used as
/// positive evidence for any criterion.
pub fn visible(lm: Landmark, threshold: f32) -> bool {
    lm.visibility > threshold
}
