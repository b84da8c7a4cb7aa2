use egui::Pos2;

/// Shortest distance from `p` to the segment `a`-`b`.
///
/// Projects `p` onto the segment's line and clamps the parameter to the
/// segment; a degenerate segment collapses to the distance to `a`.
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let l2 = ab.length_sq();
    if l2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / l2).clamp(0.0, 1.0);
    let projection = a + t * ab;
    p.distance(projection)
}
