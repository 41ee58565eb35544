/// Number of triangles a fan over a polygon with `len` corners produces.
#[inline]
pub fn num_fan_triangles(len: usize) -> usize {
    len.saturating_sub(2)
}

/// Splits a polygon into the fan `(l[0], l[1 + i], l[2 + i])`.
/// Polygons with fewer than three corners yield nothing. Convexity is not checked.
pub fn triangulate_fan<T: Copy>(polygon: &[T]) -> Vec<[T; 3]> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    polygon[1..].windows(2)
        .map(|w| [polygon[0], w[0], w[1]])
        .collect()
}
