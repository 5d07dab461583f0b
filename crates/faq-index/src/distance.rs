//! Distance kernel

/// Squared euclidean distance between two vectors of equal length.
///
/// No square root is taken: the value is monotonic with the true distance,
/// which is all ranking needs. Callers check lengths beforehand.
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let n = a.len().min(b.len());
    let mut sum = 0.0f32;
    let mut i = 0;

    // Unrolling 4
    while i + 3 < n {
        let d0 = a[i] - b[i];
        let d1 = a[i + 1] - b[i + 1];
        let d2 = a[i + 2] - b[i + 2];
        let d3 = a[i + 3] - b[i + 3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
        i += 4;
    }

    while i < n {
        let d = a[i] - b[i];
        sum += d * d;
        i += 1;
    }

    sum
}
