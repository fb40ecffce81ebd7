//! Buffer comparison helpers for regression checks

/// Largest absolute elementwise difference, or `None` when lengths differ
pub fn max_abs_diff(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    Some(
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0f32, f32::max),
    )
}

/// True when both buffers have the same length and agree within `tolerance`
pub fn buffers_match(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
}
