//! Quadrant shifts that move the DC term between the corner and the centre.
//!
//! `shift` matches the usual `fftshift` convention (roll by `n / 2` on each
//! axis) and `unshift` undoes it (roll by `n - n / 2`). For odd sizes these
//! are different permutations, so callers must pair them rather than apply
//! `shift` twice.

/// Move DC from `(0, 0)` to `(width / 2, height / 2)`.
pub fn shift<T: Copy>(data: &[T], width: usize, height: usize) -> Vec<T> {
    roll(data, width, height, width / 2, height / 2)
}

/// Inverse of [`shift`]: move DC from the centre back to `(0, 0)`.
pub fn unshift<T: Copy>(data: &[T], width: usize, height: usize) -> Vec<T> {
    roll(data, width, height, width - width / 2, height - height / 2)
}

/// Circular roll: the element at `(x, y)` lands at `((x + dx) % w, (y + dy) % h)`.
fn roll<T: Copy>(data: &[T], width: usize, height: usize, dx: usize, dy: usize) -> Vec<T> {
    debug_assert_eq!(data.len(), width * height);
    if data.is_empty() {
        return Vec::new();
    }
    let mut out = data.to_vec();
    for y in 0..height {
        let ty = (y + dy) % height;
        for x in 0..width {
            let tx = (x + dx) % width;
            out[ty * width + tx] = data[y * width + x];
        }
    }
    out
}
