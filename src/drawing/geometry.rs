//! Demo geometry generation
//!
//! Pure functions producing the vertex data the demos upload.

use crate::constants::{SPHERE_GRID, SPHERE_RADIUS};

/// Regular polygon ring: `count` (x, y) pairs on a circle of `radius`
///
/// Vertex i sits at (i + 1) * 360 / count degrees.
pub fn polygon_ring(count: usize, radius: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(count * 2);
    // f64 so the ring stays round for large counts
    let step = 360.0_f64 / count as f64;
    for i in 0..count {
        let radian = (step * (i + 1) as f64).to_radians();
        data.push((radius as f64 * radian.cos()) as f32);
        data.push((radius as f64 * radian.sin()) as f32);
    }
    data
}

/// Next polygon vertex count, wrapping from `max` back to `min`
pub fn next_vertex_count(current: usize, min: usize, max: usize) -> usize {
    if current >= max {
        min
    } else {
        current + 1
    }
}

/// Sphere point cloud: SPHERE_GRID x SPHERE_GRID points, (x, y, z) each
///
/// Point (i, j) is stored at (i * SPHERE_GRID + j) * 3.
pub fn sphere_points() -> Vec<f32> {
    let mut data = vec![0.0f32; SPHERE_GRID * SPHERE_GRID * 3];
    let radius = SPHERE_RADIUS as f64;
    for i in 0..SPHERE_GRID {
        let radian_x = ((i + 1) as f64 * 2.0).to_radians();
        for j in 0..SPHERE_GRID {
            let radian_z = ((j + 1) as f64 * 2.0).to_radians();
            let base = (i * SPHERE_GRID + j) * 3;
            data[base] = (radius * radian_x.cos() * radian_z.sin()) as f32;
            data[base + 1] = (radius * radian_x.sin() * radian_z.cos()) as f32;
            data[base + 2] = (radius * radian_z.cos()) as f32;
        }
    }
    data
}

/// Axis-aligned quad as a triangle fan: x, y, z, u, v per vertex
///
/// Order: top-left, bottom-left, bottom-right, top-right.
pub fn textured_quad(left: f32, top: f32, right: f32, bottom: f32) -> [f32; 20] {
    #[rustfmt::skip]
    let quad = [
        left,  top,    0.0, 0.0, 1.0,
        left,  bottom, 0.0, 0.0, 0.0,
        right, bottom, 0.0, 1.0, 0.0,
        right, top,    0.0, 1.0, 1.0,
    ];
    quad
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{POLYGON_MAX_VERTICES, POLYGON_MIN_VERTICES, POLYGON_RADIUS};

    #[test]
    fn test_polygon_ring_points_on_circle() {
        for n in POLYGON_MIN_VERTICES..=POLYGON_MAX_VERTICES {
            let data = polygon_ring(n, POLYGON_RADIUS);
            assert_eq!(data.len(), n * 2);
            for i in 0..n {
                let (x, y) = (data[i * 2], data[i * 2 + 1]);
                let r = (x * x + y * y).sqrt();
                assert!((r - POLYGON_RADIUS).abs() < 1e-5, "n={} i={} r={}", n, i, r);

                let expected = (i + 1) as f64 * 360.0 / n as f64;
                let angle = (y as f64).atan2(x as f64).to_degrees().rem_euclid(360.0);
                let diff = (angle - expected.rem_euclid(360.0)).abs();
                assert!(diff < 1e-3 || (360.0 - diff) < 1e-3, "n={} i={}", n, i);
            }
        }
    }

    #[test]
    fn test_polygon_ring_spacing() {
        let n = 7;
        let data = polygon_ring(n, 1.0);
        let expected = (360.0_f64 / n as f64).to_radians();
        for i in 0..n - 1 {
            let a = (data[i * 2 + 1] as f64).atan2(data[i * 2] as f64);
            let b = (data[i * 2 + 3] as f64).atan2(data[i * 2 + 2] as f64);
            let delta = (b - a).rem_euclid(std::f64::consts::TAU);
            assert!((delta - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_next_vertex_count_wraps() {
        assert_eq!(next_vertex_count(3, 3, 30), 4);
        assert_eq!(next_vertex_count(29, 3, 30), 30);
        assert_eq!(next_vertex_count(30, 3, 30), 3);
    }

    #[test]
    fn test_sphere_point_indexing() {
        let data = sphere_points();
        assert_eq!(data.len(), SPHERE_GRID * SPHERE_GRID * 3);

        // Every slot is written by its own (i, j): spot check against the formula
        for &(i, j) in &[(0usize, 0usize), (17, 42), (179, 179), (90, 3)] {
            let rx = ((i + 1) as f64 * 2.0).to_radians();
            let rz = ((j + 1) as f64 * 2.0).to_radians();
            let base = (i * SPHERE_GRID + j) * 3;
            let r = SPHERE_RADIUS as f64;
            assert!((data[base] as f64 - r * rx.cos() * rz.sin()).abs() < 1e-6);
            assert!((data[base + 1] as f64 - r * rx.sin() * rz.cos()).abs() < 1e-6);
            assert!((data[base + 2] as f64 - r * rz.cos()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sphere_points_within_radius_bounds() {
        let data = sphere_points();
        for p in data.chunks(3) {
            for c in p {
                assert!(c.abs() <= SPHERE_RADIUS + 1e-6);
            }
        }
    }

    #[test]
    fn test_textured_quad_layout() {
        let quad = textured_quad(-1.0, 1.0, 1.0, -1.0);
        // top-left samples v = 1, which the shader flips to the image's first row
        assert_eq!(&quad[0..5], &[-1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(&quad[15..20], &[1.0, 1.0, 0.0, 1.0, 1.0]);
    }
}
