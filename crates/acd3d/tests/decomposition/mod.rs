mod cancellation;
mod cube;
mod flat;
mod interface;
mod l_shape;
mod session;

/// Flat buffers of the unit cube, with outward-oriented triangles.
pub fn cube() -> (Vec<f64>, Vec<u32>) {
    let points = vec![
        0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
    ];
    let triangles = vec![
        0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, //
        1, 2, 6, 1, 6, 5, 2, 3, 7, 2, 7, 6, 3, 0, 4, 3, 4, 7,
    ];
    (points, triangles)
}

/// Flat buffers of an L-shaped prism of volume 3: the union of the boxes
/// `[0, 2] x [0, 1] x [0, 1]` and `[0, 1] x [1, 2] x [0, 1]`.
pub fn l_shape() -> (Vec<f64>, Vec<u32>) {
    // Counterclockwise profile in the xy plane. Vertex 3 is the reflex corner.
    let profile = [
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 1.0],
        [1.0, 1.0],
        [1.0, 2.0],
        [0.0, 2.0],
    ];
    let n = profile.len() as u32;

    let mut points = Vec::new();
    for z in [0.0, 1.0] {
        for [x, y] in profile {
            points.extend_from_slice(&[x, y, z]);
        }
    }

    let mut triangles = Vec::new();
    // Top and bottom faces, as fans around the reflex corner.
    for i in [4, 5, 0, 1] {
        let j = (i + 1) % n;
        triangles.extend_from_slice(&[3 + n, i + n, j + n]);
        triangles.extend_from_slice(&[3, j, i]);
    }

    // Side faces.
    for i in 0..n {
        let j = (i + 1) % n;
        triangles.extend_from_slice(&[i, j, j + n]);
        triangles.extend_from_slice(&[i, j + n, i + n]);
    }

    (points, triangles)
}

pub fn triangle_count(triangles: &[u32]) -> u32 {
    triangles.len() as u32 / 3
}

pub fn point_count(points: &[f64]) -> u32 {
    points.len() as u32 / 3
}
