//! # Cube Meshes
//!
//! Two fixed descriptions of the same ±1 cube, both wound clockwise when seen
//! from outside (front faces in a left-handed system):
//!
//! - [`generate_indexed_cube`]: 8 shared corners, 36 `u16` indices
//! - [`generate_face_colored_cube`]: 36 vertices, one flat color per face

use super::CubeMesh;
use crate::gfx::rendering::vertex::{ColorVertex, HomogeneousColorVertex};

const HALF_ALPHA: f32 = 0.5;

#[rustfmt::skip]
const CORNERS: [ColorVertex; 8] = [
    ColorVertex::new([-1.0,  1.0, -1.0], [0.0, 0.0, 1.0, HALF_ALPHA]),
    ColorVertex::new([ 1.0,  1.0, -1.0], [0.0, 1.0, 0.0, HALF_ALPHA]),
    ColorVertex::new([ 1.0,  1.0,  1.0], [0.0, 1.0, 1.0, HALF_ALPHA]),
    ColorVertex::new([-1.0,  1.0,  1.0], [1.0, 0.0, 0.0, HALF_ALPHA]),
    ColorVertex::new([-1.0, -1.0, -1.0], [1.0, 0.0, 1.0, HALF_ALPHA]),
    ColorVertex::new([ 1.0, -1.0, -1.0], [1.0, 1.0, 0.0, HALF_ALPHA]),
    ColorVertex::new([ 1.0, -1.0,  1.0], [1.0, 1.0, 1.0, HALF_ALPHA]),
    ColorVertex::new([-1.0, -1.0,  1.0], [0.0, 0.0, 0.0, HALF_ALPHA]),
];

#[rustfmt::skip]
const CORNER_INDICES: [u16; 36] = [
    3, 1, 0,    2, 1, 3, // top
    0, 5, 4,    1, 5, 0, // front
    3, 4, 7,    0, 4, 3, // left
    1, 6, 5,    2, 6, 1, // right
    2, 7, 6,    3, 7, 2, // back
    6, 4, 5,    7, 4, 6, // bottom
];

/// Corners of one face, already split into two clockwise triangles.
type FaceTriangles = [[f32; 3]; 6];

#[rustfmt::skip]
const FACES: [(FaceTriangles, [f32; 4]); 6] = [
    // Front (-Z)
    ([[-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0],
      [-1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0]], [1.0, 0.0, 0.0, 1.0]),
    // Back (+Z)
    ([[-1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0],
      [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0]], [0.0, 1.0, 0.0, 1.0]),
    // Top (+Y)
    ([[-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
      [-1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0]], [0.0, 0.0, 1.0, 1.0]),
    // Bottom (-Y)
    ([[-1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
      [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0]], [1.0, 1.0, 0.0, 1.0]),
    // Left (-X)
    ([[-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0],
      [-1.0, -1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0]], [1.0, 0.0, 1.0, 1.0]),
    // Right (+X)
    ([[ 1.0, -1.0, -1.0], [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0],
      [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0]], [0.0, 1.0, 1.0, 1.0]),
];

/// 8 half-transparent colored corners shared through an index buffer.
pub fn generate_indexed_cube() -> CubeMesh<ColorVertex> {
    CubeMesh {
        vertices: CORNERS.to_vec(),
        indices: Some(CORNER_INDICES.to_vec()),
    }
}

/// 36 unshared vertices, each face a single opaque color.
pub fn generate_face_colored_cube() -> CubeMesh<HomogeneousColorVertex> {
    let vertices = FACES
        .iter()
        .flat_map(|(corners, color)| {
            corners
                .iter()
                .map(move |&[x, y, z]| {
                    HomogeneousColorVertex::new([x, y, z, 1.0], *color)
                })
        })
        .collect();

    CubeMesh {
        vertices,
        indices: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    /// Clockwise-from-outside triangles have `(b - a) x (c - a)` pointing away
    /// from the cube center.
    fn faces_outward(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> bool {
        let (a, b, c) = (Vector3::from(a), Vector3::from(b), Vector3::from(c));
        let normal = (b - a).cross(c - a);
        let centroid = (a + b + c) / 3.0;
        normal.dot(centroid) > 0.0
    }

    #[test]
    fn test_indexed_cube_generation() {
        let cube = generate_indexed_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.draw_count(), 36);
        assert_eq!(cube.triangle_count(), 12);

        let indices = cube.indices.as_ref().unwrap();
        assert!(indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
        for triangle in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| cube.vertices[triangle[k] as usize].position);
            assert!(
                faces_outward(a, b, c),
                "triangle {triangle:?} is not clockwise"
            );
        }
    }

    #[test]
    fn test_face_colored_cube_generation() {
        let cube = generate_face_colored_cube();
        assert_eq!(cube.vertex_count(), 36);
        assert_eq!(cube.draw_count(), 36);
        assert!(cube.indices.is_none());

        for triangle in cube.vertices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| {
                let p = triangle[k].position;
                assert_eq!(p[3], 1.0);
                [p[0], p[1], p[2]]
            });
            assert!(faces_outward(a, b, c));
        }

        for face in cube.vertices.chunks(6) {
            assert!(face.iter().all(|v| v.color == face[0].color));
        }
    }
}
