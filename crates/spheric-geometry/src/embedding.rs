//! Latitude derivation for world generation's biome banding.
//!
//! The face-adjacency graph in [`crate::topology`] is purely combinatorial
//! and needs no 3D embedding to resolve neighbours. World generation,
//! though, buckets faces into biome bands by latitude, so this module
//! assigns each of the icosahedron's 12 vertices its `z` coordinate in a
//! regular icosahedron with a vertex at each pole (pentagonal antiprism
//! capped by two pyramids), and derives each face's latitude as the
//! midpoint of its edge's two endpoints.

use crate::topology::ICOSAHEDRON_EDGES;

/// `z` coordinate of each of the 12 icosahedron vertices in a unit-radius
/// regular icosahedron with vertex `0` at the north pole and `11` at the
/// south pole. Ring vertices sit at `z = +-1/sqrt(5)`.
const VERTEX_Z: [f64; 12] = [
    1.0,
    0.447_213_595_499_958,
    0.447_213_595_499_958,
    0.447_213_595_499_958,
    0.447_213_595_499_958,
    0.447_213_595_499_958,
    -0.447_213_595_499_958,
    -0.447_213_595_499_958,
    -0.447_213_595_499_958,
    -0.447_213_595_499_958,
    -0.447_213_595_499_958,
    -1.0,
];

/// The latitude of a face's centroid, in `-1.0..=1.0`, where `1.0` is the
/// north pole and `-1.0` the south pole. Used to bucket faces into biome
/// bands before per-tile jitter is applied.
#[must_use]
pub fn face_latitude(face: u8) -> f64 {
    let (a, b) = ICOSAHEDRON_EDGES.get(face as usize).copied().unwrap_or((0, 0));
    let z_a = VERTEX_Z.get(a as usize).copied().unwrap_or(0.0);
    let z_b = VERTEX_Z.get(b as usize).copied().unwrap_or(0.0);
    (z_a + z_b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_faces_have_extreme_latitude() {
        let north_face_latitude = face_latitude(0);
        assert!(north_face_latitude > 0.7, "face 0 touches the north pole vertex");
    }

    #[test]
    fn latitudes_stay_within_unit_range() {
        for face in 0..30 {
            let lat = face_latitude(face);
            assert!((-1.0..=1.0).contains(&lat));
        }
    }

    #[test]
    fn latitude_is_deterministic() {
        for face in 0..30 {
            assert!((face_latitude(face) - face_latitude(face)).abs() < f64::EPSILON);
        }
    }
}
