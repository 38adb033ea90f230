//! Tile-to-tile neighbour resolution across the 30-face grid, including
//! face-seam crossings.

use spheric_types::{Direction, TileKey, GRID_SIZE};

use crate::topology::TOPOLOGY;

const LAST: u8 = GRID_SIZE - 1;

/// The tile adjacent to `key` in direction `dir`, and the direction the
/// caller now faces (identical to `dir` unless a face seam was crossed).
///
/// Total over the whole grid: every tile has exactly one neighbour in
/// each of the four directions, including tiles on a face boundary.
#[must_use]
pub fn neighbor(key: TileKey, dir: Direction) -> (TileKey, Direction) {
    match dir {
        Direction::West if key.col > 0 => (TileKey::new(key.face, key.row, key.col - 1), dir),
        Direction::East if key.col < LAST => (TileKey::new(key.face, key.row, key.col + 1), dir),
        Direction::North if key.row > 0 => (TileKey::new(key.face, key.row - 1, key.col), dir),
        Direction::South if key.row < LAST => (TileKey::new(key.face, key.row + 1, key.col), dir),
        _ => cross_seam(key, dir),
    }
}

fn cross_seam(key: TileKey, dir: Direction) -> (TileKey, Direction) {
    let (other_face, exit_dir, flip) = TOPOLOGY.seam(key.face, dir);

    // The along-seam coordinate is `row` when crossing a W/E edge, `col`
    // when crossing a N/S edge; the other coordinate is pinned to the
    // boundary of the edge being entered.
    let along = match dir {
        Direction::West | Direction::East => key.row,
        Direction::North | Direction::South => key.col,
    };
    let along = if flip { LAST - along } else { along };

    let entry_edge = exit_dir.opposite();
    let new_key = match entry_edge {
        Direction::West => TileKey::new(other_face, along, 0),
        Direction::East => TileKey::new(other_face, along, LAST),
        Direction::North => TileKey::new(other_face, 0, along),
        Direction::South => TileKey::new(other_face, LAST, along),
    };

    (new_key, exit_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spheric_types::FACE_COUNT;

    #[test]
    fn interior_step_keeps_face_and_direction() {
        let key = TileKey::new(3, 10, 10);
        for dir in Direction::ALL {
            let (next, out_dir) = neighbor(key, dir);
            assert_eq!(next.face, key.face);
            assert_eq!(out_dir, dir);
        }
    }

    #[test]
    fn stepping_west_then_east_returns_to_origin() {
        let key = TileKey::new(7, 20, 20);
        let (west, _) = neighbor(key, Direction::West);
        let (back, _) = neighbor(west, Direction::East);
        assert_eq!(back, key);
    }

    #[test]
    fn geometry_closure_holds_across_every_face_boundary() {
        for face in 0..FACE_COUNT {
            for dir in Direction::ALL {
                let boundary_key = match dir {
                    Direction::West => TileKey::new(face, 17, 0),
                    Direction::East => TileKey::new(face, 17, LAST),
                    Direction::North => TileKey::new(face, 0, 17),
                    Direction::South => TileKey::new(face, LAST, 17),
                };
                let (next, out_dir) = neighbor(boundary_key, dir);
                assert_ne!(next.face, face, "face {face} dir {dir:?} did not cross a seam");
                let (back, _) = neighbor(next, out_dir.opposite());
                assert_eq!(back, boundary_key, "closure failed for face {face} dir {dir:?}");
            }
        }
    }

    #[test]
    fn every_tile_has_a_neighbor_in_every_direction() {
        let key = TileKey::new(0, 0, 0);
        for dir in Direction::ALL {
            let (next, _) = neighbor(key, dir);
            assert!(next.row < GRID_SIZE);
            assert!(next.col < GRID_SIZE);
            assert!(next.face < FACE_COUNT);
        }
    }
}
