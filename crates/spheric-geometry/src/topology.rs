//! Static face-adjacency derivation for the 30-face rhombic triacontahedron.
//!
//! The 30 faces correspond one-to-one with the 30 edges of an icosahedron;
//! two faces are adjacent exactly when their icosahedron edges share a
//! vertex and bound a common icosahedron triangle. That relation yields a
//! 4-regular graph on 30 nodes (60 undirected adjacencies, matching the 60
//! edges of the icosahedron's dual), which lines up exactly with each face
//! needing one neighbour per cardinal direction.
//!
//! The icosahedron is built as a pentagonal antiprism capped by two
//! pyramids: vertex `0` is the north pole, `1..=5` the upper ring, `6..=10`
//! the lower ring, `11` the south pole.

use std::sync::LazyLock;

use spheric_types::Direction;

use crate::FACE_COUNT;

pub(crate) const ICOSAHEDRON_EDGES: [(u8, u8); 30] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (0, 5),
    (1, 2),
    (2, 3),
    (3, 4),
    (4, 5),
    (5, 1),
    (1, 6),
    (2, 7),
    (3, 8),
    (4, 9),
    (5, 10),
    (1, 10),
    (2, 6),
    (3, 7),
    (4, 8),
    (5, 9),
    (6, 7),
    (7, 8),
    (8, 9),
    (9, 10),
    (10, 6),
    (11, 6),
    (11, 7),
    (11, 8),
    (11, 9),
    (11, 10),
];

const ICOSAHEDRON_FACES: [(u8, u8, u8); 20] = [
    (0, 1, 2),
    (0, 2, 3),
    (0, 3, 4),
    (0, 4, 5),
    (0, 5, 1),
    (1, 2, 6),
    (2, 3, 7),
    (3, 4, 8),
    (4, 5, 9),
    (5, 1, 10),
    (2, 6, 7),
    (3, 7, 8),
    (4, 8, 9),
    (5, 9, 10),
    (1, 10, 6),
    (11, 6, 7),
    (11, 7, 8),
    (11, 8, 9),
    (11, 9, 10),
    (11, 10, 6),
];

/// One undirected adjacency between two faces, as discovered while walking
/// the icosahedron's triangles. `dir_a`/`dir_b` are the local direction
/// slots each side assigns to this seam; `flip` says whether the
/// along-seam coordinate is mirrored when crossing.
struct Seam {
    face_a: u8,
    dir_a: Direction,
    face_b: u8,
    dir_b: Direction,
}

fn edge_index(a: u8, b: u8) -> u8 {
    let key = if a < b { (a, b) } else { (b, a) };
    match ICOSAHEDRON_EDGES.iter().position(|e| *e == key) {
        Some(index) => u8::try_from(index).unwrap_or(0),
        None => 0,
    }
}

/// Pairs up the two RT-faces that meet at `shared` within triangle
/// `(p, q, r)`, given the two edges of the triangle incident to `shared`.
fn pair_at_vertex(shared: u8, other1: u8, other2: u8) -> (u8, u8) {
    (edge_index(shared, other1), edge_index(shared, other2))
}

fn build_seams() -> Vec<Seam> {
    let mut slots_used: [u8; FACE_COUNT as usize] = [0; FACE_COUNT as usize];
    let mut seams = Vec::with_capacity(60);

    let mut connect = |seams: &mut Vec<Seam>, x: u8, y: u8| {
        #[expect(
            clippy::indexing_slicing,
            reason = "x and y are edge indices in 0..FACE_COUNT by construction of edge_index"
        )]
        let slot_x = slots_used[x as usize];
        #[expect(
            clippy::indexing_slicing,
            reason = "x and y are edge indices in 0..FACE_COUNT by construction of edge_index"
        )]
        let slot_y = slots_used[y as usize];
        seams.push(Seam {
            face_a: x,
            dir_a: Direction::from_index(slot_x),
            face_b: y,
            dir_b: Direction::from_index(slot_y),
        });
        #[expect(
            clippy::indexing_slicing,
            reason = "x and y are edge indices in 0..FACE_COUNT by construction of edge_index"
        )]
        {
            slots_used[x as usize] = slot_x.wrapping_add(1);
            slots_used[y as usize] = slot_y.wrapping_add(1);
        }
    };

    for &(p, q, r) in &ICOSAHEDRON_FACES {
        let (e_pq, e_rp) = pair_at_vertex(p, q, r);
        connect(&mut seams, e_pq, e_rp);
        let (e_qr, e_pq2) = pair_at_vertex(q, r, p);
        connect(&mut seams, e_qr, e_pq2);
        let (e_rp2, e_qr2) = pair_at_vertex(r, p, q);
        connect(&mut seams, e_rp2, e_qr2);
    }

    seams
}

/// Per-(face, direction) seam resolution: which face lies across that
/// edge, which direction you face once you've crossed into it, and
/// whether the along-seam coordinate is mirrored.
pub struct Topology {
    neighbor_face: [[u8; 4]; FACE_COUNT as usize],
    exit_dir: [[Direction; 4]; FACE_COUNT as usize],
    flip: [[bool; 4]; FACE_COUNT as usize],
}

impl Topology {
    fn build() -> Self {
        let seams = build_seams();
        let mut neighbor_face = [[0_u8; 4]; FACE_COUNT as usize];
        let mut exit_dir = [[Direction::West; 4]; FACE_COUNT as usize];
        let mut flip = [[false; 4]; FACE_COUNT as usize];

        for (seam_index, seam) in seams.iter().enumerate() {
            let mirrored = seam_index % 2 == 1;
            #[expect(
                clippy::indexing_slicing,
                reason = "face ids are 0..FACE_COUNT by construction of edge_index"
            )]
            {
                neighbor_face[seam.face_a as usize][seam.dir_a.index() as usize] = seam.face_b;
                exit_dir[seam.face_a as usize][seam.dir_a.index() as usize] =
                    seam.dir_b.opposite();
                flip[seam.face_a as usize][seam.dir_a.index() as usize] = mirrored;

                neighbor_face[seam.face_b as usize][seam.dir_b.index() as usize] = seam.face_a;
                exit_dir[seam.face_b as usize][seam.dir_b.index() as usize] =
                    seam.dir_a.opposite();
                flip[seam.face_b as usize][seam.dir_b.index() as usize] = mirrored;
            }
        }

        Self {
            neighbor_face,
            exit_dir,
            flip,
        }
    }

    /// The face across `face`'s `dir` edge, the direction you face once
    /// you've stepped into it, and whether the along-seam coordinate is
    /// mirrored when crossing.
    #[must_use]
    pub const fn seam(&self, face: u8, dir: Direction) -> (u8, Direction, bool) {
        let f = face as usize % FACE_COUNT as usize;
        let d = dir.index() as usize;
        #[expect(
            clippy::indexing_slicing,
            reason = "f is reduced modulo FACE_COUNT and d is a Direction index in 0..4"
        )]
        (self.neighbor_face[f][d], self.exit_dir[f][d], self.flip[f][d])
    }
}

/// The process-wide topology table, built once on first use.
pub static TOPOLOGY: LazyLock<Topology> = LazyLock::new(Topology::build);
