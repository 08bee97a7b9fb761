//! Static cube mesh data
//!
//! Interleaved position (3), normal (3), uv (2) per vertex; four vertices
//! per face, 36 indices for the 12 triangles.

pub const VERTEX_STRIDE: u32 = 8 * std::mem::size_of::<f32>() as u32;

#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 24 * 8] = [
    // +Z face
    -0.5, -0.5,  0.5,   0.0,  0.0,  1.0,   0.0, 0.0,
     0.5, -0.5,  0.5,   0.0,  0.0,  1.0,   1.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  0.0,  1.0,   1.0, 1.0,
    -0.5,  0.5,  0.5,   0.0,  0.0,  1.0,   0.0, 1.0,
    // -Z face
     0.5, -0.5, -0.5,   0.0,  0.0, -1.0,   0.0, 0.0,
    -0.5, -0.5, -0.5,   0.0,  0.0, -1.0,   1.0, 0.0,
    -0.5,  0.5, -0.5,   0.0,  0.0, -1.0,   1.0, 1.0,
     0.5,  0.5, -0.5,   0.0,  0.0, -1.0,   0.0, 1.0,
    // +X face
     0.5, -0.5,  0.5,   1.0,  0.0,  0.0,   0.0, 0.0,
     0.5, -0.5, -0.5,   1.0,  0.0,  0.0,   1.0, 0.0,
     0.5,  0.5, -0.5,   1.0,  0.0,  0.0,   1.0, 1.0,
     0.5,  0.5,  0.5,   1.0,  0.0,  0.0,   0.0, 1.0,
    // -X face
    -0.5, -0.5, -0.5,  -1.0,  0.0,  0.0,   0.0, 0.0,
    -0.5, -0.5,  0.5,  -1.0,  0.0,  0.0,   1.0, 0.0,
    -0.5,  0.5,  0.5,  -1.0,  0.0,  0.0,   1.0, 1.0,
    -0.5,  0.5, -0.5,  -1.0,  0.0,  0.0,   0.0, 1.0,
    // +Y face
    -0.5,  0.5,  0.5,   0.0,  1.0,  0.0,   0.0, 0.0,
     0.5,  0.5,  0.5,   0.0,  1.0,  0.0,   1.0, 0.0,
     0.5,  0.5, -0.5,   0.0,  1.0,  0.0,   1.0, 1.0,
    -0.5,  0.5, -0.5,   0.0,  1.0,  0.0,   0.0, 1.0,
    // -Y face
    -0.5, -0.5, -0.5,   0.0, -1.0,  0.0,   0.0, 0.0,
     0.5, -0.5, -0.5,   0.0, -1.0,  0.0,   1.0, 0.0,
     0.5, -0.5,  0.5,   0.0, -1.0,  0.0,   1.0, 1.0,
    -0.5, -0.5,  0.5,   0.0, -1.0,  0.0,   0.0, 1.0,
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
     0,  1,  2,   2,  3,  0,
     4,  5,  6,   6,  7,  4,
     8,  9, 10,  10, 11,  8,
    12, 13, 14,  14, 15, 12,
    16, 17, 18,  18, 19, 16,
    20, 21, 22,  22, 23, 20,
];
