/// Reads and writes binary little-endian PLY files.
pub mod ply;
