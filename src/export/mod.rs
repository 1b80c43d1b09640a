//! Export module for saving stitched panoramas.
//!
//! JPEG (default) and PNG encodings, with writes that never leave a partial
//! file at the destination.

mod encode;

pub use encode::{encode_equirect, encode_to, write_equirect, ExportError};
