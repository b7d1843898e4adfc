mod block_encoder;
mod reference;

pub use block_encoder::BlockEncoder;
pub use reference::{ReferenceCompressIntEncoder, ReferenceCompressIntReader};
