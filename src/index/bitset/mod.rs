mod bitmap_posting_iterator;

pub use bitmap_posting_iterator::{BitmapPostingIterator, SingleBitmapPostingIterator};
