mod dictionary;
mod file_reader;

pub use dictionary::{DictionaryReader, SortedDictionary};
pub use file_reader::{FileReader, MemFile};
