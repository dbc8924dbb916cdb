mod collection;
pub mod format;
mod mirror;
mod slot;
mod store;

pub use format::ParseError;
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{BusyFlag, ErrorKind, Fault, RecipeStore, StoreError};
