//! Ready-made [`FileSource`](crate::FileSource) implementations.
//!
//! | Source          | Backing store                     |
//! |-----------------|-----------------------------------|
//! | [`MemorySource`] | In-process tree, mutable at runtime |
//! | [`DirSource`]    | A host directory, read-only       |

mod memory;
mod native;

pub use memory::MemorySource;
pub use native::DirSource;
