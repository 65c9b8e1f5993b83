//! The self-describing container that carries a serialized tree and its
//! packed payload in one buffer.

pub mod blob;

pub use blob::{ContainerBlob, TREE_END, TREE_START};
