pub mod sort;
pub mod transform;

pub use sort::{SortDirection, SortSpec};
pub use transform::derive_view;

#[cfg(test)]
mod test;
