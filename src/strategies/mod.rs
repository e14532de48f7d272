pub mod grid;
pub mod traits;
