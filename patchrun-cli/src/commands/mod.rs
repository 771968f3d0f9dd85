pub mod entities;
pub mod migrate;
pub mod plan;
