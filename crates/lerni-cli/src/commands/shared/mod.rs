pub mod fields;
pub mod limit;
pub mod rows;
