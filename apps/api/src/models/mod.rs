pub mod letter;
pub mod usage;
