pub mod students;
pub mod validate;
