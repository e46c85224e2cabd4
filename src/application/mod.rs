pub mod errors;
pub mod tester;
