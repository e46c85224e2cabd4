pub mod a2a;
pub mod discovery;
pub mod report;
