pub mod edit;
pub mod fill;
pub mod job;
pub mod language;
pub mod settings;
