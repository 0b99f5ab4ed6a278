pub mod annotation;
pub mod backup;
pub mod settings;
