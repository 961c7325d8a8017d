pub mod file;
pub mod hyetograph;
pub mod stdin;
