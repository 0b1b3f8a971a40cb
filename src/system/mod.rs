//! System interface abstractions for testing and development

pub mod commands;
pub mod filesystem;

// Re-export commonly used items
pub use commands::{CommandExecutor, DemoCommandExecutor, ExecError, RealCommandExecutor};
pub use filesystem::{DemoFilesystemReader, FilesystemReader, RealFilesystemReader};
