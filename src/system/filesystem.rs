use std::io;
use std::path::Path;

use crate::demo::data::DEMO_AGENT_CONFIG;

/// Abstraction for filesystem access to enable testing without real files
pub trait FilesystemReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem reader using std::fs
pub struct RealFilesystemReader;

impl FilesystemReader for RealFilesystemReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Demo filesystem reader that returns predefined file contents
pub struct DemoFilesystemReader;

impl DemoFilesystemReader {
    fn get_demo_content(&self, path: &Path) -> Option<&'static str> {
        match path.file_name().and_then(|name| name.to_str()) {
            Some("zpool_iostat.json") => Some(DEMO_AGENT_CONFIG),
            _ => None,
        }
    }
}

impl FilesystemReader for DemoFilesystemReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get_demo_content(path)
            .map(str::to_string)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Demo: File not mocked: {}", path.display()),
                )
            })
    }
}
