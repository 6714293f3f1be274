//! Unix (macOS and Linux) platform implementation

pub mod filesystem;
pub mod process;

/// Unix platform implementation
pub struct UnixPlatform;

impl UnixPlatform {
    #[must_use]
    pub fn create() -> crate::core::Platform {
        crate::core::Platform::new(
            Box::new(filesystem::UnixFilesystemOperations::new()),
            Box::new(process::UnixProcessOperations::new()),
        )
    }
}
