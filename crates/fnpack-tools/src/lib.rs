//! External tool plumbing for fnpack.
//!
//! The packaging pipeline never installs dependencies or compresses files
//! itself. It decides *when* to call two narrow capabilities,
//! [`DependencyInstaller`] and [`Archiver`], and this crate provides their
//! concrete process-backed implementations ([`PipInstaller`],
//! [`ZipArchiver`]) on top of a mockable [`ToolExecutor`].

pub mod archiver;
pub mod doctor;
pub mod executor;
pub mod installer;
pub mod tool;

pub use archiver::{ArchiveEntry, Archiver, ZipArchiver};
pub use doctor::{CheckResult, DoctorReport, ToolCheck, ToolDoctor};
pub use executor::{RealExecutor, ToolExecutor};
pub use installer::{DependencyInstaller, PipInstaller};
pub use tool::{ToolCommand, ToolError};
