//! Staging, source assembly, and archiving for fnpack.
//!
//! # Build pipeline
//!
//! ```text
//! fnpack build
//!   1. Prepare    ── rm -rf <output_dir>; mkdir <output_dir>/<staging_dir>
//!   2. Manifest   ── absent → fail; comments/blank only → skip install
//!   3. Install    ── pip install --requirement <manifest> --target <staging>
//!   4. Assemble   ── copy <source_dir>/* → <staging>/
//!   5. Archive    ── (cd <staging> && zip -r <archive> .)
//!   6. Verify     ── stat + unzip -l <archive>
//! ```
//!
//! # Layout guarantee
//!
//! The archive root is the staging root. Dependencies and handler modules
//! sit side by side at the top level, which is where the serverless runtime
//! looks for the entry-point module.

pub mod assemble;
pub mod pipeline;
pub mod report;
pub mod workspace;

pub use pipeline::{Assembled, Pipeline, PipelineError, Stage, Step};
pub use report::{ArchiveReport, BuildReport, VerifyError};
