//! Content readers for the DFM include resolver.
//!
//! The renderer never touches the filesystem directly. Every inclusion goes
//! through a [`ContentReader`], which maps a working-folder-relative path to
//! the file content and a stable identifier for dependency tracking.
//!
//! The crate provides:
//! - [`ContentReader`] trait, implemented for closures as well
//! - [`FsReader`] rooted at the working folder
//! - [`CachingReader`], an opt-in memoizing wrapper keyed by resolved path
//! - [`MockReader`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use dfm_storage::{ContentReader, FsReader};
//!
//! let reader = FsReader::new("docs");
//! let loaded = reader.read("guide/intro.md", "index.md", true)?;
//! println!("{}: {} bytes", loaded.identifier, loaded.content.len());
//! ```

mod cache;
mod error;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod reader;

pub use cache::CachingReader;
pub use error::{ReadError, ReadErrorKind};
pub use fs::FsReader;
#[cfg(feature = "mock")]
pub use mock::{MockReader, ReadCall};
pub use reader::{ContentReader, LoadedContent};
