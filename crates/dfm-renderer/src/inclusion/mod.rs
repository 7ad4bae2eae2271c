//! File inclusion: tokens, path resolution, file context and dependencies.
//!
//! The expansion itself lives in the render session, which ties these pieces
//! together with the content reader.

mod context;
mod dependencies;
mod front_matter;
mod path;
mod token;

pub use context::{FileContext, FileFrame, FileScope};
pub use dependencies::DependencySet;
pub use front_matter::strip_front_matter;
pub(crate) use path::join;
pub use path::{ResolvedPath, WORKING_FOLDER_PREFIX, is_external, normalize, parent_dir};
pub use token::{IncludeToken, find_inline_includes, parse_block_include};
