//! Input/output helpers.
//!
//! - file-name month resolution (`filename`)
//! - archive unpacking into a scoped workspace (`archive`)
//! - spreadsheet reading + per-file normalization (`sheet`)
//! - dataset assembly (`dataset`)
//! - JSON exports (`export`)

pub mod archive;
pub mod dataset;
pub mod export;
pub mod filename;
pub mod sheet;

pub use archive::*;
pub use dataset::*;
pub use export::*;
pub use filename::*;
pub use sheet::*;
