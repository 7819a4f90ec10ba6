//! REST operations behind the HTTP engine.
//!
//! - **`router`**: maps a parsed request to one operation
//! - **`files`**: list, download, delete, rename and copy
//! - **`upload`**: multipart upload into a directory
//! - **`sysinfo`**: storage, memory, uptime, network and counter snapshot
//! - **`ui`**: the bundled single-page interface
//! - **`error`**: operation failures and their JSON envelope

pub mod error;
pub mod files;
pub mod router;
pub mod sysinfo;
pub mod ui;
pub mod upload;

pub use error::ApiError;
pub use router::{dispatch, Reply};
