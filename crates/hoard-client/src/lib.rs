//! Upload client for Hoard.
//!
//! [`Uploader`] turns filesystem entries into blobs and schema objects:
//! a regular file becomes a content blob plus a `file` map, a symlink a
//! `symlink` map, and a directory a `static-set` of its entries (uploaded
//! recursively, in name order) plus a `directory` map. It also creates and
//! signs permanodes and shares.

pub mod error;
pub mod uploader;

pub use error::{ClientError, ClientResult};
pub use uploader::{PutResult, UploadConfig, Uploader};
