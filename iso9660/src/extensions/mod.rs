//! ISO9660 extensions
//!
//! Only the Rock Ridge alternate name is consumed; other SUSP entries are
//! skipped.

pub mod rock_ridge;
