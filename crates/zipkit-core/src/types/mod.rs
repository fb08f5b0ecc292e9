//! Domain types shared by archive creation and extraction.
//!
//! `DestDir` can only be built from an existing, canonicalized directory and
//! `Password` can only hold a non-empty secret, so code that receives one of
//! these does not need to re-check those properties.

pub mod dest_dir;
pub mod entry;
pub mod password;

pub use dest_dir::DestDir;
pub use entry::ArchiveEntry;
pub use entry::EntryKind;
pub use password::Encryption;
pub use password::Password;
