#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `digests` condenses a directory tree into a single MD5 value so two trees
//! can be compared without transferring or enumerating anything twice. After
//! every mirroring cycle both roots are digested; equal digests confirm that
//! the replica converged, unequal digests flag drift (typically concurrent
//! external mutation of one of the trees).
//!
//! # Design
//!
//! - [`tree_digest`] walks a root with the snapshot builder and feeds one
//!   hash stream in snapshot order. Per entry it hashes the relative path, a
//!   NUL separator, and a kind tag; file entries additionally contribute a
//!   little-endian length prefix and their contents, read in fixed-size
//!   chunks so memory stays bounded for large files.
//! - [`verify`] digests both roots and packages the comparison as a
//!   [`Verification`].
//! - The digest is purely diagnostic. A mismatch is reported, never acted
//!   on: the next cycle's diff repairs real drift, so no re-copy pass hangs
//!   off the comparison.
//!
//! # Invariants
//!
//! - Deterministic: digests depend only on tree structure and file contents.
//!   Modification times are excluded.
//! - A missing root digests as an empty tree, matching the snapshot rules
//!   for a not-yet-created replica.
//! - An unreadable file contributes an empty contents frame and a warning
//!   rather than failing the walk.
//!
//! # Errors
//!
//! [`DigestError`] wraps the snapshot root validation failures; there is
//! nothing else to get wrong from the caller's side.

mod error;
mod tree;

pub use crate::error::{DigestError, DigestResult};
pub use crate::tree::{DIGEST_LEN, TreeDigest, Verification, tree_digest, verify};
