use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use digest::Digest;
use md5::Md5;
use snapshot::{EntryKind, SnapshotBuilder, TreeSnapshot};

use crate::error::DigestResult;

/// Number of bytes in a [`TreeDigest`].
pub const DIGEST_LEN: usize = 16;

/// Bytes read per chunk while hashing file contents.
const DIGEST_BUFFER_SIZE: usize = 128 * 1024;

/// Whole-tree content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeDigest([u8; DIGEST_LEN]);

impl TreeDigest {
    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl fmt::Display for TreeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TreeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeDigest({self})")
    }
}

/// Outcome of comparing the digests of two roots.
#[derive(Clone, Copy, Debug)]
pub struct Verification {
    source_digest: TreeDigest,
    replica_digest: TreeDigest,
}

impl Verification {
    /// Returns the digest of the source root.
    #[must_use]
    pub const fn source_digest(&self) -> TreeDigest {
        self.source_digest
    }

    /// Returns the digest of the replica root.
    #[must_use]
    pub const fn replica_digest(&self) -> TreeDigest {
        self.replica_digest
    }

    /// Returns `true` when both digests agree.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.source_digest == self.replica_digest
    }
}

/// Computes the content digest of the tree rooted at `root`.
///
/// A missing root digests as an empty tree.
pub fn tree_digest(root: &Path) -> DigestResult<TreeDigest> {
    let tree = SnapshotBuilder::new(root)
        .missing_root_as_empty(true)
        .build()?;
    Ok(digest_snapshot(&tree))
}

/// Digests both roots and compares them.
pub fn verify(source_root: &Path, replica_root: &Path) -> DigestResult<Verification> {
    Ok(Verification {
        source_digest: tree_digest(source_root)?,
        replica_digest: tree_digest(replica_root)?,
    })
}

fn digest_snapshot(tree: &TreeSnapshot) -> TreeDigest {
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];

    for entry in tree.entries() {
        hasher.update(entry.relative_path().as_os_str().as_encoded_bytes());
        hasher.update([0u8]);
        match entry.kind() {
            EntryKind::Directory => hasher.update(b"d"),
            EntryKind::File => {
                hasher.update(b"f");
                let full = tree.root().join(entry.relative_path());
                hash_file_contents(&mut hasher, &mut buffer, &full);
            }
        }
    }

    TreeDigest(hasher.finalize().into())
}

// Content read failures hash as an empty frame; the digest walk itself never
// fails.
fn hash_file_contents(hasher: &mut Md5, buffer: &mut [u8], path: &Path) {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(error) => {
            tracing::warn!(path = %path.display(), "failed to hash file contents: {error}");
            hasher.update(0u64.to_le_bytes());
            return;
        }
    };

    let length = match file.metadata() {
        Ok(metadata) => metadata.len(),
        Err(error) => {
            tracing::warn!(path = %path.display(), "failed to hash file contents: {error}");
            hasher.update(0u64.to_le_bytes());
            return;
        }
    };
    hasher.update(length.to_le_bytes());

    loop {
        match file.read(buffer) {
            Ok(0) => break,
            Ok(read) => hasher.update(&buffer[..read]),
            Err(error) => {
                tracing::warn!(path = %path.display(), "failed to hash file contents: {error}");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const EMPTY_TREE_DIGEST: &str = "d41d8cd98f00b204e9800998ecf8427e";

    #[test]
    fn empty_and_missing_roots_share_the_empty_digest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let present = temp.path().join("present");
        fs::create_dir(&present).expect("create dir");
        let absent = temp.path().join("absent");

        let digest_present = tree_digest(&present).expect("digest empty dir");
        let digest_absent = tree_digest(&absent).expect("digest missing dir");
        assert_eq!(digest_present.to_string(), EMPTY_TREE_DIGEST);
        assert_eq!(digest_absent, digest_present);
    }

    #[test]
    fn display_renders_lowercase_hex() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let digest = tree_digest(temp.path()).expect("digest");
        let rendered = digest.to_string();
        assert_eq!(rendered.len(), DIGEST_LEN * 2);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rendered, rendered.to_lowercase());
    }

    #[test]
    fn equal_trees_have_equal_digests() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let left = temp.path().join("left");
        let right = temp.path().join("right");
        for root in [&left, &right] {
            fs::create_dir_all(root.join("a/c")).expect("create dirs");
            fs::write(root.join("a/b.txt"), b"payload").expect("write file");
        }

        let verification = verify(&left, &right).expect("verify");
        assert!(verification.converged());
        assert_eq!(
            verification.source_digest(),
            verification.replica_digest()
        );
    }

    #[test]
    fn content_change_changes_the_digest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("tree");
        fs::create_dir(&root).expect("create dir");
        fs::write(root.join("data.txt"), b"before").expect("write file");
        let before = tree_digest(&root).expect("digest");

        fs::write(root.join("data.txt"), b"after!").expect("rewrite file");
        let after = tree_digest(&root).expect("digest");
        assert_ne!(before, after);
    }

    #[test]
    fn renaming_a_file_changes_the_digest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let left = temp.path().join("left");
        let right = temp.path().join("right");
        fs::create_dir(&left).expect("create dir");
        fs::create_dir(&right).expect("create dir");
        fs::write(left.join("one.txt"), b"same bytes").expect("write file");
        fs::write(right.join("two.txt"), b"same bytes").expect("write file");

        let verification = verify(&left, &right).expect("verify");
        assert!(!verification.converged());
    }

    #[test]
    fn an_extra_empty_directory_changes_the_digest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let left = temp.path().join("left");
        let right = temp.path().join("right");
        fs::create_dir(&left).expect("create dir");
        fs::create_dir_all(right.join("leftover")).expect("create dirs");

        let verification = verify(&left, &right).expect("verify");
        assert!(!verification.converged());
    }

    #[test]
    fn mtime_changes_do_not_affect_the_digest() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("tree");
        fs::create_dir(&root).expect("create dir");
        fs::write(root.join("data.txt"), b"stable").expect("write file");
        let before = tree_digest(&root).expect("digest");

        let stamp = filetime::FileTime::from_unix_time(946_684_800, 0);
        filetime::set_file_mtime(root.join("data.txt"), stamp).expect("set mtime");
        let after = tree_digest(&root).expect("digest");
        assert_eq!(before, after);
    }

    #[test]
    fn file_root_is_rejected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path().join("plain.txt");
        fs::write(&root, b"data").expect("write file");
        assert!(tree_digest(&root).is_err());
    }
}
