//! Short asset identifiers.
//!
//! Local assets are named `{id}{ext}`, where `id` is eight lowercase hex
//! characters. Eight characters give roughly 4.3 billion names, so collisions
//! become likely after tens of thousands of uploads. There is no collision
//! check; a collision overwrites the earlier file.

use std::sync::atomic::{AtomicU32, Ordering};

use uuid::Uuid;

/// Produces identifiers for newly stored assets.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn generate(&self) -> String;
}

/// First eight hex characters of a random v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortUuid;

impl ShortUuid {
    /// Identifier length in characters.
    pub const LEN: usize = 8;
}

impl IdGenerator for ShortUuid {
    fn generate(&self) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(Self::LEN);
        id
    }
}

/// Deterministic generator yielding `00000000`, `00000001`, ...
///
/// Useful in tests and fixtures where exact names must be known up front.
#[derive(Debug, Default)]
pub struct SequenceIds {
    next: AtomicU32,
}

impl SequenceIds {
    /// Start the sequence at `start`.
    #[must_use]
    pub const fn starting_at(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl IdGenerator for SequenceIds {
    fn generate(&self) -> String {
        format!("{:08x}", self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Extension of the last path element, including the leading dot.
///
/// Returns an empty string when the name has no dot. Only the final
/// extension is kept, so `archive.tar.gz` yields `.gz`.
#[must_use]
pub fn file_extension(filename: &str) -> &str {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    name.rfind('.').map_or("", |idx| &name[idx..])
}

/// Storage name for an uploaded file: identifier plus original extension.
///
/// The extension is copied verbatim, including spaces or URL delimiters.
#[must_use]
pub fn asset_file_name(id: &str, original_filename: &str) -> String {
    format!("{id}{}", file_extension(original_filename))
}
