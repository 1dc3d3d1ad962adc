//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a new random UUID v4.
    #[must_use]
    pub fn generate_uuid_v4(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate a URL-safe room ID derived from the display name plus the
    /// ULID of the creation instant.
    ///
    /// The name prefix keeps room URLs readable; the ULID suffix makes the
    /// ID globally unique without a coordination round trip. The result is
    /// stable once generated and is used as the routing key for all of the
    /// room's sub-resources.
    #[must_use]
    pub fn generate_room_id(&self, name: &str) -> String {
        let slug = slugify(name);
        let ulid = Ulid::new().to_string().to_lowercase();
        if slug.is_empty() {
            format!("room-{ulid}")
        } else {
            format!("{slug}-{ulid}")
        }
    }
}

/// Lowercase a name and reduce it to a short URL-safe slug.
///
/// Non-alphanumeric runs collapse to a single hyphen; the slug is capped
/// at 48 characters so IDs stay routable in URLs.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
        if slug.len() >= 48 {
            break;
        }
    }

    slug.trim_matches('-').to_string()
}
