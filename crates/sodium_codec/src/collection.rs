//! The canonical collection table.

use std::fmt;

/// One of the ten canonical Sodium collections.
///
/// Each collection has a fixed numeric ID that is its identity inside the
/// binary container, and a string name used by the in-memory API and as the
/// relational table name. The ID assignments are a wire contract and must
/// never be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Panel user accounts.
    Users,
    /// Daemon host machines.
    Nodes,
    /// Game server instances.
    Servers,
    /// Service categories (groups of eggs).
    Nests,
    /// Server templates.
    Eggs,
    /// Physical/logical node locations.
    Locations,
    /// API credentials.
    ApiKeys,
    /// Panel-wide announcements.
    Announcements,
    /// Administrative audit trail.
    AuditLogs,
    /// Per-user activity trail.
    ActivityLogs,
}

impl Collection {
    /// All canonical collections in numeric-ID order.
    ///
    /// This is also the order blocks appear in an encoded container.
    pub const ALL: [Collection; 10] = [
        Collection::Users,
        Collection::Nodes,
        Collection::Servers,
        Collection::Nests,
        Collection::Eggs,
        Collection::Locations,
        Collection::ApiKeys,
        Collection::Announcements,
        Collection::AuditLogs,
        Collection::ActivityLogs,
    ];

    /// Returns the collection's numeric ID used in the binary container.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Collection::Users => 1,
            Collection::Nodes => 2,
            Collection::Servers => 3,
            Collection::Nests => 4,
            Collection::Eggs => 5,
            Collection::Locations => 6,
            Collection::ApiKeys => 7,
            Collection::Announcements => 8,
            Collection::AuditLogs => 9,
            Collection::ActivityLogs => 10,
        }
    }

    /// Returns the collection's string name.
    ///
    /// This is the key used in snapshot JSON and the relational table name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Nodes => "nodes",
            Collection::Servers => "servers",
            Collection::Nests => "nests",
            Collection::Eggs => "eggs",
            Collection::Locations => "locations",
            Collection::ApiKeys => "apiKeys",
            Collection::Announcements => "announcements",
            Collection::AuditLogs => "auditLogs",
            Collection::ActivityLogs => "activityLogs",
        }
    }

    /// Looks up a collection by its numeric ID.
    ///
    /// Returns `None` for IDs this version does not know about; callers skip
    /// such blocks for forward compatibility.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.id() == id)
    }

    /// Looks up a collection by its string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
