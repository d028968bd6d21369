//! Resource permission bits.
//!
//! Every ACL entry stores a small bitmask:
//! - VIEW (bit 0): view and use the resource
//! - EDIT (bit 1): modify its settings
//! - DELETE (bit 2): delete it
//! - SHARE (bit 3): grant access to others

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Per-resource permissions represented as a 32-bit bitfield.
    ///
    /// Serialized as a plain number on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PermissionBits: u32 {
        /// Can view and use the resource
        const VIEW   = 1 << 0;
        /// Can modify the resource
        const EDIT   = 1 << 1;
        /// Can delete the resource
        const DELETE = 1 << 2;
        /// Can share the resource with other principals
        const SHARE  = 1 << 3;
    }
}

/// Bit bundles granted by the predefined access roles.
pub struct RoleBits;

impl RoleBits {
    pub const VIEWER: PermissionBits = PermissionBits::VIEW;

    pub const EDITOR: PermissionBits = PermissionBits::VIEW.union(PermissionBits::EDIT);

    pub const MANAGER: PermissionBits = Self::EDITOR.union(PermissionBits::DELETE);

    pub const OWNER: PermissionBits = Self::MANAGER.union(PermissionBits::SHARE);
}

impl PermissionBits {
    /// Create a bit set from a raw wire value, dropping unknown bits.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self::from_bits_truncate(value)
    }

    /// Check if this set includes every bit of `required`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lc_common::permissions::PermissionBits;
    ///
    /// let perms = PermissionBits::VIEW | PermissionBits::EDIT;
    /// assert!(perms.has(PermissionBits::VIEW));
    /// assert!(!perms.has(PermissionBits::SHARE));
    /// ```
    #[must_use]
    pub const fn has(self, required: Self) -> bool {
        self.contains(required)
    }

    /// Coarse access level for these bits.
    #[must_use]
    pub const fn access_level(self) -> AccessLevel {
        perm_bits_to_access_level(self.bits())
    }
}

impl Default for PermissionBits {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for PermissionBits {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for PermissionBits {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_raw)
    }
}

/// Check whether `permissions` contains every bit of `required`.
///
/// A `required` value of zero is always satisfied.
#[must_use]
pub const fn has_permissions(permissions: u32, required: u32) -> bool {
    (permissions & required) == required
}

/// Coarse access label shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    None,
    Viewer,
    Editor,
    Owner,
}

impl AccessLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a permission bitmask to its access level.
///
/// The strongest capability decides: DELETE means owner, then EDIT means
/// editor, then VIEW means viewer.
#[must_use]
pub const fn perm_bits_to_access_level(bits: u32) -> AccessLevel {
    if bits & PermissionBits::DELETE.bits() != 0 {
        AccessLevel::Owner
    } else if bits & PermissionBits::EDIT.bits() != 0 {
        AccessLevel::Editor
    } else if bits & PermissionBits::VIEW.bits() != 0 {
        AccessLevel::Viewer
    } else {
        AccessLevel::None
    }
}

/// Per-capability view of a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PermissionCheck {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_share: bool,
    pub access_level: AccessLevel,
}

impl PermissionCheck {
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            can_view: has_permissions(bits, PermissionBits::VIEW.bits()),
            can_edit: has_permissions(bits, PermissionBits::EDIT.bits()),
            can_delete: has_permissions(bits, PermissionBits::DELETE.bits()),
            can_share: has_permissions(bits, PermissionBits::SHARE.bits()),
            access_level: perm_bits_to_access_level(bits),
        }
    }
}
