//! Role capabilities bitflags
//!
//! Roles are coarse (admin/owner/cleaner/guest); handlers check the
//! capability they need instead of matching on roles.

use bitflags::bitflags;

bitflags! {
    /// What a staff user may do in the admin surface
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Create/edit properties, room types and room units
        const MANAGE_PROPERTIES   = 1 << 0;
        /// Create/edit reservations and guest services
        const MANAGE_RESERVATIONS = 1 << 1;
        /// Create, assign and delete cleaning tasks
        const MANAGE_CLEANING     = 1 << 2;
        /// Update status of tasks assigned to oneself
        const WORK_CLEANING       = 1 << 3;
        /// Rules, templates, and host-side chat
        const MANAGE_MESSAGING    = 1 << 4;
        /// Manage user profiles
        const MANAGE_USERS        = 1 << 5;
        /// See every property regardless of ownership
        const ALL_PROPERTIES      = 1 << 6;

        const OWNER = Self::MANAGE_PROPERTIES.bits()
            | Self::MANAGE_RESERVATIONS.bits()
            | Self::MANAGE_CLEANING.bits()
            | Self::MANAGE_MESSAGING.bits();

        const CLEANER = Self::WORK_CLEANING.bits();

        const ALL = u32::MAX;
    }
}

impl Capabilities {
    /// Check a required capability
    #[inline]
    pub fn has(&self, capability: Capabilities) -> bool {
        self.contains(capability)
    }

    /// Names of the set flags, for logs and error messages
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_capabilities() {
        let caps = Capabilities::OWNER;
        assert!(caps.has(Capabilities::MANAGE_PROPERTIES));
        assert!(caps.has(Capabilities::MANAGE_MESSAGING));
        assert!(!caps.has(Capabilities::MANAGE_USERS));
        assert!(!caps.has(Capabilities::ALL_PROPERTIES));
    }

    #[test]
    fn test_cleaner_capabilities() {
        let caps = Capabilities::CLEANER;
        assert!(caps.has(Capabilities::WORK_CLEANING));
        assert!(!caps.has(Capabilities::MANAGE_CLEANING));
    }

    #[test]
    fn test_all_contains_everything() {
        assert!(Capabilities::ALL.has(Capabilities::OWNER | Capabilities::MANAGE_USERS));
    }

    #[test]
    fn test_list() {
        let names = Capabilities::CLEANER.list();
        assert_eq!(names, vec!["WORK_CLEANING"]);
    }
}
