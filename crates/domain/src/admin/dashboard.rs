//! Dashboard summary payloads.

use serde::{Deserialize, Serialize};

/// User counters shown on the dashboard landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    /// All registered users
    pub total_users: u64,
    /// Users verified by an administrator
    pub verified_users: u64,
    /// Users waiting for verification
    pub pending_users: u64,
    /// Users with an administrator role
    pub admin_users: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_default_to_zero() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"totalUsers":10,"pendingUsers":3}"#).unwrap();
        assert_eq!(stats.total_users, 10);
        assert_eq!(stats.pending_users, 3);
        assert_eq!(stats.verified_users, 0);
    }
}
