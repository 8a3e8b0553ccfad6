//! Aggregate counters for the dashboard.

use serde::{Deserialize, Serialize};

use super::Registration;

/// Response of `/dashboard/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_teambuildings: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_registrations: u64,
    #[serde(default)]
    pub active_teambuildings: u64,
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub upcoming_events: Option<u64>,
    /// Most recent registrations, newest first, as bounded by the backend.
    #[serde(default)]
    pub recent_registrations: Vec<Registration>,
}
