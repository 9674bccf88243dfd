//! Application constants.
//!
//! Centralizes magic numbers and fallback labels for better maintainability.

/// Pagination constants for collection requests.
pub mod pagination {
    /// Page size appended to every collection request.
    pub const PER_PAGE: usize = 100;
}

/// Lookup window constants.
pub mod window {
    /// Default number of months scheduling, check-ins and registrations look back.
    pub const DEFAULT_LOOKBACK_MONTHS: u32 = 9;
}

/// Truncation limits for summarized lists.
pub mod limits {
    /// Maximum recent plans kept per team.
    pub const RECENT_PLANS_PER_TEAM: usize = 5;

    /// Maximum recent check-ins kept per event.
    pub const RECENT_CHECK_INS_PER_EVENT: usize = 5;

    /// Maximum registrations listed.
    pub const REGISTRATIONS_LISTED: usize = 20;
}

/// Display fallbacks for missing or unresolved upstream values.
pub mod labels {
    /// Position label when an assignment has neither a position nor a status.
    pub const DEFAULT_POSITION: &str = "Scheduled";

    /// Event name when the event cannot be resolved.
    pub const UNKNOWN_EVENT: &str = "Unknown Event";

    /// Group name when the group cannot be resolved.
    pub const UNKNOWN_GROUP: &str = "Unknown Group";

    /// Role when a membership does not carry one.
    pub const DEFAULT_ROLE: &str = "Member";
}
