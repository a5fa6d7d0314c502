/// Number of animated dots on an edge for the target stage's recent activity.
pub fn flow_intensity(recent_activity: u64) -> u8 {
    match recent_activity {
        0 => 0,
        1..=5 => 1,
        6..=15 => 2,
        _ => 3,
    }
}

/// Whether a node shows the pulse indicator.
pub fn is_active(recent_activity: u64) -> bool {
    recent_activity > 0
}
