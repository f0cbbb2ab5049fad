pub mod claims {

    /// How long a claim without an explicit expiry date still entitles the
    /// claimant to see the code, counted from `claimed_at`.
    pub const ACTIVE_WINDOW_DAYS: i64 = 30;
}

pub mod sessions {

    /// Default widget session lifetime. Partner tokens live only a few
    /// minutes; the session outlives them since the widget presents it for
    /// every later call.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    /// Minimum TTL for a burned `jti` marker, applied when a token arrives
    /// moments before its expiry.
    pub const REPLAY_TTL_FLOOR_SECS: u64 = 60;
}
