//! Time windows scoping the aggregation.

use time::{Duration, OffsetDateTime};

/// Closed-open time interval `[start, now)` ending at the request snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// Trailing 7 days.
    Week,
    /// Trailing 30 days.
    Month,
    /// No lower bound.
    AllTime,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Week => "week",
            Window::Month => "month",
            Window::AllTime => "alltime",
        }
    }

    /// Trailing span; `None` for the unbounded all-time window.
    pub fn span(&self) -> Option<Duration> {
        match self {
            Window::Week => Some(Duration::days(7)),
            Window::Month => Some(Duration::days(30)),
            Window::AllTime => None,
        }
    }

    /// Closed lower bound of a window ending at `now`.
    pub fn start(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        self.span().map(|span| now - span)
    }

    /// Inclusion test: `occurred_at` in `[start, now)`.
    pub fn contains(&self, occurred_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        if occurred_at >= now {
            return false;
        }
        match self.start(now) {
            Some(start) => occurred_at >= start,
            None => true,
        }
    }

    /// Default engagement half-life for trending in this window.
    ///
    /// Short enough that events older than the window span weigh close to
    /// nothing, and all-time trending still favors recency.
    pub fn default_half_life(&self) -> Duration {
        match self {
            Window::Week => Duration::days(1),
            Window::Month => Duration::days(4),
            Window::AllTime => Duration::days(7),
        }
    }

    pub fn all() -> [Window; 3] {
        [Window::Week, Window::Month, Window::AllTime]
    }
}

impl From<geev_sdk::objects::Window> for Window {
    fn from(value: geev_sdk::objects::Window) -> Self {
        match value {
            geev_sdk::objects::Window::Week => Window::Week,
            geev_sdk::objects::Window::Month => Window::Month,
            geev_sdk::objects::Window::AllTime => Window::AllTime,
        }
    }
}

impl From<Window> for geev_sdk::objects::Window {
    fn from(value: Window) -> Self {
        match value {
            Window::Week => geev_sdk::objects::Window::Week,
            Window::Month => geev_sdk::objects::Window::Month,
            Window::AllTime => geev_sdk::objects::Window::AllTime,
        }
    }
}
