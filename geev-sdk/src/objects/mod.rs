pub mod leaderboard;

pub use leaderboard::{
    Category, CategoryInfo, LeaderboardOptions, LeaderboardPage, LeaderboardQuery, MetricValue,
    RankEntry, Window, WindowInfo, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
