pub mod games;
pub mod leaderboard;
pub mod participants;
pub mod picks;
