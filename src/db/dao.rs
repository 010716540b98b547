//! Module for Data Access Objects

use sqlx::FromRow;

/// Raw `user_progress` row. Converted to
/// [`UserProgress`](crate::db::UserProgress) before anything reasons about it.
#[derive(FromRow, Debug, Clone)]
pub(crate) struct UserProgressDAO {
    pub(crate) guild_id: i64,
    pub(crate) user_id: i64,
    pub(crate) message_xp: i64,
    pub(crate) voice_xp: i64,
    pub(crate) level: i64,
    pub(crate) total_messages: i64,
    pub(crate) total_voice_secs: i64,
    pub(crate) counting_rounds: i64,
    pub(crate) last_message_ts: i64,
    pub(crate) streak_days: i64,
    pub(crate) last_streak_day: Option<String>,
    pub(crate) awarded_milestones: String,
}
