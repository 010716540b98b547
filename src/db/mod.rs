//! SQLite persistence for per-user leveling state.
//!
//! One table, keyed by `(guild_id, user_id)`. Every engine operation runs in a
//! single transaction, so SQLite's writer serialization is what keeps
//! concurrent updates to the same row from interleaving.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteExecutor, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
};
use sqlx::Executor;

use crate::error::{Error, Result};
use crate::events::MilestoneId;
use crate::exp::Exp;
use crate::ids::{i64_from_id, id_from_i64, GuildId, UserId, UserKey};

pub(crate) mod dao;

use dao::UserProgressDAO;

const SCHEMA: &str = include_str!("../../schema.sql");

const DAY_FMT: &str = "%Y-%m-%d";

/// Everything the core tracks for one guild member.
///
/// Owned by this module: the engine reads it, transforms it, and hands it back
/// to [`store`] inside the same transaction.
#[derive(Debug, Clone)]
pub struct UserProgress {
    pub key: UserKey,
    pub message_xp: Exp,
    pub voice_xp: Exp,
    pub level: u32,
    pub total_messages: u64,
    pub total_voice_secs: u64,
    pub counting_rounds: u64,
    /// Unix seconds of the last XP-granting message; 0 when there was none.
    pub last_message_ts: i64,
    pub streak_days: u32,
    pub last_streak_day: Option<NaiveDate>,
    pub(crate) awarded: BTreeSet<MilestoneId>,
}

impl UserProgress {
    pub fn total_xp(&self) -> Exp {
        Exp(self.message_xp.0.saturating_add(self.voice_xp.0))
    }

    /// Milestones already awarded, ascending by kind and threshold.
    pub fn awarded_milestones(&self) -> impl Iterator<Item = MilestoneId> + '_ {
        self.awarded.iter().copied()
    }
}

fn corrupt(column: &'static str, detail: impl ToString) -> Error {
    Error::Corrupt {
        column,
        detail: detail.to_string(),
    }
}

fn u64_column(column: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| corrupt(column, format!("negative value {value}")))
}

impl TryFrom<UserProgressDAO> for UserProgress {
    type Error = Error;

    fn try_from(dao: UserProgressDAO) -> Result<Self> {
        let UserProgressDAO {
            guild_id,
            user_id,
            message_xp,
            voice_xp,
            level,
            total_messages,
            total_voice_secs,
            counting_rounds,
            last_message_ts,
            streak_days,
            last_streak_day,
            awarded_milestones,
        } = dao;

        let key = UserKey {
            guild: GuildId(id_from_i64!(guild_id)),
            user: UserId(id_from_i64!(user_id)),
        };

        let last_streak_day = last_streak_day
            .map(|s| {
                NaiveDate::parse_from_str(&s, DAY_FMT)
                    .map_err(|e| corrupt("last_streak_day", format!("{s:?}: {e}")))
            })
            .transpose()?;

        let raw_ids: Vec<String> = serde_json::from_str(&awarded_milestones)
            .map_err(|e| corrupt("awarded_milestones", e))?;
        let awarded = raw_ids
            .iter()
            .map(|raw| {
                MilestoneId::from_str(raw).map_err(|e| corrupt("awarded_milestones", e))
            })
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(UserProgress {
            key,
            message_xp: Exp(u64_column("message_xp", message_xp)?),
            voice_xp: Exp(u64_column("voice_xp", voice_xp)?),
            level: u32::try_from(level).map_err(|_| corrupt("level", level))?,
            total_messages: u64_column("total_messages", total_messages)?,
            total_voice_secs: u64_column("total_voice_secs", total_voice_secs)?,
            counting_rounds: u64_column("counting_rounds", counting_rounds)?,
            last_message_ts,
            streak_days: u32::try_from(streak_days)
                .map_err(|_| corrupt("streak_days", streak_days))?,
            last_streak_day,
            awarded,
        })
    }
}

impl From<&UserProgress> for UserProgressDAO {
    fn from(progress: &UserProgress) -> Self {
        let awarded: Vec<String> = progress.awarded.iter().map(|m| m.to_string()).collect();
        let awarded_milestones =
            serde_json::to_string(&awarded).unwrap_or_else(|_| unreachable!());
        #[allow(clippy::cast_possible_wrap)]
        let total_messages = progress.total_messages as i64;
        #[allow(clippy::cast_possible_wrap)]
        let total_voice_secs = progress.total_voice_secs as i64;
        #[allow(clippy::cast_possible_wrap)]
        let counting_rounds = progress.counting_rounds as i64;
        UserProgressDAO {
            guild_id: i64_from_id!(progress.key.guild),
            user_id: i64_from_id!(progress.key.user),
            message_xp: progress.message_xp.to_i64(),
            voice_xp: progress.voice_xp.to_i64(),
            level: i64::from(progress.level),
            total_messages,
            total_voice_secs,
            counting_rounds,
            last_message_ts: progress.last_message_ts,
            streak_days: i64::from(progress.streak_days),
            last_streak_day: progress
                .last_streak_day
                .map(|d| d.format(DAY_FMT).to_string()),
            awarded_milestones,
        }
    }
}

/// Leaderboard metric. A closed enum instead of a caller-supplied column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Xp,
    Messages,
    VoiceSeconds,
    CountingRounds,
}

impl Metric {
    fn order_expr(self) -> &'static str {
        match self {
            Metric::Xp => "message_xp + voice_xp",
            Metric::Messages => "total_messages",
            Metric::VoiceSeconds => "total_voice_secs",
            Metric::CountingRounds => "counting_rounds",
        }
    }
}

/// Opens (creating if missing) a SQLite database at `url`,
/// e.g. `sqlite://leveling.db`.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let pool = SqlitePoolOptions::new().connect_with(opts).await?;
    Ok(pool)
}

pub(crate) async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(SCHEMA).await?;
    Ok(())
}

const ALL_COLUMNS: &str = "guild_id, user_id, message_xp, voice_xp, level, \
    total_messages, total_voice_secs, counting_rounds, last_message_ts, \
    streak_days, last_streak_day, awarded_milestones";

pub(crate) async fn fetch(
    exec: impl SqliteExecutor<'_>,
    key: UserKey,
) -> Result<Option<UserProgressDAO>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ALL_COLUMNS} FROM user_progress WHERE guild_id = ? AND user_id = ?"
    ))
    .bind(i64_from_id!(key.guild))
    .bind(i64_from_id!(key.user))
    .fetch_optional(exec)
    .await
}

/// Fetches the row for `key`, inserting a default one first if the user has
/// never been seen.
pub(crate) async fn fetch_or_insert(
    conn: &mut sqlx::SqliteConnection,
    key: UserKey,
) -> Result<UserProgressDAO, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO user_progress (guild_id, user_id) VALUES (?, ?)")
        .bind(i64_from_id!(key.guild))
        .bind(i64_from_id!(key.user))
        .execute(&mut *conn)
        .await?;
    sqlx::query_as(&format!(
        "SELECT {ALL_COLUMNS} FROM user_progress WHERE guild_id = ? AND user_id = ?"
    ))
    .bind(i64_from_id!(key.guild))
    .bind(i64_from_id!(key.user))
    .fetch_one(conn)
    .await
}

/// Writes every mutable column of the row back.
pub(crate) async fn store(
    exec: impl SqliteExecutor<'_>,
    dao: &UserProgressDAO,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE user_progress SET \
            message_xp = ?, voice_xp = ?, level = ?, \
            total_messages = ?, total_voice_secs = ?, counting_rounds = ?, \
            last_message_ts = ?, streak_days = ?, last_streak_day = ?, \
            awarded_milestones = ? \
        WHERE guild_id = ? AND user_id = ?",
    )
    .bind(dao.message_xp)
    .bind(dao.voice_xp)
    .bind(dao.level)
    .bind(dao.total_messages)
    .bind(dao.total_voice_secs)
    .bind(dao.counting_rounds)
    .bind(dao.last_message_ts)
    .bind(dao.streak_days)
    .bind(dao.last_streak_day.as_deref())
    .bind(dao.awarded_milestones.as_str())
    .bind(dao.guild_id)
    .bind(dao.user_id)
    .execute(exec)
    .await?;
    Ok(())
}

/// The only deletion path: explicit admin reset.
pub(crate) async fn delete(exec: impl SqliteExecutor<'_>, key: UserKey) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_progress WHERE guild_id = ? AND user_id = ?")
        .bind(i64_from_id!(key.guild))
        .bind(i64_from_id!(key.user))
        .execute(exec)
        .await?;
    Ok(())
}

pub(crate) async fn top_by(
    exec: impl SqliteExecutor<'_>,
    guild: GuildId,
    metric: Metric,
    limit: u32,
) -> Result<Vec<(UserId, i64)>, sqlx::Error> {
    let limit = limit.clamp(1, 100);
    let rows: Vec<(i64, i64)> = sqlx::query_as(&format!(
        "SELECT user_id, {} AS value FROM user_progress \
        WHERE guild_id = ? ORDER BY value DESC LIMIT ?",
        metric.order_expr()
    ))
    .bind(i64_from_id!(guild))
    .bind(i64::from(limit))
    .fetch_all(exec)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(user_id, value)| (UserId(id_from_i64!(user_id)), value))
        .collect())
}
