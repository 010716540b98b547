//! The leveling engine: ties accrual, level math, milestones and streaks
//! together around one SQLite transaction per inbound activity.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use crate::config::LevelingConfig;
use crate::db::{self, dao::UserProgressDAO, Metric, UserProgress};
use crate::error::Result;
use crate::events::{LevelingEvent, MilestoneKind};
use crate::exp::Exp;
use crate::ids::{GuildId, UserId, UserKey};

mod accrual;
mod milestones;
mod streak;

/// An inbound activity reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Message {
        chars: usize,
        has_media_attachment: bool,
    },
    /// A slice of voice presence. Only full minutes earn XP, so hosts that
    /// tick more often than once a minute should carry the remainder seconds
    /// into the next tick themselves.
    VoiceTick { seconds: u64 },
    /// A successfully completed counting-game round the user took part in.
    CountingRound,
}

/// What one processed activity did to the user's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// XP granted by this activity; 0 when suppressed or the section is off.
    pub granted: u64,
    /// True when the message cooldown swallowed the grant.
    pub cooldown_suppressed: bool,
    pub total_xp: Exp,
    pub level: u32,
    pub streak_days: u32,
    /// Everything external collaborators should act on, in emission order.
    pub events: Vec<LevelingEvent>,
}

/// The core. Construct once with a validated config and share freely; every
/// operation is one transaction against the pool.
pub struct Leveling {
    pool: SqlitePool,
    cfg: LevelingConfig,
}

impl Leveling {
    /// Validates `cfg`, applies the schema, and returns a ready engine.
    pub async fn new(pool: SqlitePool, cfg: LevelingConfig) -> Result<Self> {
        cfg.validate()?;
        db::ensure_schema(&pool).await?;
        Ok(Self { pool, cfg })
    }

    pub fn config(&self) -> &LevelingConfig {
        &self.cfg
    }

    /// Processes one activity atomically: accrues XP, recomputes the level,
    /// awards newly crossed milestones, and advances the streak machine.
    pub async fn record_activity(
        &self,
        key: UserKey,
        activity: Activity,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let section_enabled = match activity {
            Activity::Message { .. } => self.cfg.xp.message.enabled,
            Activity::VoiceTick { .. } => self.cfg.xp.voice.enabled,
            Activity::CountingRound => self.cfg.xp.counting.enabled,
        };
        if !section_enabled {
            return self.snapshot_outcome(key).await;
        }

        let mut tx = self.pool.begin().await?;
        let dao = db::fetch_or_insert(&mut tx, key).await?;
        let mut progress = UserProgress::try_from(dao)?;

        let mut events: Vec<LevelingEvent> = Vec::new();
        let mut granted: u64 = 0;
        let mut cooldown_suppressed = false;

        match activity {
            Activity::Message {
                chars,
                has_media_attachment,
            } => {
                let msg_cfg = &self.cfg.xp.message;
                let elapsed = now.timestamp().saturating_sub(progress.last_message_ts);
                #[allow(clippy::cast_possible_wrap)]
                let cooldown = msg_cfg.cooldown_seconds as i64;
                if progress.last_message_ts > 0 && elapsed < cooldown {
                    cooldown_suppressed = true;
                } else {
                    granted = accrual::message_xp(msg_cfg, chars, has_media_attachment);
                    let prev_activity_ts = progress.last_message_ts;
                    progress.message_xp = progress.message_xp.saturating_add(granted);
                    progress.total_messages = progress.total_messages.saturating_add(1);
                    progress.last_message_ts = now.timestamp();

                    for milestone in milestones::award_crossed(
                        MilestoneKind::Messages,
                        &self.cfg.milestones.message_count,
                        progress.total_messages,
                        &mut progress.awarded,
                    ) {
                        events.push(LevelingEvent::MilestoneReached {
                            user: key,
                            milestone,
                        });
                    }

                    if self.cfg.streaks.enabled {
                        let (days, step, recorded_day) = streak::advance(
                            self.cfg.streaks.reset_policy,
                            progress.streak_days,
                            progress.last_streak_day,
                            prev_activity_ts,
                            now,
                        );
                        if let streak::StreakStep::Reset { previous } = step {
                            events.push(LevelingEvent::StreakBroken {
                                user: key,
                                previous_streak: previous,
                            });
                        }
                        progress.streak_days = days;
                        progress.last_streak_day = Some(recorded_day);
                    }
                }
            }
            Activity::VoiceTick { seconds } => {
                granted = accrual::voice_xp(&self.cfg.xp.voice, seconds);
                progress.voice_xp = progress.voice_xp.saturating_add(granted);
                progress.total_voice_secs = progress.total_voice_secs.saturating_add(seconds);
            }
            Activity::CountingRound => {
                granted = accrual::counting_xp(&self.cfg.xp.counting);
                // Counting happens in chat, so its XP accrues to the message pool.
                progress.message_xp = progress.message_xp.saturating_add(granted);
                progress.counting_rounds = progress.counting_rounds.saturating_add(1);

                for milestone in milestones::award_crossed(
                    MilestoneKind::CountingRounds,
                    &self.cfg.milestones.counting_rounds,
                    progress.counting_rounds,
                    &mut progress.awarded,
                ) {
                    events.push(LevelingEvent::MilestoneReached {
                        user: key,
                        milestone,
                    });
                }
            }
        }

        let new_level = self.cfg.level_formula.level_for(progress.total_xp());
        if new_level > progress.level {
            events.push(LevelingEvent::LevelUp {
                user: key,
                old_level: progress.level,
                new_level,
            });
            progress.level = new_level;
        }

        db::store(&mut *tx, &UserProgressDAO::from(&progress)).await?;
        tx.commit().await?;

        tracing::debug!(
            user = %key,
            granted,
            cooldown_suppressed,
            total_xp = %progress.total_xp(),
            level = progress.level,
            "processed activity"
        );

        Ok(Outcome {
            granted,
            cooldown_suppressed,
            total_xp: progress.total_xp(),
            level: progress.level,
            streak_days: progress.streak_days,
            events,
        })
    }

    /// Reads a user's record; `None` when the user was never seen.
    pub async fn progress(&self, key: UserKey) -> Result<Option<UserProgress>> {
        match db::fetch(&self.pool, key).await? {
            Some(dao) => Ok(Some(UserProgress::try_from(dao)?)),
            None => Ok(None),
        }
    }

    /// Admin override of the message XP pool. The level is recomputed; a
    /// raised level is reported via `LevelUp`, a lowered one is stored
    /// silently.
    pub async fn set_message_xp(&self, key: UserKey, amount: u64) -> Result<Outcome> {
        let mut tx = self.pool.begin().await?;
        let dao = db::fetch_or_insert(&mut tx, key).await?;
        let mut progress = UserProgress::try_from(dao)?;

        let mut events = Vec::new();
        progress.message_xp = Exp(amount);
        let new_level = self.cfg.level_formula.level_for(progress.total_xp());
        if new_level > progress.level {
            events.push(LevelingEvent::LevelUp {
                user: key,
                old_level: progress.level,
                new_level,
            });
        }
        progress.level = new_level;

        db::store(&mut *tx, &UserProgressDAO::from(&progress)).await?;
        tx.commit().await?;

        Ok(Outcome {
            granted: 0,
            cooldown_suppressed: false,
            total_xp: progress.total_xp(),
            level: progress.level,
            streak_days: progress.streak_days,
            events,
        })
    }

    /// Explicit admin reset: deletes the user's row entirely.
    pub async fn reset(&self, key: UserKey) -> Result<()> {
        db::delete(&self.pool, key).await?;
        tracing::debug!(user = %key, "reset user progress");
        Ok(())
    }

    /// Guild leaderboard over `metric`, best first. `limit` is clamped to 100.
    pub async fn top(
        &self,
        guild: GuildId,
        metric: Metric,
        limit: u32,
    ) -> Result<Vec<(UserId, i64)>> {
        let rows = db::top_by(&self.pool, guild, metric, limit).await?;
        Ok(rows)
    }

    async fn snapshot_outcome(&self, key: UserKey) -> Result<Outcome> {
        let (total_xp, level, streak_days) = match self.progress(key).await? {
            Some(p) => (p.total_xp(), p.level, p.streak_days),
            None => (Exp(0), 0, 0),
        };
        Ok(Outcome {
            granted: 0,
            cooldown_suppressed: false,
            total_xp,
            level,
            streak_days,
            events: Vec::new(),
        })
    }
}
