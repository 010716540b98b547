//! XP accrual, leveling, milestone and streak tracking for a guild bot,
//! persisted in SQLite.
//!
//! The crate is the *core* only: the host feeds activities in via
//! [`Leveling::record_activity`] and delivers the returned
//! [`LevelingEvent`]s (announcements, role rewards) itself. Configuration is
//! an explicit, validated [`LevelingConfig`] handed to the engine at
//! construction.
//!
//! ```no_run
//! # async fn demo() -> guild_leveling::Result<()> {
//! use chrono::Utc;
//! use guild_leveling::{connect, Activity, GuildId, Leveling, LevelingConfig, UserId, UserKey};
//!
//! let cfg = LevelingConfig::from_json_str(&std::fs::read_to_string("leveling.json").unwrap())?;
//! let engine = Leveling::new(connect("sqlite://leveling.db").await?, cfg).await?;
//!
//! let key = UserKey::new(GuildId(1), UserId(42));
//! let outcome = engine
//!     .record_activity(
//!         key,
//!         Activity::Message { chars: 120, has_media_attachment: false },
//!         Utc::now(),
//!     )
//!     .await?;
//! for event in &outcome.events {
//!     // announce level-ups, grant milestone roles, ...
//!     let _ = event;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod db;
mod engine;
mod error;
mod events;
mod exp;
mod ids;
mod level;

pub use config::{
    AttachmentBonus, ConfigError, CountingXpConfig, LengthBonus, LevelFormula, LevelingConfig,
    MessageXpConfig, MilestoneConfig, StreakConfig, StreakResetPolicy, VoiceXpConfig, XpConfig,
};
pub use db::{connect, Metric, UserProgress};
pub use engine::{Activity, Leveling, Outcome};
pub use error::{Error, Result};
pub use events::{LevelingEvent, MilestoneId, MilestoneKind, ParseMilestoneIdError};
pub use exp::Exp;
pub use ids::{GuildId, UserId, UserKey};
