//! Pure XP-delta computation per activity. Cooldowns and persistence live in
//! the engine; this module only answers "how much is this activity worth".

use crate::config::{CountingXpConfig, MessageXpConfig, VoiceXpConfig};

pub(super) fn message_xp(cfg: &MessageXpConfig, chars: usize, has_media_attachment: bool) -> u64 {
    let mut gain = cfg.amount;
    if has_media_attachment {
        if let Some(bonus) = &cfg.attachment_bonus {
            gain = gain.saturating_add(bonus.amount);
        }
    }
    if let Some(bonus) = &cfg.length_bonus {
        // chars_per_bonus_xp is validated to be >= 1
        let length_bonus = (chars as u64 / bonus.chars_per_bonus_xp).min(bonus.max_bonus);
        gain = gain.saturating_add(length_bonus);
    }
    gain
}

/// Only full minutes earn XP; leftover seconds are the caller's to carry.
pub(super) fn voice_xp(cfg: &VoiceXpConfig, seconds: u64) -> u64 {
    let full_minutes = seconds / 60;
    full_minutes.saturating_mul(cfg.amount_per_minute)
}

pub(super) fn counting_xp(cfg: &CountingXpConfig) -> u64 {
    cfg.amount
}
