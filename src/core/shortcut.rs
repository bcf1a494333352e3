//! Shortcut classifier - maps a key release to a playback action.
//!
//! The speed key is matched by symbol identity first. The legacy hardware
//! code is checked as well because the same physical key produces different
//! symbols across layouts (` on US, ' on UK, @ on Japanese/French, ö on
//! German); users of those layouts have come to rely on the physical key
//! working regardless of what it types.

use crate::events::KeyupEvent;

/// Hardware code of the physical speed key (backtick on a US layout).
pub const LEGACY_SPEED_KEY_CODE: u32 = 192;

/// Symbols accepted as the speed key across layouts.
const SPEED_KEY_SYMBOLS: [char; 4] = ['`', '\'', '"', '@'];

/// Action a key release classified into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    /// Un-modified speed key: toggle or cycle per the configured policy.
    ToggleOrCycle,
    /// Single-modifier chord: jump straight to this rate.
    FixedRate(f64),
    /// Digit key: seek to digit/10 of the duration.
    Seek(u8),
}

/// Classify a key release. Returns `None` for anything that is not a
/// recognized shortcut, including ambiguous multi-modifier chords.
///
/// Shift is deliberately ignored: `"` and `@` already require it on many
/// layouts, so it cannot disambiguate anything.
pub fn classify(event: &KeyupEvent, seek_enabled: bool) -> Option<ShortcutAction> {
    let mods = event.modifiers;

    if is_speed_key(event) {
        return match (mods.ctrl, mods.alt, mods.meta) {
            (false, false, false) => Some(ShortcutAction::ToggleOrCycle),
            (true, false, false) => Some(ShortcutAction::FixedRate(3.0)),
            (false, false, true) => Some(ShortcutAction::FixedRate(4.0)),
            (false, true, false) => Some(ShortcutAction::FixedRate(5.0)),
            // Two or more of ctrl/alt/meta: ambiguous, match nothing
            _ => None,
        };
    }

    if seek_enabled
        && !mods.ctrl
        && !mods.alt
        && !mods.meta
        && let Some(digit) = event.key.and_then(|k| k.to_digit(10))
    {
        return Some(ShortcutAction::Seek(digit as u8));
    }

    None
}

fn is_speed_key(event: &KeyupEvent) -> bool {
    event.key.is_some_and(|k| SPEED_KEY_SYMBOLS.contains(&k))
        || event.code == LEGACY_SPEED_KEY_CODE
}
