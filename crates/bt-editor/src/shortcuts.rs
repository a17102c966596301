//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Drawing / tagging ──
    /// Abort the drag or close the tag prompt.
    Cancel,
    ConfirmTag,

    // ── Edit ──
    DeleteHovered,
    /// Ask to remove every box on the current image.
    ClearImage,

    // ── Queue ──
    NextImage,
    PrevImage,
    Submit,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Enter"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "Delete" | "Backspace" => Some(ShortcutAction::ClearImage),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "Enter" => Some(ShortcutAction::Submit),
                _ => None,
            };
        }

        if shift {
            return match key {
                "Escape" => Some(ShortcutAction::Cancel),
                _ => None,
            };
        }

        // ── Single keys (no modifiers) ──
        match key {
            "Escape" => Some(ShortcutAction::Cancel),
            "Enter" => Some(ShortcutAction::ConfirmTag),
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteHovered),
            "ArrowRight" => Some(ShortcutAction::NextImage),
            "ArrowLeft" => Some(ShortcutAction::PrevImage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_keys() {
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, false),
            Some(ShortcutAction::ConfirmTag)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::DeleteHovered)
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, false, false, false),
            Some(ShortcutAction::PrevImage)
        );
    }

    #[test]
    fn cmd_enter_submits_on_both_platforms() {
        assert_eq!(
            ShortcutMap::resolve("Enter", true, false, false, false),
            Some(ShortcutAction::Submit)
        );
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, true),
            Some(ShortcutAction::Submit)
        );
    }

    #[test]
    fn cmd_shift_delete_clears() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, true, false, true),
            Some(ShortcutAction::ClearImage)
        );
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", true, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("Enter", false, true, false, false), None);
    }
}
