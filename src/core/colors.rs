//! Color mapping for display categories.
//!
//! # Public API
//! - [`get_category_color_style`]: color function for a category
//! - [`get_aligned_category`]: fixed-width colored category label
//! - [`get_colored_path`]: apply the category color to a path
//!
//! # Color Scheme
//! - **NotAtHead / LockedByOther / Unmerged**: red, the file is blocked
//! - **ModifiedOnOtherBranch**: magenta
//! - **Added**: green
//! - **Modified / CheckedOut**: yellow
//! - **Deleted**: red
//! - **Untracked**: cyan
//! - **Lockable / Unmodified / None**: muted

use crate::core::classify::DisplayCategory;
use colored::*;

/// Width of the longest category label
const LABEL_WIDTH: usize = 12;

pub fn get_category_color_style(category: DisplayCategory) -> Box<dyn Fn(&str) -> ColoredString> {
    match category {
        DisplayCategory::NotAtHead => Box::new(|text: &str| text.red().bold()),
        DisplayCategory::LockedByOther => Box::new(|text: &str| text.red()),
        DisplayCategory::ModifiedOnOtherBranch => Box::new(|text: &str| text.magenta()),
        DisplayCategory::Added => Box::new(|text: &str| text.green()),
        DisplayCategory::Unmerged => Box::new(|text: &str| text.red().bold()),
        DisplayCategory::Deleted => Box::new(|text: &str| text.red()),
        DisplayCategory::Modified => Box::new(|text: &str| text.yellow()),
        DisplayCategory::Untracked => Box::new(|text: &str| text.cyan()),
        DisplayCategory::CheckedOut => Box::new(|text: &str| text.yellow().bold()),
        DisplayCategory::Lockable | DisplayCategory::Unmodified | DisplayCategory::None => {
            Box::new(|text: &str| text.bright_black())
        }
    }
}

pub fn get_aligned_category(category: DisplayCategory) -> ColoredString {
    let color_fn = get_category_color_style(category);
    color_fn(&format!("{:<width$}", category.as_str(), width = LABEL_WIDTH))
}

pub fn get_colored_path(category: DisplayCategory, path: &str) -> ColoredString {
    let color_fn = get_category_color_style(category);
    color_fn(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_labels_share_width() {
        colored::control::set_override(false);
        let short = get_aligned_category(DisplayCategory::Added).to_string();
        let long = get_aligned_category(DisplayCategory::LockedByOther).to_string();
        assert_eq!(short.len(), long.len());
        colored::control::unset_override();
    }

    #[test]
    fn test_colored_path_keeps_text() {
        colored::control::set_override(false);
        let path = get_colored_path(DisplayCategory::Modified, "Content/A.uasset");
        assert_eq!(path.to_string(), "Content/A.uasset");
        colored::control::unset_override();
    }
}
