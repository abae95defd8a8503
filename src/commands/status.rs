use crate::commands::session::{Session, SessionOptions};
use crate::core::{
    classify::{classify, DisplayCategory},
    output::{format_file_line, print_info, print_section_header},
    state::CachedState,
    CacheUsage,
};
use colored::*;

/// Show the state of the given files, or of every file that needs attention
pub fn execute_status(options: &SessionOptions, files: Vec<String>) -> crate::core::Result<()> {
    let mut session = Session::open(options)?;

    let explicit = !files.is_empty();
    let targets = if explicit {
        session.resolve(&files)
    } else {
        session.provider.known_files()
    };

    let states = session.provider.get_state(&targets, CacheUsage::ForceUpdate);
    let shown: Vec<&CachedState> = states
        .iter()
        .filter(|state| explicit || needs_attention(classify(&state.status)))
        .collect();

    let summary = session.provider.status_summary();
    if let Some(branch) = &summary.branch {
        println!("\n{} {}", "On branch".white(), branch.blue());
    }

    if shown.is_empty() {
        print_info("Nothing to report, all files are current");
        return Ok(());
    }

    print_section_header("Files");
    for state in shown {
        let relative = session.display_path(&state.path);
        println!("{}", format_file_line(&relative, &state.status));
    }
    println!();

    Ok(())
}

fn needs_attention(category: DisplayCategory) -> bool {
    !matches!(
        category,
        DisplayCategory::Lockable | DisplayCategory::Unmodified | DisplayCategory::None
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_categories_are_hidden() {
        assert!(!needs_attention(DisplayCategory::Unmodified));
        assert!(!needs_attention(DisplayCategory::Lockable));
        assert!(needs_attention(DisplayCategory::CheckedOut));
        assert!(needs_attention(DisplayCategory::NotAtHead));
    }
}
