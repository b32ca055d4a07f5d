//! File selection: drop ignored/binary files, apply an include allow-list.

use globset::{Glob, GlobSet, GlobSetBuilder};

use critique_diff::{Diff, FileDiff, FileStatus};

fn build_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().unwrap())
}

/// Returns the subset of `diff.files` that survive ignore-glob filtering,
/// binary-file dropping, and (if non-empty) the include allow-list.
pub fn select_files<'a>(diff: &'a Diff, ignore_patterns: &[String], include_globs: &[String]) -> Vec<&'a FileDiff> {
    let ignore = build_set(ignore_patterns);
    let include = build_set(include_globs);
    diff.files
        .iter()
        .filter(|f| f.status != FileStatus::Binary)
        .filter(|f| !ignore.is_match(f.display_path()))
        .filter(|f| include_globs.is_empty() || include.is_match(f.display_path()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use critique_diff::parse_diff;

    fn sample_diff() -> Diff {
        let text = "diff --git a/src/main.rs b/src/main.rs\n\
index 111..222 100644\n\
--- a/src/main.rs\n\
+++ b/src/main.rs\n\
@@ -1,1 +1,2 @@\n\
 fn main() {}\n\
+// comment\n\
diff --git a/vendor/lib.min.js b/vendor/lib.min.js\n\
index 333..444 100644\n\
--- a/vendor/lib.min.js\n\
+++ b/vendor/lib.min.js\n\
@@ -1,1 +1,1 @@\n\
-old\n\
+new\n";
        parse_diff(text).unwrap()
    }

    #[test]
    fn ignore_glob_drops_matching_files() {
        let diff = sample_diff();
        let selected = select_files(&diff, &["vendor/**".to_string()], &[]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].display_path(), "src/main.rs");
    }

    #[test]
    fn include_globs_restrict_to_allow_list() {
        let diff = sample_diff();
        let selected = select_files(&diff, &[], &["src/**".to_string()]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].display_path(), "src/main.rs");
    }

    #[test]
    fn empty_include_list_means_everything_passes() {
        let diff = sample_diff();
        let selected = select_files(&diff, &[], &[]);
        assert_eq!(selected.len(), 2);
    }
}
