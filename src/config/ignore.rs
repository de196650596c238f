use std::path::Path;

const IGNORE_FILE: &str = ".resgraphignore";

/// Load the nearest `.resgraphignore`, walking up from `start`.
///
/// One URI or path glob per line; blank lines and `#` comments are skipped.
pub fn load_resgraphignore(start: &Path) -> Vec<String> {
    start
        .ancestors()
        .map(|dir| dir.join(IGNORE_FILE))
        .find(|path| path.is_file())
        .and_then(|path| std::fs::read_to_string(path).ok())
        .map(|content| parse_ignore_patterns(&content))
        .unwrap_or_default()
}

fn parse_ignore_patterns(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}
