use std::path::Path;

/// Match a glob pattern against `text`.
///
/// - `*` matches any run of characters except `/`
/// - `**` matches any run of characters including `/`
/// - `?` matches one character except `/`
///
/// Matching is byte-wise and case-sensitive.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    match_bytes(pattern.as_bytes(), text.as_bytes())
}

fn match_bytes(p: &[u8], t: &[u8]) -> bool {
    match p.split_first() {
        None => t.is_empty(),
        Some((b'*', rest)) => {
            if let Some(after) = rest.strip_prefix(b"*") {
                if let Some(after_slash) = after.strip_prefix(b"/") {
                    // `**/` resumes only at a component boundary, zero directories included
                    match_bytes(after_slash, t)
                        || t.iter()
                            .enumerate()
                            .any(|(i, &c)| c == b'/' && match_bytes(after_slash, &t[i + 1..]))
                } else {
                    (0..=t.len()).any(|i| match_bytes(after, &t[i..]))
                }
            } else {
                let stop = t.iter().position(|&c| c == b'/').unwrap_or(t.len());
                (0..=stop).any(|i| match_bytes(rest, &t[i..]))
            }
        }
        Some((b'?', rest)) => match t.split_first() {
            Some((&c, tail)) if c != b'/' => match_bytes(rest, tail),
            _ => false,
        },
        Some((&pc, rest)) => match t.split_first() {
            Some((&tc, tail)) if tc == pc => match_bytes(rest, tail),
            _ => false,
        },
    }
}

/// Exclusion rules in `.gitignore` syntax.
///
/// Handles comments, `!` negation, trailing `/` for directories and anchoring
/// (leading `/` or an inner `/`). Only the root `.gitignore` is read.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

impl Rule {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, line) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, line) = match line.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (anchored, line) = match line.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (line.contains('/'), line),
        };

        (!line.is_empty()).then(|| Self {
            pattern: line.to_string(),
            negated,
            dir_only,
            anchored,
        })
    }

    fn matches(&self, relative_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        if self.anchored {
            glob_match(&self.pattern, relative_path)
        } else {
            let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
            glob_match(&self.pattern, name)
        }
    }
}

impl IgnoreRules {
    /// Read rules from a `.gitignore` file. A missing or unreadable file gives an
    /// empty rule set.
    #[must_use]
    pub fn from_file(path: &Path) -> Self {
        let mut rules = Self::default();
        if let Ok(content) = std::fs::read_to_string(path) {
            rules.extend(content.lines());
        } else {
            tracing::debug!("no ignore file at {}", path.display());
        }
        rules
    }

    pub fn extend<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        self.rules.extend(lines.into_iter().filter_map(Rule::parse));
    }

    /// Last matching rule wins, so a later `!pattern` re-includes a path.
    #[must_use]
    pub fn is_ignored(&self, relative_path: &str, is_dir: bool) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(relative_path, is_dir))
            .is_some_and(|rule| !rule.negated)
    }
}
