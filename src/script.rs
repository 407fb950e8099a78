use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a task before or while it runs.
///
/// Invalid commands and failed commands are not errors at this level: they end
/// the task with [`TaskStatus::Failed`](crate::TaskStatus::Failed).
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("cannot open file: {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write task report")]
    Output(#[from] io::Error),
}

/// Strip a trailing `#` comment and surrounding whitespace.
///
/// Returns `None` for lines with nothing left. The comment marker is recognized
/// anywhere, including inside a quoted message.
pub fn normalize_line(raw: &str) -> Option<&str> {
    let code = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let line = code.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'));
    (!line.is_empty()).then_some(line)
}

/// Read a task script and return its non-empty, normalized lines.
pub fn read_script(path: &Path) -> Result<Vec<String>, TaskError> {
    let content = fs::read_to_string(path).map_err(|source| TaskError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .filter_map(normalize_line)
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_strips_comments_and_blanks() {
        assert_eq!(
            normalize_line("  CREATE USER alice  # This is Alice"),
            Some("CREATE USER alice")
        );
        assert_eq!(normalize_line("\tGET USERS\r"), Some("GET USERS"));
        assert_eq!(normalize_line("# only a comment"), None);
        assert_eq!(normalize_line("   "), None);
        assert_eq!(normalize_line(""), None);
    }

    #[test]
    fn test_comment_marker_inside_quotes_is_still_a_comment() {
        assert_eq!(
            normalize_line(r#"SEND MESSAGE alice "issue #4""#),
            Some(r#"SEND MESSAGE alice "issue"#)
        );
    }

    #[test]
    fn test_read_script_skips_empty_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "\n  # header\n  CREATE USER alice\n\n  GET USERS # list\n  EXIT\n"
        )
        .unwrap();

        let lines = read_script(file.path()).unwrap();
        assert_eq!(lines, vec!["CREATE USER alice", "GET USERS", "EXIT"]);
    }

    #[test]
    fn test_read_missing_script() {
        let err = read_script(Path::new("definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, TaskError::Open { .. }));
        assert_eq!(err.to_string(), "cannot open file: definitely/not/here.txt");
    }
}
