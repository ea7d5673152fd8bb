//! Environment variable loading.
//!
//! Keeps the fallback chains in one place so callers never repeat
//! `or_else(|| env::var(..))` ladders.

use std::env;
use std::path::Path;
use std::str::FromStr;

/// Load `.env` from the current directory into the process environment.
/// Variables that are already set are never overridden. Runs at most once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env`, skipping keys that are already present.
/// Returns the number of variables that were set.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let content = match std::fs::read_to_string(dir.join(".env")) {
        Ok(c) => c,
        Err(_) => return 0,
    };
    let mut applied = 0;
    for line in content.lines() {
        if let Some((key, value)) = parse_dotenv_line(line) {
            if env::var(key).is_err() {
                env::set_var(key, value);
                applied += 1;
            }
        }
    }
    tracing::debug!(dir = %dir.display(), applied, "Loaded .env");
    applied
}

/// Parse one `KEY=value` line. Comments, blank lines and lines without `=`
/// yield `None`. Surrounding quotes are removed; an unquoted trailing
/// `# comment` is dropped.
pub(crate) fn parse_dotenv_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    if key.is_empty() {
        return None;
    }
    let mut value = line[eq_pos + 1..].trim();
    if let Some(hash_pos) = value.find('#') {
        let before_hash = value[..hash_pos].trim_end();
        if !before_hash.contains('"') && !before_hash.contains('\'') {
            value = before_hash;
        }
    }
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        value = &value[1..value.len() - 1];
    }
    Some((key, value))
}

fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
}

/// Read the primary key or the first alias that is set; empty values fall
/// back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(primary, aliases)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` for unset or blank values.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean flag: `0/false/no/off` is false, any other value is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup(primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Parse a typed value. Unparsable input is logged and replaced by `default`.
pub fn env_parse<T>(primary: &str, aliases: &[&str], default: T) -> T
where
    T: FromStr,
{
    match env_optional(primary, aliases) {
        Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key = primary, value = %raw, "Ignoring unparsable value");
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_line() {
        assert_eq!(parse_dotenv_line("KEY=value"), Some(("KEY", "value")));
        assert_eq!(parse_dotenv_line("  KEY = value  "), Some(("KEY", "value")));
        assert_eq!(parse_dotenv_line("KEY=\"quoted value\""), Some(("KEY", "quoted value")));
        assert_eq!(parse_dotenv_line("KEY='single'"), Some(("KEY", "single")));
        assert_eq!(parse_dotenv_line("KEY=value # note"), Some(("KEY", "value")));
        assert_eq!(parse_dotenv_line("export KEY=v"), Some(("KEY", "v")));
        assert_eq!(parse_dotenv_line("# comment"), None);
        assert_eq!(parse_dotenv_line(""), None);
        assert_eq!(parse_dotenv_line("no_equals"), None);
        assert_eq!(parse_dotenv_line("=value"), None);
    }

    #[test]
    fn test_quoted_hash_is_kept() {
        assert_eq!(
            parse_dotenv_line("KEY=\"a # b\""),
            Some(("KEY", "a # b"))
        );
    }

    #[test]
    fn test_load_dotenv_does_not_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "SANDRUN_TEST_DOTENV_NEW=from_file\nSANDRUN_TEST_DOTENV_SET=from_file\n",
        )
        .unwrap();
        env::set_var("SANDRUN_TEST_DOTENV_SET", "from_env");

        let applied = load_dotenv_from_dir(dir.path());

        assert_eq!(applied, 1);
        assert_eq!(env::var("SANDRUN_TEST_DOTENV_NEW").unwrap(), "from_file");
        assert_eq!(env::var("SANDRUN_TEST_DOTENV_SET").unwrap(), "from_env");
    }

    #[test]
    fn test_env_or_alias_chain() {
        env::set_var("SANDRUN_TEST_ALIAS_B", "from_alias");
        assert_eq!(
            env_or("SANDRUN_TEST_PRIMARY_A", &["SANDRUN_TEST_ALIAS_B"], || "d".into()),
            "from_alias"
        );
        assert_eq!(
            env_or("SANDRUN_TEST_UNSET_X", &["SANDRUN_TEST_UNSET_Y"], || "d".into()),
            "d"
        );
    }

    #[test]
    fn test_env_optional_blank_is_none() {
        env::set_var("SANDRUN_TEST_BLANK", "   ");
        assert_eq!(env_optional("SANDRUN_TEST_BLANK", &[]), None);
    }

    #[test]
    fn test_env_bool() {
        env::set_var("SANDRUN_TEST_BOOL_OFF", "off");
        env::set_var("SANDRUN_TEST_BOOL_ON", "1");
        assert!(!env_bool("SANDRUN_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("SANDRUN_TEST_BOOL_ON", &[], false));
        assert!(env_bool("SANDRUN_TEST_BOOL_UNSET", &[], true));
    }

    #[test]
    fn test_env_parse_falls_back() {
        env::set_var("SANDRUN_TEST_PARSE_BAD", "lots");
        env::set_var("SANDRUN_TEST_PARSE_GOOD", "42");
        assert_eq!(env_parse::<u64>("SANDRUN_TEST_PARSE_BAD", &[], 7), 7);
        assert_eq!(env_parse::<u64>("SANDRUN_TEST_PARSE_GOOD", &[], 7), 42);
    }
}
