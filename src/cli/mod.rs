use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use crate::store::HistoryEntry;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Double AES-CBC text encryption with history and bookmarks
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(long, global = true, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encrypt text with the active profile
    Encrypt(TransformArgs),
    /// Decrypt text with the active profile
    Decrypt(TransformArgs),
    /// Decrypt text that looks encrypted, encrypt anything else
    Auto(TransformArgs),
    /// Report whether text looks like ciphertext
    Detect {
        /// Text to inspect; read from stdin when omitted
        text: Option<String>,
    },
    /// Inspect and edit the history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Inspect and edit bookmarks
    Bookmarks {
        #[command(subcommand)]
        action: BookmarkAction,
    },
    /// Manage key profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Write history and bookmarks to a backup file
    Export {
        path: PathBuf,
        /// Leave history out of the backup
        #[arg(long)]
        no_history: bool,
        /// Leave bookmarks out of the backup
        #[arg(long)]
        no_bookmarks: bool,
    },
    /// Merge entries from a backup file
    Import { path: PathBuf },
    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TransformArgs {
    /// Text to transform; read from stdin when omitted
    pub text: Option<String>,

    /// Use the Base64 key/IV and a single AES pass
    #[arg(long)]
    pub single: bool,

    /// Bookmark the recorded entry
    #[arg(long)]
    pub favorite: bool,

    /// Note attached to the recorded entry
    #[arg(long)]
    pub note: Option<String>,

    /// Do not add the result to history
    #[arg(long)]
    pub no_record: bool,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List all entries, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Entries whose input, output or note contains TEXT (case-insensitive)
    Search {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// The most recent entries
    Recent {
        /// Defaults to the RecentItemsCount setting
        count: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Delete entries from history; their bookmarks stay
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete every entry that is not a favorite
    Clear,
    /// Set the note of an entry
    Note { id: String, note: String },
    /// Bookmark an entry
    Favorite { id: String },
    /// Remove an entry's bookmark
    Unfavorite { id: String },
}

#[derive(Subcommand, Debug)]
pub enum BookmarkAction {
    /// List all bookmarks
    List {
        #[arg(long)]
        json: bool,
    },
    /// Bookmarks whose input, output or note contains TEXT (case-insensitive)
    Search {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete bookmarks and unfavorite their history entries
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete all bookmarks
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// List profiles; the active one is marked with '*'
    List,
    /// Add a profile with random keys
    Add { name: String },
    /// Make a profile the active one
    Select { name: String },
    /// Delete a profile
    Remove { name: String },
    /// Replace a profile's keys
    SetKeys {
        name: String,
        #[arg(long)]
        key: String,
        #[arg(long)]
        iv: String,
    },
    /// Store keys as the defaults for new configurations (active profile's keys if omitted)
    SetDefault {
        #[arg(long, requires = "iv")]
        key: Option<String>,
        #[arg(long, requires = "key")]
        iv: Option<String>,
    },
    /// Discard all profiles and start over from the defaults
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one setting, e.g. `max-history-items 200`
    Set { name: String, value: String },
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// One line per entry: id, local time, operation, favorite marker, input, output,
/// then the note if there is one.
pub fn format_entry(entry: &HistoryEntry) -> String {
    let mut line = format!(
        "{}  {}  {:<7} {} {} -> {}",
        entry.id,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.operation,
        if entry.is_favorite { '*' } else { ' ' },
        entry.input,
        entry.output
    );
    if !entry.note.is_empty() {
        line.push_str(&format!("  # {}", entry.note));
    }
    line
}

/// Strips the line ending that terminal input and pipes append.
pub fn trim_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Operation;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_encrypt_defaults() {
        let args = parse(&["aesvault", "encrypt", "hello"]);
        assert_eq!(args.log_format, "text");
        assert_eq!(args.log_level, DEFAULT_LOG_LEVEL);
        match args.command {
            Command::Encrypt(t) => {
                assert_eq!(t.text.as_deref(), Some("hello"));
                assert!(!t.single);
                assert!(!t.favorite);
                assert!(!t.no_record);
                assert!(t.note.is_none());
            }
            other => panic!("Expected encrypt, got {:?}", other),
        }
    }

    #[test]
    fn test_transform_flags() {
        let args = parse(&[
            "aesvault", "decrypt", "--single", "--favorite", "--note", "work", "--no-record",
        ]);
        match args.command {
            Command::Decrypt(t) => {
                assert!(t.text.is_none());
                assert!(t.single && t.favorite && t.no_record);
                assert_eq!(t.note.as_deref(), Some("work"));
            }
            other => panic!("Expected decrypt, got {:?}", other),
        }
    }

    #[test]
    fn test_global_log_flags_after_subcommand() {
        let args = parse(&["aesvault", "detect", "abc", "--log-format", "json", "--log-level", "debug"]);
        assert_eq!(args.log_format, "json");
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        assert!(CliArgs::try_parse_from(["aesvault", "--log-format", "xml", "detect"]).is_err());
    }

    #[test]
    fn test_history_subcommands() {
        match parse(&["aesvault", "history", "delete", "a", "b"]).command {
            Command::History {
                action: HistoryAction::Delete { ids },
            } => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("Unexpected {:?}", other),
        }
        assert!(CliArgs::try_parse_from(["aesvault", "history", "delete"]).is_err());

        match parse(&["aesvault", "history", "recent", "3", "--json"]).command {
            Command::History {
                action: HistoryAction::Recent { count, json },
            } => {
                assert_eq!(count, Some(3));
                assert!(json);
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_profile_set_default_needs_both_keys() {
        assert!(CliArgs::try_parse_from(["aesvault", "profile", "set-default", "--key", "k"]).is_err());
        assert!(CliArgs::try_parse_from(["aesvault", "profile", "set-default"]).is_ok());
    }

    #[test]
    fn test_export_flags() {
        match parse(&["aesvault", "export", "/tmp/b.json", "--no-history"]).command {
            Command::Export {
                path,
                no_history,
                no_bookmarks,
            } => {
                assert_eq!(path, PathBuf::from("/tmp/b.json"));
                assert!(no_history);
                assert!(!no_bookmarks);
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_format_entry() {
        let entry = HistoryEntry::new(Operation::Encrypt, "in", "out")
            .favorite(true)
            .with_note("memo");
        let line = format_entry(&entry);
        assert!(line.starts_with(&entry.id));
        assert!(line.contains("encrypt"));
        assert!(line.contains("* in -> out"));
        assert!(line.ends_with("# memo"));
    }

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending("abc\n"), "abc");
        assert_eq!(trim_line_ending("abc\r\n"), "abc");
        assert_eq!(trim_line_ending("abc \n\n"), "abc \n");
        assert_eq!(trim_line_ending("abc"), "abc");
    }
}
