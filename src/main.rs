/*!
# aesvault

Command-line front end for the aesvault library.

## Usage

```text
aesvault [OPTIONS] <COMMAND>

Commands:
  encrypt    Encrypt text with the active profile
  decrypt    Decrypt text with the active profile
  auto       Decrypt text that looks encrypted, encrypt anything else
  detect     Report whether text looks like ciphertext
  history    Inspect and edit the history
  bookmarks  Inspect and edit bookmarks
  profile    Manage key profiles
  export     Write history and bookmarks to a backup file
  import     Merge entries from a backup file
  settings   Show or change preferences

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level used when RUST_LOG is not set [default: warn]
```

## Configuration

- `AESVAULT_DIR`: data directory (defaults to `~/.config/aesvault`)
- `AESVAULT_PASSPHRASE`: passphrase for the key vault; prompted for when unset
*/

use aesvault::cli::{
    format_entry, trim_line_ending, BookmarkAction, CliArgs, Command, HistoryAction,
    ProfileAction, SettingsAction, TransformArgs,
};
use aesvault::config::{AppSettings, Config, DataDirLock};
use aesvault::constants::{
    DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME,
};
use aesvault::crypto::{looks_like_encrypted, AgeProtector};
use aesvault::errors::{AppResult, StoreError};
use aesvault::ops::{self, Mode, TransformRequest};
use aesvault::profiles::{KeySet, KeyVault};
use aesvault::store::{Collection, EntryStore, HistoryEntry, Operation};
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn main() {
    let args = CliArgs::parse();
    init_tracing(&args.log_format, &args.log_level);

    let correlation_id = Uuid::new_v4().to_string();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = root_span.enter();

    if let Err(e) = run_application(args) {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `--log-level`.
fn init_tracing(format: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if format == LOG_FORMAT_JSON {
        builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .init();
    } else {
        builder.with_target(false).init();
    }
}

fn run_application(args: CliArgs) -> AppResult<()> {
    let config = Config::load()?;
    config.validate()?;
    debug!("Configuration loaded: {:?}", config);

    let _lock = DataDirLock::acquire(&config.data_dir)?;
    let data_dir = config.data_dir.as_path();

    let mut settings = AppSettings::load(data_dir);
    let mut store = EntryStore::open(data_dir);
    ops::apply_limits(&mut store, &settings);

    match args.command {
        Command::Encrypt(t) => transform_command(data_dir, &mut store, Some(Operation::Encrypt), t, &settings),
        Command::Decrypt(t) => transform_command(data_dir, &mut store, Some(Operation::Decrypt), t, &settings),
        Command::Auto(t) => transform_command(data_dir, &mut store, None, t, &settings),
        Command::Detect { text } => {
            let text = read_input(text)?;
            let verdict = if looks_like_encrypted(text.trim()) {
                "encrypted"
            } else {
                "plain"
            };
            println!("{}", verdict);
            Ok(())
        }
        Command::History { action } => history_command(&mut store, action, &settings),
        Command::Bookmarks { action } => bookmarks_command(&mut store, action),
        Command::Profile { action } => profile_command(data_dir, action),
        Command::Export {
            path,
            no_history,
            no_bookmarks,
        } => {
            let report = ops::export(&mut store, &path, !no_history, !no_bookmarks)?;
            println!(
                "Exported {} history entries and {} bookmarks to {}",
                report.history_count,
                report.bookmark_count,
                path.display()
            );
            println!("blake3: {}", report.checksum);
            Ok(())
        }
        Command::Import { path } => {
            let report = ops::import(&mut store, &path)?;
            println!(
                "Imported {} new items ({} history, {} bookmarks)",
                report.total(),
                report.history_added,
                report.bookmarks_added
            );
            Ok(())
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => print_json(&settings),
            SettingsAction::Set { name, value } => {
                settings.set(&name, &value)?;
                settings.save(data_dir)?;
                info!("Setting {} updated", name);
                print_json(&settings)
            }
        },
    }
}

fn open_vault(data_dir: &Path) -> AppResult<KeyVault<AgeProtector>> {
    Ok(KeyVault::new(data_dir, AgeProtector::from_env_or_prompt()?))
}

/// Text from the argument, or all of stdin minus one trailing line ending.
fn read_input(text: Option<String>) -> AppResult<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(trim_line_ending(&buffer).to_string())
        }
    }
}

fn transform_command(
    data_dir: &Path,
    store: &mut EntryStore,
    operation: Option<Operation>,
    args: TransformArgs,
    settings: &AppSettings,
) -> AppResult<()> {
    let input = read_input(args.text)?;
    let operation = operation.unwrap_or_else(|| {
        if settings.auto_detect {
            ops::detect_operation(&input)
        } else {
            Operation::Encrypt
        }
    });
    let input = match operation {
        Operation::Decrypt => input.trim().to_string(),
        Operation::Encrypt => input,
    };

    let vault = open_vault(data_dir)?;
    let app_config = vault.load()?;
    let keys = app_config.active_keys()?;

    let request = TransformRequest {
        operation,
        input,
        mode: if args.single { Mode::Single } else { Mode::Double },
        favorite: args.favorite,
        note: args.note,
        record: !args.no_record,
    };
    let outcome = ops::run(store, keys, request)?;
    println!("{}", outcome.output);
    Ok(())
}

fn history_command(
    store: &mut EntryStore,
    action: HistoryAction,
    settings: &AppSettings,
) -> AppResult<()> {
    match action {
        HistoryAction::List { json } => print_entries(store.history(), json),
        HistoryAction::Search { text, json } => {
            print_entries(&store.search(Collection::History, &text), json)
        }
        HistoryAction::Recent { count, json } => {
            let count = count.unwrap_or(settings.recent_items_count);
            print_entries(&store.recent(count), json)
        }
        HistoryAction::Delete { ids } => {
            let removed = store.delete_history_entries(&ids);
            println!("Deleted {} history entries", removed);
            Ok(())
        }
        HistoryAction::Clear => {
            store.clear_history();
            println!("History cleared; favorites kept");
            Ok(())
        }
        HistoryAction::Note { id, note } => {
            let entry = find_anywhere(store, &id)?.with_note(note);
            store.update_entry(&entry);
            Ok(())
        }
        HistoryAction::Favorite { id } => {
            let entry = find_anywhere(store, &id)?.favorite(true);
            store.update_entry(&entry);
            Ok(())
        }
        HistoryAction::Unfavorite { id } => {
            let entry = find_anywhere(store, &id)?.favorite(false);
            store.update_entry(&entry);
            Ok(())
        }
    }
}

fn bookmarks_command(store: &mut EntryStore, action: BookmarkAction) -> AppResult<()> {
    match action {
        BookmarkAction::List { json } => print_entries(store.bookmarks(), json),
        BookmarkAction::Search { text, json } => {
            print_entries(&store.search(Collection::Bookmarks, &text), json)
        }
        BookmarkAction::Delete { ids } => {
            let removed = store.delete_bookmark_entries(&ids);
            println!("Deleted {} bookmarks", removed);
            Ok(())
        }
        BookmarkAction::Clear => {
            store.clear_bookmarks();
            println!("Bookmarks cleared");
            Ok(())
        }
    }
}

fn profile_command(data_dir: &Path, action: ProfileAction) -> AppResult<()> {
    let vault = open_vault(data_dir)?;

    if let ProfileAction::Reset = action {
        vault.reset_to_defaults()?;
        println!("Key configuration reset to defaults");
        return Ok(());
    }

    let mut app_config = vault.load()?;
    match action {
        ProfileAction::List => {
            let active_id = app_config.active_profile().map(|p| p.id);
            for profile in &app_config.profiles {
                let marker = if Some(profile.id) == active_id { '*' } else { ' ' };
                println!("{} {}  {}", marker, profile.name, profile.id);
            }
            return Ok(());
        }
        ProfileAction::Add { name } => {
            let id = app_config.add_profile(&name)?.id;
            println!("Added profile {} ({})", name.trim(), id);
        }
        ProfileAction::Select { name } => {
            let selected = app_config.select_profile(&name)?.name.clone();
            println!("Active profile: {}", selected);
        }
        ProfileAction::Remove { name } => {
            let removed = app_config.remove_profile(&name)?;
            println!("Removed profile {}", removed.name);
        }
        ProfileAction::SetKeys { name, key, iv } => {
            app_config.set_profile_keys(&name, KeySet::from_plaintext(&key, &iv)?)?;
            println!("Keys of profile {} replaced", name.trim());
        }
        ProfileAction::SetDefault { key, iv } => {
            let (key, iv) = match (key, iv) {
                (Some(key), Some(iv)) => (key, iv),
                _ => {
                    let active = app_config.active_keys()?;
                    (active.key.clone(), active.iv.clone())
                }
            };
            vault.set_as_defaults(&key, &iv)?;
            println!("Default keys updated");
            return Ok(());
        }
        ProfileAction::Reset => {}
    }
    vault.save(&app_config)
}

/// Looks an entry up in history, then in bookmarks.
fn find_anywhere(store: &mut EntryStore, id: &str) -> AppResult<HistoryEntry> {
    if let Some(entry) = store.find(Collection::History, id) {
        return Ok(entry.clone());
    }
    store
        .find(Collection::Bookmarks, id)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
}

fn print_entries(entries: &[HistoryEntry], json: bool) -> AppResult<()> {
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No entries");
    }
    for entry in entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| aesvault::AppError::Config(format!("Failed to render JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}
