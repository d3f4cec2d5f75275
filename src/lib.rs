/*!
# aesvault

aesvault encrypts and decrypts short pieces of text (phone numbers, account ids,
connection strings) with AES-CBC and keeps a searchable record of what it did.

## Core Features

- Double AES-CBC encryption with a plaintext key/IV, or a single pass with a Base64 key/IV
- A heuristic that tells ciphertext produced by this tool from ordinary text
- Named key profiles, stored sealed with an age passphrase
- A history of transforms with notes, plus a bookmarks collection of favorites
- JSON backup export and import

## Architecture

- `cli`: Command-line interface handling using clap
- `config`: Environment configuration, persisted settings and the data directory lock
- `constants`: Names, defaults and file names
- `crypto`: Cipher transforms, key validation and secret protection
- `errors`: Error handling infrastructure
- `profiles`: Key profiles and the protected key vault
- `store`: The history and bookmarks store
- `ops`: Workflows that combine the above

## Usage Example

```rust,no_run
use aesvault::ops::{run, TransformRequest};
use aesvault::profiles::KeySet;
use aesvault::store::{EntryStore, Operation};
use aesvault::Config;

fn main() -> aesvault::AppResult<()> {
    let config = Config::load()?;
    let mut store = EntryStore::open(&config.data_dir);

    let outcome = run(
        &mut store,
        &KeySet::default(),
        TransformRequest::new(Operation::Encrypt, "0912345678"),
    )?;
    println!("{}", outcome.output);
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// AES transforms, key handling and secret protection
pub mod crypto;
/// Error types and utilities for error handling
pub mod errors;
/// High-level workflows
pub mod ops;
/// Key profiles and their protected storage
pub mod profiles;
/// History and bookmarks persistence
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::{AppSettings, Config};
pub use errors::{AppError, AppResult};
pub use profiles::{AppConfig, KeyProfile, KeySet, KeyVault};
pub use store::{Collection, EntryStore, HistoryEntry, Operation};
