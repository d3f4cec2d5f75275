//! Encrypt or decrypt a piece of text and record the result.

use crate::crypto::{
    decrypt_double, decrypt_single, encrypt_double, encrypt_single, looks_like_encrypted,
};
use crate::errors::AppResult;
use crate::profiles::KeySet;
use crate::store::{EntryStore, HistoryEntry, Operation};
use tracing::{debug, info};

/// Which cipher path to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plaintext key/IV, two AES-CBC passes.
    #[default]
    Double,
    /// Base64 key/IV, one AES-CBC pass.
    Single,
}

/// Parameters of one transform.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub operation: Operation,
    pub input: String,
    pub mode: Mode,
    /// Record the entry as a favorite.
    pub favorite: bool,
    pub note: Option<String>,
    /// Whether a successful, non-empty transform is added to history.
    pub record: bool,
}

impl TransformRequest {
    pub fn new(operation: Operation, input: impl Into<String>) -> Self {
        Self {
            operation,
            input: input.into(),
            mode: Mode::Double,
            favorite: false,
            note: None,
            record: true,
        }
    }
}

/// Outcome of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub output: String,
    /// Id of the recorded history entry, if one was added.
    pub entry_id: Option<String>,
}

/// Picks decrypt for input that looks like ciphertext, encrypt otherwise.
pub fn detect_operation(input: &str) -> Operation {
    if looks_like_encrypted(input.trim()) {
        Operation::Decrypt
    } else {
        Operation::Encrypt
    }
}

/// Runs the cipher for `operation` in `mode` with `keys`.
///
/// # Errors
///
/// Propagates the cipher's `CryptoError`s unchanged.
pub fn transform(operation: Operation, input: &str, mode: Mode, keys: &KeySet) -> AppResult<String> {
    match (operation, mode) {
        (Operation::Encrypt, Mode::Double) => encrypt_double(input, &keys.key, &keys.iv),
        (Operation::Decrypt, Mode::Double) => decrypt_double(input, &keys.key, &keys.iv),
        (Operation::Encrypt, Mode::Single) => {
            encrypt_single(input, &keys.key_base64, &keys.iv_base64)
        }
        (Operation::Decrypt, Mode::Single) => {
            decrypt_single(input, &keys.key_base64, &keys.iv_base64)
        }
    }
}

/// Transforms `request.input` and, on success, records it in `store`.
///
/// Failed transforms leave the store untouched. Empty input transforms to empty
/// output and is never recorded.
///
/// # Errors
///
/// Returns the cipher error for bad key material or ciphertext.
pub fn run(
    store: &mut EntryStore,
    keys: &KeySet,
    request: TransformRequest,
) -> AppResult<TransformOutcome> {
    debug!(
        "Running {} in {:?} mode on {} bytes",
        request.operation,
        request.mode,
        request.input.len()
    );
    let output = transform(request.operation, &request.input, request.mode, keys)?;

    if !request.record || request.input.is_empty() {
        return Ok(TransformOutcome {
            output,
            entry_id: None,
        });
    }

    let mut entry = HistoryEntry::new(request.operation, request.input, output.clone())
        .favorite(request.favorite);
    if let Some(note) = request.note {
        entry = entry.with_note(note);
    }
    let entry_id = entry.id.clone();
    store.add_entry(entry);
    info!("Recorded {} as history entry {}", request.operation, entry_id);

    Ok(TransformOutcome {
        output,
        entry_id: Some(entry_id),
    })
}
