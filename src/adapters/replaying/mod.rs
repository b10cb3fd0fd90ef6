//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_generator;

use std::sync::{Arc, Mutex};

use crate::cassette::replayer::CassetteReplayer;

/// Retrieve the next recorded output for a given port and method.
///
/// # Errors
///
/// Returns an error if the lock is poisoned or the cassette has no more
/// interactions for the pair.
pub(crate) fn next_output(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, String> {
    let mut guard = replayer.lock().map_err(|e| format!("replayer lock poisoned: {e}"))?;
    let output = guard.next_interaction(port, method)?.output.clone();
    Ok(output)
}

/// How a replayed interaction ended.
#[derive(Debug)]
pub(crate) enum Replayed<T> {
    /// The recorded call succeeded with this value.
    Ok(T),
    /// The recorded call failed with this message.
    Err(String),
}

/// Deserialize a replayed output using the Ok/Err JSON convention.
///
/// # Errors
///
/// Returns an error if the output does not match the expected type.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(
    output: serde_json::Value,
) -> Result<Replayed<T>, serde_json::Error> {
    if let Some(err_val) = output.get("Err").or_else(|| output.get("err")) {
        let msg = err_val.as_str().unwrap_or("replayed error").to_string();
        return Ok(Replayed::Err(msg));
    }
    if let Some(ok_val) = output.get("Ok").or_else(|| output.get("ok")) {
        return serde_json::from_value(ok_val.clone()).map(Replayed::Ok);
    }
    serde_json::from_value(output).map(Replayed::Ok)
}
