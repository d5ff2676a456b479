//! Process-wide registry of persistent emulator instances.
//!
//! Ids are chosen by the caller and opaque to the engine. One global lock
//! guards the map and the instances; every operation holds it for its full
//! duration, so feed and read are linearizable per instance.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::emulator::Emulator;
use crate::error::Error;
use crate::extract;

static INSTANCES: OnceLock<Mutex<HashMap<u64, Emulator>>> = OnceLock::new();

fn instances() -> &'static Mutex<HashMap<u64, Emulator>> {
    INSTANCES.get_or_init(|| Mutex::new(HashMap::new()))
}

fn with<T>(id: u64, f: impl FnOnce(&mut Emulator) -> T) -> Result<T, Error> {
    let mut map = instances().lock();
    let emulator = map.get_mut(&id).ok_or(Error::NotFound { id })?;
    Ok(f(emulator))
}

/// Allocate an instance under `id`. An existing instance with the same id
/// is destroyed first.
pub fn create(id: u64, cols: usize, rows: usize) {
    instances().lock().insert(id, Emulator::new(cols, rows));
}

/// Drop the instance; a no-op when the id is unknown.
pub fn destroy(id: u64) {
    instances().lock().remove(&id);
}

/// Feed bytes to the instance's parser. Partial escape sequences are held
/// until the next feed.
pub fn feed(id: u64, bytes: &[u8]) -> Result<(), Error> {
    with(id, |emulator| emulator.feed(bytes))?
}

pub fn resize(id: u64, cols: usize, rows: usize) -> Result<(), Error> {
    with(id, |emulator| emulator.resize(cols, rows))
}

pub fn reset(id: u64) -> Result<(), Error> {
    with(id, |emulator| emulator.reset())
}

/// Structured JSON for a window of rows; `limit` 0 means all.
pub fn json(id: u64, offset: usize, limit: usize) -> Result<String, Error> {
    let document = with(id, |emulator| extract::document(emulator, offset, limit))?;
    Ok(serde_json::to_string(&document)?)
}

/// Plain-text projection of all retained rows.
pub fn text(id: u64) -> Result<String, Error> {
    with(id, |emulator| extract::text(emulator, 0, 0))
}

/// Cursor as `[x, y]`, screen-relative.
pub fn cursor(id: u64) -> Result<[u32; 2], Error> {
    with(id, |emulator| emulator.cursor())
}

/// Whether the instance's parser is at a safe read boundary.
pub fn is_ready(id: u64) -> Result<bool, Error> {
    with(id, |emulator| emulator.is_ready())
}
