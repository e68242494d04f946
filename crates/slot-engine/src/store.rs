//! Key-path document store seam.
//!
//! The booking site keeps tutors and bookings in a hosted JSON tree addressed by
//! `/`-separated paths. [`DocumentStore`] is that interface; [`MemoryStore`] is an
//! in-process tree used by tests and the CLI.

use serde_json::{Map, Value};

use crate::error::{BookingError, Result};

/// Read/write access to a JSON document tree by path.
///
/// Writing `null` is equivalent to removing the path, and absent paths read as `None`.
pub trait DocumentStore {
    fn get(&self, path: &str) -> Result<Option<Value>>;

    fn set(&mut self, path: &str, value: Value) -> Result<()>;

    fn remove(&mut self, path: &str) -> Result<()>;

    /// Store `value` under a fresh child key of `path` and return that key.
    fn append(&mut self, path: &str, value: Value) -> Result<String>;
}

/// A [`DocumentStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    root: Value,
    appended: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(root: Value) -> Self {
        Self { root, appended: 0 }
    }

    pub fn into_value(self) -> Value {
        self.root
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn child<'v>(node: &'v Value, segment: &str) -> Option<&'v Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'v>(node: &'v mut Value, segment: &str) -> Option<&'v mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Descend into `segment`, replacing scalars and creating objects along the way.
fn child_or_insert<'v>(node: &'v mut Value, segment: &str) -> Result<&'v mut Value> {
    if !node.is_object() && !node.is_array() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => {
            let len = items.len();
            segment
                .parse::<usize>()
                .ok()
                .and_then(move |i| items.get_mut(i))
                .ok_or_else(|| {
                    BookingError::Store(format!(
                        "index {:?} out of bounds for array of length {}",
                        segment, len
                    ))
                })
        }
        _ => Err(BookingError::Store(format!(
            "cannot descend into {:?}",
            segment
        ))),
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Option<Value>> {
        let mut node = &self.root;
        for segment in segments(path) {
            match child(node, segment) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        Ok((!node.is_null()).then(|| node.clone()))
    }

    fn set(&mut self, path: &str, value: Value) -> Result<()> {
        if value.is_null() {
            return self.remove(path);
        }
        let segs = segments(path);
        let Some((last, parents)) = segs.split_last() else {
            self.root = value;
            return Ok(());
        };

        let mut node = &mut self.root;
        for segment in parents {
            node = child_or_insert(node, segment)?;
        }
        *child_or_insert(node, last)? = value;
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<()> {
        let segs = segments(path);
        let Some((last, parents)) = segs.split_last() else {
            self.root = Value::Null;
            return Ok(());
        };

        let mut node = &mut self.root;
        for segment in parents {
            match child_mut(node, segment) {
                Some(next) => node = next,
                None => return Ok(()),
            }
        }
        match node {
            Value::Object(map) => {
                map.remove(*last);
            }
            Value::Array(items) => {
                if let Some(slot) = last.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    *slot = Value::Null;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Keys are `-item<counter>`. The counter restarts with every [`MemoryStore`],
    /// so keys already present under `path` are skipped.
    fn append(&mut self, path: &str, value: Value) -> Result<String> {
        let parent = path.trim_end_matches('/');
        loop {
            self.appended += 1;
            let key = format!("-item{:012}", self.appended);
            let child_path = format!("{}/{}", parent, key);
            if self.get(&child_path)?.is_none() {
                self.set(&child_path, value)?;
                return Ok(key);
            }
        }
    }
}
