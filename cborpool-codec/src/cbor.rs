//! CBOR engine backed by ciborium.

use std::any::type_name;
use std::cmp::Ordering;
use std::ops::Range;
use std::sync::Arc;

use ciborium::Value;
use ciborium::tag::Captured;
use serde::Serialize;

use cborpool_core::{Atlas, EncodeError, Engine, KeySortMode, ProxyWriter};

/// Initial size of the key scratch buffer.
const DEFAULT_SCRATCH_SIZE: usize = 256;

/// Engine that encodes values as CBOR according to an [`Atlas`].
///
/// With [`KeySortMode::Preserve`] the value is serialized straight into the
/// proxy, with the type's semantic tag written as a header in front of it.
/// The other modes lower the value to a [`ciborium::Value`] tree first so map
/// keys can be reordered; encoded keys are staged in a scratch buffer that
/// lives as long as the engine.
///
/// An unregistered type is rejected before anything is written. A value whose
/// `Serialize` impl fails partway through may leave a partial item in the
/// destination when streaming.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use cborpool_codec::CborEngine;
/// use cborpool_core::{Atlas, Engine, ProxyWriter};
///
/// let mut engine = CborEngine::new(Arc::new(Atlas::open()));
/// let mut out = Vec::new();
///
/// engine.marshal(&42u8, &mut ProxyWriter::bound(&mut out)).unwrap();
/// assert_eq!(out, [0x18, 0x2a]);
/// ```
#[derive(Debug)]
pub struct CborEngine {
    atlas: Arc<Atlas>,
    scratch: Vec<u8>,
    spans: Vec<Range<usize>>,
}

impl CborEngine {
    /// The atlas this engine encodes with.
    #[must_use]
    pub fn atlas(&self) -> &Arc<Atlas> {
        &self.atlas
    }

    /// Semantic tag for `T`, or an error if the atlas does not accept `T`.
    fn resolve<T: ?Sized>(&self) -> Result<Option<u64>, EncodeError> {
        match self.atlas.entry::<T>() {
            Some(entry) => Ok(entry.tag()),
            None if self.atlas.is_open() => Ok(None),
            None => Err(EncodeError::UnregisteredType(type_name::<T>())),
        }
    }

    fn lower<T>(value: &T, tag: Option<u64>) -> Result<Value, EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let tree = Value::serialized(value).map_err(EncodeError::serialization)?;

        Ok(match tag {
            Some(tag) => Value::Tag(tag, Box::new(tree)),
            None => tree,
        })
    }

    fn sort_keys(&mut self, value: &mut Value, mode: KeySortMode) -> Result<(), EncodeError> {
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.sort_keys(item, mode)?;
                }
            }
            Value::Tag(_, inner) => self.sort_keys(inner, mode)?,
            Value::Map(entries) => {
                for (k, v) in entries.iter_mut() {
                    self.sort_keys(k, mode)?;
                    self.sort_keys(v, mode)?;
                }
                self.sort_map(entries, mode)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn sort_map(
        &mut self,
        entries: &mut Vec<(Value, Value)>,
        mode: KeySortMode,
    ) -> Result<(), EncodeError> {
        if entries.len() < 2 {
            return Ok(());
        }

        // Keys are compared by their encoded form
        self.scratch.clear();
        self.spans.clear();
        for (key, _) in entries.iter() {
            let start = self.scratch.len();
            ciborium::into_writer(key, &mut self.scratch).map_err(from_cbor)?;
            self.spans.push(start..self.scratch.len());
        }

        let scratch = &self.scratch;
        let spans = &self.spans;
        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by(|&a, &b| {
            let (ka, kb) = (&scratch[spans[a].clone()], &scratch[spans[b].clone()]);
            match mode {
                KeySortMode::LengthFirst => ka.len().cmp(&kb.len()).then_with(|| ka.cmp(kb)),
                KeySortMode::Bytewise => ka.cmp(kb),
                KeySortMode::Preserve => Ordering::Equal,
            }
        });

        let mut slots: Vec<Option<(Value, Value)>> = entries.drain(..).map(Some).collect();
        entries.extend(order.into_iter().filter_map(|i| slots[i].take()));
        Ok(())
    }
}

impl Engine for CborEngine {
    type Schema = Atlas;
    type Error = EncodeError;

    fn new(schema: Arc<Atlas>) -> Self {
        Self {
            atlas: schema,
            scratch: Vec::with_capacity(DEFAULT_SCRATCH_SIZE),
            spans: Vec::new(),
        }
    }

    fn marshal<T>(&mut self, value: &T, out: &mut ProxyWriter<'_>) -> Result<(), EncodeError>
    where
        T: Serialize + ?Sized,
    {
        let tag = self.resolve::<T>()?;

        let mode = self.atlas.key_sort();
        if mode == KeySortMode::Preserve {
            return match tag {
                Some(tag) => ciborium::into_writer(&Captured(Some(tag), value), out),
                None => ciborium::into_writer(value, out),
            }
            .map_err(from_cbor);
        }

        let mut tree = Self::lower(value, tag)?;
        self.sort_keys(&mut tree, mode)?;
        ciborium::into_writer(&tree, out).map_err(from_cbor)
    }
}

fn from_cbor(err: ciborium::ser::Error<std::io::Error>) -> EncodeError {
    match err {
        ciborium::ser::Error::Io(e) => EncodeError::from(e),
        ciborium::ser::Error::Value(msg) => EncodeError::Serialization(msg),
    }
}
