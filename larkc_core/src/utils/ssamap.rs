use std::{
    convert::{TryFrom, TryInto},
    fmt::Debug,
    marker::PhantomData,
};

type SSAKey = usize;

/// A helper utility for SSA-like map semantics.
///
/// Keys are handed out monotonically, slots are tombstoned on removal and
/// never reused so a key stays unambiguous for the lifetime of the map.
#[derive(Debug, Clone)]
pub struct SSAMap<K, V>
where
    K: TryFrom<SSAKey> + TryInto<SSAKey>,
{
    inner: Vec<Option<V>>,
    next_free: SSAKey,
    _k: PhantomData<K>,
}

impl<K, V> Default for SSAMap<K, V>
where
    K: TryFrom<SSAKey> + TryInto<SSAKey>,
    <K as TryFrom<SSAKey>>::Error: Debug,
    <K as TryInto<SSAKey>>::Error: Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SSAMap<K, V>
where
    K: TryFrom<SSAKey> + TryInto<SSAKey>,
    <K as TryFrom<SSAKey>>::Error: Debug,
    <K as TryInto<SSAKey>>::Error: Debug,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: vec![],
            next_free: 0,
            _k: PhantomData,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.iter().all(Option::is_none)
    }

    /// The number of live (non-tombstoned) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.iter().filter(|slot| slot.is_some()).count()
    }

    #[inline]
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (K, &'a V)> {
        self.inner.iter().enumerate().filter_map(|(idx, value)| {
            value
                .as_ref()
                .and_then(|v| K::try_from(idx).ok().map(|k| (k, v)))
        })
    }

    /// Advance the key allocator to `pos`, leaving the skipped slots empty.
    #[inline]
    pub fn skip_to_nth(&mut self, pos: SSAKey) -> Result<(), SSAKey> {
        if pos < self.next_free {
            Err(self.next_free)
        } else {
            for _ in 0..(pos - self.next_free) {
                self.inner.push(None);
            }

            self.next_free = pos;

            Ok(())
        }
    }

    #[inline]
    pub fn insert(&mut self, value: impl Into<V>) -> K {
        let key = self.next_free;
        self.next_free += 1;

        assert_eq!(key, self.inner.len());

        self.inner.push(Some(value.into()));

        K::try_from(key).unwrap()
    }

    #[inline]
    pub fn get(&self, key: K) -> Option<&V> {
        self.inner.get(key.try_into().unwrap())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.inner.get_mut(key.try_into().unwrap())?.as_mut()
    }

    /// Tombstone the slot for `key`, returning its value.
    ///
    /// The key is retired, it will never be handed out again.
    #[inline]
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.inner.get_mut(key.try_into().unwrap())?.take()
    }
}
