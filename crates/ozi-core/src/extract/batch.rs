//! Accumulate-and-flush over an ordered sequence of query keys.

use super::progress::ExtractionProgress;

/// Lazy sequence of record batches.
///
/// For each key, `fetch` produces the records for that key (possibly lazily,
/// possibly none); records are appended to an accumulator that is yielded
/// whenever it reaches `batch_size`. The remainder is yielded once the keys
/// are exhausted. Every yielded batch is non-empty and at most `batch_size`
/// long. Batch boundaries do not align with key boundaries.
///
/// `fetch` owns failure handling: a key whose call failed simply yields no
/// records. The sequence can only be restarted by building a new extractor.
pub struct BatchExtractor<K, F, I>
where
    I: IntoIterator,
{
    keys: std::vec::IntoIter<K>,
    fetch: F,
    current: Option<I::IntoIter>,
    buffer: Vec<I::Item>,
    batch_size: usize,
    progress: ExtractionProgress,
}

impl<K, F, I> BatchExtractor<K, F, I>
where
    F: FnMut(&K) -> I,
    I: IntoIterator,
{
    /// `batch_size` of 0 is treated as 1. Adds `keys.len()` to the progress total.
    pub fn new(keys: Vec<K>, batch_size: usize, progress: ExtractionProgress, fetch: F) -> Self {
        let batch_size = batch_size.max(1);
        progress.add_total(keys.len() as u64);
        Self {
            keys: keys.into_iter(),
            fetch,
            current: None,
            buffer: Vec::with_capacity(batch_size),
            batch_size,
            progress,
        }
    }

    fn take_buffer(&mut self) -> Vec<I::Item> {
        std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size))
    }
}

impl<K, F, I> Iterator for BatchExtractor<K, F, I>
where
    F: FnMut(&K) -> I,
    I: IntoIterator,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(records) = self.current.as_mut() {
                match records.next() {
                    Some(rec) => {
                        self.progress.add_received(1);
                        self.buffer.push(rec);
                        if self.buffer.len() >= self.batch_size {
                            return Some(self.take_buffer());
                        }
                    }
                    None => {
                        self.current = None;
                        self.progress.key_done();
                    }
                }
                continue;
            }

            match self.keys.next() {
                Some(key) => self.current = Some((self.fetch)(&key).into_iter()),
                None if self.buffer.is_empty() => return None,
                None => return Some(self.take_buffer()),
            }
        }
    }
}
