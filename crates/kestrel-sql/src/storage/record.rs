//! Record handles.

use std::sync::Arc;

use parking_lot::Mutex;

use kestrel_common::{KestrelError, KestrelResult, RecordId};

/// A stored row: an id plus a shared, mutex-guarded byte buffer.
///
/// Cloning a `Record` clones the handle, not the bytes.
#[derive(Debug, Clone)]
pub struct Record {
    rid: RecordId,
    data: Arc<Mutex<Vec<u8>>>,
}

impl Record {
    /// Wraps a freshly built buffer.
    pub fn new(rid: RecordId, data: Vec<u8>) -> Self {
        Self {
            rid,
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Record id.
    pub fn rid(&self) -> RecordId {
        self.rid
    }

    /// The guarded buffer. Hold the lock only for the duration of a copy.
    pub fn data(&self) -> &Arc<Mutex<Vec<u8>>> {
        &self.data
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true for a zero-length record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies out `len` bytes at `offset`.
    pub fn read_field(&self, offset: usize, len: usize) -> KestrelResult<Vec<u8>> {
        let data = self.data.lock();
        data.get(offset..offset + len)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| out_of_bounds(self.rid, offset, len, data.len()))
    }

    /// Overwrites bytes at `offset`.
    pub fn write_field(&self, offset: usize, bytes: &[u8]) -> KestrelResult<()> {
        let mut data = self.data.lock();
        let size = data.len();
        let region = data
            .get_mut(offset..offset + bytes.len())
            .ok_or_else(|| out_of_bounds(self.rid, offset, bytes.len(), size))?;
        region.copy_from_slice(bytes);
        Ok(())
    }
}

fn out_of_bounds(rid: RecordId, offset: usize, len: usize, size: usize) -> KestrelError {
    KestrelError::internal(format!(
        "field range {offset}..{} outside record {rid} of {size} bytes",
        offset + len
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let record = Record::new(RecordId::new(1), vec![0; 8]);
        record.write_field(4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(record.read_field(4, 4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(record.len(), 8);
        assert!(record.read_field(6, 4).is_err());
        assert!(record.write_field(7, &[0, 0]).is_err());
    }

    #[test]
    fn test_clones_share_bytes() {
        let record = Record::new(RecordId::new(1), vec![0; 4]);
        let handle = record.clone();
        handle.write_field(0, &[9]).unwrap();
        assert_eq!(record.read_field(0, 1).unwrap(), vec![9]);
    }
}
