//! Fixed-capacity byte regions owned by a `Session`.

use std::fmt;

/// Largest capacity whose allocation, terminator included, still fits in
/// `isize::MAX` bytes.
pub const MAX_CAPACITY: usize = isize::MAX as usize - 1;

/// A byte region with a fixed capacity and a logical length.
///
/// One extra byte is allocated past `capacity` so the content can always be
/// NUL-terminated for text use; the terminator is never counted in `len`.
#[derive(Clone)]
pub struct IoBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl IoBuffer {
    /// Capacities above [`MAX_CAPACITY`] are clamped to it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; slot_count(capacity)].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// The valid bytes, `[0, len)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The valid bytes decoded as UTF-8, with invalid sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Resets the logical length. Bytes past it are left as they were.
    pub fn clear(&mut self) {
        self.len = 0;
        self.data[0] = 0;
    }

    /// Appends as much of `bytes` as fits and returns how many were copied.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.remaining());
        self.data[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.advance(n);
        n
    }

    /// Free space after the current content, for reading into.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let cap = self.capacity();
        &mut self.data[self.len..cap]
    }

    /// Marks `n` more bytes of the spare region as valid.
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.len += n;
        self.data[self.len] = 0;
    }

    /// Drops the first `n` valid bytes, shifting the rest to the front.
    pub(crate) fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
        self.data[self.len] = 0;
    }
}

fn slot_count(capacity: usize) -> usize {
    capacity.min(MAX_CAPACITY) + 1
}

/// Formatted text is truncated at capacity rather than reported as an error.
impl fmt::Write for IoBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s.as_bytes());
        Ok(())
    }
}

impl fmt::Debug for IoBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_append_clamps_to_capacity() {
        let mut buf = IoBuffer::with_capacity(4);
        assert_eq!(buf.append(b"ab"), 2);
        assert_eq!(buf.append(b"cdef"), 2);
        assert_eq!(buf.as_bytes(), b"abcd");
        assert!(buf.is_full());
        assert_eq!(buf.append(b"g"), 0);
    }

    #[test]
    fn test_clear_then_overwrite() {
        let mut buf = IoBuffer::with_capacity(8);
        buf.append(b"abcd");
        buf.clear();
        assert_eq!(buf.len(), 0);
        assert!(buf.as_bytes().is_empty());

        buf.append(b"xy");
        assert_eq!(buf.as_bytes(), b"xy");
    }

    #[test]
    fn test_nul_terminated_after_content() {
        let mut buf = IoBuffer::with_capacity(3);
        buf.append(b"abc");
        assert_eq!(buf.data[3], 0);
        buf.consume(1);
        assert_eq!(&buf.data[..3], b"bc\0");
    }

    #[test]
    fn test_zero_bytes_are_content() {
        let mut buf = IoBuffer::with_capacity(8);
        buf.append(b"a\0b");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_bytes(), b"a\0b");
    }

    #[test]
    fn test_spare_and_advance() {
        let mut buf = IoBuffer::with_capacity(6);
        buf.append(b"ab");
        let spare = buf.spare_mut();
        assert_eq!(spare.len(), 4);
        spare[..2].copy_from_slice(b"cd");
        buf.advance(2);
        assert_eq!(buf.as_bytes(), b"abcd");
        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn test_consume_keeps_remainder() {
        let mut buf = IoBuffer::with_capacity(8);
        buf.append(b"hello");
        buf.consume(3);
        assert_eq!(buf.as_bytes(), b"lo");
        buf.consume(10);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_huge_capacity_does_not_overflow() {
        assert_eq!(slot_count(usize::MAX), MAX_CAPACITY + 1);
        assert_eq!(slot_count(MAX_CAPACITY), MAX_CAPACITY + 1);
        assert_eq!(slot_count(0), 1);
        assert_eq!(IoBuffer::with_capacity(0).capacity(), 0);
    }

    #[test]
    fn test_formatted_append_truncates() {
        let mut buf = IoBuffer::with_capacity(8);
        write!(buf, "recv:{}", 12345).unwrap();
        assert_eq!(buf.as_bytes(), b"recv:123");
        assert_eq!(buf.to_string_lossy(), "recv:123");
    }
}
