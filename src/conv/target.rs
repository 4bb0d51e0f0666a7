/// Marker trait for byte-oriented buffers with incremental append operations
///
/// In most ways, it is convenient to think of `Target` as an analogous trait to
/// [`std::io::Write`]. The principal difference between the two is the fact
/// that the `push_XXX` methods on `Target` are infallible and total; while they
/// return a `usize` value representing the number of bytes written, this is
/// used only for book-keeping on the caller side (e.g. to fill in the length
/// prefix of a packed sequence), never to signal partial success.
pub trait Target {
    /// Ensures that at least `extra` more bytes can be appended without
    /// reallocation, where the implementor has a notion of capacity
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty buffer
    #[must_use]
    fn create() -> Self;

    /// Appends a single byte; the return value must be `1`
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends the bytes of a known-length array; the return value must be `N`
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends the bytes of a slice; the return value must be its length
    ///
    /// ```ignore
    /// x.push_all(&arr) === x.push_many(arr)
    /// ```
    fn push_all(&mut self, buf: &[u8]) -> usize;

    /// Records that the preceding `push_XXX` operations form one logical
    /// unit, such as a single packed node
    ///
    /// This must have no effect on the contents of the buffer. A default
    /// no-op implementation is provided.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Performs [`Target::resolve`] and returns `0usize`, for use as the
    /// final term of a sum of byte-counts
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vec_target_counts() {
        let mut buf: Vec<u8> = Target::create();
        assert!(buf.is_empty());
        buf.anticipate(8);
        let n = buf.push_one(0x05)
            + buf.push_many([0x00, 0x02])
            + buf.push_all(&[0x0a])
            + buf.resolve_zero();
        assert_eq!(n, 4);
        assert_eq!(buf, vec![0x05, 0x00, 0x02, 0x0a]);
    }
}
