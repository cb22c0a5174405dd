//! Fixed-size windows over an ordered list of work items

use std::num::NonZeroUsize;

/// Split `items` into contiguous windows of `size` items.
///
/// The last window may be shorter. Windows are lazy borrowed slices: nothing
/// is reordered, deduplicated or filtered, so concatenating them yields the
/// input exactly. A zero size is unrepresentable and must be rejected when
/// the configuration is parsed.
pub fn chunks<T>(items: &[T], size: NonZeroUsize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_even_split() {
        let items = [1, 2, 3, 4];
        let windows: Vec<_> = chunks(&items, size(2)).collect();
        assert_eq!(windows, vec![&[1, 2][..], &[3, 4][..]]);
    }

    #[test]
    fn test_short_last_window() {
        let items = ["a", "b", "c", "d", "e"];
        let windows: Vec<_> = chunks(&items, size(2)).collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2], &["e"][..]);
    }

    #[test]
    fn test_size_larger_than_input() {
        let items = [1, 2, 3];
        let windows: Vec<_> = chunks(&items, size(10)).collect();
        assert_eq!(windows, vec![&[1, 2, 3][..]]);
    }

    #[test]
    fn test_empty_input() {
        let items: [u8; 0] = [];
        assert_eq!(chunks(&items, size(3)).count(), 0);
    }

    #[test]
    fn test_concatenation_equals_input() {
        let items: Vec<usize> = (0..23).collect();
        for n in 1..=25 {
            let windows: Vec<_> = chunks(&items, size(n)).collect();
            for window in &windows[..windows.len() - 1] {
                assert_eq!(window.len(), n);
            }
            assert!(windows.last().unwrap().len() <= n);
            let joined: Vec<usize> = windows.concat();
            assert_eq!(joined, items, "chunk size {}", n);
        }
    }
}
