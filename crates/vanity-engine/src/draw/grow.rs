/// Growable array with an explicit length and a power-of-two capacity.
///
/// Backing storage is always fully initialized up to `capacity()`; `len`
/// marks how much of it belongs to the current frame. `clear` only resets
/// the length, so capacity reached in one frame is reused by the next and
/// is released when the array is dropped.
#[derive(Debug, Clone)]
pub struct GrowArray<T> {
    storage: Vec<T>,
    len: usize,
}

impl<T: Copy + Default> GrowArray<T> {
    pub const fn new() -> Self {
        Self {
            storage: Vec::new(),
            len: 0,
        }
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
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Ensures room for `additional` more items, doubling capacity as needed.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len + additional;
        if required <= self.storage.len() {
            return;
        }
        let new_cap = required.next_power_of_two();
        self.storage.resize(new_cap, T::default());
    }

    /// Appends `item` and returns its index.
    #[inline]
    pub fn push(&mut self, item: T) -> usize {
        self.reserve(1);
        let index = self.len;
        self.storage[index] = item;
        self.len += 1;
        index
    }

    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.reserve(items.len());
        self.storage[self.len..self.len + items.len()].copy_from_slice(items);
        self.len += items.len();
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.storage[self.len])
    }

    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Drops every item but keeps the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.len]
    }
}

impl<T: Copy + Default> Default for GrowArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_grows_by_powers_of_two() {
        let mut a = GrowArray::<u32>::new();
        assert_eq!(a.capacity(), 0);

        a.push(1);
        assert_eq!(a.capacity(), 1);
        a.push(2);
        assert_eq!(a.capacity(), 2);
        a.push(3);
        assert_eq!(a.capacity(), 4);

        a.extend_from_slice(&[4, 5, 6]);
        assert_eq!(a.capacity(), 8);
        assert_eq!(a.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut a = GrowArray::<u32>::new();
        a.extend_from_slice(&[0; 20]);
        assert_eq!(a.capacity(), 32);

        a.clear();
        assert!(a.is_empty());
        assert_eq!(a.capacity(), 32);
    }

    #[test]
    fn pop_and_last() {
        let mut a = GrowArray::<u32>::new();
        a.push(7);
        a.push(9);
        assert_eq!(a.last(), Some(&9));
        assert_eq!(a.pop(), Some(9));
        assert_eq!(a.pop(), Some(7));
        assert_eq!(a.pop(), None);
    }
}
