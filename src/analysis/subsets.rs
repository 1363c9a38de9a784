//! Restartable power-set enumeration in increasing-size order.

/// Yields every subset of `pool`, smallest first, lexicographic within a
/// size. Finite and lazy: nothing is materialized beyond the current
/// combination, so callers can early-exit on an exponential space.
pub(crate) struct IncreasingSubsets<T: Clone> {
    pool: Vec<T>,
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> IncreasingSubsets<T> {
    pub(crate) fn new(pool: Vec<T>) -> Self {
        Self {
            pool,
            indices: Vec::new(),
            done: false,
        }
    }

    /// Steps `indices` to the next combination of the same size, or grows
    /// the size by one. Returns false when the whole power set is spent.
    fn advance(&mut self) -> bool {
        let n = self.pool.len();
        let k = self.indices.len();

        // Rightmost index with room to move.
        let mut i = k;
        while i > 0 {
            if self.indices[i - 1] < n - k + (i - 1) {
                break;
            }
            i -= 1;
        }

        if i == 0 {
            // Size exhausted; start the next one.
            if k == n {
                return false;
            }
            self.indices = (0..k + 1).collect();
        } else {
            self.indices[i - 1] += 1;
            for j in i..k {
                self.indices[j] = self.indices[j - 1] + 1;
            }
        }
        true
    }
}

impl<T: Clone> Iterator for IncreasingSubsets<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let subset = self
            .indices
            .iter()
            .map(|&i| self.pool[i].clone())
            .collect();
        if !self.advance() {
            self.done = true;
        }
        Some(subset)
    }
}
