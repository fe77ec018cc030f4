//! Dense per-cell maps.

/// A value for every cell of a `width x height` grid, stored row-major.
///
/// Used for distance fields and per-cell violation maps. Published to
/// viewers as `[y][x]` rows via [`CellMap::to_rows`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellMap<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Clone> CellMap<T> {
    /// A map with every cell set to `fill`.
    pub fn new(width: u32, height: u32, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width as usize * height as usize],
        }
    }

    /// Reset every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Row-major snapshot, one inner vector per row, mapped through `f`.
    pub fn to_rows<U>(&self, f: impl Fn(&T) -> U) -> Vec<Vec<U>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.data
            .chunks(self.width as usize)
            .map(|row| row.iter().map(&f).collect())
            .collect()
    }
}

impl<T> CellMap<T> {
    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// The value at `(x, y)`, or `None` outside the map.
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        self.index(x, y).map(|i| &self.data[i])
    }

    /// Overwrite the value at `(x, y)`. Returns `false` outside the map.
    pub fn set(&mut self, x: u32, y: u32, value: T) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// Row-major iterator of `(x, y, &value)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &T)> + '_ {
        let width = self.width.max(1);
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i as u32) % width, (i as u32) / width, v))
    }

    /// Values in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_rows() {
        let mut map = CellMap::new(3, 2, 0u8);
        assert!(map.set(2, 1, 1));
        assert!(!map.set(3, 0, 1));
        assert_eq!(map.get(2, 1), Some(&1));
        assert_eq!(map.get(0, 2), None);
        assert_eq!(map.to_rows(|&v| v), vec![vec![0, 0, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn iter_is_row_major() {
        let map = CellMap::new(2, 2, ());
        let coords: Vec<(u32, u32)> = map.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn fill_resets() {
        let mut map = CellMap::new(2, 2, 5u32);
        map.set(0, 0, 9);
        map.fill(0);
        assert!(map.as_slice().iter().all(|&v| v == 0));
    }
}
