use crate::tensor::dims::{Dim1, Dim2, Dims};
use num_traits::Zero;
use rand::Rng;
use rand::distributions::Distribution;
use std::ops::{Index, IndexMut};
use std::slice::{ChunksExact, ChunksExactMut, Iter, IterMut};
use std::vec::IntoIter;

/// Dense row-major tensor that owns its data.
#[derive(PartialEq)]
pub struct Tensor<T, D>
where
    D: Dims,
{
    data: Vec<T>,
    dims: D,
}

pub type Tensor1<T> = Tensor<T, Dim1>;
pub type Tensor2<T> = Tensor<T, Dim2>;

impl<T, D: Dims> Tensor<T, D> {
    pub fn from_vec(data: Vec<T>, dims: D) -> Self {
        assert_eq!(
            data.len(),
            dims.tensor_len(),
            "Mismatched data length {} and dimension {}",
            data.len(),
            dims
        );
        Tensor { data, dims }
    }

    pub fn from_distribution<R, S>(rng: &mut R, dist: S, dims: D) -> Self
    where
        R: Rng,
        S: Distribution<T>,
    {
        let data: Vec<T> = dist.sample_iter(rng).take(dims.tensor_len()).collect();
        Tensor { data, dims }
    }

    #[inline]
    pub fn dims(&self) -> &D {
        &self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<T> Tensor1<T> {
    pub fn from_vec_1d(data: Vec<T>) -> Self {
        let len = data.len();
        Tensor { data, dims: Dim1(len) }
    }
}

impl<T> Tensor2<T> {
    pub fn from_vec_2d<const N: usize>(vec: Vec<[T; N]>) -> Self {
        let rows = vec.len();
        let data: Vec<T> = vec.into_iter().flatten().collect();
        Tensor { data, dims: Dim2(rows, N) }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.dims.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.dims.cols()
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[T] {
        let cols = self.cols();
        &self.data[index * cols..(index + 1) * cols]
    }

    #[inline]
    pub fn row_mut(&mut self, index: usize) -> &mut [T] {
        let cols = self.cols();
        &mut self.data[index * cols..(index + 1) * cols]
    }

    /// Iterates over the rows of the matrix.
    pub fn iter_major_axis(&self) -> ChunksExact<'_, T> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.cols().max(1))
    }

    pub fn iter_major_axis_mut(&mut self) -> ChunksExactMut<'_, T> {
        let cols = self.cols().max(1);
        self.data.chunks_exact_mut(cols)
    }
}

impl<T: Clone> Tensor2<T> {
    /// Copies the given rows into a new matrix, in order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.cols());
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Tensor { data, dims: Dim2(indices.len(), self.cols()) }
    }
}

impl<T: Clone, D: Dims> Tensor<T, D> {
    pub fn filled(value: T, dims: D) -> Self {
        Tensor {
            data: vec![value; dims.tensor_len()],
            dims,
        }
    }
    #[inline]
    pub fn fill(&mut self, fill: T) {
        self.data.fill(fill);
    }
}

impl<T: Zero + Clone, D: Dims> Tensor<T, D> {
    #[inline]
    pub fn zeroed(dims: D) -> Self {
        Self::filled(T::zero(), dims)
    }
}

impl<T, D: Dims> AsRef<[T]> for Tensor<T, D> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T, D: Dims> AsMut<[T]> for Tensor<T, D> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T, D: Dims> Index<usize> for Tensor<T, D> {
    type Output = T;
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, D: Dims> IndexMut<usize> for Tensor<T, D> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T> Index<[usize; 2]> for Tensor2<T> {
    type Output = T;
    #[inline]
    fn index(&self, [row, col]: [usize; 2]) -> &Self::Output {
        debug_assert!(col < self.cols());
        &self.data[row * self.cols() + col]
    }
}

impl<T> IndexMut<[usize; 2]> for Tensor2<T> {
    #[inline]
    fn index_mut(&mut self, [row, col]: [usize; 2]) -> &mut Self::Output {
        debug_assert!(col < self.cols());
        let cols = self.cols();
        &mut self.data[row * cols + col]
    }
}

impl<'a, T, D: Dims> IntoIterator for &'a Tensor<T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, T, D: Dims> IntoIterator for &'a mut Tensor<T, D> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter_mut()
    }
}

impl<T, D: Dims> IntoIterator for Tensor<T, D> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<T: Clone, D: Dims> Clone for Tensor<T, D> {
    fn clone(&self) -> Self {
        Tensor {
            data: self.data.clone(),
            dims: self.dims,
        }
    }
}

#[macro_export]
macro_rules! tensor {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {
        $crate::tensor::Tensor2::from_vec_2d(vec![$([$($x,)*],)*])
    };
    ($($x:expr),* $(,)*) => {
        $crate::tensor::Tensor1::from_vec_1d(vec![$($x,)*])
    };
}

#[cfg(test)]
mod test {
    use crate::tensor::{Dim1, Dim2, Tensor, Tensor2};

    #[test]
    fn test_macro_layout() {
        let t: Tensor2<i32> = tensor![[1, 2, 3], [4, 5, 6]];
        assert_eq!(t.dims(), &Dim2(2, 3));
        assert_eq!(t.as_ref(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(t[[1, 0]], 4);
        assert_eq!(t.row(1), &[4, 5, 6]);
        let v = tensor![7, 8];
        assert_eq!(v.dims(), &Dim1(2));
    }

    #[test]
    fn test_rows() {
        let mut t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), Dim2(3, 2));
        let rows: Vec<&[i32]> = t.iter_major_axis().collect();
        assert_eq!(rows, vec![&[0, 1][..], &[2, 3], &[4, 5]]);
        t.row_mut(2)[1] = 50;
        assert_eq!(t[[2, 1]], 50);
        let picked = t.select_rows(&[2, 0]);
        assert_eq!(picked.as_ref(), &[4, 50, 0, 1]);
    }

    #[test]
    fn test_empty_rows() {
        let t: Tensor2<f64> = Tensor::zeroed(Dim2(0, 3));
        assert_eq!(t.iter_major_axis().count(), 0);
        let t: Tensor2<f64> = Tensor::zeroed(Dim2(2, 0));
        assert!(t.is_empty());
    }

    #[test]
    #[should_panic]
    fn test_from_vec_mismatch() {
        Tensor::from_vec(vec![1.0, 2.0, 3.0], Dim2(2, 2));
    }
}
