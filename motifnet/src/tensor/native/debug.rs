use crate::tensor::{Dim1, Dim2, Tensor};
use std::fmt::{Debug, Formatter, Write};

fn fmt_separated<I, T>(
    iter: &mut I,
    f: &mut Formatter,
    sep: &str,
    fmt: &mut impl FnMut(T, &mut Formatter) -> std::fmt::Result,
    limit: usize,
) -> std::fmt::Result
where
    I: Iterator<Item = T>,
{
    let mut first = true;
    for el in iter.take(limit) {
        if first {
            first = false;
        } else {
            f.write_str(sep)?;
        }
        fmt(el, f)?;
    }
    Ok(())
}

fn fmt_separated_max<I, T>(
    mut iter: I,
    len: usize,
    max: usize,
    f: &mut Formatter,
    sep: &str,
    fmt: &mut impl FnMut(T, &mut Formatter) -> std::fmt::Result,
) -> std::fmt::Result
where
    I: Iterator<Item = T>,
{
    if len > max {
        let limit = max / 2;
        let to_skip = len - (limit * 2);
        fmt_separated(&mut iter, f, sep, fmt, limit)?;
        f.write_str(sep)?;
        write!(f, "...({to_skip} hidden)")?;
        f.write_str(sep)?;
        iter.nth(to_skip - 1);
        fmt_separated(&mut iter, f, sep, fmt, limit)
    } else {
        fmt_separated(&mut iter, f, sep, fmt, len)
    }
}

const DEBUG_LIMIT_DIM_OUTER: usize = 5;
const DEBUG_LIMIT_DIM_INNER: usize = 10;

fn fmt_row<T: Debug>(row: &[T], f: &mut Formatter) -> std::fmt::Result {
    f.write_char('[')?;
    fmt_separated_max(row.iter(), row.len(), DEBUG_LIMIT_DIM_INNER, f, ", ", &mut |el, f| {
        Debug::fmt(el, f)
    })?;
    f.write_char(']')
}

impl<T: Debug> Debug for Tensor<T, Dim1> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        fmt_row(self.as_ref(), f)?;
        write!(f, " dims={} len={}", self.dims(), self.len())
    }
}

impl<T: Debug> Debug for Tensor<T, Dim2> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_char('[')?;
        if !self.is_empty() {
            f.write_str("\n   ")?;
            fmt_separated_max(
                self.iter_major_axis(),
                self.rows(),
                DEBUG_LIMIT_DIM_OUTER,
                f,
                ",\n   ",
                &mut |row, f| fmt_row(row, f),
            )?;
            f.write_char('\n')?;
        }
        f.write_char(']')?;
        write!(f, " dims={} len={}", self.dims(), self.len())
    }
}

#[cfg(test)]
mod test {
    use crate::tensor;
    use crate::tensor::{Dim2, Tensor, Tensor1};

    #[test]
    fn test_small() {
        assert_eq!("[1, 2, 3] dims=(3) len=3", format!("{:?}", tensor![1, 2, 3] as Tensor1<i32>));
        assert_eq!(
            "[\n   [1, 2],\n   [3, 4]\n] dims=(2, 2) len=4",
            format!("{:?}", tensor![[1, 2], [3, 4]])
        );
    }

    #[test]
    fn test_large() {
        let a = Tensor::from_vec((0..200).collect::<Vec<i32>>(), Dim2(10, 20));
        let expected = r#"[
   [0, 1, 2, 3, 4, ...(10 hidden), 15, 16, 17, 18, 19],
   [20, 21, 22, 23, 24, ...(10 hidden), 35, 36, 37, 38, 39],
   ...(6 hidden),
   [160, 161, 162, 163, 164, ...(10 hidden), 175, 176, 177, 178, 179],
   [180, 181, 182, 183, 184, ...(10 hidden), 195, 196, 197, 198, 199]
] dims=(10, 20) len=200"#;
        assert_eq!(expected, format!("{a:?}"))
    }
}
