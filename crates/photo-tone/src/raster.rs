//! Row dispatch shared by the processing stages.
//!
//! Every stage writes one output row from the immutable input, so rows can
//! be filled in any order or in parallel without changing the result.

use enough::{Stop, StopReason};
use rayon::prelude::*;

use crate::buffer::PixelBuffer;

/// Images with at least this many pixels are processed on the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// How rows are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Sequential,
    Parallel,
}

impl Dispatch {
    /// Parallel for large images, sequential below [`PARALLEL_THRESHOLD`].
    pub(crate) fn for_buffer(buffer: &PixelBuffer) -> Self {
        let pixels = buffer.width() as usize * buffer.height() as usize;
        if pixels >= PARALLEL_THRESHOLD {
            Dispatch::Parallel
        } else {
            Dispatch::Sequential
        }
    }
}

/// Fill every row of `output` with `row_fn(y, row)`.
///
/// `stop` is polled before each row; the first failed check aborts and
/// leaves `output` partially written.
pub(crate) fn fill_rows<F>(
    output: &mut PixelBuffer,
    dispatch: Dispatch,
    stop: &(dyn Stop + Sync),
    row_fn: F,
) -> Result<(), StopReason>
where
    F: Fn(usize, &mut [u8]) + Sync + Send,
{
    let stride = output.stride();
    let data = output.as_bytes_mut();

    match dispatch {
        Dispatch::Parallel => {
            data.par_chunks_mut(stride)
                .enumerate()
                .try_for_each(|(y, row)| {
                    stop.check()?;
                    row_fn(y, row);
                    Ok(())
                })
        }
        Dispatch::Sequential => {
            for (y, row) in data.chunks_mut(stride).enumerate() {
                stop.check()?;
                row_fn(y, row);
            }
            Ok(())
        }
    }
}

/// Round to nearest, then clamp into the u8 range.
#[inline]
pub(crate) fn clamp_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    #[test]
    fn test_clamp_channel_rounds_then_clamps() {
        assert_eq!(clamp_channel(-12.7), 0);
        assert_eq!(clamp_channel(0.49), 0);
        assert_eq!(clamp_channel(0.5), 1);
        assert_eq!(clamp_channel(127.5), 128);
        assert_eq!(clamp_channel(254.6), 255);
        assert_eq!(clamp_channel(1e9), 255);
    }

    #[test]
    fn test_fill_rows_visits_every_row_once() {
        for dispatch in [Dispatch::Sequential, Dispatch::Parallel] {
            let mut out = PixelBuffer::filled(3, 5, [0; 4]).unwrap();
            fill_rows(&mut out, dispatch, &Unstoppable, |y, row| {
                for v in row.iter_mut() {
                    *v += y as u8 + 1;
                }
            })
            .unwrap();
            for y in 0..5 {
                assert_eq!(out.pixel(2, y), [y as u8 + 1; 4], "{dispatch:?}");
            }
        }
    }

    #[test]
    fn test_dispatch_threshold() {
        let small = PixelBuffer::filled(10, 10, [0; 4]).unwrap();
        assert_eq!(Dispatch::for_buffer(&small), Dispatch::Sequential);
        let large = PixelBuffer::filled(256, 256, [0; 4]).unwrap();
        assert_eq!(Dispatch::for_buffer(&large), Dispatch::Parallel);
    }
}
