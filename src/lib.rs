/*
    Reader for the binary complex field snapshots written by the wave function solvers,
    and a converter to MAT-files for downstream analysis.
    Decoded fields keep the column-major layout MAT-files use, described by ArrayDim
 */
pub mod error;
pub mod header;
pub mod record;
pub mod io_bin;
pub mod io_mat;

#[cfg(test)]
mod test_util;

pub use error::{Error, Result};
pub use header::Header;
pub use record::{Axis, FieldRecord};
pub use io_bin::{convert_files, decode, decode_file};

const N_DIMS:usize = 4;


/// column-major shape with up to 4 axes, unused axes are singleton
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct ArrayDim {
    shape: [usize; N_DIMS],
    strides: [usize; N_DIMS],
}

impl ArrayDim {

    pub fn scalar() -> ArrayDim {
        ArrayDim{
            shape: [1;N_DIMS],
            strides: [1;N_DIMS],
        }
    }

    pub fn from_shape(shape: &[usize]) -> ArrayDim {
        assert!(shape.len() <= N_DIMS,"only up to {} axes are supported",N_DIMS);

        let mut dims = [1;N_DIMS];
        let mut strides = [1;N_DIMS];

        for (d,s) in dims.iter_mut().zip(shape.iter()) {
            *d = *s;
        }

        Self::calc_strides(&dims, &mut strides);
        Self {
            shape: dims,
            strides,
        }
    }

    /// return the shape with all singleton dimensions intact
    pub fn shape(&self) -> &[usize; N_DIMS] {
        &self.shape
    }

    /// return the shape with trailing singleton dimensions removed
    pub fn shape_ns(&self) -> &[usize] {
        if let Some(i) = self.shape.iter().rev().position(|&dim| dim != 1) {
            let new_len = self.shape.len() - i;
            &self.shape[..new_len]
        } else {
            &[1]
        }
    }

    pub fn size(&self, dim:usize) -> usize {
        assert!(dim < N_DIMS);
        self.shape[dim]
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    fn calc_strides(dims:&[usize],strides:&mut [usize]) {
        let mut stride = 1;
        for (dim,s) in dims.iter().zip(strides.iter_mut()) {
            *s = stride;
            stride *= dim;
        }
    }

    #[inline]
    /// calculate the element address from the index (subscripts)
    pub fn calc_addr(&self,idx: &[usize]) -> usize {
        let mut offset = 0;
        for (i,stride) in idx.iter().zip(self.strides.iter()) {
            offset += i * stride;
        }
        offset
    }

}
