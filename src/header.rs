//! Fixed-layout header of the binary field format.
//!
//! The header is the `llllllliidddddddddddddd` record written by the simulation
//! code: seven 64-bit integers, two 32-bit integers and fourteen doubles, 176
//! bytes with no padding. The format carries no byte order marker, so every field
//! is read in [NativeEndian] order, the same order the producer wrote it in.

use std::io::Read;
use byteorder::{NativeEndian, ReadBytesExt};
use log::debug;
use crate::error::{Error, Result};

/// byte order assumed for both the header and the data block
pub type FileOrder = NativeEndian;

/// expected value of the first header field. It is also the absolute offset of the data block.
pub const MAGIC: i64 = 1380;

/// size in bytes of the packed header record
pub const HEADER_SIZE: usize = 7 * 8 + 2 * 4 + 14 * 8;


/// spatial axis of the simulation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    X,
    Y,
    Z,
}

/// Decoded header. Fields this crate does not interpret are kept so the record
/// stays complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    /// format tag and data block offset
    pub magic: i64,
    pub reserved: [i64; 2],
    pub n_dims: i64,
    pub n_dim_x: i64,
    pub n_dim_y: i64,
    pub n_dim_z: i64,
    pub flag: i32,
    pub is_complex: i32,
    pub t: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub dkx: f64,
    pub dky: f64,
    pub dkz: f64,
    pub dt: f64,
}

impl Header {

    /// read exactly [HEADER_SIZE] bytes and decode them field by field
    pub fn read<R: Read>(reader: &mut R) -> Result<Header> {
        let mut buf = [0u8; HEADER_SIZE];
        reader.read_exact(&mut buf)?;
        let mut c = &buf[..];

        let magic = c.read_i64::<FileOrder>()?;
        let reserved = [c.read_i64::<FileOrder>()?, c.read_i64::<FileOrder>()?];
        let n_dims = c.read_i64::<FileOrder>()?;
        let n_dim_x = c.read_i64::<FileOrder>()?;
        let n_dim_y = c.read_i64::<FileOrder>()?;
        let n_dim_z = c.read_i64::<FileOrder>()?;
        let flag = c.read_i32::<FileOrder>()?;
        let is_complex = c.read_i32::<FileOrder>()?;

        let mut d = [0f64; 14];
        c.read_f64_into::<FileOrder>(&mut d)?;
        let [t, x_min, x_max, y_min, y_max, z_min, z_max, dx, dy, dz, dkx, dky, dkz, dt] = d;

        let header = Header {
            magic, reserved, n_dims, n_dim_x, n_dim_y, n_dim_z, flag, is_complex,
            t, x_min, x_max, y_min, y_max, z_min, z_max, dx, dy, dz, dkx, dky, dkz, dt,
        };
        debug!(
            "header: magic={} n_dims={} dims=({},{},{}) complex={} t={}",
            magic, n_dims, n_dim_x, n_dim_y, n_dim_z, is_complex, t
        );
        Ok(header)
    }

    /// check the magic number, then the complex flag
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::InvalidMagic(self.magic));
        }
        if self.is_complex != 1 {
            return Err(Error::NotComplex(self.is_complex));
        }
        Ok(())
    }

    /// absolute byte offset of the first sample
    pub fn data_offset(&self) -> u64 {
        self.magic as u64
    }

    /// extent along `axis` as an unsigned size
    pub fn extent(&self, axis: GridAxis) -> Result<usize> {
        let value = match axis {
            GridAxis::X => self.n_dim_x,
            GridAxis::Y => self.n_dim_y,
            GridAxis::Z => self.n_dim_z,
        };
        usize::try_from(value).map_err(|_| Error::InvalidExtent { axis, value })
    }

}
