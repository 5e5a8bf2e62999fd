//! Builders for synthetic input files. The crate has no write path for the
//! binary format, this only exists to feed the decoder in tests.

use byteorder::WriteBytesExt;
use num_complex::Complex64;
use crate::header::{FileOrder, Header, HEADER_SIZE, MAGIC};

pub fn test_header(n_dims: i64, nx: i64, ny: i64) -> Header {
    Header {
        magic: MAGIC,
        reserved: [0, 0],
        n_dims,
        n_dim_x: nx,
        n_dim_y: ny,
        n_dim_z: 1,
        flag: 0,
        is_complex: 1,
        t: 1.5,
        x_min: -10.,
        x_max: 10.,
        y_min: -5.,
        y_max: 5.,
        z_min: 0.,
        z_max: 0.,
        dx: 20. / nx as f64,
        dy: 10. / ny as f64,
        dz: 0.,
        dkx: 0.,
        dky: 0.,
        dkz: 0.,
        dt: 0.01,
    }
}

pub fn header_bytes(h: &Header) -> Vec<u8> {
    let mut b = Vec::with_capacity(HEADER_SIZE);
    for v in [h.magic, h.reserved[0], h.reserved[1], h.n_dims, h.n_dim_x, h.n_dim_y, h.n_dim_z] {
        b.write_i64::<FileOrder>(v).unwrap();
    }
    b.write_i32::<FileOrder>(h.flag).unwrap();
    b.write_i32::<FileOrder>(h.is_complex).unwrap();
    for v in [
        h.t, h.x_min, h.x_max, h.y_min, h.y_max, h.z_min, h.z_max,
        h.dx, h.dy, h.dz, h.dkx, h.dky, h.dkz, h.dt,
    ] {
        b.write_f64::<FileOrder>(v).unwrap();
    }
    b
}

/// header, zero padding up to the data offset, then the samples in file order
pub fn bin_file(h: &Header, samples: &[Complex64]) -> Vec<u8> {
    let mut b = header_bytes(h);
    b.resize(MAGIC as usize, 0);
    for s in samples {
        b.write_f64::<FileOrder>(s.re).unwrap();
        b.write_f64::<FileOrder>(s.im).unwrap();
    }
    b
}
