//! Decoder for binary complex field snapshots.
//!
//! A file is a fixed [Header] followed by a block of `(re, im)` double pairs. The
//! block starts at the absolute offset stored in the header's magic field, not at
//! the end of the header. 2-D files are written with x in the outer loop and y in
//! the inner loop, which is the column-major order of a `[ny, nx]` array.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use byteorder::ReadBytesExt;
use log::{debug, info, warn};
use num_complex::Complex64;
use crate::error::{Error, Result};
use crate::header::{FileOrder, GridAxis, Header};
use crate::io_mat::write_record;
use crate::record::{Axis, FieldRecord};

/// upper bound on the buffer reserved before any sample has been read
const MAX_PREALLOC_SAMPLES: usize = 1 << 20;


/// open a file and decode only its header. No validation is performed.
pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
    let mut f = File::open(path)?;
    Header::read(&mut f)
}

/// move to the absolute data offset recorded in the header
pub fn seek_to_data<S: Seek>(stream: &mut S, header: &Header) -> Result<()> {
    debug!("seeking to data block at byte {}", header.data_offset());
    stream.seek(SeekFrom::Start(header.data_offset()))?;
    Ok(())
}

fn read_sample<R: Read>(reader: &mut R) -> Result<Complex64> {
    let re = reader.read_f64::<FileOrder>()?;
    let im = reader.read_f64::<FileOrder>()?;
    Ok(Complex64::new(re, im))
}

fn read_samples<R: Read>(reader: &mut R, count: usize) -> Result<Vec<Complex64>> {
    // the header alone does not prove the file holds `count` samples
    let mut data = Vec::with_capacity(count.min(MAX_PREALLOC_SAMPLES));
    for _ in 0..count {
        data.push(read_sample(reader)?);
    }
    Ok(data)
}

/// Read the data block one `(re, im)` pair at a time. The 1-D result has `nx`
/// elements. The 2-D result is a column-major `[ny, nx]` array: sample `k` of the
/// file is `[k % ny, k / ny]`, so file order is kept as is.
pub fn read_complex_array<R: Read>(reader: &mut R, header: &Header) -> Result<Vec<Complex64>> {
    match header.n_dims {
        1 => {
            let nx = header.extent(GridAxis::X)?;
            read_samples(reader, nx)
        }
        2 => {
            let nx = header.extent(GridAxis::X)?;
            let ny = header.extent(GridAxis::Y)?;
            let count = nx.checked_mul(ny).ok_or(Error::ExtentOverflow { nx, ny })?;
            read_samples(reader, count)
        }
        n => Err(Error::UnsupportedDimensionality(n)),
    }
}

/// package the header fields used downstream together with the data
pub fn to_record(header: &Header, wavefunction: Vec<Complex64>) -> Result<FieldRecord> {
    let x = Axis {
        n: header.extent(GridAxis::X)?,
        min: header.x_min,
        max: header.x_max,
        delta: header.dx,
    };
    let t = header.t;
    match header.n_dims {
        1 => Ok(FieldRecord::OneD { x, t, wavefunction }),
        2 => {
            let y = Axis {
                n: header.extent(GridAxis::Y)?,
                min: header.y_min,
                max: header.y_max,
                delta: header.dy,
            };
            Ok(FieldRecord::TwoD { x, y, t, wavefunction })
        }
        n => Err(Error::UnsupportedDimensionality(n)),
    }
}

/// read, validate and decode a complete file from a seekable stream
pub fn decode_reader<R: Read + Seek>(reader: &mut R) -> Result<FieldRecord> {
    let (_, record) = decode_with_header(reader)?;
    Ok(record)
}

fn decode_with_header<R: Read + Seek>(reader: &mut R) -> Result<(Header, FieldRecord)> {
    let header = Header::read(reader)?;
    header.validate()?;
    seek_to_data(reader, &header)?;
    let data = read_complex_array(reader, &header)?;
    let record = to_record(&header, data)?;
    Ok((header, record))
}

fn open_and_decode(path: &Path) -> Result<(Header, FieldRecord)> {
    // the handle is dropped on every return path
    let mut reader = BufReader::new(File::open(path)?);
    decode_with_header(&mut reader).inspect_err(|e| {
        warn!("rejected {}: {}", path.display(), e);
    })
}

/// decode a file without writing anything
pub fn decode_file(path: impl AsRef<Path>) -> Result<FieldRecord> {
    decode(path, false)
}

/// Decode a file. With `write_output` the record is also written to
/// [output_path] of the input, replacing any existing file.
pub fn decode(path: impl AsRef<Path>, write_output: bool) -> Result<FieldRecord> {
    let path = path.as_ref();
    let (header, record) = open_and_decode(path)?;
    info!("decoded {} ({}-D, {} samples)", path.display(), record.dimensionality(), record.field().len());
    emit(&header, &record, path, write_output)?;
    Ok(record)
}

/// print the metadata and write the MAT-file when `write_output` is set
pub fn emit(header: &Header, record: &FieldRecord, path: &Path, write_output: bool) -> Result<Option<PathBuf>> {
    if !write_output {
        return Ok(None);
    }
    println!("dims = ({},{},{})", header.n_dim_x, header.n_dim_y, header.n_dim_z);
    for (name, (min, max)) in ["xrange", "yrange"].iter().zip(record.bounds()) {
        println!("{} = ({},{})", name, min, max);
    }
    println!("t = {}", record.time());

    let out = output_path(path);
    write_record(&out, record)?;
    info!("wrote {}", out.display());
    println!("{} created.", out.display());
    Ok(Some(out))
}

/// the input path with its extension replaced by `.mat`
pub fn output_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("mat")
}

/// Decode and write every file in order. Stops at the first failure, files
/// after it are not touched.
pub fn convert_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        return Err(Error::MissingInput);
    }
    let mut written = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        println!("Read file: {}", path.display());
        decode(path, true)?;
        written.push(output_path(path));
    }
    Ok(written)
}
