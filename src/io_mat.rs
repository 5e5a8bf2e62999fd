//! Writer for level 5 MAT-files.
//!
//! Only what the converter needs is supported: uncompressed numeric arrays of
//! class double (optionally complex) and int64. Everything is written in the
//! same native byte order the input is read in, and the endian indicator in the
//! file header records it.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use byteorder::WriteBytesExt;
use num_complex::Complex64;
use crate::ArrayDim;
use crate::error::{Error, Result};
use crate::header::FileOrder;
use crate::record::FieldRecord;

const HEADER_TEXT_SIZE: usize = 116;
const VERSION: u16 = 0x0100;
const ENDIAN_INDICATOR: u16 = u16::from_be_bytes(*b"MI");

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_INT64: u32 = 12;
const MI_MATRIX: u32 = 14;

const MX_DOUBLE_CLASS: u32 = 6;
const MX_INT64_CLASS: u32 = 14;
const FLAG_COMPLEX: u32 = 0x0800;

/// data element tag size
const TAG_SIZE: usize = 8;

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use matfile::{MatFile, NumericData};
    use num_complex::Complex64;
    use crate::io_bin::decode;
    use crate::record::Axis;
    use crate::test_util::{bin_file, test_header};
    use super::*;

    fn doubles(mat: &MatFile, name: &str) -> (Vec<usize>, Vec<f64>, Option<Vec<f64>>) {
        let array = mat.find_by_name(name).unwrap_or_else(|| panic!("{name} missing"));
        match array.data() {
            NumericData::Double { real, imag } => (array.size().to_vec(), real.clone(), imag.clone()),
            other => panic!("{name} is not double: {other:?}"),
        }
    }

    fn int64(mat: &MatFile, name: &str) -> i64 {
        match mat.find_by_name(name).unwrap().data() {
            NumericData::Int64 { real, .. } => real[0],
            other => panic!("{name} is not int64: {other:?}"),
        }
    }

    #[test]
    fn header_is_128_bytes() {
        let mut w = MatWriter::new(Vec::new());
        w.write_header("test").unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), 128);
        assert_eq!(&bytes[..4], b"test");
        assert_eq!(bytes[115], b' ');
        assert_eq!(u16::from_ne_bytes([bytes[124], bytes[125]]), 0x0100);
        assert_eq!(u16::from_ne_bytes([bytes[126], bytes[127]]), ENDIAN_INDICATOR);
    }

    #[test]
    fn elements_are_8_byte_aligned() {
        let var = MatVariable::scalar_f64("t", 0.5);
        // flags 16 + dims 16 + name 16 + real 16
        assert_eq!(var.body_size(), 64);
        let mut w = MatWriter::new(Vec::new());
        w.write_variable(&var).unwrap();
        assert_eq!(w.into_inner().len(), TAG_SIZE + 64);

        let var = MatVariable::complex("wavefunction", ArrayDim::from_shape(&[1, 3]), vec![Complex64::ONE; 3]).unwrap();
        // flags 16 + dims 16 + name 8+16 + real 8+24 + imag 8+24
        assert_eq!(var.body_size(), 120);
    }

    #[test]
    fn one_d_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("phi.bin");
        let samples = [
            Complex64::new(1., 0.),
            Complex64::new(2., 0.),
            Complex64::new(3., 0.),
            Complex64::new(4., 1.),
        ];
        std::fs::write(&input, bin_file(&test_header(1, 4, 1), &samples)).unwrap();
        decode(&input, true).unwrap();

        let f = File::open(dir.path().join("phi.mat")).unwrap();
        let mat = MatFile::parse(f).unwrap();
        let (size, re, im) = doubles(&mat, "wavefunction");
        assert_eq!(size, vec![1, 4]);
        assert_eq!(re, vec![1., 2., 3., 4.]);
        assert_eq!(im, Some(vec![0., 0., 0., 1.]));
        assert_eq!(int64(&mat, "nDimX"), 4);
        assert_eq!(doubles(&mat, "xMin").1, vec![-10.]);
        assert_eq!(doubles(&mat, "xMax").1, vec![10.]);
        assert_eq!(doubles(&mat, "dx").1, vec![5.]);
        assert_eq!(doubles(&mat, "t").1, vec![1.5]);
        assert!(mat.find_by_name("nDimY").is_none());
        assert!(mat.find_by_name("yMin").is_none());
    }

    #[test]
    fn two_d_is_stored_y_by_x() {
        let x = Axis { n: 3, min: 0., max: 3., delta: 1. };
        let y = Axis { n: 2, min: -1., max: 1., delta: 1. };
        let wavefunction: Vec<Complex64> = (0..6).map(|k| Complex64::new(k as f64, 0.)).collect();
        let record = FieldRecord::TwoD { x, y, t: 0., wavefunction };
        let bytes = encode_record(&record).unwrap();

        let mat = MatFile::parse(bytes.as_slice()).unwrap();
        let names: Vec<&str> = mat.arrays().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["wavefunction", "nDimX", "nDimY", "xMin", "yMin", "xMax", "yMax", "dx", "dy", "t"]);
        let (size, re, _) = doubles(&mat, "wavefunction");
        assert_eq!(size, vec![2, 3]);
        // column-major, element [1, 2] is last
        assert_eq!(re[1 + 2 * 2], 5.);
        assert_eq!(int64(&mat, "nDimY"), 2);
        assert_eq!(doubles(&mat, "yMax").1, vec![1.]);
    }

    #[test]
    fn mismatched_wavefunction_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bad.mat");
        let record = FieldRecord::TwoD {
            x: Axis { n: 3, min: 0., max: 3., delta: 1. },
            y: Axis { n: 2, min: 0., max: 2., delta: 1. },
            t: 0.,
            wavefunction: vec![Complex64::ONE; 5],
        };
        assert_debug_snapshot!(write_record(&out, &record).unwrap_err(), @r###"
        MatShapeMismatch {
            name: "wavefunction",
            expected: 6,
            actual: 5,
        }
        "###);
        assert!(!out.exists());
        assert!(encode_record(&record).is_err());
    }

    #[test]
    fn existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("old.mat");
        std::fs::write(&out, vec![0xFFu8; 4096]).unwrap();
        let record = FieldRecord::OneD {
            x: Axis { n: 1, min: 0., max: 1., delta: 1. },
            t: 0.,
            wavefunction: vec![Complex64::ONE],
        };
        write_record(&out, &record).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), encode_record(&record).unwrap());
    }

}

/// numeric payload of a MAT variable, in column-major order
#[derive(Debug, Clone, PartialEq)]
pub enum MatData {
    Double(Vec<f64>),
    Complex(Vec<Complex64>),
    Int64(Vec<i64>),
}

impl MatData {
    fn len(&self) -> usize {
        match self {
            MatData::Double(d) => d.len(),
            MatData::Complex(d) => d.len(),
            MatData::Int64(d) => d.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatVariable {
    pub name: String,
    pub dims: ArrayDim,
    pub data: MatData,
}

impl MatVariable {

    pub fn scalar_f64(name: &str, value: f64) -> Self {
        Self { name: name.to_string(), dims: ArrayDim::scalar(), data: MatData::Double(vec![value]) }
    }

    pub fn scalar_i64(name: &str, value: i64) -> Self {
        Self { name: name.to_string(), dims: ArrayDim::scalar(), data: MatData::Int64(vec![value]) }
    }

    pub fn complex(name: &str, dims: ArrayDim, data: Vec<Complex64>) -> Result<Self> {
        if dims.numel() != data.len() {
            return Err(Error::MatShapeMismatch {
                name: name.to_string(),
                expected: dims.numel(),
                actual: data.len(),
            });
        }
        Ok(Self { name: name.to_string(), dims, data: MatData::Complex(data) })
    }

    /// dimensions as stored, at least two of them
    fn mat_dims(&self) -> Vec<usize> {
        let mut d = self.dims.shape_ns().to_vec();
        while d.len() < 2 {
            d.push(1);
        }
        d
    }

    /// size of the miMATRIX payload following its tag
    fn body_size(&self) -> usize {
        let n = self.data.len();
        let parts = match self.data {
            MatData::Complex(_) => 2,
            _ => 1,
        };
        (TAG_SIZE + 8)
            + (TAG_SIZE + padded(4 * self.mat_dims().len()))
            + (TAG_SIZE + padded(self.name.len()))
            + parts * (TAG_SIZE + padded(8 * n))
    }
}

fn padded(len: usize) -> usize {
    len.div_ceil(8) * 8
}

/// variables written for a record, in output order
pub fn record_variables(record: &FieldRecord) -> Result<Vec<MatVariable>> {
    let vars = match record {
        FieldRecord::OneD { x, t, wavefunction } => vec![
            // 1-D fields are stored as row vectors
            MatVariable::complex("wavefunction", ArrayDim::from_shape(&[1, x.n]), wavefunction.clone())?,
            MatVariable::scalar_i64("nDimX", x.n as i64),
            MatVariable::scalar_f64("xMin", x.min),
            MatVariable::scalar_f64("xMax", x.max),
            MatVariable::scalar_f64("dx", x.delta),
            MatVariable::scalar_f64("t", *t),
        ],
        FieldRecord::TwoD { x, y, t, wavefunction } => vec![
            MatVariable::complex("wavefunction", record.dims(), wavefunction.clone())?,
            MatVariable::scalar_i64("nDimX", x.n as i64),
            MatVariable::scalar_i64("nDimY", y.n as i64),
            MatVariable::scalar_f64("xMin", x.min),
            MatVariable::scalar_f64("yMin", y.min),
            MatVariable::scalar_f64("xMax", x.max),
            MatVariable::scalar_f64("yMax", y.max),
            MatVariable::scalar_f64("dx", x.delta),
            MatVariable::scalar_f64("dy", y.delta),
            MatVariable::scalar_f64("t", *t),
        ],
    };
    Ok(vars)
}

pub struct MatWriter<W: Write> {
    writer: W,
}

impl<W: Write> MatWriter<W> {

    pub fn new(inner: W) -> Self {
        Self { writer: inner }
    }

    /// 116 bytes of text, 8 bytes subsystem offset, version and endian indicator
    pub fn write_header(&mut self, description: &str) -> Result<()> {
        let mut text = [b' '; HEADER_TEXT_SIZE];
        let n = description.len().min(HEADER_TEXT_SIZE);
        text[..n].copy_from_slice(&description.as_bytes()[..n]);
        self.writer.write_all(&text)?;
        self.writer.write_all(&[0u8; 8])?;
        self.writer.write_u16::<FileOrder>(VERSION)?;
        self.writer.write_u16::<FileOrder>(ENDIAN_INDICATOR)?;
        Ok(())
    }

    pub fn write_variable(&mut self, var: &MatVariable) -> Result<()> {
        let body = var.body_size();
        self.write_tag(MI_MATRIX, body)?;

        let (class, complex) = match var.data {
            MatData::Double(_) => (MX_DOUBLE_CLASS, false),
            MatData::Complex(_) => (MX_DOUBLE_CLASS, true),
            MatData::Int64(_) => (MX_INT64_CLASS, false),
        };
        let flags = if complex { class | FLAG_COMPLEX } else { class };
        self.write_tag(MI_UINT32, 8)?;
        self.writer.write_u32::<FileOrder>(flags)?;
        self.writer.write_u32::<FileOrder>(0)?;

        let dims = var.mat_dims();
        self.write_tag(MI_INT32, 4 * dims.len())?;
        for d in &dims {
            let d = i32::try_from(*d).map_err(|_| Error::MatElementTooLarge(*d))?;
            self.writer.write_i32::<FileOrder>(d)?;
        }
        self.write_padding(4 * dims.len())?;

        self.write_tag(MI_INT8, var.name.len())?;
        self.writer.write_all(var.name.as_bytes())?;
        self.write_padding(var.name.len())?;

        let n = var.data.len();
        match &var.data {
            MatData::Double(d) => {
                self.write_tag(MI_DOUBLE, 8 * n)?;
                for v in d {
                    self.writer.write_f64::<FileOrder>(*v)?;
                }
            }
            MatData::Complex(d) => {
                self.write_tag(MI_DOUBLE, 8 * n)?;
                for v in d {
                    self.writer.write_f64::<FileOrder>(v.re)?;
                }
                self.write_tag(MI_DOUBLE, 8 * n)?;
                for v in d {
                    self.writer.write_f64::<FileOrder>(v.im)?;
                }
            }
            MatData::Int64(d) => {
                self.write_tag(MI_INT64, 8 * n)?;
                for v in d {
                    self.writer.write_i64::<FileOrder>(*v)?;
                }
            }
        }
        Ok(())
    }

    fn write_tag(&mut self, data_type: u32, n_bytes: usize) -> Result<()> {
        let n = u32::try_from(n_bytes).map_err(|_| Error::MatElementTooLarge(n_bytes))?;
        self.writer.write_u32::<FileOrder>(data_type)?;
        self.writer.write_u32::<FileOrder>(n)?;
        Ok(())
    }

    fn write_padding(&mut self, len: usize) -> Result<()> {
        let pad = padded(len) - len;
        self.writer.write_all(&[0u8; 8][..pad])?;
        Ok(())
    }

    /// header followed by every variable, in order
    pub fn write_file(&mut self, vars: &[MatVariable]) -> Result<()> {
        self.write_header(&format!(
            "MATLAB 5.0 MAT-file, Platform: {}, Created by: {} {}",
            std::env::consts::OS,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        ))?;
        for var in vars {
            self.write_variable(var)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

}

pub fn encode_record(record: &FieldRecord) -> Result<Vec<u8>> {
    let vars = record_variables(record)?;
    let mut writer = MatWriter::new(Cursor::new(Vec::new()));
    writer.write_file(&vars)?;
    Ok(writer.into_inner().into_inner())
}

/// write a record to `path`, replacing any existing file. Nothing is created if
/// the record is inconsistent.
pub fn write_record(path: impl AsRef<Path>, record: &FieldRecord) -> Result<()> {
    let vars = record_variables(record)?;
    let mut writer = MatWriter::new(BufWriter::new(File::create(path)?));
    writer.write_file(&vars)?;
    writer.into_inner().flush()?;
    Ok(())
}
