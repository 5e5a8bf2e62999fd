use thiserror::Error;
use crate::header::GridAxis;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid file format")]
    InvalidMagic(i64),
    #[error("File does not contain complex data")]
    NotComplex(i32),
    #[error("unsupported number of dimensions: {0}")]
    UnsupportedDimensionality(i64),
    #[error("invalid extent along {axis:?}: {value}")]
    InvalidExtent { axis: GridAxis, value: i64 },
    #[error("grid of {nx} x {ny} points overflows the address space")]
    ExtentOverflow { nx: usize, ny: usize },
    #[error("No filename specified.")]
    MissingInput,
    #[error("mat element of {0} bytes exceeds the 32-bit size field")]
    MatElementTooLarge(usize),
    #[error("variable {name} has {actual} elements but its dimensions hold {expected}")]
    MatShapeMismatch { name: String, expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
