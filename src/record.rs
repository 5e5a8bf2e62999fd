use num_complex::Complex64;
use crate::ArrayDim;


/// grid description of one spatial axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub delta: f64,
}

/// Decoded field. 1-D and 2-D records carry different axis sets.
///
/// The 2-D wavefunction is stored column-major with shape `[ny, nx]`, so element
/// `[y, x]` lives at `y + x * ny`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRecord {
    OneD {
        x: Axis,
        t: f64,
        wavefunction: Vec<Complex64>,
    },
    TwoD {
        x: Axis,
        y: Axis,
        t: f64,
        wavefunction: Vec<Complex64>,
    },
}

impl FieldRecord {

    pub fn dimensionality(&self) -> usize {
        match self {
            FieldRecord::OneD { .. } => 1,
            FieldRecord::TwoD { .. } => 2,
        }
    }

    /// axes in x, y order
    pub fn axes(&self) -> Vec<&Axis> {
        match self {
            FieldRecord::OneD { x, .. } => vec![x],
            FieldRecord::TwoD { x, y, .. } => vec![x, y],
        }
    }

    /// number of points per axis in x, y order
    pub fn extents(&self) -> Vec<usize> {
        self.axes().iter().map(|a| a.n).collect()
    }

    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.axes().iter().map(|a| (a.min, a.max)).collect()
    }

    pub fn spacing(&self) -> Vec<f64> {
        self.axes().iter().map(|a| a.delta).collect()
    }

    pub fn time(&self) -> f64 {
        match self {
            FieldRecord::OneD { t, .. } | FieldRecord::TwoD { t, .. } => *t,
        }
    }

    pub fn field(&self) -> &[Complex64] {
        match self {
            FieldRecord::OneD { wavefunction, .. } | FieldRecord::TwoD { wavefunction, .. } => wavefunction,
        }
    }

    /// array shape of the wavefunction, `[nx]` or `[ny, nx]`
    pub fn shape(&self) -> Vec<usize> {
        match self {
            FieldRecord::OneD { x, .. } => vec![x.n],
            FieldRecord::TwoD { x, y, .. } => vec![y.n, x.n],
        }
    }

    pub fn dims(&self) -> ArrayDim {
        ArrayDim::from_shape(&self.shape())
    }

    /// element at `[x]` (1-D) or `[y, x]` (2-D)
    pub fn get(&self, idx: &[usize]) -> Option<&Complex64> {
        let shape = self.shape();
        if idx.len() != shape.len() || idx.iter().zip(&shape).any(|(i, n)| i >= n) {
            return None;
        }
        self.field().get(self.dims().calc_addr(idx))
    }

    /// copy the wavefunction into an ndarray with the record's shape
    #[cfg(feature = "ndarray")]
    pub fn to_ndarray(&self) -> Result<ndarray::ArrayD<Complex64>, ndarray::ShapeError> {
        use ndarray::ShapeBuilder;
        ndarray::ArrayD::from_shape_vec(self.shape().f(), self.field().to_vec())
    }

}
