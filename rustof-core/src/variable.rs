//! Unit-carrying labeled arrays.
//!
//! A [`Variable`] is a (possibly scalar) array of physical values with an
//! attached [`Unit`] and the set of dimension labels it varies over.
//! Elementwise operations propagate units and fail with typed errors on
//! unit or shape mismatches. Broadcasting is deliberately narrow: a scalar
//! broadcasts against anything, otherwise dimension labels and shapes must
//! match exactly.

use nalgebra::Vector3;

use crate::dim::Dim;
use crate::error::{Error, Result};
use crate::unit::Unit;

/// Element storage for a [`Variable`].
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    /// Scalar floating-point elements.
    Float(Vec<f64>),
    /// 3-vector elements (positions, beam vectors).
    Vector(Vec<Vector3<f64>>),
}

impl Values {
    fn len(&self) -> usize {
        match self {
            Values::Float(v) => v.len(),
            Values::Vector(v) => v.len(),
        }
    }
}

/// A labeled array of physical values with an attached unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    dims: Vec<Dim>,
    shape: Vec<usize>,
    unit: Unit,
    values: Values,
    variances: Option<Vec<f64>>,
}

impl Variable {
    /// Creates a dimensionless-shaped (scalar) float variable.
    #[must_use]
    pub fn scalar(value: f64, unit: Unit) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            unit,
            values: Values::Float(vec![value]),
            variances: None,
        }
    }

    /// Creates a scalar 3-vector variable.
    #[must_use]
    pub fn vector(value: Vector3<f64>, unit: Unit) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            unit,
            values: Values::Vector(vec![value]),
            variances: None,
        }
    }

    /// Creates a one-dimensional float variable.
    #[must_use]
    pub fn array(dim: Dim, values: Vec<f64>, unit: Unit) -> Self {
        let n = values.len();
        Self {
            dims: vec![dim],
            shape: vec![n],
            unit,
            values: Values::Float(values),
            variances: None,
        }
    }

    /// Creates a one-dimensional 3-vector variable.
    #[must_use]
    pub fn vectors(dim: Dim, values: Vec<Vector3<f64>>, unit: Unit) -> Self {
        let n = values.len();
        Self {
            dims: vec![dim],
            shape: vec![n],
            unit,
            values: Values::Vector(values),
            variances: None,
        }
    }

    /// Creates a two-dimensional float variable in row-major layout.
    pub fn dense(dims: [Dim; 2], shape: [usize; 2], values: Vec<f64>, unit: Unit) -> Result<Self> {
        Self::with_dims(dims.to_vec(), shape.to_vec(), values, unit)
    }

    /// Creates a float variable with explicit dims and shape (row-major).
    pub fn with_dims(dims: Vec<Dim>, shape: Vec<usize>, values: Vec<f64>, unit: Unit) -> Result<Self> {
        if dims.len() != shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} dims for {} shape entries",
                dims.len(),
                shape.len()
            )));
        }
        let volume: usize = shape.iter().product();
        if values.len() != volume {
            return Err(Error::ShapeMismatch(format!(
                "expected {volume} values for shape {shape:?}, got {}",
                values.len()
            )));
        }
        Ok(Self {
            dims,
            shape,
            unit,
            values: Values::Float(values),
            variances: None,
        })
    }

    /// Attaches per-element variances.
    pub fn with_variances(mut self, variances: Vec<f64>) -> Result<Self> {
        if variances.len() != self.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} variances for {} values",
                variances.len(),
                self.len()
            )));
        }
        self.variances = Some(variances);
        Ok(self)
    }

    /// Dimension labels, outer axis first.
    #[must_use]
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Extent along each dimension.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Physical unit of the values.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Replaces the unit without touching values.
    pub fn set_unit(&mut self, unit: Unit) {
        self.unit = unit;
    }

    /// Total number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the variable holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// True for zero-dimensional (scalar) variables.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Float elements, or a shape error for 3-vector variables.
    pub fn floats(&self) -> Result<&[f64]> {
        match &self.values {
            Values::Float(v) => Ok(v),
            Values::Vector(_) => Err(Error::ShapeMismatch(
                "expected float elements, found 3-vectors".into(),
            )),
        }
    }

    /// Mutable float elements.
    pub fn floats_mut(&mut self) -> Result<&mut [f64]> {
        match &mut self.values {
            Values::Float(v) => Ok(v),
            Values::Vector(_) => Err(Error::ShapeMismatch(
                "expected float elements, found 3-vectors".into(),
            )),
        }
    }

    /// 3-vector elements, or a shape error for float variables.
    pub fn vector_values(&self) -> Result<&[Vector3<f64>]> {
        match &self.values {
            Values::Vector(v) => Ok(v),
            Values::Float(_) => Err(Error::ShapeMismatch(
                "expected 3-vector elements, found floats".into(),
            )),
        }
    }

    /// Per-element variances, if attached.
    #[must_use]
    pub fn variances(&self) -> Option<&[f64]> {
        self.variances.as_deref()
    }

    /// The single value of a scalar variable.
    pub fn value(&self) -> Result<f64> {
        if !self.is_scalar() {
            return Err(Error::ShapeMismatch(format!(
                "expected a scalar, found dims {:?}",
                self.dims
            )));
        }
        Ok(self.floats()?[0])
    }

    /// Renames a dimension label; a no-op if the label is absent.
    pub fn rename_dim(&mut self, from: Dim, to: Dim) {
        for dim in &mut self.dims {
            if *dim == from {
                *dim = to;
            }
        }
    }

    /// Fails with a unit-mismatch error unless the unit is exactly `expected`.
    pub fn expect_unit(&self, expected: Unit) -> Result<()> {
        if self.unit == expected {
            Ok(())
        } else {
            Err(Error::UnitMismatch {
                expected: expected.to_string(),
                found: self.unit.to_string(),
            })
        }
    }

    /// Elementwise sum; units must match.
    pub fn add(&self, rhs: &Variable) -> Result<Variable> {
        self.check_same_unit(rhs)?;
        self.zip(rhs, self.unit, |a, b| a + b, |a, b| a + b)
    }

    /// Elementwise difference; units must match.
    pub fn sub(&self, rhs: &Variable) -> Result<Variable> {
        self.check_same_unit(rhs)?;
        self.zip(rhs, self.unit, |a, b| a - b, |a, b| a - b)
    }

    /// Elementwise product with unit composition.
    pub fn mul(&self, rhs: &Variable) -> Result<Variable> {
        let unit = self.unit.mul(rhs.unit);
        self.zip_floats(rhs, unit, |a, b| a * b)
    }

    /// Elementwise quotient with unit composition.
    pub fn div(&self, rhs: &Variable) -> Result<Variable> {
        let unit = self.unit.div(rhs.unit);
        self.zip_floats(rhs, unit, |a, b| a / b)
    }

    /// Scales all elements by a raw dimensionless factor.
    #[must_use]
    pub fn times(&self, factor: f64) -> Variable {
        let values = match &self.values {
            Values::Float(v) => Values::Float(v.iter().map(|x| x * factor).collect()),
            Values::Vector(v) => Values::Vector(v.iter().map(|x| x * factor).collect()),
        };
        Variable {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            unit: self.unit,
            values,
            variances: None,
        }
    }

    /// Euclidean norm of each 3-vector element.
    pub fn norm(&self) -> Result<Variable> {
        let v = self.vector_values()?;
        Ok(Variable {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            unit: self.unit,
            values: Values::Float(v.iter().map(|x| x.norm()).collect()),
            variances: None,
        })
    }

    /// Elementwise dot product of 3-vector variables with unit composition.
    pub fn dot(&self, rhs: &Variable) -> Result<Variable> {
        let (dims, shape) = broadcast_dims(self, rhs)?;
        let a = self.vector_values()?;
        let b = rhs.vector_values()?;
        let n: usize = shape.iter().product();
        let out = (0..n)
            .map(|i| a[pick(a.len(), i)].dot(&b[pick(b.len(), i)]))
            .collect();
        Ok(Variable {
            dims,
            shape,
            unit: self.unit.mul(rhs.unit),
            values: Values::Float(out),
            variances: None,
        })
    }

    /// Elementwise square root; the unit must have even exponents and all
    /// values must be non-negative.
    pub fn sqrt(&self) -> Result<Variable> {
        let unit = self.unit.sqrt().ok_or_else(|| Error::UnitMismatch {
            expected: "a unit with even exponents".into(),
            found: self.unit.to_string(),
        })?;
        if self.floats()?.iter().any(|v| *v < 0.0) {
            return Err(Error::NumericalDomain(
                "square root of a negative value".into(),
            ));
        }
        self.map(unit, f64::sqrt)
    }

    /// Elementwise reciprocal with unit inversion.
    pub fn reciprocal(&self) -> Result<Variable> {
        self.map(self.unit.recip(), f64::recip)
    }

    /// Elementwise sine; requires an angle (radian or dimensionless) input.
    pub fn sin(&self) -> Result<Variable> {
        self.check_angle()?;
        self.map(Unit::ONE, f64::sin)
    }

    /// Elementwise cosine; requires an angle (radian or dimensionless) input.
    pub fn cos(&self) -> Result<Variable> {
        self.check_angle()?;
        self.map(Unit::ONE, f64::cos)
    }

    /// Maps float elements through a fallible function, attaching `unit`.
    pub fn try_map<F>(&self, unit: Unit, f: F) -> Result<Variable>
    where
        F: Fn(f64) -> Result<f64>,
    {
        let values = self
            .floats()?
            .iter()
            .map(|&x| f(x))
            .collect::<Result<Vec<_>>>()?;
        Ok(Variable {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            unit,
            values: Values::Float(values),
            variances: None,
        })
    }

    fn map(&self, unit: Unit, f: impl Fn(f64) -> f64) -> Result<Variable> {
        Ok(Variable {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            unit,
            values: Values::Float(self.floats()?.iter().map(|&x| f(x)).collect()),
            variances: None,
        })
    }

    fn check_same_unit(&self, rhs: &Variable) -> Result<()> {
        if self.unit == rhs.unit {
            Ok(())
        } else {
            Err(Error::UnitMismatch {
                expected: self.unit.to_string(),
                found: rhs.unit.to_string(),
            })
        }
    }

    fn check_angle(&self) -> Result<()> {
        if self.unit.is_angle() {
            Ok(())
        } else {
            Err(Error::UnitMismatch {
                expected: Unit::RAD.to_string(),
                found: self.unit.to_string(),
            })
        }
    }

    fn zip(
        &self,
        rhs: &Variable,
        unit: Unit,
        float_op: impl Fn(f64, f64) -> f64,
        vector_op: impl Fn(Vector3<f64>, Vector3<f64>) -> Vector3<f64>,
    ) -> Result<Variable> {
        match (&self.values, &rhs.values) {
            (Values::Float(_), Values::Float(_)) => self.zip_floats(rhs, unit, float_op),
            (Values::Vector(a), Values::Vector(b)) => {
                let (dims, shape) = broadcast_dims(self, rhs)?;
                let n: usize = shape.iter().product();
                let out = (0..n)
                    .map(|i| vector_op(a[pick(a.len(), i)], b[pick(b.len(), i)]))
                    .collect();
                Ok(Variable {
                    dims,
                    shape,
                    unit,
                    values: Values::Vector(out),
                    variances: None,
                })
            }
            _ => Err(Error::ShapeMismatch(
                "cannot combine float and 3-vector variables".into(),
            )),
        }
    }

    fn zip_floats(
        &self,
        rhs: &Variable,
        unit: Unit,
        op: impl Fn(f64, f64) -> f64,
    ) -> Result<Variable> {
        let (dims, shape) = broadcast_dims(self, rhs)?;
        let a = self.floats()?;
        let b = rhs.floats()?;
        let n: usize = shape.iter().product();
        let out = (0..n)
            .map(|i| op(a[pick(a.len(), i)], b[pick(b.len(), i)]))
            .collect();
        Ok(Variable {
            dims,
            shape,
            unit,
            values: Values::Float(out),
            variances: None,
        })
    }
}

#[inline]
fn pick(len: usize, i: usize) -> usize {
    if len == 1 {
        0
    } else {
        i
    }
}

fn broadcast_dims(a: &Variable, b: &Variable) -> Result<(Vec<Dim>, Vec<usize>)> {
    if a.is_scalar() {
        Ok((b.dims.clone(), b.shape.clone()))
    } else if b.is_scalar() || (a.dims == b.dims && a.shape == b.shape) {
        Ok((a.dims.clone(), a.shape.clone()))
    } else {
        Err(Error::ShapeMismatch(format!(
            "cannot broadcast dims {:?} against {:?}",
            a.dims, b.dims
        )))
    }
}
