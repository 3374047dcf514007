//! Linear constraints and generators in exchange form.

use std::fmt;

use num_rational::BigRational;
use num_traits::Zero;

use super::expr::{write_terms, LinExpr};

/// Relation of a constraint `expr ⋈ 0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConsKind {
    Eq,
    SupEq,
    Sup,
    /// `expr = 0 mod modulus`.
    EqMod(BigRational),
    Diseq,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinCons {
    pub kind: ConsKind,
    pub expr: LinExpr,
}

impl LinCons {
    #[inline]
    pub fn new(kind: ConsKind, expr: LinExpr) -> Self {
        Self { kind, expr }
    }
    #[inline]
    pub fn eq(expr: LinExpr) -> Self {
        Self::new(ConsKind::Eq, expr)
    }
    #[inline]
    pub fn ge(expr: LinExpr) -> Self {
        Self::new(ConsKind::SupEq, expr)
    }
    #[inline]
    pub fn gt(expr: LinExpr) -> Self {
        Self::new(ConsKind::Sup, expr)
    }

    /// `x_dim >= lo` with an integer bound.
    pub fn lower(dim: usize, lo: i64) -> Self {
        Self::ge(LinExpr::from_ints(&[(dim, 1)], -lo))
    }

    /// `x_dim <= hi` with an integer bound.
    pub fn upper(dim: usize, hi: i64) -> Self {
        Self::ge(LinExpr::from_ints(&[(dim, -1)], hi))
    }

    fn relation(&self) -> &'static str {
        match self.kind {
            ConsKind::Eq | ConsKind::EqMod(_) => "=",
            ConsKind::SupEq => ">=",
            ConsKind::Sup => ">",
            ConsKind::Diseq => "!=",
        }
    }
}

/// Kind of a generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenKind {
    Vertex,
    Ray,
    Line,
    RayMod,
    LineMod,
}

/// Generator: a vertex (point) or a direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LinGen {
    pub kind: GenKind,
    /// Sparse coordinates, sorted by dimension.
    pub coords: Vec<(usize, BigRational)>,
}

impl LinGen {
    pub fn new(kind: GenKind, mut coords: Vec<(usize, BigRational)>) -> Self {
        coords.retain(|(_, q)| !q.is_zero());
        coords.sort_by_key(|(d, _)| *d);
        Self { kind, coords }
    }

    pub fn vertex(coords: Vec<(usize, BigRational)>) -> Self {
        Self::new(GenKind::Vertex, coords)
    }

    pub fn ray(coords: Vec<(usize, BigRational)>) -> Self {
        Self::new(GenKind::Ray, coords)
    }

    pub fn line(coords: Vec<(usize, BigRational)>) -> Self {
        Self::new(GenKind::Line, coords)
    }

    /// Dense coordinate, zero when absent.
    pub fn coord(&self, dim: usize) -> BigRational {
        self.coords
            .iter()
            .find(|(d, _)| *d == dim)
            .map(|(_, q)| q.clone())
            .unwrap_or_else(BigRational::zero)
    }
}

impl fmt::Display for LinCons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Scalar constraints print as `terms ⋈ -cst`.
        let scalar_terms: Option<Vec<(usize, BigRational)>> = self
            .expr
            .terms
            .iter()
            .map(|(d, c)| c.as_scalar().map(|q| (*d, q)))
            .collect();
        match (scalar_terms, self.expr.cst.as_scalar()) {
            (Some(terms), Some(cst)) if terms.iter().any(|(_, q)| !q.is_zero()) => {
                write_terms(f, &terms, None)?;
                write!(f, " {} {}", self.relation(), -cst)?;
            }
            _ => write!(f, "{} {} 0", self.expr, self.relation())?,
        }
        if let ConsKind::EqMod(m) = &self.kind {
            write!(f, " mod {m}")?;
        }
        Ok(())
    }
}

impl fmt::Display for LinGen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            GenKind::Vertex => "V",
            GenKind::Ray => "R",
            GenKind::Line => "L",
            GenKind::RayMod => "RM",
            GenKind::LineMod => "LM",
        };
        write!(f, "{tag}(")?;
        if self.coords.is_empty() {
            f.write_str("0")?;
        } else {
            let dims: Vec<String> = self
                .coords
                .iter()
                .map(|(d, q)| format!("x{d}={q}"))
                .collect();
            f.write_str(&dims.join(", "))?;
        }
        f.write_str(")")
    }
}
