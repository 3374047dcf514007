//! Per-client domain context: configuration plus the conversion engine.
//!
//! Every polyhedron operation takes `&Domain`. Nothing is shared between
//! calls except what the caller keeps in the `Domain` itself.

use crate::cfg::{Budget, PolyCfg};
use crate::engine::{Chernikova, ConversionEngine};
use crate::matrix::Layout;

#[derive(Debug)]
pub struct Domain {
    cfg: PolyCfg,
    engine: Box<dyn ConversionEngine>,
}

impl Domain {
    pub fn new(cfg: PolyCfg) -> Self {
        Self::with_engine(cfg, Box::new(Chernikova))
    }

    pub fn with_engine(cfg: PolyCfg, engine: Box<dyn ConversionEngine>) -> Self {
        Self { cfg, engine }
    }

    /// Domain with the epsilon column (strict inequalities).
    pub fn strict() -> Self {
        Self::new(PolyCfg::strict())
    }

    #[inline]
    pub fn cfg(&self) -> &PolyCfg {
        &self.cfg
    }

    #[inline]
    pub fn engine(&self) -> &dyn ConversionEngine {
        self.engine.as_ref()
    }

    #[inline]
    pub fn layout(&self, int_dims: usize, real_dims: usize) -> Layout {
        Layout::new(self.cfg.strict, int_dims, real_dims)
    }

    /// Fresh resource budget for one operation.
    #[inline]
    pub(crate) fn budget(&self) -> Budget {
        Budget::new(&self.cfg)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new(PolyCfg::default())
    }
}
