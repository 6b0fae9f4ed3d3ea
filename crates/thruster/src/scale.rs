//! Externally supplied part scale and the per-quantity exponents applied to it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleQuantity {
    Mass,
    Cost,
    Tank,
    Engine,
    Rcs,
}

/// Exponent per quantity; unset quantities do not scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScaleExponents {
    pub mass: Option<f64>,
    pub cost: Option<f64>,
    pub tank: Option<f64>,
    pub engine: Option<f64>,
    pub rcs: Option<f64>,
}

impl ScaleExponents {
    pub fn exponent(&self, quantity: ScaleQuantity) -> Option<f64> {
        match quantity {
            ScaleQuantity::Mass => self.mass,
            ScaleQuantity::Cost => self.cost,
            ScaleQuantity::Tank => self.tank,
            ScaleQuantity::Engine => self.engine,
            ScaleQuantity::Rcs => self.rcs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    factor: f64,
    exponents: ScaleExponents,
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::new(ScaleExponents::default())
    }
}

impl ScaleFactor {
    pub fn new(exponents: ScaleExponents) -> Self {
        Self {
            factor: 1.0,
            exponents,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn exponents(&self) -> &ScaleExponents {
        &self.exponents
    }

    /// Returns whether the factor changed.
    pub fn set_factor(&mut self, factor: f64) -> bool {
        if factor == self.factor || !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        log::debug!("scale factor {} -> {}", self.factor, factor);
        self.factor = factor;
        true
    }

    /// `factor ^ exponent` for `quantity`, or `1` when no exponent is authored.
    pub fn scale(&self, quantity: ScaleQuantity) -> f64 {
        self.exponents
            .exponent(quantity)
            .map_or(1.0, |exponent| self.factor.powf(exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_applies_authored_exponents() {
        let mut scale = ScaleFactor::new(ScaleExponents {
            engine: Some(2.0),
            mass: Some(3.0),
            ..ScaleExponents::default()
        });
        assert_eq!(scale.scale(ScaleQuantity::Engine), 1.0);
        assert!(scale.set_factor(2.0));
        assert!(!scale.set_factor(2.0));
        assert!(!scale.set_factor(-1.0));
        assert_eq!(scale.scale(ScaleQuantity::Engine), 4.0);
        assert_eq!(scale.scale(ScaleQuantity::Mass), 8.0);
        assert_eq!(scale.scale(ScaleQuantity::Rcs), 1.0);
    }
}
