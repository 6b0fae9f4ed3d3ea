//! Core constants and rounding primitives for the propellant mixer workspace.

/// Physical and policy constants.
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Ignition potential that must be strictly exceeded for a mixture to light.
    pub const IGNITION_THRESHOLD: f64 = 0.999;
    /// Altitude/pressure key of the terminal point on an Isp curve.
    pub const ISP_CURVE_END_KEY: f64 = 12.0;
    /// Near-zero Isp written at the terminal curve point.
    pub const ISP_CURVE_END_VALUE: f64 = 0.001;
    /// Mass flow is reported in kg/s while thrust is authored in kN.
    pub const KILONEWTONS_TO_NEWTONS: f64 = 1_000.0;
}

/// Rounding helpers that keep displayed numbers at a sensible precision.
///
/// Ties are resolved to the even neighbour so that repeated rescaling does not
/// drift upward on values that land exactly halfway.
pub mod rounding {
    /// Round to the nearest integer, ties to even.
    #[inline]
    pub fn round(v: f64) -> f64 {
        v.round_ties_even()
    }

    /// Round to a fixed number of decimal places.
    #[inline]
    pub fn round_to_decimals(v: f64, decimals: i32) -> f64 {
        let scale = 10f64.powi(decimals);
        round(v * scale) / scale
    }

    /// Round to the nearest multiple of `step`.
    #[inline]
    pub fn round_to_step(v: f64, step: f64) -> f64 {
        round(v / step) * step
    }

    /// Discretize a thrust delta: tenths, then integers above 5, then fives above 20.
    pub fn coarsen_thrust_change(change: f64) -> f64 {
        let mut change = round_to_step(change, 0.1);
        if change.abs() > 5.0 {
            change = round(change);
        }
        if change.abs() > 20.0 {
            change = round_to_step(change, 5.0);
        }
        change
    }

    /// Discretize an Isp delta that has already been rounded to whole seconds.
    pub fn coarsen_isp_change(change: f64) -> f64 {
        if change.abs() > 10.0 {
            round_to_step(change, 5.0)
        } else {
            change
        }
    }

    /// Round a positive quantity to one significant figure (`0.0374` -> `0.04`).
    ///
    /// Non-positive and non-finite inputs collapse to zero.
    pub fn round_to_significant_figure(v: f64) -> f64 {
        if !v.is_finite() || v <= 0.0 {
            return 0.0;
        }
        let power_of_ten = 10f64.powf(v.log10().floor());
        power_of_ten * round(v / power_of_ten)
    }

    /// Snap a fraction to the closer of its nearest tenth and nearest sixteenth.
    ///
    /// On an exact tie the sixteenth wins.
    pub fn nearest_clean_fraction(fraction: f64) -> f64 {
        let nearest_tenth = round(fraction * 10.0) / 10.0;
        let nearest_sixteenth = round(fraction * 16.0) / 16.0;
        if (fraction - nearest_tenth).abs() < (fraction - nearest_sixteenth).abs() {
            nearest_tenth
        } else {
            nearest_sixteenth
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn thrust_change_coarsens_by_magnitude() {
            assert!((coarsen_thrust_change(3.04) - 3.0).abs() < 1e-9);
            assert!((coarsen_thrust_change(7.4) - 7.0).abs() < 1e-9);
            assert!((coarsen_thrust_change(23.0) - 25.0).abs() < 1e-9);
            assert!((coarsen_thrust_change(-23.0) + 25.0).abs() < 1e-9);
        }

        #[test]
        fn isp_change_only_coarsens_above_ten() {
            assert_eq!(coarsen_isp_change(9.0), 9.0);
            assert_eq!(coarsen_isp_change(-10.0), -10.0);
            assert_eq!(coarsen_isp_change(12.0), 10.0);
            assert_eq!(coarsen_isp_change(-14.0), -15.0);
        }

        #[test]
        fn significant_figure_rounding() {
            assert!((round_to_significant_figure(0.0374) - 0.04).abs() < 1e-12);
            assert!((round_to_significant_figure(263.0) - 300.0).abs() < 1e-9);
            assert_eq!(round_to_significant_figure(0.0), 0.0);
            assert_eq!(round_to_significant_figure(f64::NAN), 0.0);
        }

        #[test]
        fn clean_fraction_prefers_the_closer_grid() {
            assert_eq!(nearest_clean_fraction(0.375), 0.375);
            assert!((nearest_clean_fraction(0.41) - 0.4).abs() < 1e-12);
            assert_eq!(nearest_clean_fraction(0.5), 0.5);
        }
    }
}
