use fixed::types::I32F32;

/// PDF point, stored as fixed point and always aligned to a thousandth of a point.
///
/// Arithmetic goes through integer millipoints, so adding and then subtracting the
/// same offset gives back the original value bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pt(I32F32);

impl Pt {
    pub const ZERO: Pt = Pt(I32F32::from_bits(0));
    pub const MAX: Pt = Pt(I32F32::MAX);
    pub const MIN: Pt = Pt(I32F32::MIN);

    /// Rounds to the nearest millipoint. Non-finite input saturates: NaN and positive
    /// infinity to `Pt::MAX`, negative infinity to `Pt::MIN`.
    pub fn from_f32(value: f32) -> Pt {
        if value.is_nan() || value == f32::INFINITY {
            return Pt::MAX;
        }
        if value == f32::NEG_INFINITY {
            return Pt::MIN;
        }
        let milli = (value as f64 * 1000.0).round();
        let milli = milli.clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Pt::from_milli_i64(milli)
    }

    pub fn from_i32(value: i32) -> Pt {
        Pt::from_milli_i64((value as i64) * 1000)
    }

    pub fn to_milli_i64(self) -> i64 {
        let bits = self.0.to_bits() as i128;
        let denom = 1i128 << 32;
        let scaled = bits * 1000;
        let adj = if scaled >= 0 { denom / 2 } else { -denom / 2 };
        let milli = (scaled + adj) / denom;
        milli.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    pub fn from_milli_i64(milli: i64) -> Pt {
        Pt::from_milli_i128(milli as i128)
    }

    fn from_milli_i128(milli: i128) -> Pt {
        let denom = 1i128 << 32;
        let adj = if milli >= 0 { 500 } else { -500 };
        let bits = (milli * denom + adj) / 1000;
        let bits = bits.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        Pt(I32F32::from_bits(bits))
    }

    pub fn is_positive(self) -> bool {
        self > Pt::ZERO
    }
}

impl std::fmt::Display for Pt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.to_milli_i64() as f64 / 1000.0)
    }
}

impl std::ops::Add for Pt {
    type Output = Pt;
    fn add(self, rhs: Pt) -> Pt {
        Pt::from_milli_i128(self.to_milli_i64() as i128 + rhs.to_milli_i64() as i128)
    }
}

impl std::ops::AddAssign for Pt {
    fn add_assign(&mut self, rhs: Pt) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Pt {
    type Output = Pt;
    fn sub(self, rhs: Pt) -> Pt {
        Pt::from_milli_i128(self.to_milli_i64() as i128 - rhs.to_milli_i64() as i128)
    }
}

impl std::ops::SubAssign for Pt {
    fn sub_assign(&mut self, rhs: Pt) {
        *self = *self - rhs;
    }
}

impl std::ops::Mul<i32> for Pt {
    type Output = Pt;
    fn mul(self, rhs: i32) -> Pt {
        let milli = self.to_milli_i64() as i128;
        Pt::from_milli_i128(milli.saturating_mul(rhs as i128))
    }
}

impl std::ops::Neg for Pt {
    type Output = Pt;
    fn neg(self) -> Pt {
        Pt::from_milli_i128(-(self.to_milli_i64() as i128))
    }
}

/// A point in PDF space: origin at the bottom-left, y grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: Pt,
    pub y: Pt,
}

impl Point {
    pub const ORIGIN: Point = Point {
        x: Pt::ZERO,
        y: Pt::ZERO,
    };

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: Pt::from_f32(x),
            y: Pt::from_f32(y),
        }
    }

    pub fn from_pt(x: Pt, y: Pt) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: Pt,
    pub height: Pt,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Pt::from_f32(width),
            height: Pt::from_f32(height),
        }
    }

    pub fn a4() -> Self {
        Self {
            width: Pt::from_f32(595.28),
            height: Pt::from_f32(841.89),
        }
    }

    pub fn letter() -> Self {
        // 8.5in x 11in at 72pt/in.
        Self {
            width: Pt::from_f32(612.0),
            height: Pt::from_f32(792.0),
        }
    }

    pub fn from_inches(width_in: f32, height_in: f32) -> Self {
        Self {
            width: Pt::from_f32(width_in * 72.0),
            height: Pt::from_f32(height_in * 72.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    pub fn all(value: f32) -> Self {
        let v = Pt::from_f32(value);
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top: Pt::from_f32(top),
            right: Pt::from_f32(right),
            bottom: Pt::from_f32(bottom),
            left: Pt::from_f32(left),
        }
    }

    pub(crate) fn any_negative(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .any(|v| *v < Pt::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_sub_is_exact() {
        let a = Pt::from_f32(123.457);
        let b = Pt::from_f32(-98.001);
        assert_eq!((a + b) - b, a);
        assert_eq!((a - b) + b, a);
    }

    #[test]
    fn non_finite_input_saturates() {
        assert_eq!(Pt::from_f32(f32::NAN), Pt::MAX);
        assert_eq!(Pt::from_f32(f32::INFINITY), Pt::MAX);
        assert_eq!(Pt::from_f32(f32::NEG_INFINITY), Pt::MIN);
        assert_ne!(Pt::from_f32(f32::NAN), Pt::ZERO);
    }

    #[test]
    fn integer_scaling_uses_millipoints() {
        assert_eq!(Pt::from_i32(36) * 2, Pt::from_i32(72));
        assert_eq!(-Pt::from_i32(5), Pt::from_i32(-5));
        assert_eq!(Pt::from_f32(1.5).to_string(), "1.500");
    }

    #[test]
    fn letter_is_eight_and_a_half_by_eleven_inches() {
        assert_eq!(Size::letter(), Size::from_inches(8.5, 11.0));
    }
}
