use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

pub type Cost = Quantity<f64, 0, 0, 1>;

impl Cost {
    pub const ONE_CENT: Self = Self(0.01);
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.2}", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:+.3}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_signed() {
        assert_eq!(Cost::from(-1.234).to_string(), "-1.23");
        assert_eq!(Cost::from(0.5).to_string(), "+0.50");
    }
}
