use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Placed, Point, Rect};

/// Which food this is. Only affects defaults and descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodKind {
    /// 10 energy, 30 x 30.
    Apple,
    /// 15 energy, 18 x 30.
    Banana,
    /// Anything built from explicit values.
    Other,
}

impl fmt::Display for FoodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apple => write!(f, "apple"),
            Self::Banana => write!(f, "banana"),
            Self::Other => write!(f, "food"),
        }
    }
}

/// A passive energy source lying on the battlefield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    /// What it is.
    pub kind: FoodKind,
    /// Energy granted when eaten.
    pub energy: i32,
    rect: Rect,
}

impl Food {
    /// Build food from an energy value, a position and an extent.
    pub fn new(energy: i32, rect: Rect) -> CoreResult<Self> {
        let food = Self {
            kind: FoodKind::Other,
            energy,
            rect,
        };
        food.validate()?;
        Ok(food)
    }

    /// Check the extent and that eating it never costs energy. Deserialized
    /// food bypasses [`Food::new`], so loaders call this before placing it.
    pub fn validate(&self) -> CoreResult<()> {
        self.rect.validate()?;
        if self.energy < 0 {
            return Err(CoreError::InvalidFood(format!(
                "energy must be non-negative, got {}",
                self.energy
            )));
        }
        Ok(())
    }

    /// An apple at the given position.
    pub fn apple(at: Point) -> Self {
        Self {
            kind: FoodKind::Apple,
            energy: 10,
            rect: Rect::new(at.x, at.y, 30.0, 30.0),
        }
    }

    /// A banana at the given position.
    pub fn banana(at: Point) -> Self {
        Self {
            kind: FoodKind::Banana,
            energy: 15,
            rect: Rect::new(at.x, at.y, 18.0, 30.0),
        }
    }
}

impl Default for Food {
    fn default() -> Self {
        Self {
            kind: FoodKind::Other,
            energy: 5,
            rect: Rect::new(100.0, 100.0, 50.0, 50.0),
        }
    }
}

impl Placed for Food {
    fn rect(&self) -> Rect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_have_expected_energy() {
        assert_eq!(Food::apple(Point::default()).energy, 10);
        assert_eq!(Food::banana(Point::default()).energy, 15);
        assert_eq!(Food::default().energy, 5);
    }

    #[test]
    fn new_rejects_negative_extent() {
        assert!(Food::new(5, Rect::new(0.0, 0.0, -3.0, 3.0)).is_err());
        let food = Food::new(7, Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(food.rect(), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(food.kind, FoodKind::Other);
    }

    #[test]
    fn new_rejects_negative_energy() {
        let result = Food::new(-1, Rect::new(0.0, 0.0, 3.0, 3.0));
        assert!(matches!(result, Err(CoreError::InvalidFood(_))));
        assert!(Food::new(0, Rect::new(0.0, 0.0, 3.0, 3.0)).is_ok());
    }

    #[test]
    fn deserialized_food_is_checked_by_validate() {
        let food: Food = serde_json::from_str(
            r#"{"kind":"other","energy":-500,"rect":{"x":0,"y":0,"width":-40,"height":10}}"#,
        )
        .unwrap();
        assert!(matches!(food.validate(), Err(CoreError::InvalidExtent { .. })));
        assert!(Food::apple(Point::default()).validate().is_ok());
        assert!(Food::banana(Point::default()).validate().is_ok());
    }
}
