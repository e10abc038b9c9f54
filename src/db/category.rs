use rand::seq::SliceRandom as _;
use serde::{Deserialize, Serialize};

/// Colours the terminal layer knows how to render.
pub const PALETTE: &[&str] = &[
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "brightred",
    "brightgreen",
    "brightyellow",
    "brightblue",
    "brightmagenta",
    "brightcyan",
    "brightwhite",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: String, color: String) -> Self {
        Self { name, color }
    }

    pub fn with_random_color(name: String) -> Self {
        Self::new(name, random_color().to_string())
    }
}

pub fn random_color() -> &'static str {
    PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("white")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_color_is_from_palette() {
        for _ in 0..20 {
            let category = Category::with_random_color("defi".to_string());
            assert!(PALETTE.contains(&category.color.as_str()));
        }
    }
}
