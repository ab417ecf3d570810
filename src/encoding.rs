//! Visual encoding of a capacity (in MW) into a marker radius and color.

/// The color bucket of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Color {
    /// below 1,000 MW
    Red,
    /// from 1,000 MW to below 10,000 MW
    Blue,
    /// from 10,000 MW to below 100,000 MW
    Yellow,
    /// 100,000 MW and above
    Teal,
}

impl Color {
    /// Returns the bucket of `capacity`. Lower bounds are inclusive.
    pub fn of(capacity: f64) -> Self {
        if capacity < 1_000.0 {
            Color::Red
        } else if capacity < 10_000.0 {
            Color::Blue
        } else if capacity < 100_000.0 {
            Color::Yellow
        } else {
            Color::Teal
        }
    }

    /// Returns the (red, green, blue, alpha) components
    pub fn rgba(&self) -> (u8, u8, u8, f32) {
        match self {
            Color::Red => (255, 99, 132, 0.7),
            Color::Blue => (54, 162, 235, 0.7),
            Color::Yellow => (255, 205, 86, 0.7),
            Color::Teal => (75, 192, 192, 0.7),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (r, g, b, a) = self.rgba();
        write!(f, "rgba({r}, {g}, {b}, {a})")
    }
}

/// Logarithmic mapping between capacity and radius.
/// A capacity of 1 MW or less maps to `min_radius` and `ceiling` maps to `max_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min_radius: f64,
    pub max_radius: f64,
    /// The capacity drawn with `max_radius`
    pub ceiling: f64,
    /// Whether capacities above `ceiling` are drawn with `max_radius`.
    /// Otherwise they extrapolate beyond it.
    pub clamp: bool,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            min_radius: 3.0,
            max_radius: 50.0,
            ceiling: 2_000_000.0,
            clamp: false,
        }
    }
}

impl Scale {
    pub fn radius(&self, capacity: f64) -> f64 {
        let log_min = 1.0f64.ln();
        let log_max = self.ceiling.ln();
        let log_value = capacity.max(1.0).ln();

        let radius = self.min_radius
            + (self.max_radius - self.min_radius) * (log_value - log_min) / (log_max - log_min);
        if self.clamp {
            radius.min(self.max_radius)
        } else {
            radius
        }
    }

    pub fn encode(&self, capacity: f64) -> Encoding {
        Encoding {
            radius: self.radius(capacity),
            color: Color::of(capacity),
        }
    }
}

/// How a capacity is drawn
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Encoding {
    pub radius: f64,
    pub color: Color,
}

/// Returns the [`Encoding`] of `capacity` with the default [`Scale`]
pub fn encode(capacity: f64) -> Encoding {
    Scale::default().encode(capacity)
}
