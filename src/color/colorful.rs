use crate::{
    color::{Color, ColorRegistry},
    error::{Error, Result},
};

/// Cyclic sequence of colors.
///
/// The cursor always points at a valid entry. An empty configured list is
/// replaced by [`Color::on`], which makes the sequence a fixed point.
#[derive(Debug, Clone)]
pub struct Colorful {
    colors: Vec<Color>,
    cursor: usize,
    fallback: bool,
}

impl Colorful {
    /// Create a sequence; an empty list renders [`Color::on`].
    pub fn new(colors: Vec<Color>) -> Self {
        if colors.is_empty() {
            return Self {
                colors: vec![Color::on()],
                cursor: 0,
                fallback: true,
            };
        }
        Self {
            colors,
            cursor: 0,
            fallback: false,
        }
    }

    /// Build from a comma separated list of registered color names.
    ///
    /// An unregistered name is a configuration error.
    pub fn from_names(list: &str, registry: &ColorRegistry) -> Result<Self> {
        let colors = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                registry
                    .lookup(name)
                    .cloned()
                    .map_err(|_| Error::config(format!("unknown color `{name}`")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(colors))
    }

    /// Move to the next color, wrapping around.
    pub fn advance_color(&mut self) {
        if self.colors.len() <= 1 {
            return;
        }
        self.cursor = (self.cursor + 1) % self.colors.len();
    }

    /// Go back to the first color.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Color under the cursor.
    pub fn current_color(&self) -> &Color {
        &self.colors[self.cursor]
    }

    /// Index of the current color.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of configured colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether the configured list was empty and the default color is used.
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }
}
