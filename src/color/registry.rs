use std::collections::HashMap;

use crate::{
    color::{Color, ColorFormat},
    error::{Error, Result},
};

/// Name to color table.
///
/// Populated once while the profile is loaded and read-only afterwards.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    colors: Vec<Color>,
    index: HashMap<String, usize>,
    loaded: bool,
}

impl ColorRegistry {
    /// Create an empty, not yet loaded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the registry from `name -> value` pairs.
    ///
    /// Either every entry is registered or none is. A second call fails with
    /// [`Error::AlreadyLoaded`].
    pub fn load<I, N, V>(&mut self, entries: I, format: ColorFormat) -> Result<()>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        if self.loaded {
            return Err(Error::AlreadyLoaded);
        }

        let mut colors = Vec::new();
        let mut index = HashMap::new();
        for (name, value) in entries {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(Error::config("color without a name"));
            }
            let color = Color::parse(name, value.as_ref(), format)?;
            if index.insert(name.to_string(), colors.len()).is_some() {
                return Err(Error::config(format!("duplicated color `{name}`")));
            }
            colors.push(color);
        }

        log::debug!("Loaded {} colors", colors.len());
        self.colors = colors;
        self.index = index;
        self.loaded = true;
        Ok(())
    }

    /// Parse the format name and populate the registry.
    pub fn load_with_format_name<I, N, V>(&mut self, entries: I, format: &str) -> Result<()>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let format = ColorFormat::parse(format)?;
        self.load(entries, format)
    }

    /// Find a color by name.
    pub fn lookup(&self, name: &str) -> Result<&Color> {
        self.index
            .get(name.trim())
            .and_then(|position| self.colors.get(*position))
            .ok_or_else(|| Error::NotFound(format!("color `{}`", name.trim())))
    }

    /// Color names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(Color::name)
    }

    /// Colors in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.colors.iter()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether a load succeeded.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }
}
