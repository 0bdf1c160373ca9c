//! Registries shared by the animation loop.
//!
//! A [`Scene`] is built while the profile loads: colors first, then elements,
//! then groups. After [`Scene::seal`] only element colors change, and the
//! scene is handed to every tick by reference.

use crate::{
    color::{ColorFormat, ColorRegistry},
    config::check_version,
    element::{ElementRegistry, GroupRegistry},
    error::Result,
};

/// Registries of the loaded profile.
#[derive(Debug, Default)]
pub struct Scene {
    pub colors: ColorRegistry,
    pub elements: ElementRegistry,
    pub groups: GroupRegistry,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scene from a profile document header and its color table.
    pub fn load<I, N, V>(version: &str, colors: I, format: ColorFormat) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        check_version(version)?;
        let mut scene = Self::new();
        scene.colors.load(colors, format)?;
        Ok(scene)
    }

    /// Freeze the element set once the profile is fully loaded.
    pub fn seal(&mut self) {
        self.elements.seal();
        log::info!(
            "Scene ready: {} colors, {} elements, {} groups",
            self.colors.len(),
            self.elements.len(),
            self.groups.len()
        );
    }
}
