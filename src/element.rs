//! Addressable output units and their groups.

use std::collections::HashMap;

use crate::{
    color::{Color, Filter, Rgb},
    error::{Error, Result},
};

/// Index of an element in its [`ElementRegistry`].
pub type ElementId = usize;

/// A single addressable unit of LED output.
#[derive(Debug, Clone)]
pub struct Element {
    id: ElementId,
    name: String,
    color: Rgb,
    default_color: Color,
}

impl Element {
    /// Index in the registry.
    pub const fn id(&self) -> ElementId {
        self.id
    }

    /// Unique element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currently rendered color.
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Color restored by [`Element::reset`].
    pub const fn default_color(&self) -> &Color {
        &self.default_color
    }

    /// Combine a color into the rendered one.
    ///
    /// This is the only way the rendered color changes.
    pub fn set_color(&mut self, source: &Color, filter: Filter, intensity: u8) {
        self.color = filter.apply(self.color, source.rgb(), intensity);
    }

    /// Overwrite with the default color.
    pub fn reset(&mut self) {
        let default = self.default_color.clone();
        self.set_color(&default, Filter::Normal, 100);
    }
}

/// Every element of the loaded profile, in declaration order.
///
/// The set of elements is fixed once [`ElementRegistry::seal`] is called;
/// only their rendered colors change afterwards.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    elements: Vec<Element>,
    by_name: HashMap<String, ElementId>,
    sealed: bool,
}

impl ElementRegistry {
    /// Create an empty, unsealed registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new element, rendered off until a color is applied.
    pub fn register(&mut self, name: &str) -> Result<ElementId> {
        self.register_with_default(name, Color::off())
    }

    /// Register a new element that resets to `default_color`.
    pub fn register_with_default(&mut self, name: &str, default_color: Color) -> Result<ElementId> {
        if self.sealed {
            return Err(Error::AlreadyLoaded);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::config("element without a name"));
        }
        if self.by_name.contains_key(name) {
            return Err(Error::config(format!("duplicated element `{name}`")));
        }

        let id = self.elements.len();
        self.elements.push(Element {
            id,
            name: name.to_string(),
            color: default_color.rgb(),
            default_color,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Freeze the set of elements.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the set of elements is frozen.
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Get an element by id.
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Get an element by id for rendering.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Find the id of a named element.
    pub fn find(&self, name: &str) -> Result<ElementId> {
        self.by_name
            .get(name.trim())
            .copied()
            .ok_or_else(|| Error::NotFound(format!("element `{}`", name.trim())))
    }

    /// Get an element by name.
    pub fn by_name(&self, name: &str) -> Result<&Element> {
        let id = self.find(name)?;
        self.get(id)
            .ok_or_else(|| Error::NotFound(format!("element `{name}`")))
    }

    /// Elements in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut()
    }

    /// Apply one color to every element.
    pub fn set_all(&mut self, source: &Color, filter: Filter, intensity: u8) {
        for element in &mut self.elements {
            element.set_color(source, filter, intensity);
        }
    }

    /// Put every element back to its default color.
    pub fn reset_all(&mut self) {
        for element in &mut self.elements {
            element.reset();
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Named set of elements.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    elements: Vec<ElementId>,
}

impl Group {
    /// Unique group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member element ids.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }
}

/// Add-only set of named groups.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<Group>,
}

impl GroupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group from element names.
    pub fn add<'a>(
        &mut self,
        name: &str,
        element_names: impl IntoIterator<Item = &'a str>,
        elements: &ElementRegistry,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::config("group without a name"));
        }
        if self.groups.iter().any(|group| group.name == name) {
            return Err(Error::config(format!("duplicated group `{name}`")));
        }
        let members = element_names
            .into_iter()
            .map(|element| elements.find(element))
            .collect::<Result<Vec<_>>>()?;
        self.groups.push(Group {
            name: name.to_string(),
            elements: members,
        });
        Ok(())
    }

    /// Get a group by name.
    pub fn get(&self, name: &str) -> Result<&Group> {
        self.groups
            .iter()
            .find(|group| group.name == name.trim())
            .ok_or_else(|| Error::NotFound(format!("group `{}`", name.trim())))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
