//! Message processing.
//!
//! Element and group messages become overrides painted on top of the
//! transitions every tick. Profile level messages are handed back to the
//! caller, which owns profile loading.

use crate::{
    channel::MessageReceiver,
    color::{Color, ColorFormat, ColorRegistry, Filter},
    element::{ElementId, ElementRegistry},
    error::Result,
    message::{Message, MessageType},
    scene::Scene,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Group { name: String, elements: Vec<ElementId> },
    Element(ElementId),
}

#[derive(Debug, Clone)]
struct Override {
    target: Target,
    color: Color,
    filter: Filter,
}

/// Colors forced by messages, painted after the transitions.
///
/// Group overrides are painted before element overrides, so the more
/// specific one wins. Within each kind the latest message wins.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    groups: Vec<Override>,
    elements: Vec<Override>,
}

impl Overrides {
    /// Create an empty override layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the color of one element, replacing its previous override.
    pub fn set_element(&mut self, id: ElementId, color: Color, filter: Filter) {
        self.elements.retain(|o| o.target != Target::Element(id));
        self.elements.push(Override {
            target: Target::Element(id),
            color,
            filter,
        });
    }

    /// Force the color of a group, replacing its previous override.
    pub fn set_group(&mut self, name: &str, elements: Vec<ElementId>, color: Color, filter: Filter) {
        self.clear_group(name);
        self.groups.push(Override {
            target: Target::Group {
                name: name.to_string(),
                elements,
            },
            color,
            filter,
        });
    }

    /// Drop the override of one element.
    pub fn clear_element(&mut self, id: ElementId) {
        self.elements.retain(|o| o.target != Target::Element(id));
    }

    /// Drop the override of a group.
    pub fn clear_group(&mut self, name: &str) {
        self.groups
            .retain(|o| !matches!(&o.target, Target::Group { name: n, .. } if n == name));
    }

    /// Drop every element override.
    pub fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Drop every group override.
    pub fn clear_groups(&mut self) {
        self.groups.clear();
    }

    /// Number of active overrides.
    pub fn len(&self) -> usize {
        self.groups.len() + self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paint every override into `elements`.
    pub fn apply(&self, elements: &mut ElementRegistry) {
        for o in self.groups.iter().chain(&self.elements) {
            let ids = match &o.target {
                Target::Group { elements: members, .. } => members.as_slice(),
                Target::Element(id) => core::slice::from_ref(id),
            };
            for id in ids {
                if let Some(element) = elements.get_mut(*id) {
                    element.set_color(&o.color, o.filter, 100);
                }
            }
        }
    }
}

/// What happened to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Turned into an override change.
    Applied,
    /// Profile level message for the caller.
    Deferred(Message),
}

/// Drains the message channel into an [`Overrides`] layer.
pub struct MessageProcessor<'a, const SIZE: usize> {
    messages: MessageReceiver<'a, SIZE>,
    overrides: Overrides,
}

impl<'a, const SIZE: usize> MessageProcessor<'a, SIZE> {
    /// Create a processor draining `messages`.
    pub fn new(messages: MessageReceiver<'a, SIZE>) -> Self {
        Self {
            messages,
            overrides: Overrides::new(),
        }
    }

    /// Current override layer.
    pub const fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    /// Handle every queued message (non-blocking).
    ///
    /// Rejected messages are logged and dropped. Profile level messages are
    /// returned in arrival order.
    pub fn process_pending(&mut self, scene: &Scene) -> Vec<Message> {
        let mut deferred = Vec::new();
        while let Some(message) = self.messages.try_receive() {
            log::debug!("Received {message}");
            match handle(&mut self.overrides, message, scene) {
                Ok(Outcome::Applied) => (),
                Ok(Outcome::Deferred(message)) => deferred.push(message),
                Err(e) => log::warn!("Rejected message: {e}"),
            }
        }
        deferred
    }
}

/// Apply a single message to `overrides`.
pub fn handle(overrides: &mut Overrides, message: Message, scene: &Scene) -> Result<Outcome> {
    match message.kind() {
        MessageType::SetElement => {
            let id = scene
                .elements
                .find(message.require_field(0, "element")?)?;
            let color = resolve_color(&scene.colors, message.require_field(1, "color")?)?;
            overrides.set_element(id, color, filter_field(&message)?);
        }
        MessageType::SetGroup => {
            let group = scene.groups.get(message.require_field(0, "group")?)?;
            let color = resolve_color(&scene.colors, message.require_field(1, "color")?)?;
            overrides.set_group(
                group.name(),
                group.elements().to_vec(),
                color,
                filter_field(&message)?,
            );
        }
        MessageType::ClearElement => {
            let id = scene
                .elements
                .find(message.require_field(0, "element")?)?;
            overrides.clear_element(id);
        }
        MessageType::ClearGroup => {
            let group = scene.groups.get(message.require_field(0, "group")?)?;
            overrides.clear_group(group.name());
        }
        MessageType::ClearAllElements => overrides.clear_elements(),
        MessageType::ClearAllGroups => overrides.clear_groups(),
        MessageType::LoadProfile
        | MessageType::FinishLastProfile
        | MessageType::FinishAllProfiles
        | MessageType::CraftProfile
        | MessageType::LoadProfileByEmulator => return Ok(Outcome::Deferred(message)),
    }
    Ok(Outcome::Applied)
}

/// Registered color name, or an inline hex value.
fn resolve_color(colors: &ColorRegistry, name: &str) -> Result<Color> {
    match colors.lookup(name) {
        Ok(color) => Ok(color.clone()),
        Err(e) => Color::parse(name, name, ColorFormat::Hex).map_err(|_| e),
    }
}

fn filter_field(message: &Message) -> Result<Filter> {
    match message.field(2).map(str::trim) {
        Some(name) if !name.is_empty() => Filter::parse(name),
        _ => Ok(Filter::Normal),
    }
}
