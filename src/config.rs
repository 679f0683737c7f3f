//! Path-based runtime configuration.
//!
//! [`ConfigStore`] wraps a [`Settings`] tree and exposes its numeric and
//! boolean leaves under dotted paths mirroring the field names, e.g.
//! `"particles.max_count"` or `"visual.effects.glow.min_speed"`. Hosts
//! wiring sliders and checkboxes talk to the store; code with the type in
//! hand uses [`ConfigStore::modify`] and regular field access instead.
//!
//! Listeners registered with [`ConfigStore::subscribe`] are called after
//! every committed change, so a host can push the updated snapshot into a
//! running `Simulation`.
//!
//! ```ignore
//! let mut config = ConfigStore::new(Settings::default());
//! config.subscribe(|_change, settings| {
//!     sim.update_settings(settings.clone());
//! });
//! config.set("pointer.radius", 180.0)?;
//! config.set("visual.effects.trail.enabled", false)?;
//! ```
//!
//! Enum and gradient leaves (the pointer force kind, the color ramps) are
//! not path-addressable; change those through [`ConfigStore::modify`].

use tracing::warn;

use crate::error::ConfigError;
use crate::settings::{Quality, Settings};

/// A value at a settings leaf.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingValue {
    Number(f32),
    Flag(bool),
}

impl SettingValue {
    /// The numeric payload, if this is a number.
    pub fn as_number(self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(n),
            Self::Flag(_) => None,
        }
    }

    /// The boolean payload, if this is a flag.
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Self::Flag(f) => Some(f),
            Self::Number(_) => None,
        }
    }
}

impl From<f32> for SettingValue {
    fn from(n: f32) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for SettingValue {
    fn from(f: bool) -> Self {
        Self::Flag(f)
    }
}

/// What a listener is being told about.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigChange {
    /// A single leaf changed through [`ConfigStore::set`].
    Leaf { path: String, value: SettingValue },
    /// The tree changed through [`ConfigStore::modify`] or a preset.
    Bulk,
}

/// Handle identifying a registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ConfigChange, &Settings)>;

/// Owns a [`Settings`] tree and notifies listeners on every change.
pub struct ConfigStore {
    settings: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ConfigStore {
    /// Wrap a settings tree. A tree that fails validation is accepted and
    /// logged; use sites clamp what they can.
    pub fn new(settings: Settings) -> Self {
        if let Err(error) = settings.validate() {
            warn!(%error, "settings failed validation");
        }
        Self {
            settings,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Read the value at a dotted path.
    pub fn get(&self, path: &str) -> Result<SettingValue, ConfigError> {
        read_path(&self.settings, path)
    }

    /// Write the value at a dotted path and notify listeners.
    ///
    /// Whole-number leaves accept any number and store it rounded, never
    /// below zero. The write commits even when the resulting tree fails
    /// validation; the failure is logged.
    pub fn set(&mut self, path: &str, value: impl Into<SettingValue>) -> Result<(), ConfigError> {
        let value = value.into();
        write_path(&mut self.settings, path, value)?;
        if let Err(error) = self.settings.validate() {
            warn!(%error, path, "settings failed validation after write");
        }
        let change = ConfigChange::Leaf {
            path: path.to_string(),
            value,
        };
        self.notify(&change);
        Ok(())
    }

    /// Edit the tree directly and notify listeners once.
    ///
    /// This is the route to leaves without a path: the pointer force kind,
    /// the gradients, and any multi-field change that should land as one
    /// notification.
    pub fn modify(&mut self, edit: impl FnOnce(&mut Settings)) {
        edit(&mut self.settings);
        if let Err(error) = self.settings.validate() {
            warn!(%error, "settings failed validation after edit");
        }
        self.notify(&ConfigChange::Bulk);
    }

    /// Apply a quality preset and notify listeners.
    pub fn apply_preset(&mut self, quality: Quality) {
        self.modify(|settings| settings.apply_preset(quality));
    }

    /// Replace the tree with the defaults and notify listeners.
    pub fn reset_to_defaults(&mut self) {
        self.modify(|settings| *settings = Settings::default());
    }

    /// Register a listener called after every committed change.
    ///
    /// The listener sees the change and the already-updated settings.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ConfigChange, &Settings) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false when the id is not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// The current settings tree.
    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// An owned copy of the current settings tree.
    pub fn snapshot(&self) -> Settings {
        self.settings.clone()
    }

    fn notify(&mut self, change: &ConfigChange) {
        for (_, listener) in &mut self.listeners {
            listener(change, &self.settings);
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn read_path(settings: &Settings, path: &str) -> Result<SettingValue, ConfigError> {
    use SettingValue::{Flag, Number};

    let value = match path {
        // Particles
        "particles.max_count" => Number(settings.particles.max_count as f32),
        "particles.spawn_rate" => Number(settings.particles.spawn_rate),
        "particles.lifetime.min" => Number(settings.particles.lifetime.min),
        "particles.lifetime.max" => Number(settings.particles.lifetime.max),
        "particles.size.base" => Number(settings.particles.size.base),
        "particles.size.random_variation" => Number(settings.particles.size.random_variation),
        "particles.rotation.speed" => Number(settings.particles.rotation.speed),
        "particles.rotation.random_variation" => {
            Number(settings.particles.rotation.random_variation)
        }
        "particles.upward_force" => Number(settings.particles.upward_force),
        "particles.drag" => Number(settings.particles.drag),
        "particles.spawn_area.x.min" => Number(settings.particles.spawn_area.x.min),
        "particles.spawn_area.x.max" => Number(settings.particles.spawn_area.x.max),
        "particles.spawn_area.y.min" => Number(settings.particles.spawn_area.y.min),
        "particles.spawn_area.y.max" => Number(settings.particles.spawn_area.y.max),

        // Child spawning
        "child_spawning.probability" => Number(settings.child_spawning.probability),
        "child_spawning.force_multiplier.target" => {
            Number(settings.child_spawning.force_multiplier.target)
        }
        "child_spawning.force_multiplier.random_range" => {
            Number(settings.child_spawning.force_multiplier.random_range)
        }
        "child_spawning.max_children" => Number(settings.child_spawning.max_children as f32),

        // Noise
        "noise.scale" => Number(settings.noise.scale),
        "noise.strength.horizontal" => Number(settings.noise.strength.horizontal),
        "noise.strength.vertical" => Number(settings.noise.strength.vertical),
        "noise.speed" => Number(settings.noise.speed),
        "noise.octaves" => Number(settings.noise.octaves as f32),

        // Pointer
        "pointer.strength" => Number(settings.pointer.strength),
        "pointer.radius" => Number(settings.pointer.radius),
        "pointer.falloff_curve" => Number(settings.pointer.falloff_curve),
        "pointer.click_spawn_count" => Number(settings.pointer.click_spawn_count as f32),
        "pointer.sweep.speed_multiplier" => Number(settings.pointer.sweep.speed_multiplier),
        "pointer.sweep.directional_spread" => Number(settings.pointer.sweep.directional_spread),
        "pointer.follow.spread" => Number(settings.pointer.follow.spread),
        "pointer.follow.strength" => Number(settings.pointer.follow.strength),
        "pointer.follow.suction_strength" => Number(settings.pointer.follow.suction_strength),
        "pointer.boids.speed_limit" => Number(settings.pointer.boids.speed_limit),
        "pointer.boids.separation" => Number(settings.pointer.boids.separation),
        "pointer.boids.alignment" => Number(settings.pointer.boids.alignment),
        "pointer.boids.cohesion" => Number(settings.pointer.boids.cohesion),

        // Overlay repulsion
        "overlay_repulsion.enabled" => Flag(settings.overlay_repulsion.enabled),
        "overlay_repulsion.force_multiplier" => Number(settings.overlay_repulsion.force_multiplier),
        "overlay_repulsion.padding" => Number(settings.overlay_repulsion.padding),
        "overlay_repulsion.falloff_curve" => Number(settings.overlay_repulsion.falloff_curve),

        // Visual effects
        "visual.effects.glow.min_speed" => Number(settings.visual.effects.glow.min_speed),
        "visual.effects.glow.max_intensity" => Number(settings.visual.effects.glow.max_intensity),
        "visual.effects.bloom.min_speed" => Number(settings.visual.effects.bloom.min_speed),
        "visual.effects.bloom.max_intensity" => Number(settings.visual.effects.bloom.max_intensity),
        "visual.effects.trail.enabled" => Flag(settings.visual.effects.trail.enabled),
        "visual.effects.trail.min_speed" => Number(settings.visual.effects.trail.min_speed),
        "visual.effects.trail.max_length" => {
            Number(settings.visual.effects.trail.max_length as f32)
        }
        "visual.effects.trail.length_multiplier" => {
            Number(settings.visual.effects.trail.length_multiplier)
        }
        "visual.effects.trail.falloff_exponent" => {
            Number(settings.visual.effects.trail.falloff_exponent)
        }

        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    };
    Ok(value)
}

fn write_path(settings: &mut Settings, path: &str, value: SettingValue) -> Result<(), ConfigError> {
    let number = |value: SettingValue| {
        value.as_number().ok_or_else(|| ConfigError::WrongKind {
            path: path.to_string(),
            expected: "number",
        })
    };
    let flag = |value: SettingValue| {
        value.as_flag().ok_or_else(|| ConfigError::WrongKind {
            path: path.to_string(),
            expected: "flag",
        })
    };
    // Whole-number leaves round and never go below zero
    let count = |value: SettingValue| number(value).map(|n| n.max(0.0).round());

    match path {
        // Particles
        "particles.max_count" => settings.particles.max_count = count(value)? as usize,
        "particles.spawn_rate" => settings.particles.spawn_rate = number(value)?,
        "particles.lifetime.min" => settings.particles.lifetime.min = number(value)?,
        "particles.lifetime.max" => settings.particles.lifetime.max = number(value)?,
        "particles.size.base" => settings.particles.size.base = number(value)?,
        "particles.size.random_variation" => {
            settings.particles.size.random_variation = number(value)?
        }
        "particles.rotation.speed" => settings.particles.rotation.speed = number(value)?,
        "particles.rotation.random_variation" => {
            settings.particles.rotation.random_variation = number(value)?
        }
        "particles.upward_force" => settings.particles.upward_force = number(value)?,
        "particles.drag" => settings.particles.drag = number(value)?,
        "particles.spawn_area.x.min" => settings.particles.spawn_area.x.min = number(value)?,
        "particles.spawn_area.x.max" => settings.particles.spawn_area.x.max = number(value)?,
        "particles.spawn_area.y.min" => settings.particles.spawn_area.y.min = number(value)?,
        "particles.spawn_area.y.max" => settings.particles.spawn_area.y.max = number(value)?,

        // Child spawning
        "child_spawning.probability" => settings.child_spawning.probability = number(value)?,
        "child_spawning.force_multiplier.target" => {
            settings.child_spawning.force_multiplier.target = number(value)?
        }
        "child_spawning.force_multiplier.random_range" => {
            settings.child_spawning.force_multiplier.random_range = number(value)?
        }
        "child_spawning.max_children" => {
            settings.child_spawning.max_children = count(value)? as u32
        }

        // Noise
        "noise.scale" => settings.noise.scale = number(value)?,
        "noise.strength.horizontal" => settings.noise.strength.horizontal = number(value)?,
        "noise.strength.vertical" => settings.noise.strength.vertical = number(value)?,
        "noise.speed" => settings.noise.speed = number(value)?,
        "noise.octaves" => settings.noise.octaves = count(value)? as u32,

        // Pointer
        "pointer.strength" => settings.pointer.strength = number(value)?,
        "pointer.radius" => settings.pointer.radius = number(value)?,
        "pointer.falloff_curve" => settings.pointer.falloff_curve = number(value)?,
        "pointer.click_spawn_count" => settings.pointer.click_spawn_count = count(value)? as u32,
        "pointer.sweep.speed_multiplier" => {
            settings.pointer.sweep.speed_multiplier = number(value)?
        }
        "pointer.sweep.directional_spread" => {
            settings.pointer.sweep.directional_spread = number(value)?
        }
        "pointer.follow.spread" => settings.pointer.follow.spread = number(value)?,
        "pointer.follow.strength" => settings.pointer.follow.strength = number(value)?,
        "pointer.follow.suction_strength" => {
            settings.pointer.follow.suction_strength = number(value)?
        }
        "pointer.boids.speed_limit" => settings.pointer.boids.speed_limit = number(value)?,
        "pointer.boids.separation" => settings.pointer.boids.separation = number(value)?,
        "pointer.boids.alignment" => settings.pointer.boids.alignment = number(value)?,
        "pointer.boids.cohesion" => settings.pointer.boids.cohesion = number(value)?,

        // Overlay repulsion
        "overlay_repulsion.enabled" => settings.overlay_repulsion.enabled = flag(value)?,
        "overlay_repulsion.force_multiplier" => {
            settings.overlay_repulsion.force_multiplier = number(value)?
        }
        "overlay_repulsion.padding" => settings.overlay_repulsion.padding = number(value)?,
        "overlay_repulsion.falloff_curve" => {
            settings.overlay_repulsion.falloff_curve = number(value)?
        }

        // Visual effects
        "visual.effects.glow.min_speed" => {
            settings.visual.effects.glow.min_speed = number(value)?
        }
        "visual.effects.glow.max_intensity" => {
            settings.visual.effects.glow.max_intensity = number(value)?
        }
        "visual.effects.bloom.min_speed" => {
            settings.visual.effects.bloom.min_speed = number(value)?
        }
        "visual.effects.bloom.max_intensity" => {
            settings.visual.effects.bloom.max_intensity = number(value)?
        }
        "visual.effects.trail.enabled" => settings.visual.effects.trail.enabled = flag(value)?,
        "visual.effects.trail.min_speed" => {
            settings.visual.effects.trail.min_speed = number(value)?
        }
        "visual.effects.trail.max_length" => {
            settings.visual.effects.trail.max_length = count(value)? as usize
        }
        "visual.effects.trail.length_multiplier" => {
            settings.visual.effects.trail.length_multiplier = number(value)?
        }
        "visual.effects.trail.falloff_exponent" => {
            settings.visual.effects.trail.falloff_exponent = number(value)?
        }

        _ => return Err(ConfigError::UnknownPath(path.to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ForceKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_set_and_get_number() {
        let mut config = ConfigStore::default();
        config.set("pointer.radius", 180.0).unwrap();
        assert_eq!(config.get("pointer.radius").unwrap(), SettingValue::Number(180.0));
        assert_eq!(config.settings().pointer.radius, 180.0);
    }

    #[test]
    fn test_set_and_get_flag() {
        let mut config = ConfigStore::default();
        config.set("visual.effects.trail.enabled", false).unwrap();
        assert_eq!(
            config.get("visual.effects.trail.enabled").unwrap(),
            SettingValue::Flag(false)
        );
        assert!(!config.settings().visual.effects.trail.enabled);
    }

    #[test]
    fn test_count_leaves_round_and_clamp() {
        let mut config = ConfigStore::default();

        config.set("particles.max_count", 12.7).unwrap();
        assert_eq!(config.settings().particles.max_count, 13);

        config.set("pointer.click_spawn_count", -3.0).unwrap();
        assert_eq!(config.settings().pointer.click_spawn_count, 0);
    }

    #[test]
    fn test_unknown_path() {
        let mut config = ConfigStore::default();
        assert!(matches!(
            config.get("particles.no_such_leaf"),
            Err(ConfigError::UnknownPath(_))
        ));
        assert!(matches!(
            config.set("particles.no_such_leaf", 1.0),
            Err(ConfigError::UnknownPath(_))
        ));
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let mut config = ConfigStore::default();
        assert!(matches!(
            config.set("pointer.radius", true),
            Err(ConfigError::WrongKind { expected: "number", .. })
        ));
        assert!(matches!(
            config.set("overlay_repulsion.enabled", 1.0),
            Err(ConfigError::WrongKind { expected: "flag", .. })
        ));
        // Nothing committed
        assert_eq!(config.settings().pointer.radius, 100.0);
        assert!(config.settings().overlay_repulsion.enabled);
    }

    #[test]
    fn test_listener_sees_leaf_change_and_new_value() {
        let mut config = ConfigStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        config.subscribe(move |change, settings| {
            sink.borrow_mut().push((change.clone(), settings.noise.speed));
        });

        config.set("noise.speed", 2.0).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].0,
            ConfigChange::Leaf {
                path: "noise.speed".to_string(),
                value: SettingValue::Number(2.0),
            }
        );
        assert_eq!(seen[0].1, 2.0);
    }

    #[test]
    fn test_modify_notifies_bulk() {
        let mut config = ConfigStore::default();
        let changes = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&changes);
        config.subscribe(move |change, _| sink.borrow_mut().push(change.clone()));

        config.modify(|settings| {
            settings.pointer.force_kind = ForceKind::Boids;
            settings.pointer.boids.speed_limit = 300.0;
        });

        assert_eq!(*changes.borrow(), vec![ConfigChange::Bulk]);
        assert_eq!(config.settings().pointer.force_kind, ForceKind::Boids);
        assert_eq!(config.settings().pointer.boids.speed_limit, 300.0);
    }

    #[test]
    fn test_apply_preset_notifies() {
        let mut config = ConfigStore::default();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        config.subscribe(move |_, _| *sink.borrow_mut() += 1);

        config.apply_preset(Quality::Low);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(config.settings().particles.max_count, 200);
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut config = ConfigStore::default();
        config.set("particles.spawn_rate", 2.0).unwrap();
        config.set("overlay_repulsion.enabled", false).unwrap();

        config.reset_to_defaults();
        assert_eq!(config.settings().particles.spawn_rate, 50.0);
        assert!(config.settings().overlay_repulsion.enabled);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut config = ConfigStore::default();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = config.subscribe(move |_, _| *sink.borrow_mut() += 1);

        config.set("particles.drag", 0.1).unwrap();
        assert!(config.unsubscribe(id));
        config.set("particles.drag", 0.2).unwrap();

        assert_eq!(*count.borrow(), 1);
        assert!(!config.unsubscribe(id));
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        let mut config = ConfigStore::default();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        config.subscribe(move |_, _| *sink.borrow_mut() += 1);

        let _ = config.set("particles.no_such_leaf", 1.0);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut config = ConfigStore::default();
        let snapshot = config.snapshot();
        config.set("particles.spawn_rate", 0.0).unwrap();
        assert_eq!(snapshot.particles.spawn_rate, 50.0);
        assert_eq!(config.settings().particles.spawn_rate, 0.0);
    }
}
