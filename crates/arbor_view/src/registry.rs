//! Entity view registry.
//!
//! Maps engine identities to persistent visual handles. A handle is created
//! the first time its identity is seen and updated in place on every later
//! pass. It is never recreated.
//!
//! ```text
//! Snapshot ──► for each entity ──► known?  ── yes ──► update position / scale
//!                                    │
//!                                    no ──► create handle, push on draw order
//! ```

use std::collections::HashMap;

use arbor_shared::{EntityId, ObjectInfo, Snapshot, BASE_FOOTPRINT};
use serde::{Deserialize, Serialize};

use crate::input::ViewTransform;

/// What happens to handles whose identity is missing from a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VanishedPolicy {
    /// Keep them. The handle count never decreases.
    #[default]
    Retain,
    /// Drop them at the end of the pass.
    Remove,
}

/// Registry configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryConfig {
    /// Side length of the base texture. Scale is `texture_size / size`.
    pub texture_size: f64,
    /// Vanished-identity policy.
    pub vanished: VanishedPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            texture_size: BASE_FOOTPRINT,
            vanished: VanishedPolicy::Retain,
        }
    }
}

/// Axis-aligned rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns true if the point is inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// The persistent visual for one identity.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualHandle {
    /// Identity this handle mirrors.
    pub id: EntityId,
    /// Top-left position, simulation space.
    pub position: (f64, f64),
    /// Texture scale.
    pub scale: f64,
    /// On-surface side length (`texture_size * scale`).
    pub footprint: f64,
    /// Pass that created the handle.
    pub created_pass: u64,
    /// Last pass that saw the identity.
    pub updated_pass: u64,
    /// Whether hit testing considers this handle.
    pub interactive: bool,
    size: f64,
}

impl VisualHandle {
    fn new(id: EntityId, info: &ObjectInfo, texture_size: f64, pass: u64) -> Self {
        let size = info.size();
        let scale = texture_size / size;
        Self {
            id,
            position: info.position(),
            scale,
            footprint: texture_size * scale,
            created_pass: pass,
            updated_pass: pass,
            interactive: true,
            size,
        }
    }

    /// Engine-side size the scale was derived from.
    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size
    }

    /// Hit area with simulation positions drawn 1:1 on the surface.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.0, self.position.1, self.footprint, self.footprint)
    }

    /// Hit area on the surface when positions are mapped through `transform`.
    #[must_use]
    pub fn surface_bounds(&self, transform: &ViewTransform) -> Rect {
        let (x, y) = transform.to_surface(self.position.0, self.position.1);
        Rect::new(x, y, self.footprint, self.footprint)
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Handles created.
    pub created: usize,
    /// Handles updated in place.
    pub updated: usize,
    /// Repeated identities within the snapshot (treated as updates).
    pub duplicates: usize,
    /// Handles dropped under [`VanishedPolicy::Remove`].
    pub removed: usize,
    /// Records skipped for an unknown variant.
    pub unrecognized: usize,
    /// Records skipped as malformed.
    pub malformed: usize,
    /// Handles alive after the pass.
    pub live: usize,
}

/// Identity → handle map with creation-ordered drawing.
pub struct EntityViewRegistry {
    config: RegistryConfig,
    /// Handles in creation (draw) order.
    handles: Vec<VisualHandle>,
    /// Identity → index into `handles`.
    index: HashMap<EntityId, usize>,
    pass: u64,
    total_created: u64,
    last: ReconcileStats,
}

impl EntityViewRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            handles: Vec::new(),
            index: HashMap::new(),
            pass: 0,
            total_created: 0,
            last: ReconcileStats::default(),
        }
    }

    /// Folds one snapshot into the registry.
    pub fn reconcile(&mut self, snapshot: &Snapshot) -> ReconcileStats {
        self.pass += 1;
        let pass = self.pass;
        let mut stats = ReconcileStats {
            unrecognized: snapshot.unrecognized(),
            malformed: snapshot.malformed().len(),
            ..ReconcileStats::default()
        };

        for entity in snapshot.iter() {
            if let Some(&slot) = self.index.get(&entity.id) {
                let handle = &mut self.handles[slot];
                if handle.updated_pass == pass {
                    stats.duplicates += 1;
                } else {
                    stats.updated += 1;
                }
                Self::update(handle, &entity.object_info, self.config.texture_size, pass);
            } else {
                let handle = VisualHandle::new(entity.id, &entity.object_info, self.config.texture_size, pass);
                self.index.insert(entity.id, self.handles.len());
                self.handles.push(handle);
                self.total_created += 1;
                stats.created += 1;
            }
        }

        if self.config.vanished == VanishedPolicy::Remove {
            stats.removed = self.sweep(pass);
        }

        stats.live = self.handles.len();
        self.last = stats;
        stats
    }

    fn update(handle: &mut VisualHandle, info: &ObjectInfo, texture_size: f64, pass: u64) {
        handle.position = info.position();
        let size = info.size();
        if (size - handle.size).abs() > f64::EPSILON {
            handle.size = size;
            handle.scale = texture_size / size;
            handle.footprint = texture_size * handle.scale;
        }
        handle.updated_pass = pass;
    }

    /// Drops handles not seen in `pass`. Returns how many.
    fn sweep(&mut self, pass: u64) -> usize {
        let before = self.handles.len();
        self.handles.retain(|handle| handle.updated_pass == pass);
        let removed = before - self.handles.len();
        if removed > 0 {
            self.index = self
                .handles
                .iter()
                .enumerate()
                .map(|(slot, handle)| (handle.id, slot))
                .collect();
        }
        removed
    }

    /// Topmost interactive handle under the point.
    ///
    /// Later-created handles draw on top, so they win.
    #[must_use]
    pub fn hit_test(&self, x: f64, y: f64) -> Option<EntityId> {
        self.hit_test_on_surface(&ViewTransform::IDENTITY, x, y)
    }

    /// Topmost interactive handle under a surface point when simulation
    /// positions are placed on the surface through `transform`.
    ///
    /// Each handle covers `footprint` surface pixels from its mapped top-left
    /// corner.
    #[must_use]
    pub fn hit_test_on_surface(&self, transform: &ViewTransform, x: f64, y: f64) -> Option<EntityId> {
        self.handles
            .iter()
            .rev()
            .find(|handle| handle.interactive && handle.surface_bounds(transform).contains(x, y))
            .map(|handle| handle.id)
    }

    /// Enables or disables hit testing for one handle.
    ///
    /// Returns false if the identity is unknown.
    pub fn set_interactive(&mut self, id: EntityId, interactive: bool) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.handles[slot].interactive = interactive;
                true
            }
            None => false,
        }
    }

    /// Handle for an identity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&VisualHandle> {
        self.index.get(&id).map(|&slot| &self.handles[slot])
    }

    /// Live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no handle exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handles in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &VisualHandle> {
        self.handles.iter()
    }

    /// Passes run so far.
    #[inline]
    #[must_use]
    pub const fn pass(&self) -> u64 {
        self.pass
    }

    /// Handles created over the registry's lifetime.
    #[inline]
    #[must_use]
    pub const fn total_created(&self) -> u64 {
        self.total_created
    }

    /// Stats of the most recent pass.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> ReconcileStats {
        self.last
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for EntityViewRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
