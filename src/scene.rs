//! Rendering backend interface and an in-memory retained scene.
//!
//! The page manager never draws. It creates one root node per loaded page,
//! moves it through the X/Y/opacity [`Channel`]s, hides or shows it and
//! reorders it. Destruction is always deferred: a node scheduled for deletion
//! survives until no running animation references it.
//!
//! [`SceneGraph`] is the reference backend used by the simulator and the
//! tests. It keeps nodes in back-to-front draw order.

use alloc::vec::Vec;

use crate::anim::Channel;
use crate::config::OPA_COVER;

/// Opaque handle to a scene node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SceneId(pub u32);

/// Operations the page manager needs from a rendering engine.
pub trait SceneBackend {
    /// Create a visible full-screen root node at the origin, fully opaque, on top.
    fn create_root(&mut self) -> SceneId;

    /// Schedule a node for destruction once nothing animates it anymore.
    fn delete_deferred(
        &mut self,
        id: SceneId,
    );

    fn set_hidden(
        &mut self,
        id: SceneId,
        hidden: bool,
    );

    fn is_hidden(
        &self,
        id: SceneId,
    ) -> bool;

    /// Raise a node to the front of the draw order.
    fn move_foreground(
        &mut self,
        id: SceneId,
    );

    /// Current value of a channel (0 for unknown nodes).
    fn value(
        &self,
        id: SceneId,
        channel: Channel,
    ) -> i32;

    fn set_value(
        &mut self,
        id: SceneId,
        channel: Channel,
        value: i32,
    );

    /// Destroy deferred nodes for which `in_use` returns false.
    fn collect_garbage(
        &mut self,
        _in_use: &dyn Fn(SceneId) -> bool,
    ) {
    }
}

// =============================================================================
// Reference Scene Graph
// =============================================================================

/// A page root node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SceneNode {
    pub id: SceneId,
    pub x: i32,
    pub y: i32,
    pub opacity: i32,
    pub hidden: bool,
    /// Scheduled for deletion.
    pub doomed: bool,
}

impl SceneNode {
    const fn new(id: SceneId) -> Self {
        Self {
            id,
            x: 0,
            y: 0,
            opacity: OPA_COVER,
            hidden: false,
            doomed: false,
        }
    }
}

/// In-memory retained scene. Nodes are stored back-to-front.
#[derive(Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next_id: 1,
        }
    }

    /// Look up a node.
    pub fn node(
        &self,
        id: SceneId,
    ) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(
        &mut self,
        id: SceneId,
    ) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Nodes from back to front, including doomed ones not yet collected.
    pub fn nodes(&self) -> &[SceneNode] { &self.nodes }

    /// Ids from back to front.
    pub fn z_order(&self) -> impl Iterator<Item = SceneId> + '_ { self.nodes.iter().map(|n| n.id) }

    /// Whether the node exists (deferred nodes still count).
    pub fn contains(
        &self,
        id: SceneId,
    ) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize { self.nodes.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
}

impl SceneBackend for SceneGraph {
    fn create_root(&mut self) -> SceneId {
        let id = SceneId(self.next_id.max(1));
        self.next_id = id.0.wrapping_add(1);
        self.nodes.push(SceneNode::new(id));
        id
    }

    fn delete_deferred(
        &mut self,
        id: SceneId,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.doomed = true;
        }
    }

    fn set_hidden(
        &mut self,
        id: SceneId,
        hidden: bool,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    fn is_hidden(
        &self,
        id: SceneId,
    ) -> bool {
        self.node(id).is_some_and(|n| n.hidden)
    }

    fn move_foreground(
        &mut self,
        id: SceneId,
    ) {
        if let Some(pos) = self.nodes.iter().position(|n| n.id == id) {
            let node = self.nodes.remove(pos);
            self.nodes.push(node);
        }
    }

    fn value(
        &self,
        id: SceneId,
        channel: Channel,
    ) -> i32 {
        self.node(id).map_or(0, |n| match channel {
            Channel::X => n.x,
            Channel::Y => n.y,
            Channel::Opacity => n.opacity,
        })
    }

    fn set_value(
        &mut self,
        id: SceneId,
        channel: Channel,
        value: i32,
    ) {
        if let Some(node) = self.node_mut(id) {
            match channel {
                Channel::X => node.x = value,
                Channel::Y => node.y = value,
                Channel::Opacity => node.opacity = value.clamp(0, OPA_COVER),
            }
        }
    }

    fn collect_garbage(
        &mut self,
        in_use: &dyn Fn(SceneId) -> bool,
    ) {
        self.nodes.retain(|n| !n.doomed || in_use(n.id));
    }
}

// =============================================================================
// Tests
// =============================================================================
