//! Tree mirror.
//!
//! A headless copy of the editor's object tree: one root per zone, one group
//! per object kind family under it, and one leaf per entity (path points hang
//! below their path). The UI binds to [`TreeNodeKey`]s; the session keeps the
//! identity → node index in step with every mutation.

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::galaxy::{ObjectKind, ZoneKey};
use crate::ids::Identity;
use crate::settings::GameVariant;

new_key_type! {
    pub struct TreeNodeKey;
}

/// Kind families shown as tree groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeGroup {
    General,
    MapPart,
    Gravity,
    Start,
    Area,
    Camera,
    Sound,
    Cutscene,
    Position,
    Changer,
    Debug,
    Path,
}

impl TreeGroup {
    #[must_use]
    pub fn for_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::General | ObjectKind::Child => Self::General,
            ObjectKind::MapPart => Self::MapPart,
            ObjectKind::Gravity => Self::Gravity,
            ObjectKind::Start => Self::Start,
            ObjectKind::Area => Self::Area,
            ObjectKind::Camera => Self::Camera,
            ObjectKind::Sound => Self::Sound,
            ObjectKind::Cutscene => Self::Cutscene,
            ObjectKind::Position => Self::Position,
            ObjectKind::Changer => Self::Changer,
            ObjectKind::Debug => Self::Debug,
        }
    }

    /// Groups displayed for a game, in display order.
    #[must_use]
    pub fn for_game(game: GameVariant) -> &'static [TreeGroup] {
        match game {
            GameVariant::Galaxy1 => &[
                Self::General,
                Self::MapPart,
                Self::Gravity,
                Self::Start,
                Self::Area,
                Self::Camera,
                Self::Sound,
                Self::Cutscene,
                Self::Position,
                Self::Debug,
                Self::Path,
            ],
            GameVariant::Galaxy2 => &[
                Self::General,
                Self::MapPart,
                Self::Gravity,
                Self::Start,
                Self::Area,
                Self::Camera,
                Self::Cutscene,
                Self::Position,
                Self::Changer,
                Self::Debug,
                Self::Path,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeLabel {
    Zone(String),
    Group(TreeGroup),
    Object(Identity),
    Path(Identity),
    PathPoint(Identity),
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub label: TreeLabel,
    pub(crate) parent: Option<TreeNodeKey>,
    pub(crate) children: Vec<TreeNodeKey>,
}

impl TreeNode {
    fn new(label: TreeLabel) -> Self {
        Self {
            label,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<TreeNodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[TreeNodeKey] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct TreeMirror {
    nodes: SlotMap<TreeNodeKey, TreeNode>,
    roots: Vec<TreeNodeKey>,
    zone_roots: FxHashMap<ZoneKey, TreeNodeKey>,
    groups: FxHashMap<(ZoneKey, TreeGroup), TreeNodeKey>,
    by_identity: FxHashMap<Identity, TreeNodeKey>,
}

impl TreeMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a zone root with the group nodes the game displays.
    pub fn add_zone(&mut self, zone: ZoneKey, name: &str, game: GameVariant) -> TreeNodeKey {
        let root = self.nodes.insert(TreeNode::new(TreeLabel::Zone(name.to_string())));
        self.roots.push(root);
        self.zone_roots.insert(zone, root);
        for &group in TreeGroup::for_game(game) {
            let node = self.add_child(TreeNode::new(TreeLabel::Group(group)), root);
            self.groups.insert((zone, group), node);
        }
        root
    }

    fn add_child(&mut self, child: TreeNode, parent: TreeNodeKey) -> TreeNodeKey {
        let key = self.nodes.insert(child);
        self.attach(key, parent);
        key
    }

    /// Moves `child` under `parent`, detaching it from its old parent.
    fn attach(&mut self, child: TreeNodeKey, parent: TreeNodeKey) {
        if child == parent {
            log::warn!("Cannot attach tree node to itself");
            return;
        }
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent
            && let Some(n) = self.nodes.get_mut(p)
            && let Some(i) = n.children.iter().position(|&x| x == child)
        {
            n.children.remove(i);
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn group_node(&self, zone: ZoneKey, group: TreeGroup) -> Option<TreeNodeKey> {
        self.groups.get(&(zone, group)).copied()
    }

    /// Adds an object leaf. Returns `None` if the zone shows no group for
    /// the kind.
    pub fn insert_object(&mut self, identity: Identity, zone: ZoneKey, kind: ObjectKind) -> Option<TreeNodeKey> {
        let group = self.group_node(zone, TreeGroup::for_kind(kind))?;
        let key = self.add_child(TreeNode::new(TreeLabel::Object(identity)), group);
        self.by_identity.insert(identity, key);
        Some(key)
    }

    pub fn insert_path(&mut self, identity: Identity, zone: ZoneKey) -> Option<TreeNodeKey> {
        let group = self.group_node(zone, TreeGroup::Path)?;
        let key = self.add_child(TreeNode::new(TreeLabel::Path(identity)), group);
        self.by_identity.insert(identity, key);
        Some(key)
    }

    pub fn insert_point(&mut self, identity: Identity, path: Identity) -> Option<TreeNodeKey> {
        let parent = self.node_of(path)?;
        let key = self.add_child(TreeNode::new(TreeLabel::PathPoint(identity)), parent);
        self.by_identity.insert(identity, key);
        Some(key)
    }

    /// Re-parents an object's existing node under another zone/group. The
    /// node key is kept.
    pub fn repoint_object(&mut self, identity: Identity, zone: ZoneKey, kind: ObjectKind) -> bool {
        let (Some(node), Some(group)) = (
            self.node_of(identity),
            self.group_node(zone, TreeGroup::for_kind(kind)),
        ) else {
            return false;
        };
        self.attach(node, group);
        true
    }

    /// Removes an entity's node and its subtree.
    pub fn remove(&mut self, identity: Identity) -> bool {
        let Some(key) = self.by_identity.remove(&identity) else {
            return false;
        };
        self.remove_node(key);
        true
    }

    fn remove_node(&mut self, key: TreeNodeKey) {
        let children = if let Some(node) = self.nodes.get(key) {
            node.children.clone()
        } else {
            return;
        };
        for child in children {
            self.remove_node(child);
        }

        let parent = self.nodes.get(key).and_then(|n| n.parent);
        if let Some(p) = parent {
            if let Some(parent) = self.nodes.get_mut(p)
                && let Some(pos) = parent.children.iter().position(|&x| x == key)
            {
                parent.children.remove(pos);
            }
        } else if let Some(pos) = self.roots.iter().position(|&x| x == key) {
            self.roots.remove(pos);
        }

        if let Some(node) = self.nodes.remove(key) {
            match node.label {
                TreeLabel::Object(id) | TreeLabel::Path(id) | TreeLabel::PathPoint(id) => {
                    self.by_identity.remove(&id);
                }
                TreeLabel::Zone(_) | TreeLabel::Group(_) => {}
            }
        }
    }

    #[must_use]
    pub fn node_of(&self, identity: Identity) -> Option<TreeNodeKey> {
        self.by_identity.get(&identity).copied()
    }

    #[must_use]
    pub fn get(&self, key: TreeNodeKey) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn zone_root(&self, zone: ZoneKey) -> Option<TreeNodeKey> {
        self.zone_roots.get(&zone).copied()
    }

    #[must_use]
    pub fn roots(&self) -> &[TreeNodeKey] {
        &self.roots
    }

    /// The zone root an entity's node sits under.
    #[must_use]
    pub fn zone_of_node(&self, mut key: TreeNodeKey) -> Option<TreeNodeKey> {
        while let Some(parent) = self.nodes.get(key)?.parent {
            key = parent;
        }
        Some(key)
    }

    /// Number of entity leaves indexed by identity.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.by_identity.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.zone_roots.clear();
        self.groups.clear();
        self.by_identity.clear();
    }
}
