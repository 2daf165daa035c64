// kinemorph_core/src/skeleton/roles.rs

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "Left",
            Side::Right => "Right",
        }
    }

    /// Lower-cased spellings of handedness found in rig node names.
    fn spellings(self) -> &'static [&'static str] {
        match self {
            Side::Left => &["left", "l_", "_l"],
            Side::Right => &["right", "r_", "_r"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index",
            Finger::Middle => "Middle",
            Finger::Ring => "Ring",
            Finger::Pinky => "Pinky",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Finger::Thumb => &["thumb"],
            Finger::Index => &["index"],
            Finger::Middle => &["middle"],
            Finger::Ring => &["ring"],
            Finger::Pinky => &["pinky", "little"],
        }
    }
}

/// A canonical skeletal role, independent of how any particular model names its nodes.
///
/// Handed roles carry their `Side`; finger segments carry the finger and a
/// 1-based segment number counted from the knuckle outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoneRole {
    Head,
    Neck,
    Hips,
    Spine,
    Eye(Side),
    Shoulder(Side),
    UpArm(Side),
    LowArm(Side),
    Hand(Side),
    UpLeg(Side),
    Phalanx(Side, Finger, u8),
}

impl BoneRole {
    /// The order in which roles claim nodes during resolution. Earlier roles win
    /// contested nodes, so handed limbs are resolved before the unhanded torso.
    pub fn resolution_order() -> Vec<BoneRole> {
        let mut order = Vec::with_capacity(26);
        for side in Side::BOTH {
            order.push(BoneRole::Eye(side));
            order.push(BoneRole::Shoulder(side));
            order.push(BoneRole::UpArm(side));
            order.push(BoneRole::LowArm(side));
            order.push(BoneRole::Hand(side));
            for finger in Finger::ALL {
                order.push(BoneRole::Phalanx(side, finger, 1));
            }
            order.push(BoneRole::UpLeg(side));
        }
        order.extend([BoneRole::Head, BoneRole::Neck, BoneRole::Spine, BoneRole::Hips]);
        order
    }

    pub fn side(&self) -> Option<Side> {
        match *self {
            BoneRole::Head | BoneRole::Neck | BoneRole::Hips | BoneRole::Spine => None,
            BoneRole::Eye(s)
            | BoneRole::Shoulder(s)
            | BoneRole::UpArm(s)
            | BoneRole::LowArm(s)
            | BoneRole::Hand(s)
            | BoneRole::UpLeg(s)
            | BoneRole::Phalanx(s, _, _) => Some(s),
        }
    }

    /// Eyes and every finger segment past the first may be absent from a model.
    pub fn is_optional(&self) -> bool {
        match self {
            BoneRole::Eye(_) => true,
            BoneRole::Phalanx(_, _, segment) => *segment > 1,
            _ => false,
        }
    }

    pub fn is_finger(&self) -> bool {
        matches!(self, BoneRole::Phalanx(..))
    }

    /// The same finger one segment further out. Models may carry any number
    /// of segments, so only the counter's range bounds the walk.
    pub fn next_segment(&self) -> Option<BoneRole> {
        match *self {
            BoneRole::Phalanx(side, finger, segment) => segment
                .checked_add(1)
                .map(|next| BoneRole::Phalanx(side, finger, next)),
            _ => None,
        }
    }

    fn structural_synonyms(&self) -> &'static [&'static str] {
        match self {
            BoneRole::Head => &["head"],
            BoneRole::Neck => &["neck"],
            BoneRole::Hips => &["hip"],
            BoneRole::Spine => &["spine"],
            BoneRole::Eye(_) => &["eye"],
            BoneRole::Shoulder(_) => &["shoulder"],
            BoneRole::UpArm(_) => &["arm", "uparm", "upperarm"],
            BoneRole::LowArm(_) => &["forearm", "lowarm", "lowerarm"],
            BoneRole::Hand(_) => &["hand"],
            BoneRole::UpLeg(_) => &["upleg", "upperleg"],
            BoneRole::Phalanx(_, finger, _) => finger.synonyms(),
        }
    }

    /// All alias groups for this role. A node name matches the role when it
    /// contains every substring of at least one group.
    pub fn alias_groups(&self) -> Vec<Vec<&'static str>> {
        let synonyms = self.structural_synonyms();
        match self.side() {
            None => synonyms.iter().map(|s| vec![*s]).collect(),
            Some(side) => side
                .spellings()
                .iter()
                .flat_map(|h| synonyms.iter().map(move |s| vec![*h, *s]))
                .collect(),
        }
    }

    /// Case-insensitive substring match of a node name against the alias groups.
    pub fn matches_node_name(&self, node_name: &str) -> bool {
        let lowered = node_name.to_lowercase();
        self.alias_groups()
            .iter()
            .any(|group| group.iter().all(|part| lowered.contains(part)))
    }
}

impl fmt::Display for BoneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoneRole::Head => write!(f, "Head"),
            BoneRole::Neck => write!(f, "Neck"),
            BoneRole::Hips => write!(f, "Hips"),
            BoneRole::Spine => write!(f, "Spine"),
            BoneRole::Eye(s) => write!(f, "{}Eye", s.name()),
            BoneRole::Shoulder(s) => write!(f, "{}Shoulder", s.name()),
            BoneRole::UpArm(s) => write!(f, "{}UpArm", s.name()),
            BoneRole::LowArm(s) => write!(f, "{}LowArm", s.name()),
            BoneRole::Hand(s) => write!(f, "{}Hand", s.name()),
            BoneRole::UpLeg(s) => write!(f, "{}UpLeg", s.name()),
            BoneRole::Phalanx(s, finger, segment) => {
                write!(f, "{}{}{}", s.name(), finger.name(), segment)
            }
        }
    }
}
