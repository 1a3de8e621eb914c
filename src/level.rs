use std::str::FromStr;

use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Aabb;

/// Size of every platform board.
pub const PLATFORM_SIZE: Vec3 = Vec3::new(10.0, 1.0, 10.0);
/// Size of the golden next-level cube.
pub const MARKER_SIZE: Vec3 = Vec3::splat(3.0);

const BUILTIN_LEVELS: &str = include_str!("../assets/levels.xml");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid level XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("level {level}: <{tag}> tag is missing")]
    MissingTag { level: usize, tag: &'static str },
    #[error("level {level}: invalid vector {value:?}")]
    InvalidVector { level: usize, value: String },
    #[error("level {level}: invalid platform count {value:?}")]
    InvalidCount { level: usize, value: String },
    #[error("level {level}: declared {declared} platforms but found {found}")]
    CountMismatch {
        level: usize,
        declared: usize,
        found: usize,
    },
    #[error("level {level} has no platforms")]
    Empty { level: usize },
    #[error("level {level}: unknown hint {value:?}")]
    UnknownHint { level: usize, value: String },
    #[error("no levels defined")]
    NoLevels,
    #[error("campaign is empty")]
    EmptyCampaign,
    #[error("campaign entry {0:?} is not a level index")]
    InvalidCampaignEntry(String),
    #[error("campaign references level {index} but only {count} levels exist")]
    UnknownLevel { index: usize, count: usize },
}

/// Instruction panel shown near the spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    Controls,
    Grapple,
}

impl FromStr for Hint {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "controls" => Ok(Self::Controls),
            "grapple" => Ok(Self::Grapple),
            _ => Err(()),
        }
    }
}

/// Authored description of a single level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub platforms: Vec<Vec3>,
    pub marker: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<Hint>,
}

impl Level {
    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    /// Fresh, unperturbed platform instances for play.
    pub fn instantiate(&self) -> Vec<Platform> {
        self.platforms.iter().copied().map(Platform::new).collect()
    }
}

/// Live platform: authored position plus accumulated wobble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    position: Vec3,
    tilt: f32,
}

impl Platform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            tilt: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Rotation about the x axis in radians.
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Collision box, ignoring tilt.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, PLATFORM_SIZE)
    }

    pub fn wobble(&mut self, drift: f32, tilt: f32) {
        self.position.x += drift;
        self.tilt += tilt;
    }

    /// Drops the tilt but keeps any drift.
    pub fn settle(&mut self) {
        self.tilt = 0.0;
    }
}

/// Every authored level plus the order they are played in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    levels: Vec<Level>,
    campaign: Vec<usize>,
}

impl LevelSet {
    /// Levels shipped with the game.
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_xml(BUILTIN_LEVELS)
    }

    pub fn new(levels: Vec<Level>, campaign: Vec<usize>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        if campaign.is_empty() {
            return Err(LevelError::EmptyCampaign);
        }
        if let Some(&index) = campaign.iter().find(|&&index| index >= levels.len()) {
            return Err(LevelError::UnknownLevel {
                index,
                count: levels.len(),
            });
        }
        Ok(Self { levels, campaign })
    }

    /// Parses the level XML. Without a `<campaign>` tag every level is played
    /// in document order.
    pub fn from_xml(xml: &str) -> Result<Self, LevelError> {
        let document = Document::parse(xml)?;
        let mut levels = Vec::new();

        for (index, node) in document
            .descendants()
            .filter(|n| n.has_tag_name("level"))
            .enumerate()
        {
            levels.push(parse_level(index, &node)?);
        }

        let campaign = match document
            .descendants()
            .find(|n| n.has_tag_name("campaign"))
            .and_then(|n| n.text())
        {
            Some(text) => parse_campaign(text)?,
            None => (0..levels.len()).collect(),
        };

        Self::new(levels, campaign)
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn campaign(&self) -> &[usize] {
        &self.campaign
    }

    pub fn stage_count(&self) -> usize {
        self.campaign.len()
    }

    /// Level played at campaign position `stage`, `None` once the campaign
    /// is over.
    pub fn level_for_stage(&self, stage: usize) -> Option<&Level> {
        self.campaign
            .get(stage)
            .and_then(|&index| self.levels.get(index))
    }
}

fn parse_level(index: usize, node: &Node<'_, '_>) -> Result<Level, LevelError> {
    let name = optional_text(node, "name").unwrap_or_else(|| format!("Level {}", index + 1));
    let marker = optional_text(node, "marker").ok_or(LevelError::MissingTag {
        level: index,
        tag: "marker",
    })?;
    let marker = parse_vec3(index, &marker)?;

    let platforms = node
        .children()
        .filter(|child| child.has_tag_name("platform"))
        .map(|child| parse_vec3(index, child.text().unwrap_or_default()))
        .collect::<Result<Vec<_>, _>>()?;
    if platforms.is_empty() {
        return Err(LevelError::Empty { level: index });
    }

    if let Some(count) = node.attribute("count") {
        let declared = count
            .trim()
            .parse::<usize>()
            .map_err(|_| LevelError::InvalidCount {
                level: index,
                value: count.to_string(),
            })?;
        if declared != platforms.len() {
            return Err(LevelError::CountMismatch {
                level: index,
                declared,
                found: platforms.len(),
            });
        }
    }

    let hint = optional_text(node, "hint")
        .map(|value| {
            value.parse::<Hint>().map_err(|_| LevelError::UnknownHint {
                level: index,
                value,
            })
        })
        .transpose()?;

    Ok(Level {
        name,
        platforms,
        marker,
        hint,
    })
}

fn parse_campaign(text: &str) -> Result<Vec<usize>, LevelError> {
    text.split_whitespace()
        .map(|entry| {
            entry
                .parse::<usize>()
                .map_err(|_| LevelError::InvalidCampaignEntry(entry.to_string()))
        })
        .collect()
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(level: usize, value: &str) -> Result<Vec3, LevelError> {
    let invalid = || LevelError::InvalidVector {
        level,
        value: value.trim().to_string(),
    };
    let components = value
        .split_whitespace()
        .map(|component| component.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static BUILTIN: Lazy<LevelSet> = Lazy::new(|| LevelSet::builtin().unwrap());

    #[test]
    fn builtin_levels_match_declared_counts() {
        let counts: Vec<usize> = BUILTIN.levels().iter().map(Level::platform_count).collect();
        assert_eq!(counts, vec![2, 3, 4, 6, 7, 7]);
    }

    #[test]
    fn builtin_campaign_skips_the_staircase() {
        assert_eq!(BUILTIN.campaign(), &[0, 1, 2, 3, 5]);
        assert_eq!(BUILTIN.level_for_stage(4).unwrap().name, "The Drop");
        assert!(BUILTIN.level_for_stage(5).is_none());
    }

    #[test]
    fn builtin_markers_and_hints() {
        let levels = BUILTIN.levels();
        assert_eq!(levels[0].marker, Vec3::new(15.0, 3.0, 0.0));
        assert_eq!(levels[3].marker, Vec3::new(75.0, -5.0, 0.0));
        assert_eq!(levels[5].marker, Vec3::new(95.0, -75.0, 0.0));
        assert_eq!(levels[0].hint, Some(Hint::Controls));
        assert_eq!(levels[2].hint, Some(Hint::Grapple));
        assert_eq!(levels[1].hint, None);
    }

    #[test]
    fn count_mismatch_is_rejected() {
        let xml = r#"<levels><level count="3">
            <marker>1 2 3</marker>
            <platform>0 0 0</platform>
        </level></levels>"#;
        assert!(matches!(
            LevelSet::from_xml(xml),
            Err(LevelError::CountMismatch {
                declared: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn campaign_defaults_to_document_order() {
        let xml = r#"<levels>
            <level><marker>0 0 0</marker><platform>0 -2 0</platform></level>
            <level><name>Two</name><marker>0 0 0</marker><platform>0 -2 0</platform></level>
        </levels>"#;
        let set = LevelSet::from_xml(xml).unwrap();
        assert_eq!(set.campaign(), &[0, 1]);
        assert_eq!(set.levels()[0].name, "Level 1");
        assert_eq!(set.levels()[1].name, "Two");
    }

    #[test]
    fn campaign_must_reference_existing_levels() {
        let xml = r#"<levels><campaign>0 4</campaign>
            <level><marker>0 0 0</marker><platform>0 -2 0</platform></level>
        </levels>"#;
        assert!(matches!(
            LevelSet::from_xml(xml),
            Err(LevelError::UnknownLevel { index: 4, count: 1 })
        ));
    }

    #[test]
    fn malformed_vectors_and_missing_marker() {
        let bad_vector = r#"<levels><level><marker>1 2</marker><platform>0 0 0</platform></level></levels>"#;
        assert!(matches!(
            LevelSet::from_xml(bad_vector),
            Err(LevelError::InvalidVector { .. })
        ));
        let no_marker = r#"<levels><level><platform>0 0 0</platform></level></levels>"#;
        assert!(matches!(
            LevelSet::from_xml(no_marker),
            Err(LevelError::MissingTag { tag: "marker", .. })
        ));
    }

    #[test]
    fn wobble_accumulates_and_settle_keeps_drift() {
        let mut platform = Platform::new(Vec3::new(0.0, -2.0, 0.0));
        platform.wobble(0.01, 0.02);
        platform.wobble(0.01, 0.02);
        assert!((platform.position().x - 0.02).abs() < 1e-6);
        assert!((platform.tilt() - 0.04).abs() < 1e-6);
        platform.settle();
        assert_eq!(platform.tilt(), 0.0);
        assert!((platform.position().x - 0.02).abs() < 1e-6);
        assert_eq!(platform.bounds().max.y, -1.5);
    }
}
