//! Element registry - parses `elements.data` into the immutable element
//! table.
//!
//! Recovery policy: a bad block never fails the whole load. Invalid ids,
//! duplicates and blocks missing required fields are logged and dropped; the
//! reserved EMPTY element is injected afterwards regardless of what the file
//! said about id 0.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::core::color::Rgba;
use crate::domain::element::{Category, Element, ElementId, Phase, EMPTY, FIRST_USER_ID};

// Required-field checksum: one bit per recognized key, a block registers
// only when every bit is present.
const SEEN_NAME: u16 = 1 << 0;
const SEEN_PHASE: u16 = 1 << 1;
const SEEN_CATEGORY: u16 = 1 << 2;
const SEEN_BASE_COLOR: u16 = 1 << 3;
const SEEN_BLEND_COLOR: u16 = 1 << 4;
const SEEN_HIGHLIGHT_COLOR: u16 = 1 << 5;
const SEEN_IS_MOVABLE: u16 = 1 << 6;
const SEEN_DENSITY: u16 = 1 << 7;
const SEEN_COHESION: u16 = 1 << 8;
const SEEN_REPOSE_ANGLE: u16 = 1 << 9;
const SEEN_ALL: u16 = (1 << 10) - 1;

const FIELD_NAMES: [(u16, &str); 10] = [
    (SEEN_NAME, "name"),
    (SEEN_PHASE, "phase"),
    (SEEN_CATEGORY, "category"),
    (SEEN_BASE_COLOR, "base_color"),
    (SEEN_BLEND_COLOR, "blend_color"),
    (SEEN_HIGHLIGHT_COLOR, "highlight_color"),
    (SEEN_IS_MOVABLE, "is_movable"),
    (SEEN_DENSITY, "density"),
    (SEEN_COHESION, "cohesion"),
    (SEEN_REPOSE_ANGLE, "repose_angle"),
];

/// Read-only mapping from element id to element data.
pub struct ElementRegistry {
    elements: HashMap<ElementId, Element>,
}

/// A block being accumulated during the scan. `seen` is the field checksum.
struct PendingBlock {
    id: ElementId,
    seen: u16,
    name: String,
    phase: Phase,
    category: Category,
    base_color: Rgba,
    blend_color: Rgba,
    highlight_color: Rgba,
    is_movable: bool,
    density: f32,
    cohesion: u8,
    repose_angle: u8,
}

impl PendingBlock {
    fn new(id: ElementId) -> PendingBlock {
        PendingBlock {
            id,
            seen: 0,
            name: String::new(),
            phase: Phase::Solid,
            category: Category::Solid,
            base_color: Rgba::opaque(0, 0, 0),
            blend_color: Rgba::opaque(0, 0, 0),
            highlight_color: Rgba::opaque(0, 0, 0),
            is_movable: false,
            density: 0.0,
            cohesion: 0,
            repose_angle: 45,
        }
    }

    fn apply(&mut self, key: &str, value: &str, lineno: usize) {
        match key {
            "name" => {
                self.name = value.to_string();
                self.seen |= SEEN_NAME;
            }
            "phase" => match Phase::parse(value) {
                Some(phase) => {
                    self.phase = phase;
                    self.seen |= SEEN_PHASE;
                }
                None => log::warn!("elements.data:{}: unknown phase '{}'", lineno, value),
            },
            "category" => match Category::parse(value) {
                Some(category) => {
                    self.category = category;
                    self.seen |= SEEN_CATEGORY;
                }
                None => log::warn!("elements.data:{}: unknown category '{}'", lineno, value),
            },
            "base_color" | "blend_color" | "highlight_color" => match Rgba::parse(value) {
                Some(color) => match key {
                    "base_color" => {
                        self.base_color = color;
                        self.seen |= SEEN_BASE_COLOR;
                    }
                    "blend_color" => {
                        self.blend_color = color;
                        self.seen |= SEEN_BLEND_COLOR;
                    }
                    _ => {
                        self.highlight_color = color;
                        self.seen |= SEEN_HIGHLIGHT_COLOR;
                    }
                },
                None => log::warn!("elements.data:{}: bad color '{}'", lineno, value),
            },
            "is_movable" => match value.parse::<bool>() {
                Ok(movable) => {
                    self.is_movable = movable;
                    self.seen |= SEEN_IS_MOVABLE;
                }
                Err(_) => log::warn!("elements.data:{}: bad is_movable '{}'", lineno, value),
            },
            "density" => match value.parse::<f32>() {
                Ok(density) => {
                    self.density = density;
                    self.seen |= SEEN_DENSITY;
                }
                Err(_) => log::warn!("elements.data:{}: bad density '{}'", lineno, value),
            },
            "cohesion" => match value.parse::<u8>() {
                Ok(cohesion) => {
                    self.cohesion = cohesion;
                    self.seen |= SEEN_COHESION;
                }
                Err(_) => log::warn!("elements.data:{}: bad cohesion '{}'", lineno, value),
            },
            "repose_angle" => match value.parse::<u8>() {
                Ok(angle) => {
                    self.repose_angle = angle;
                    self.seen |= SEEN_REPOSE_ANGLE;
                }
                Err(_) => log::warn!("elements.data:{}: bad repose_angle '{}'", lineno, value),
            },
            _ => log::warn!("elements.data:{}: unknown key '{}'", lineno, key),
        }
    }

    fn finish(self) -> Option<Element> {
        if self.seen != SEEN_ALL {
            let missing: Vec<&str> = FIELD_NAMES
                .iter()
                .filter(|(bit, _)| self.seen & bit == 0)
                .map(|(_, field)| *field)
                .collect();
            log::warn!(
                "elements.data: discarding element {} (missing {})",
                self.id,
                missing.join(", ")
            );
            return None;
        }
        Some(Element::new(
            self.id,
            self.name,
            self.category,
            self.phase,
            self.is_movable,
            self.density,
            self.base_color,
            self.blend_color,
            self.highlight_color,
            self.cohesion,
            self.repose_angle,
        ))
    }
}

/// Scan state between block headers. Lines inside a rejected block are
/// consumed without further noise.
enum BlockState {
    Outside,
    Discarded,
    Active(PendingBlock),
}

impl ElementRegistry {
    /// Parse the block text format. Never fails: offending blocks and lines
    /// are logged and skipped, and the EMPTY element is always present
    /// afterwards.
    pub fn from_data_text(text: &str) -> ElementRegistry {
        let mut elements: HashMap<ElementId, Element> = HashMap::new();
        let mut state = BlockState::Outside;

        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') {
                Self::flush(&mut state, &mut elements);
                state = Self::begin_block(line, lineno, &elements);
                continue;
            }

            match &mut state {
                BlockState::Active(block) => match line.split_once(':') {
                    Some((key, value)) => block.apply(key.trim(), value.trim(), lineno),
                    None => log::warn!("elements.data:{}: not a 'key: value' line", lineno),
                },
                BlockState::Discarded => {}
                BlockState::Outside => {
                    log::warn!("elements.data:{}: line outside any [id] block", lineno)
                }
            }
        }
        Self::flush(&mut state, &mut elements);

        // The reserved air element wins over anything the file defined.
        elements.insert(EMPTY, Element::empty());

        ElementRegistry { elements }
    }

    /// Load and parse a file; I/O failure is the only fatal path.
    pub fn from_file(path: &Path) -> Result<ElementRegistry, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Ok(Self::from_data_text(&text))
    }

    fn begin_block(line: &str, lineno: usize, elements: &HashMap<ElementId, Element>) -> BlockState {
        let id = line
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|inner| inner.trim().parse::<i64>().ok());

        let id = match id {
            Some(id) if id >= FIRST_USER_ID as i64 && id <= ElementId::MAX as i64 => {
                id as ElementId
            }
            _ => {
                log::warn!(
                    "elements.data:{}: discarding block with invalid id '{}'",
                    lineno,
                    line
                );
                return BlockState::Discarded;
            }
        };

        if elements.contains_key(&id) {
            log::warn!("elements.data:{}: discarding duplicate element {}", lineno, id);
            return BlockState::Discarded;
        }

        BlockState::Active(PendingBlock::new(id))
    }

    fn flush(state: &mut BlockState, elements: &mut HashMap<ElementId, Element>) {
        if let BlockState::Active(block) = std::mem::replace(state, BlockState::Outside) {
            if let Some(element) = block.finish() {
                elements.insert(element.id, element);
            }
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        let mut ids: Vec<ElementId> = self.elements.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| &self.elements[&id])
    }

    /// JSON manifest of the table for embedding UIs (palette construction).
    pub fn manifest_json(&self) -> String {
        let manifest = Manifest {
            format_version: 1,
            elements: self
                .iter()
                .map(|el| ManifestElement {
                    id: el.id,
                    name: &el.name,
                    category: el.category,
                    color: el.base_color.packed(),
                    hidden: el.id == EMPTY,
                })
                .collect(),
        };
        serde_json::to_string(&manifest).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    format_version: u32,
    elements: Vec<ManifestElement<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestElement<'a> {
    id: ElementId,
    name: &'a str,
    category: Category,
    color: u32,
    hidden: bool,
}
