//! Input classification: mapping `<input>` declarations onto fixed attribute
//! slots.
//!
//! A primitive's inputs arrive in arbitrary order, with arbitrary index
//! offsets, optional set numbers, and possibly funneled through a
//! `<vertices>` indirection. Classification flattens all of that into a
//! fixed slot table so the rest of the importer can read attributes by
//! position.

use crate::dom::{fragment, resolve_input_source, InputRef, Mesh, ResolvedInput, Source, Vertices};
use crate::mesh::source::{
    SourceReader, PARAMS_COLOR, PARAMS_INV_BIND, PARAMS_JOINT, PARAMS_NORMAL, PARAMS_POSITION,
    PARAMS_UV, PARAMS_WEIGHT,
};

pub const SLOT_POSITION: usize = 0;
pub const SLOT_NORMAL: usize = 1;
pub const SLOT_COLOR: usize = 2;
pub const SLOT_UV: usize = 3;
pub const SLOT_UV2: usize = 4;
pub const SLOT_JOINT: usize = 5;
pub const SLOT_WEIGHT: usize = 6;
pub const SLOT_INV_BIND: usize = 7;
pub const NUM_SLOTS: usize = 8;

/// Semantic looked up inside a `<vertices>` element when a slot's source URI
/// names the indirection instead of a real source.
const SLOT_SEMANTICS: [&str; NUM_SLOTS] = [
    "POSITION",
    "NORMAL",
    "COLOR",
    "TEXCOORD",
    "TEXCOORD",
    "JOINT",
    "WEIGHT",
    "INV_BIND_MATRIX",
];

/// One classified input: where its data lives and which interleaved index
/// position addresses it.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedInput<'a> {
    pub source_uri: &'a str,
    pub offset: u32,
    set: u32,
}

/// The slot table for one primitive element or skin input list.
#[derive(Debug, Clone)]
pub struct ClassifiedStreams<'a> {
    pub slots: [Option<ClassifiedInput<'a>>; NUM_SLOTS],
    /// Highest offset over every input, recognized or not. The interleaved
    /// index stride is `max_offset + 1`.
    pub max_offset: u32,
}

impl<'a> ClassifiedStreams<'a> {
    pub fn stride(&self) -> usize {
        self.max_offset as usize + 1
    }

    pub fn offset(&self, slot: usize) -> Option<u32> {
        self.slots[slot].map(|e| e.offset)
    }
}

fn primary_slot(semantic: &str) -> Option<usize> {
    match semantic {
        "POSITION" => Some(SLOT_POSITION),
        "NORMAL" => Some(SLOT_NORMAL),
        "COLOR" => Some(SLOT_COLOR),
        "TEXCOORD" => Some(SLOT_UV),
        "JOINT" => Some(SLOT_JOINT),
        "WEIGHT" => Some(SLOT_WEIGHT),
        "INV_BIND_MATRIX" => Some(SLOT_INV_BIND),
        _ => None,
    }
}

/// Slots a semantic may occupy. Only TEXCOORD spans more than one.
fn slot_span(slot: usize) -> &'static [usize] {
    const SPANS: [&[usize]; NUM_SLOTS] = [
        &[SLOT_POSITION],
        &[SLOT_NORMAL],
        &[SLOT_COLOR],
        &[SLOT_UV, SLOT_UV2],
        &[SLOT_UV2],
        &[SLOT_JOINT],
        &[SLOT_WEIGHT],
        &[SLOT_INV_BIND],
    ];
    SPANS[slot]
}

fn slot_params(slot: usize) -> &'static [&'static [&'static str]] {
    match slot {
        SLOT_POSITION => PARAMS_POSITION,
        SLOT_NORMAL => PARAMS_NORMAL,
        SLOT_COLOR => PARAMS_COLOR,
        SLOT_UV | SLOT_UV2 => PARAMS_UV,
        SLOT_JOINT => PARAMS_JOINT,
        SLOT_WEIGHT => PARAMS_WEIGHT,
        _ => PARAMS_INV_BIND,
    }
}

/// Place `entry` within the span, keeping occupants ordered by ascending set
/// number. Equal sets keep document order; entries pushed past the span end
/// are dropped.
fn select_input<'a>(
    slots: &mut [Option<ClassifiedInput<'a>>; NUM_SLOTS],
    span: &[usize],
    entry: ClassifiedInput<'a>,
) {
    for (i, &slot) in span.iter().enumerate() {
        match slots[slot] {
            None => {
                slots[slot] = Some(entry);
                return;
            }
            Some(existing) if entry.set < existing.set => {
                for j in (i + 1..span.len()).rev() {
                    slots[span[j]] = slots[span[j - 1]];
                }
                slots[slot] = Some(entry);
                return;
            }
            _ => {}
        }
    }
}

/// Classify a list of inputs into the slot table.
///
/// A `VERTEX` input is expanded through the mesh's `<vertices>` element:
/// each inner input claims its semantic's primary slot outright, carrying
/// the outer input's index offset. Everything else competes through set
/// ordering.
pub fn classify_inputs<'a>(
    inputs: impl IntoIterator<Item = InputRef<'a>>,
    vertices: Option<&'a Vertices>,
) -> ClassifiedStreams<'a> {
    let mut slots = [None; NUM_SLOTS];
    let mut max_offset = 0;

    for input in inputs {
        max_offset = max_offset.max(input.offset());

        let semantic = input.semantic();
        if semantic == "VERTEX" {
            let id = fragment(input.source_uri());
            match vertices {
                Some(v) if v.id == id => {
                    for inner in &v.input {
                        if let Some(slot) = primary_slot(&inner.semantic) {
                            slots[slot] = Some(ClassifiedInput {
                                source_uri: &inner.source,
                                offset: input.offset(),
                                set: 0,
                            });
                        }
                    }
                }
                _ => {
                    tracing::warn!("VERTEX input references unknown vertices element '{}'", id);
                }
            }
            continue;
        }

        if let Some(slot) = primary_slot(semantic) {
            let entry = ClassifiedInput {
                source_uri: input.source_uri(),
                offset: input.offset(),
                set: input.set().unwrap_or(0),
            };
            select_input(&mut slots, slot_span(slot), entry);
        }
    }

    ClassifiedStreams { slots, max_offset }
}

/// Build a typed reader for one classified slot, following the `<vertices>`
/// indirection when the slot's source URI names it.
pub fn reader_for_slot<'a>(
    streams: &ClassifiedStreams<'a>,
    slot: usize,
    sources: &'a [Source],
    vertices: Option<&'a Vertices>,
) -> Option<SourceReader<'a>> {
    let entry = streams.slots[slot]?;
    let chains = slot_params(slot);
    match resolve_input_source(entry.source_uri, sources, vertices)? {
        ResolvedInput::Source(source) => SourceReader::new(source, chains),
        ResolvedInput::Vertices(v) => {
            let inner = v.input.iter().find(|i| i.semantic == SLOT_SEMANTICS[slot])?;
            match resolve_input_source(&inner.source, sources, None)? {
                ResolvedInput::Source(source) => SourceReader::new(source, chains),
                ResolvedInput::Vertices(_) => None,
            }
        }
    }
}

/// Typed readers for the five geometry attribute slots of one primitive
/// element. Missing or unresolvable slots stay `None` and read as defaults
/// downstream.
pub struct MeshStreams<'a> {
    pub positions: Option<SourceReader<'a>>,
    pub normals: Option<SourceReader<'a>>,
    pub colors: Option<SourceReader<'a>>,
    pub uvs: Option<SourceReader<'a>>,
    pub uv2s: Option<SourceReader<'a>>,
}

impl<'a> MeshStreams<'a> {
    pub fn read_inputs(streams: &ClassifiedStreams<'a>, mesh: &'a Mesh) -> Self {
        let sources = &mesh.source;
        let vertices = mesh.vertices.as_ref();
        Self {
            positions: reader_for_slot(streams, SLOT_POSITION, sources, vertices),
            normals: reader_for_slot(streams, SLOT_NORMAL, sources, vertices),
            colors: reader_for_slot(streams, SLOT_COLOR, sources, vertices),
            uvs: reader_for_slot(streams, SLOT_UV, sources, vertices),
            uv2s: reader_for_slot(streams, SLOT_UV2, sources, vertices),
        }
    }
}
