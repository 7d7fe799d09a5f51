//! Geometry-only documents: deduplication, texcoord sets, polylists, and
//! 64K index block overflow.

use std::fmt::Write;

use super::{collada, float_source};

/// Quad built from two triangles sharing an edge, with per-vertex normals
/// and texcoords riding the position index.
pub fn quad_dae() -> String {
    let pos = float_source(
        "quad-pos",
        &[
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        3,
        &["X", "Y", "Z"],
    );
    let nrm = float_source(
        "quad-nrm",
        &[
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ],
        3,
        &["X", "Y", "Z"],
    );
    let uv = float_source(
        "quad-uv",
        &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        2,
        &["S", "T"],
    );
    collada(&format!(
        r##"<library_geometries>
    <geometry id="quad" name="Quad">
      <mesh>
        {pos}
        {nrm}
        {uv}
        <vertices id="quad-verts"><input semantic="POSITION" source="#quad-pos"/></vertices>
        <triangles count="2">
          <input semantic="VERTEX" source="#quad-verts" offset="0"/>
          <input semantic="NORMAL" source="#quad-nrm" offset="0"/>
          <input semantic="TEXCOORD" source="#quad-uv" offset="0"/>
          <p>0 1 2 0 2 3</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##
    ))
}

/// Triangle with three texcoord streams on sets 3, 1 and 2. Each stream
/// carries a constant value so the selected sets are recognizable in the
/// output.
pub fn multi_uv_dae() -> String {
    let pos = float_source(
        "tri-pos",
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        3,
        &["X", "Y", "Z"],
    );
    let uv_a = float_source("tri-uv-a", &[0.1, 0.2, 0.1, 0.2, 0.1, 0.2], 2, &["S", "T"]);
    let uv_b = float_source("tri-uv-b", &[0.3, 0.4, 0.3, 0.4, 0.3, 0.4], 2, &["S", "T"]);
    let uv_c = float_source("tri-uv-c", &[0.9, 0.9, 0.9, 0.9, 0.9, 0.9], 2, &["S", "T"]);
    collada(&format!(
        r##"<library_geometries>
    <geometry id="tri" name="SetTri">
      <mesh>
        {pos}
        {uv_a}
        {uv_b}
        {uv_c}
        <vertices id="tri-verts"><input semantic="POSITION" source="#tri-pos"/></vertices>
        <triangles count="1">
          <input semantic="VERTEX" source="#tri-verts" offset="0"/>
          <input semantic="TEXCOORD" source="#tri-uv-c" offset="0" set="3"/>
          <input semantic="TEXCOORD" source="#tri-uv-a" offset="0" set="1"/>
          <input semantic="TEXCOORD" source="#tri-uv-b" offset="0" set="2"/>
          <p>0 1 2</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##
    ))
}

/// One four-sided polylist face.
pub fn polylist_dae() -> String {
    let pos = float_source(
        "poly-pos",
        &[
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        3,
        &["X", "Y", "Z"],
    );
    collada(&format!(
        r##"<library_geometries>
    <geometry id="poly" name="PolyQuad">
      <mesh>
        {pos}
        <vertices id="poly-verts"><input semantic="POSITION" source="#poly-pos"/></vertices>
        <polylist count="1">
          <input semantic="VERTEX" source="#poly-verts" offset="0"/>
          <vcount>4</vcount>
          <p>0 1 2 3</p>
        </polylist>
      </mesh>
    </geometry>
  </library_geometries>"##
    ))
}

/// Two `<triangles>` elements over one position/texcoord pool, reusing
/// corners 0 and 2 in both elements.
pub fn two_element_uv_dae() -> String {
    let pos = float_source(
        "dual-pos",
        &[
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        3,
        &["X", "Y", "Z"],
    );
    let uv = float_source(
        "dual-uv",
        &[0.0, 0.0, 0.25, 0.25, 0.5, 0.5, 0.75, 0.75],
        2,
        &["S", "T"],
    );
    collada(&format!(
        r##"<library_geometries>
    <geometry id="dual" name="DualTri">
      <mesh>
        {pos}
        {uv}
        <vertices id="dual-verts"><input semantic="POSITION" source="#dual-pos"/></vertices>
        <triangles count="1">
          <input semantic="VERTEX" source="#dual-verts" offset="0"/>
          <input semantic="TEXCOORD" source="#dual-uv" offset="0"/>
          <p>0 1 2</p>
        </triangles>
        <triangles count="1">
          <input semantic="VERTEX" source="#dual-verts" offset="0"/>
          <input semantic="TEXCOORD" source="#dual-uv" offset="0"/>
          <p>0 2 3</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##
    ))
}

/// Two sources sharing an id; the position input must resolve to the first
/// one declared.
pub fn duplicate_id_dae() -> String {
    let real = float_source(
        "dup-pos",
        &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        3,
        &["X", "Y", "Z"],
    );
    let decoy = float_source("dup-pos", &[9.0, 9.0, 9.0], 3, &["X", "Y", "Z"]);
    collada(&format!(
        r##"<library_geometries>
    <geometry id="dup" name="DupTri">
      <mesh>
        {real}
        {decoy}
        <vertices id="dup-verts"><input semantic="POSITION" source="#dup-pos"/></vertices>
        <triangles count="1">
          <input semantic="VERTEX" source="#dup-verts" offset="0"/>
          <p>0 1 2</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##
    ))
}

/// Triangle strip-like soup with `unique` distinct position indices, every
/// corner referencing a different position so nothing deduplicates. The
/// index list pads to a multiple of three by repeating the last corner.
pub fn giant_dae(unique: usize) -> String {
    let mut coords = String::with_capacity(unique * 10);
    for i in 0..unique {
        let _ = write!(coords, "{} 0 0 ", i);
    }
    let padded = unique.div_ceil(3) * 3;
    let mut p = String::with_capacity(padded * 7);
    for i in 0..unique {
        let _ = write!(p, "{} ", i);
    }
    for _ in unique..padded {
        let _ = write!(p, "{} ", unique - 1);
    }
    collada(&format!(
        r##"<library_geometries>
    <geometry id="giant" name="Giant">
      <mesh>
        <source id="giant-pos">
          <float_array id="giant-pos-array" count="{}">{coords}</float_array>
          <technique_common>
            <accessor source="#giant-pos-array" count="{unique}" stride="3">
              <param name="X" type="float"/>
              <param name="Y" type="float"/>
              <param name="Z" type="float"/>
            </accessor>
          </technique_common>
        </source>
        <vertices id="giant-verts"><input semantic="POSITION" source="#giant-pos"/></vertices>
        <triangles count="{}">
          <input semantic="VERTEX" source="#giant-verts" offset="0"/>
          <p>{p}</p>
        </triangles>
      </mesh>
    </geometry>
  </library_geometries>"##,
        unique * 3,
        padded / 3
    ))
}
