//! Animation channel sampling.
//!
//! Morph weights are the one animated quantity the importer evaluates. The
//! MORPH_WEIGHT source carries default weights, and `<channel>` elements may
//! retarget either a single element (`weights(2)`) or the whole array.
//! Sampling is piecewise linear, clamped at the first and last keyframe.

use crate::dom::{Animation, Document, Source};

/// Evaluate a float source at `time`, applying any animation channels that
/// target it. Channels may address the source by its own id or by the id of
/// its `<float_array>`. Malformed channels are skipped with a warning so one
/// broken track cannot take down the import.
pub fn sample_float_array(doc: &Document, source: &Source, time: f32) -> Vec<f32> {
    let mut values = source.floats().to_vec();

    let array_id = source.float_array.as_ref().and_then(|a| a.id.as_deref());
    let matches = |base: &str| base == source.id || Some(base) == array_id;

    for anim in doc.all_animations() {
        for channel in &anim.channel {
            let (base, member) = split_target(&channel.target);
            if !matches(base) {
                continue;
            }
            apply_channel(doc, anim, &channel.target, &channel.source, member, time, &mut values);
        }
    }

    values
}

fn apply_channel(
    doc: &Document,
    owner: &Animation,
    target: &str,
    sampler_uri: &str,
    member: Option<usize>,
    time: f32,
    values: &mut [f32],
) {
    let sampler_id = crate::dom::fragment(sampler_uri);
    let Some(sampler) = owner
        .sampler
        .iter()
        .find(|s| s.id.as_deref() == Some(sampler_id))
        .or_else(|| {
            doc.all_animations()
                .into_iter()
                .flat_map(|a| &a.sampler)
                .find(|s| s.id.as_deref() == Some(sampler_id))
        })
    else {
        tracing::warn!("Animation channel '{}' references missing sampler", target);
        return;
    };

    let times = sampler
        .input_source("INPUT")
        .and_then(|uri| find_animation_source(doc, owner, uri));
    let outputs = sampler
        .input_source("OUTPUT")
        .and_then(|uri| find_animation_source(doc, owner, uri));
    let (Some(times), Some(outputs)) = (times, outputs) else {
        tracing::warn!("Animation channel '{}' has incomplete sampler inputs", target);
        return;
    };

    let times = times.floats();
    let outputs = outputs.floats();
    if times.is_empty() {
        tracing::warn!("Animation channel '{}' has no keyframes", target);
        return;
    }

    match member {
        Some(index) => {
            // One output value per keyframe driving a single element.
            if outputs.len() < times.len() {
                tracing::warn!("Animation channel '{}' output is shorter than its input", target);
                return;
            }
            let Some(slot) = values.get_mut(index) else {
                tracing::warn!("Animation channel '{}' targets element {} of a {}-element array", target, index, values.len());
                return;
            };
            let (k0, k1, t) = keyframe_span(times, time);
            *slot = lerp(outputs[k0], outputs[k1], t);
        }
        None => {
            // Whole-array targeting: each keyframe stores the full array.
            let width = values.len();
            if width == 0 || outputs.len() < times.len() * width {
                tracing::warn!("Animation channel '{}' output does not cover the target array", target);
                return;
            }
            let (k0, k1, t) = keyframe_span(times, time);
            for (j, slot) in values.iter_mut().enumerate() {
                *slot = lerp(outputs[k0 * width + j], outputs[k1 * width + j], t);
            }
        }
    }
}

/// Split a channel target into its base id and optional `(index)` member.
fn split_target(target: &str) -> (&str, Option<usize>) {
    match target.find('(') {
        Some(open) => {
            let member = target[open + 1..].trim_end_matches(')').parse().ok();
            (&target[..open], member)
        }
        None => (target, None),
    }
}

/// Locate the keyframe pair bracketing `time` and the blend factor between
/// them. Times outside the track clamp to the nearest endpoint.
fn keyframe_span(times: &[f32], time: f32) -> (usize, usize, f32) {
    let last = times.len() - 1;
    if time <= times[0] {
        return (0, 0, 0.0);
    }
    if time >= times[last] {
        return (last, last, 0.0);
    }
    let mut k = 0;
    while k + 1 < last && times[k + 1] <= time {
        k += 1;
    }
    let span = times[k + 1] - times[k];
    let t = if span > 0.0 { (time - times[k]) / span } else { 0.0 };
    (k, k + 1, t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Resolve an animation-scoped source id, preferring the channel's own
/// `<animation>` before falling back to a document-wide search.
fn find_animation_source<'a>(
    doc: &'a Document,
    owner: &'a Animation,
    uri: &str,
) -> Option<&'a Source> {
    let id = crate::dom::fragment(uri);
    owner.sources.iter().find(|s| s.id == id).or_else(|| {
        doc.all_animations()
            .into_iter()
            .flat_map(|a| &a.sources)
            .find(|s| s.id == id)
    })
}
