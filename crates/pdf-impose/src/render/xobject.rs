//! Turning a source page into a reusable Form XObject, and reading its boxes.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Build a Form XObject in `output` that wraps `source`'s page `page_id`, deep-copying
/// its resources. Results are cached by `cache` so repeated placements of the same
/// source page (step-and-repeat) reuse a single object.
pub(crate) fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    if let Some(&existing) = cache.get(&page_id) {
        return Ok(existing);
    }

    let page_dict = source.get_dictionary(page_id)?;

    let media_box = match page_dict.get(b"MediaBox") {
        Ok(Object::Array(arr)) => copy_box_array(arr),
        _ => default_media_box(),
    };

    let content = get_page_content(source, page_dict)?;

    let resources = match page_dict.get(b"Resources") {
        Ok(obj) => copy_object_deep(output, source, obj, cache)?,
        Err(_) => Object::Dictionary(Dictionary::new()),
    };

    let mut form_dict = Dictionary::new();
    form_dict.set("Type", Object::Name(b"XObject".to_vec()));
    form_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    form_dict.set("FormType", Object::Integer(1));
    form_dict.set("BBox", Object::Array(media_box));
    form_dict.set("Resources", resources);

    let stream = Stream::new(form_dict, content);
    let xobject_id = output.add_object(stream);
    cache.insert(page_id, xobject_id);
    Ok(xobject_id)
}

fn copy_box_array(arr: &[Object]) -> Vec<Object> {
    arr.iter()
        .map(|o| match o {
            Object::Integer(i) => Object::Real(*i as f32),
            other => other.clone(),
        })
        .collect()
}

pub(crate) fn default_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(DEFAULT_PAGE_DIMENSIONS.0),
        Object::Real(DEFAULT_PAGE_DIMENSIONS.1),
    ]
}

/// Read a page's content stream(s), decompressed, concatenated in order.
pub(crate) fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => get_single_content_stream(doc, *id),
        Ok(Object::Array(refs)) => get_concatenated_content_streams(doc, refs),
        _ => Ok(Vec::new()),
    }
}

fn get_single_content_stream(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    let stream = doc.get_object(id)?.as_stream()?;
    Ok(stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone()))
}

fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for r in refs {
        if let Object::Reference(id) = r {
            out.extend(get_single_content_stream(doc, *id)?);
            out.push(b'\n');
        }
    }
    Ok(out)
}

/// Recursively copy an object (and everything it references) from `source` into
/// `output`, caching already-copied references so shared resources aren't duplicated.
pub(crate) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            let referenced = source.get_object(*id)?.clone();
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, &referenced, cache)?;
            output.objects.insert(new_id, copied);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let mut new_arr = Vec::with_capacity(arr.len());
            for value in arr {
                new_arr.push(copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Array(new_arr))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        other => Ok(other.clone()),
    }
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

fn extract_box(doc: &Document, page_dict: &Dictionary, key: &[u8]) -> Option<(f32, f32, f32, f32)> {
    let arr = match page_dict.get(key) {
        Ok(Object::Array(a)) => a.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(a)) => a.clone(),
            _ => return None,
        },
        _ => return None,
    };
    if arr.len() != 4 {
        return None;
    }
    let v: Vec<f32> = arr.iter().filter_map(extract_number).collect();
    if v.len() != 4 {
        return None;
    }
    let x0 = v[0].min(v[2]);
    let y0 = v[1].min(v[3]);
    let w = (v[2] - v[0]).abs();
    let h = (v[3] - v[1]).abs();
    Some((x0, y0, w, h))
}

/// Look up a box on a page, walking the `Parent` chain for inherited attributes
/// (MediaBox is commonly inherited from the Pages tree).
fn extract_inherited_box(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<(f32, f32, f32, f32)> {
    let mut current = page_id;
    loop {
        let dict = doc.get_dictionary(current).ok()?;
        if let Some(found) = extract_box(doc, dict, key) {
            return Some(found);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current = *parent_id,
            _ => return None,
        }
    }
}

/// Media box dimensions in points, resolving inheritance, falling back to US Letter.
pub(crate) fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    match extract_inherited_box(doc, page_id, b"MediaBox") {
        Some((_, _, w, h)) => Ok((w, h)),
        None => Ok(DEFAULT_PAGE_DIMENSIONS),
    }
}

/// The page's TrimBox in points, falling back to its MediaBox, resolving inheritance
/// for both. Returns `(x, y, width, height)`.
pub(crate) fn get_page_trim_or_media_pt(doc: &Document, page_id: ObjectId) -> (f32, f32, f32, f32) {
    if let Some(trim) = extract_inherited_box(doc, page_id, b"TrimBox") {
        return trim;
    }
    match extract_inherited_box(doc, page_id, b"MediaBox") {
        Some(media) => media,
        None => (0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1),
    }
}

/// Read every box relevant to the analyzer (MediaBox required, others optional),
/// in points, resolving inheritance.
pub(crate) fn read_page_boxes(
    doc: &Document,
    page_id: ObjectId,
) -> Option<(
    (f32, f32, f32, f32),
    Option<(f32, f32, f32, f32)>,
    Option<(f32, f32, f32, f32)>,
    Option<(f32, f32, f32, f32)>,
)> {
    let media = extract_inherited_box(doc, page_id, b"MediaBox")?;
    let trim = extract_inherited_box(doc, page_id, b"TrimBox");
    let bleed = extract_inherited_box(doc, page_id, b"BleedBox");
    let art = extract_inherited_box(doc, page_id, b"ArtBox");
    Some((media, trim, bleed, art))
}
