//! Low-level PDF object plumbing: Form XObjects, box extraction, object copying.

mod overlay;
mod xobject;

pub(crate) use overlay::render_marks_overlay_stream;
pub(crate) use xobject::{
    copy_object_deep, create_page_xobject, get_page_content, get_page_dimensions,
    get_page_trim_or_media_pt, read_page_boxes,
};
