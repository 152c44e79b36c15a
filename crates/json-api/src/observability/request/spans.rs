//! Route templates for span names and metric labels.

use uuid::Uuid;

/// `path` with every UUID segment replaced by `{uuid}`, keeping label cardinality bounded.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::parse_str(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}
