//! HTML rendering of directory listings.
use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::ClassifiedEntry;
use crate::DirectoryView;

const STYLE: &str = "body{font-family:monospace;margin:2em}\
table{border-collapse:collapse}\
td,th{padding:0.2em 1em;text-align:left;vertical-align:top}\
pre{margin:0}\
.kind{color:#666}";

fn kind_label(entry: &ClassifiedEntry) -> String {
    if let Some(object_type) = entry.object_type() {
        format!("object ^{object_type}")
    } else if entry.is_dir() {
        "dir".to_owned()
    } else if entry.is_list() {
        "list".to_owned()
    } else if entry.is_map() {
        "map".to_owned()
    } else if entry.is_json() {
        "json".to_owned()
    } else if entry.is_parameters() {
        "symvar params".to_owned()
    } else if entry.is_symvar() {
        "symvar".to_owned()
    } else if entry.is_type() {
        "type".to_owned()
    } else if entry.is_declaration() {
        "declaration".to_owned()
    } else {
        "file".to_owned()
    }
}

/// Link target of an entry. Directories get a trailing `/`.
fn entry_href(entry: &ClassifiedEntry) -> String {
    if entry.is_dir() {
        format!("{}/", entry.href)
    } else {
        entry.href.clone()
    }
}

fn render_value(entry: &ClassifiedEntry) -> Markup {
    html! {
        @if entry.is_list() || entry.is_map() {
            pre { (entry.value) }
        } @else {
            (entry.value)
        }
    }
}

fn render_row(entry: &ClassifiedEntry) -> Markup {
    html! {
        tr {
            td { (entry.mode) }
            td { (entry.mtime) }
            td { (entry.size) }
            td { a href=(entry_href(entry)) { (entry.name) } }
            td.kind { (kind_label(entry)) }
            td { (render_value(entry)) }
        }
    }
}

/// Renders `view` as a complete HTML page.
pub fn render_directory(view: &DirectoryView) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (view.info.name) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { (view.info.name) }
                @if let Some(href) = &view.info.parent_href {
                    p { a href=(href) { ".. (" (view.info.parent) ")" } }
                }
                table {
                    tr {
                        th { "mode" }
                        th { "modified" }
                        th { "size" }
                        th { "name" }
                        th { "kind" }
                        th { "value" }
                    }
                    @for entry in &view.items {
                        (render_row(entry))
                    }
                }
            }
        }
    }
}
