//! draw.io document reader
//!
//! Flattens a draw.io file into pages of [`Shape`]s. Two layouts are accepted:
//!
//! - `<mxfile>` with one or more `<diagram>` pages. A page either holds an
//!   `<mxGraphModel>` directly or a compressed payload (base64, raw deflate,
//!   URI encoding) that decodes to one.
//! - a bare `<mxGraphModel>`, treated as a single page.
//!
//! Cells wrapped in `<object>` / `<UserObject>` take their id and label from
//! the wrapper. Only the attributes the class parser looks at are kept.

use std::collections::BTreeMap;
use std::io::Read;
use std::str;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::DeflateDecoder;
use percent_encoding::percent_decode_str;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, trace};

use crate::core::DiagramError;

type DocResult<T> = Result<T, DiagramError>;

/// Upper bound on the inflated size of one compressed page
pub const MAX_INFLATED_PAGE: u64 = 64 * 1024 * 1024;

/// One `<mxCell>` of a page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub id: String,
    /// Label text, still carrying any HTML markup
    pub value: String,
    pub style: String,
    pub vertex: bool,
    pub edge: bool,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    /// `x` of the cell's own geometry; relative position for edge labels
    pub geometry_x: Option<f64>,
}

/// One `<diagram>` of the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub name: Option<String>,
    pub shapes: Vec<Shape>,
}

/// A parsed draw.io file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn shape_count(&self) -> usize {
        self.pages.iter().map(|p| p.shapes.len()).sum()
    }
}

/// Read a draw.io document from XML text
pub fn read_document(xml: &str) -> DocResult<Document> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut state = ReadState::default();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| DiagramError::xml_error(e.to_string(), reader.buffer_position() as u64))?;
        let position = reader.buffer_position() as u64;

        match event {
            Event::Start(e) => state.open(&e, true, position)?,
            Event::Empty(e) => state.open(&e, false, position)?,
            Event::Text(t) => {
                let text = t
                    .decode()
                    .map_err(|e| DiagramError::xml_error(e.to_string(), position))?;
                state.text(&text);
            }
            Event::CData(c) => {
                let text = c
                    .decode()
                    .map_err(|e| DiagramError::xml_error(e.to_string(), position))?;
                state.text(&text);
            }
            Event::End(e) => {
                let name = element_name(e.name().as_ref(), position)?;
                state.close(&name)?;
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    state.finish()
}

/// Decode the text body of a compressed `<diagram>`
pub fn decode_payload(payload: &str) -> DocResult<String> {
    decode_payload_with_limit(payload, MAX_INFLATED_PAGE)
}

fn decode_payload_with_limit(payload: &str, limit: u64) -> DocResult<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let deflated = STANDARD
        .decode(compact)
        .map_err(|e| DiagramError::payload_error(format!("invalid base64: {}", e)))?;

    let mut decoder = DeflateDecoder::new(&deflated[..]).take(limit + 1);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| DiagramError::payload_error(format!("invalid deflate stream: {}", e)))?;
    if inflated.len() as u64 > limit {
        return Err(DiagramError::payload_error(format!(
            "page inflates past {} bytes",
            limit
        )));
    }

    let inflated = str::from_utf8(&inflated)
        .map_err(|e| DiagramError::payload_error(format!("inflated page is not UTF-8: {}", e)))?;
    let decoded = percent_decode_str(inflated)
        .decode_utf8()
        .map_err(|e| DiagramError::payload_error(format!("invalid URI encoding: {}", e)))?;
    Ok(decoded.into_owned())
}

/// Where the reader currently is in the document tree
#[derive(Default)]
struct ReadState {
    saw_mxfile: bool,
    saw_root: bool,
    pages: Vec<Page>,
    /// Page being filled; for a bare graph model this is the only page
    page: Option<PageState>,
    /// id/label of an enclosing `<object>` / `<UserObject>`
    wrapper: Option<(Option<String>, Option<String>)>,
    /// Index into the current page of the open `<mxCell>`
    cell: Option<usize>,
}

#[derive(Default)]
struct PageState {
    page: Page,
    has_model: bool,
    payload: String,
}

impl ReadState {
    fn open(&mut self, e: &BytesStart<'_>, has_children: bool, position: u64) -> DocResult<()> {
        let name = element_name(e.name().as_ref(), position)?;
        match name.as_str() {
            "mxfile" => {
                self.saw_mxfile = true;
                self.saw_root = true;
            }
            "diagram" => {
                if !self.saw_mxfile {
                    return Err(DiagramError::structure_error(
                        "<diagram> outside <mxfile>".to_string(),
                    ));
                }
                let attrs = attributes(e, position)?;
                let state = PageState {
                    page: Page {
                        name: attrs.get("name").cloned(),
                        shapes: Vec::new(),
                    },
                    ..PageState::default()
                };
                if has_children {
                    self.page = Some(state);
                } else {
                    self.pages.push(state.page);
                }
            }
            "mxGraphModel" => {
                self.saw_root = true;
                match self.page.as_mut() {
                    Some(page) => page.has_model = true,
                    None if !self.saw_mxfile && has_children => {
                        self.page = Some(PageState {
                            has_model: true,
                            ..PageState::default()
                        })
                    }
                    None if !self.saw_mxfile => self.pages.push(Page::default()),
                    None => {
                        return Err(DiagramError::structure_error(
                            "<mxGraphModel> outside <diagram>".to_string(),
                        ))
                    }
                }
            }
            "object" | "UserObject" | "userObject" if has_children => {
                let attrs = attributes(e, position)?;
                let label = attrs.get("label").or_else(|| attrs.get("value")).cloned();
                self.wrapper = Some((attrs.get("id").cloned(), label));
            }
            "mxCell" => {
                let page = self.page.as_mut().ok_or_else(|| {
                    DiagramError::structure_error("<mxCell> outside <mxGraphModel>".to_string())
                })?;
                let attrs = attributes(e, position)?;
                let shape = shape_from_attributes(attrs, self.wrapper.as_ref());
                trace!(id = %shape.id, vertex = shape.vertex, edge = shape.edge, "Read cell");
                page.page.shapes.push(shape);
                self.cell = has_children.then(|| page.page.shapes.len() - 1);
            }
            "mxGeometry" => {
                let attrs = attributes(e, position)?;
                let own_geometry = attrs.get("as").map_or(true, |a| a == "geometry");
                if let (Some(index), Some(page), true) = (self.cell, self.page.as_mut(), own_geometry) {
                    page.page.shapes[index].geometry_x =
                        attrs.get("x").and_then(|x| x.trim().parse::<f64>().ok());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        if let Some(page) = self.page.as_mut() {
            if !page.has_model {
                page.payload.push_str(text);
            }
        }
    }

    fn close(&mut self, name: &str) -> DocResult<()> {
        match name {
            "mxCell" => self.cell = None,
            "object" | "UserObject" | "userObject" => self.wrapper = None,
            "diagram" => {
                if let Some(state) = self.page.take() {
                    self.pages.push(finish_page(state)?);
                }
            }
            "mxGraphModel" if !self.saw_mxfile => {
                if let Some(state) = self.page.take() {
                    self.pages.push(state.page);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> DocResult<Document> {
        if !self.saw_root {
            return Err(DiagramError::structure_error(
                "no <mxfile> or <mxGraphModel> root element found".to_string(),
            ));
        }
        debug!(pages = self.pages.len(), "Read draw.io document");
        Ok(Document { pages: self.pages })
    }
}

fn finish_page(state: PageState) -> DocResult<Page> {
    let PageState {
        mut page,
        has_model,
        payload,
    } = state;

    if !has_model && !payload.is_empty() {
        let decoded = decode_payload(&payload)?;
        debug!(
            page = page.name.as_deref().unwrap_or(""),
            compressed = payload.len(),
            decoded = decoded.len(),
            "Decoded compressed page"
        );
        let inner = read_document(&decoded)?;
        page.shapes = inner.pages.into_iter().flat_map(|p| p.shapes).collect();
    }
    Ok(page)
}

fn shape_from_attributes(
    mut attrs: BTreeMap<String, String>,
    wrapper: Option<&(Option<String>, Option<String>)>,
) -> Shape {
    let (wrapper_id, wrapper_label) = match wrapper {
        Some((id, label)) => (id.clone(), label.clone()),
        None => (None, None),
    };

    Shape {
        id: attrs.remove("id").or(wrapper_id).unwrap_or_default(),
        value: attrs.remove("value").or(wrapper_label).unwrap_or_default(),
        style: attrs.remove("style").unwrap_or_default(),
        vertex: is_set(attrs.get("vertex")),
        edge: is_set(attrs.get("edge")),
        parent: attrs.remove("parent"),
        source: attrs.remove("source"),
        target: attrs.remove("target"),
        geometry_x: None,
    }
}

fn is_set(value: Option<&String>) -> bool {
    matches!(value.map(String::as_str), Some("1") | Some("true"))
}

fn attributes(e: &BytesStart<'_>, position: u64) -> DocResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DiagramError::xml_error(err.to_string(), position))?;
        let key = element_name(attr.key.as_ref(), position)?;
        let value = attr
            .unescape_value()
            .map_err(|err| DiagramError::xml_error(err.to_string(), position))?;
        out.insert(key, value.into_owned());
    }
    Ok(out)
}

fn element_name(raw: &[u8], position: u64) -> DocResult<String> {
    str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| DiagramError::xml_error(e.to_string(), position))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"<mxGraphModel><root>
        <mxCell id="0"/>
        <mxCell id="1" parent="0"/>
        <mxCell id="2" value="Person" style="swimlane;" vertex="1" parent="1">
          <mxGeometry x="40" y="40" width="160" height="90" as="geometry"/>
        </mxCell>
    </root></mxGraphModel>"#;

    #[test]
    fn test_bare_graph_model_is_one_page() {
        let doc = read_document(BARE).unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.shape_count(), 3);

        let person = &doc.pages[0].shapes[2];
        assert_eq!(person.id, "2");
        assert_eq!(person.value, "Person");
        assert!(person.vertex);
        assert!(!person.edge);
        assert_eq!(person.parent.as_deref(), Some("1"));
        assert_eq!(person.geometry_x, Some(40.0));
    }

    #[test]
    fn test_mxfile_pages_keep_order_and_names() {
        let xml = r#"<mxfile host="app.diagrams.net">
            <diagram id="a" name="Domain"><mxGraphModel><root><mxCell id="0"/></root></mxGraphModel></diagram>
            <diagram id="b" name="Services"><mxGraphModel><root><mxCell id="0"/><mxCell id="1" parent="0"/></root></mxGraphModel></diagram>
        </mxfile>"#;
        let doc = read_document(xml).unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].name.as_deref(), Some("Domain"));
        assert_eq!(doc.pages[1].shapes.len(), 2);
    }

    #[test]
    fn test_attribute_entities_are_unescaped() {
        let xml = r#"<mxGraphModel><root>
            <mxCell id="2" value="&lt;&lt;interface&gt;&gt;&#xa;Shape" vertex="1" parent="1"/>
        </root></mxGraphModel>"#;
        let doc = read_document(xml).unwrap();
        assert_eq!(doc.pages[0].shapes[0].value, "<<interface>>\nShape");
    }

    #[test]
    fn test_user_object_supplies_id_and_label() {
        let xml = r#"<mxGraphModel><root>
            <UserObject label="Invoice" id="inv">
              <mxCell style="swimlane;" vertex="1" parent="1"/>
            </UserObject>
            <object label="Customer" id="cus"><mxCell style="swimlane;" vertex="1" parent="1"/></object>
        </root></mxGraphModel>"#;
        let doc = read_document(xml).unwrap();
        let shapes = &doc.pages[0].shapes;
        assert_eq!(shapes[0].id, "inv");
        assert_eq!(shapes[0].value, "Invoice");
        assert_eq!(shapes[1].id, "cus");
        assert_eq!(shapes[1].value, "Customer");
    }

    #[test]
    fn test_nested_points_do_not_override_geometry() {
        let xml = r#"<mxGraphModel><root>
            <mxCell id="e" edge="1" parent="1" source="a" target="b">
              <mxGeometry relative="1" as="geometry">
                <mxPoint x="300" y="10" as="sourcePoint"/>
              </mxGeometry>
            </mxCell>
            <mxCell id="l" value="0..*" style="edgeLabel;" vertex="1" connectable="0" parent="e">
              <mxGeometry x="-0.8" relative="1" as="geometry"/>
            </mxCell>
        </root></mxGraphModel>"#;
        let doc = read_document(xml).unwrap();
        let shapes = &doc.pages[0].shapes;
        assert_eq!(shapes[0].geometry_x, None);
        assert_eq!(shapes[0].source.as_deref(), Some("a"));
        assert_eq!(shapes[1].geometry_x, Some(-0.8));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = read_document("<svg><g/></svg>").unwrap_err();
        assert!(matches!(err, DiagramError::StructureError { .. }));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = read_document("<mxGraphModel><root></mxGraphModel>").unwrap_err();
        assert!(matches!(err, DiagramError::XmlError { .. }));
    }

    #[test]
    fn test_bad_payload_is_an_error() {
        let err = read_document(r#"<mxfile><diagram name="p">not base64!</diagram></mxfile>"#)
            .unwrap_err();
        assert!(matches!(err, DiagramError::PayloadError { .. }));
    }

    fn compress(text: &str) -> String {
        use flate2::write::DeflateEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn test_payload_inflation_is_bounded() {
        let page = "a".repeat(4096);
        let payload = compress(&page);

        assert_eq!(decode_payload_with_limit(&payload, 4096).unwrap(), page);
        let err = decode_payload_with_limit(&payload, 4095).unwrap_err();
        assert!(matches!(err, DiagramError::PayloadError { .. }));
        assert!(err.to_string().contains("inflates past 4095 bytes"));
    }
}
