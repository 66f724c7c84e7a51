//! PDF export of a composed badge.
//!
//! Each badge is a single page that draws three things in order. The
//! template image comes first, stretched to the page box. The text lines
//! follow. The QR image comes last, one pixel per module.
//!
//! Every face of the font stack that a badge uses is embedded whole as a
//! Type0 font with Identity-H encoding, so text strings are big-endian glyph
//! ids. A ToUnicode map keeps the names searchable and copyable.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use checkin_common::config::BadgeLayout;
use checkin_common::error::{CheckinError, CheckinResult};
use checkin_roster::Attendee;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::compositor::{compose_badge, BadgeComposition};
use crate::font::{BadgeFont, FontStack, Glyph};
use crate::qr::qr_module_image;

/// Resource names used in the page content stream.
pub const BACKGROUND_XOBJECT: &str = "Bg";
pub const QR_XOBJECT: &str = "Qr";

/// ToUnicode `bfchar` blocks may hold at most 100 entries.
const BFCHAR_CHUNK: usize = 100;

/// Page resource name of the face at `index` in the font stack.
pub fn font_resource(index: usize) -> String {
    format!("F{}", index + 1)
}

/// Flate-compressed raster ready to embed as an image XObject.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    pub data: Vec<u8>,
}

impl EncodedImage {
    pub fn rgb(image: &RgbImage) -> CheckinResult<Self> {
        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space: "DeviceRGB",
            data: deflate(image.as_raw())?,
        })
    }

    pub fn gray(image: &GrayImage) -> CheckinResult<Self> {
        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space: "DeviceGray",
            data: deflate(image.as_raw())?,
        })
    }

    fn to_stream(&self, interpolate: bool) -> Stream {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
            "Interpolate" => interpolate,
            "Filter" => "FlateDecode",
        };
        Stream::new(dict, self.data.clone())
    }
}

/// Renders badges for one category template.
///
/// The template and the font files are decoded and compressed once; every
/// badge reuses them.
pub struct BadgeRenderer {
    layout: BadgeLayout,
    background: EncodedImage,
    fonts: FontStack,
    font_files: Vec<Vec<u8>>,
}

impl BadgeRenderer {
    /// Load the background template. A missing or unreadable template is a
    /// startup failure.
    pub fn new(
        template_path: &Path,
        layout: BadgeLayout,
        fonts: FontStack,
    ) -> CheckinResult<Self> {
        layout.validate()?;
        if !template_path.exists() {
            return Err(CheckinError::file_not_found(template_path));
        }
        let template = image::open(template_path).map_err(|e| {
            CheckinError::render(format!(
                "Failed to read template {}: {e}",
                template_path.display()
            ))
        })?;
        let background = EncodedImage::rgb(&flatten_onto_white(&template))?;
        let font_files = fonts
            .fonts()
            .iter()
            .map(|f| deflate(f.data()))
            .collect::<CheckinResult<Vec<_>>>()?;

        tracing::info!(
            template = %template_path.display(),
            width = background.width,
            height = background.height,
            fonts = fonts.fonts().len(),
            "Badge template loaded"
        );

        Ok(Self {
            layout,
            background,
            fonts,
            font_files,
        })
    }

    /// Compose without writing, for previews and tests.
    pub fn compose(&self, attendee: &Attendee) -> BadgeComposition {
        compose_badge(attendee, &self.layout, &self.fonts)
    }

    /// Render one badge to `output`, replacing any existing file.
    pub fn render(&self, attendee: &Attendee, output: &Path) -> CheckinResult<PathBuf> {
        let composition = self.compose(attendee);
        for line in &composition.lines {
            let missing = self.fonts.missing_chars(&line.text);
            if !missing.is_empty() {
                tracing::warn!(
                    id = %attendee.id,
                    text = %line.text,
                    missing = %missing.iter().collect::<String>(),
                    "No badge font covers these characters; configure a fallback font"
                );
            }
        }
        let qr = EncodedImage::gray(&qr_module_image(&composition.qr.payload)?)?;
        let fonts = EmbeddedFonts {
            stack: &self.fonts,
            files: &self.font_files,
        };
        let mut doc = build_document(&composition, &self.background, &qr, &fonts)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        doc.save(output).map_err(|e| {
            CheckinError::render(format!("Failed to write {}: {e}", output.display()))
        })?;

        tracing::info!(
            id = %attendee.id,
            path = %output.display(),
            lines = composition.lines.len(),
            "Badge rendered"
        );
        Ok(output.to_path_buf())
    }
}

/// The font stack with each face's deflated file.
pub struct EmbeddedFonts<'a> {
    pub stack: &'a FontStack,
    pub files: &'a [Vec<u8>],
}

/// Assemble the single-page PDF.
pub fn build_document(
    composition: &BadgeComposition,
    background: &EncodedImage,
    qr: &EncodedImage,
    fonts: &EmbeddedFonts<'_>,
) -> CheckinResult<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut font_resources = lopdf::Dictionary::new();
    for (index, glyphs) in used_glyphs(composition) {
        let (Some(font), Some(file)) = (fonts.stack.get(index), fonts.files.get(index)) else {
            return Err(CheckinError::render(format!("No embedded font at index {index}")));
        };
        let font_id = embed_font(&mut doc, font, file, &glyphs)?;
        font_resources.set(font_resource(index), font_id);
    }
    let background_id = doc.add_object(background.to_stream(true));
    let qr_id = doc.add_object(qr.to_stream(false));

    let content = page_content(composition);
    let encoded = content
        .encode()
        .map_err(|e| CheckinError::render(format!("Failed to encode page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(composition.page_width),
            Object::Real(composition.page_height),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => font_resources,
            "XObject" => dictionary! {
                BACKGROUND_XOBJECT => background_id,
                QR_XOBJECT => qr_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

fn page_content(composition: &BadgeComposition) -> Content {
    let mut operations = Vec::new();

    // Background, stretched to the page box.
    operations.extend(draw_image(
        BACKGROUND_XOBJECT,
        0.0,
        0.0,
        composition.page_width,
        composition.page_height,
    ));

    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "rg",
        vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
    ));
    for line in &composition.lines {
        // Absolute text position for each line; runs advance from there.
        operations.push(Operation::new(
            "Tm",
            vec![
                Object::Integer(1),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(1),
                Object::Real(line.x),
                Object::Real(line.baseline),
            ],
        ));
        for run in &line.runs {
            operations.push(Operation::new(
                "Tf",
                vec![
                    Object::Name(font_resource(run.font).into_bytes()),
                    Object::Real(line.font_size),
                ],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    glyph_bytes(&run.glyphs),
                    StringFormat::Hexadecimal,
                )],
            ));
        }
    }
    operations.push(Operation::new("ET", vec![]));

    let qr = &composition.qr;
    operations.extend(draw_image(QR_XOBJECT, qr.x, qr.y, qr.size, qr.size));

    Content { operations }
}

/// Identity-H string: two big-endian bytes per glyph id.
pub fn glyph_bytes(glyphs: &[Glyph]) -> Vec<u8> {
    glyphs.iter().flat_map(|g| g.gid.to_be_bytes()).collect()
}

/// Glyphs drawn per font index. Ordered maps keep the output byte-stable.
fn used_glyphs(composition: &BadgeComposition) -> BTreeMap<usize, BTreeMap<u16, Glyph>> {
    let mut used: BTreeMap<usize, BTreeMap<u16, Glyph>> = BTreeMap::new();
    for run in composition.lines.iter().flat_map(|l| &l.runs) {
        let glyphs = used.entry(run.font).or_default();
        for glyph in &run.glyphs {
            glyphs.entry(glyph.gid).or_insert(*glyph);
        }
    }
    used
}

/// Add the Type0 font, its CIDFontType2 descendant, descriptor, font file and
/// ToUnicode map. Returns the Type0 font object.
fn embed_font(
    doc: &mut Document,
    font: &BadgeFont,
    file: &[u8],
    glyphs: &BTreeMap<u16, Glyph>,
) -> CheckinResult<lopdf::ObjectId> {
    let metrics = font.metrics();
    let units = |v: i16| font.to_pdf_units(i32::from(v));

    let file_id = doc.add_object(Stream::new(
        dictionary! {
            "Length1" => font.data().len() as i64,
            "Filter" => "FlateDecode",
        },
        file.to_vec(),
    ));

    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => Object::Name(font.name().as_bytes().to_vec()),
        // Nonsymbolic.
        "Flags" => 32,
        "FontBBox" => metrics.bbox.iter().map(|&v| Object::Integer(units(v))).collect::<Vec<_>>(),
        "ItalicAngle" => 0,
        "Ascent" => units(metrics.ascent),
        "Descent" => units(metrics.descent),
        "CapHeight" => units(metrics.cap_height),
        "StemV" => 80,
        "FontFile2" => file_id,
    });

    let mut widths = Vec::with_capacity(glyphs.len() * 2);
    for glyph in glyphs.values() {
        widths.push(Object::Integer(i64::from(glyph.gid)));
        widths.push(Object::Array(vec![Object::Integer(
            font.to_pdf_units(i32::from(glyph.advance)),
        )]));
    }
    let default_width = font.to_pdf_units(i32::from(font.notdef_advance()));

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => Object::Name(font.name().as_bytes().to_vec()),
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => default_width,
        "W" => widths,
        "CIDToGIDMap" => "Identity",
    });

    let to_unicode = deflate(to_unicode_cmap(glyphs.values()).as_bytes())?;
    let to_unicode_id = doc.add_object(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        to_unicode,
    ));

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => Object::Name(font.name().as_bytes().to_vec()),
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        "ToUnicode" => to_unicode_id,
    }))
}

/// CMap from two-byte glyph ids back to UTF-16BE text.
pub fn to_unicode_cmap<'a>(glyphs: impl IntoIterator<Item = &'a Glyph>) -> String {
    let mut entries: BTreeSet<(u16, String)> = BTreeSet::new();
    for glyph in glyphs {
        if glyph.gid == 0 {
            continue;
        }
        let mut units = [0u16; 2];
        let utf16: String = glyph
            .ch
            .encode_utf16(&mut units)
            .iter()
            .map(|u| format!("{u:04X}"))
            .collect();
        entries.insert((glyph.gid, utf16));
    }

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );
    let entries: Vec<_> = entries.into_iter().collect();
    for chunk in entries.chunks(BFCHAR_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, utf16) in chunk {
            cmap.push_str(&format!("<{gid:04X}> <{utf16}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

fn draw_image(name: &str, x: f32, y: f32, width: f32, height: f32) -> [Operation; 4] {
    [
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(width),
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(height),
                Object::Real(x),
                Object::Real(y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

/// Composite any alpha onto white and drop it.
pub fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| -> u8 {
            let a = a as u16;
            ((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8
        };
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn deflate(raw: &[u8]) -> CheckinResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_code_reader::decode_frame;
    use checkin_roster::Identifier;
    use flate2::read::ZlibDecoder;
    use image::imageops::{resize, FilterType};
    use image::{Rgba, RgbaImage};
    use std::io::Read;

    fn write_template(dir: &Path) -> PathBuf {
        let path = dir.join("ATTENDEE.png");
        RgbaImage::from_fn(120, 170, |x, _| {
            if x < 60 {
                Rgba([20, 60, 160, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save(&path)
        .unwrap();
        path
    }

    fn anna() -> Attendee {
        Attendee {
            row: 2,
            order_id: "12345678901".to_string(),
            id: Identifier::new("12345678901-extra"),
            first_name: "anna".to_string(),
            last_name: "Lee".to_string(),
            ticket_type: Some("General Admission".to_string()),
            category: Some("ATTENDEE".to_string()),
        }
    }

    fn renderer(dir: &Path) -> BadgeRenderer {
        BadgeRenderer::new(
            &write_template(dir),
            BadgeLayout::default(),
            FontStack::bundled().unwrap(),
        )
        .unwrap()
    }

    fn encoded(text: &str) -> Vec<u8> {
        let fonts = FontStack::bundled().unwrap();
        let glyphs: Vec<Glyph> = fonts.shape(text).into_iter().flat_map(|r| r.glyphs).collect();
        glyph_bytes(&glyphs)
    }

    /// Glyph-id bytes of each text line, in drawing order.
    fn page_lines(doc: &Document) -> Vec<Vec<u8>> {
        let page_id = *doc.get_pages().get(&1).unwrap();
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let mut lines: Vec<Vec<u8>> = Vec::new();
        for op in &content.operations {
            match op.operator.as_str() {
                "Tm" => lines.push(Vec::new()),
                "Tj" => lines
                    .last_mut()
                    .unwrap()
                    .extend_from_slice(op.operands[0].as_str().unwrap()),
                _ => {}
            }
        }
        lines
    }

    fn page_font(doc: &Document, resource: &str) -> lopdf::Dictionary {
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        let font_ref = fonts.get(resource.as_bytes()).unwrap().as_reference().unwrap();
        doc.get_dictionary(font_ref).unwrap().clone()
    }

    fn inflate(stream: &Stream) -> Vec<u8> {
        let mut raw = Vec::new();
        ZlibDecoder::new(stream.content.as_slice())
            .read_to_end(&mut raw)
            .unwrap();
        raw
    }

    fn qr_stream(doc: &Document) -> Stream {
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let qr_ref = xobjects
            .get(QR_XOBJECT.as_bytes())
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_object(qr_ref).unwrap().as_stream().unwrap().clone()
    }

    fn decode_embedded_qr(doc: &Document) -> Option<String> {
        let stream = qr_stream(doc);
        let width = stream.dict.get(b"Width").unwrap().as_i64().unwrap() as u32;
        let height = stream.dict.get(b"Height").unwrap().as_i64().unwrap() as u32;
        let modules = GrayImage::from_raw(width, height, inflate(&stream)).unwrap();
        let scaled = resize(&modules, width * 8, height * 8, FilterType::Nearest);
        decode_frame(&scaled)
    }

    #[test]
    fn renders_single_page_badge() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let output = dir.path().join("out").join("12345678901.pdf");

        let written = renderer.render(&anna(), &output).unwrap();
        assert_eq!(written, output);

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert_eq!(
            page_lines(&doc),
            vec![encoded("Anna"), encoded("LEE"), encoded("ATTENDEE")]
        );
    }

    #[test]
    fn font_is_embedded_as_identity_type0() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("badge.pdf");
        renderer(dir.path()).render(&anna(), &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let font = page_font(&doc, "F1");
        assert_eq!(font.get(b"Subtype").unwrap().as_name().unwrap(), b"Type0");
        assert_eq!(font.get(b"Encoding").unwrap().as_name().unwrap(), b"Identity-H");

        let descendants = font.get(b"DescendantFonts").unwrap().as_array().unwrap();
        let cid_font = doc
            .get_dictionary(descendants[0].as_reference().unwrap())
            .unwrap();
        assert_eq!(
            cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
            b"CIDFontType2"
        );
        let descriptor = doc
            .get_dictionary(cid_font.get(b"FontDescriptor").unwrap().as_reference().unwrap())
            .unwrap();
        let file_ref = descriptor.get(b"FontFile2").unwrap().as_reference().unwrap();
        let file = doc.get_object(file_ref).unwrap().as_stream().unwrap();
        assert_eq!(
            file.dict.get(b"Length1").unwrap().as_i64().unwrap(),
            crate::font::BUNDLED_FONT.len() as i64
        );
        assert_eq!(inflate(file), crate::font::BUNDLED_FONT);
    }

    #[test]
    fn to_unicode_maps_glyphs_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("badge.pdf");
        renderer(dir.path()).render(&anna(), &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let font = page_font(&doc, "F1");
        let cmap_ref = font.get(b"ToUnicode").unwrap().as_reference().unwrap();
        let cmap = inflate(doc.get_object(cmap_ref).unwrap().as_stream().unwrap());
        let cmap = String::from_utf8(cmap).unwrap();

        let fonts = FontStack::bundled().unwrap();
        let gid_a = fonts.fonts()[0].glyph('A').unwrap().gid;
        assert!(cmap.contains(&format!("<{gid_a:04X}> <0041>")));
        assert!(cmap.contains("beginbfchar"));
    }

    #[test]
    fn bfchar_blocks_hold_at_most_one_hundred_entries() {
        let glyphs: Vec<Glyph> = (1..=250u16)
            .map(|gid| Glyph {
                ch: char::from_u32(0x4E00 + u32::from(gid)).unwrap(),
                gid,
                advance: 1000,
            })
            .collect();
        let cmap = to_unicode_cmap(&glyphs);
        assert_eq!(cmap.matches("100 beginbfchar").count(), 2);
        assert_eq!(cmap.matches("50 beginbfchar").count(), 1);
        assert!(cmap.contains("<0001> <4E01>"));
    }

    #[test]
    fn cyrillic_name_is_drawn_with_real_glyphs() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("badge.pdf");
        let mut attendee = anna();
        attendee.first_name = "жанна".to_string();
        renderer(dir.path()).render(&attendee, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let first = &page_lines(&doc)[0];
        assert_eq!(first, &encoded("Жанна"));
        assert!(first.chunks(2).all(|gid| gid != [0, 0]));
    }

    #[test]
    fn uncovered_characters_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("badge.pdf");
        let mut attendee = anna();
        attendee.first_name = "明".to_string();
        renderer(dir.path()).render(&attendee, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(page_lines(&doc)[0], vec![0, 0]);
    }

    #[test]
    fn media_box_matches_physical_size() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let output = dir.path().join("badge.pdf");
        renderer.render(&anna(), &output).unwrap();

        let doc = Document::load(&output).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect::<Vec<_>>();
        assert!((media_box[2] - 297.64).abs() < 0.01);
        assert!((media_box[3] - 419.53).abs() < 0.01);
    }

    #[test]
    fn embedded_qr_decodes_to_truncated_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let output = dir.path().join("badge.pdf");
        renderer.render(&anna(), &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(decode_embedded_qr(&doc).as_deref(), Some("12345678901"));
    }

    #[test]
    fn rendering_twice_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let first = dir.path().join("first.pdf");
        let second = dir.path().join("second.pdf");
        renderer.render(&anna(), &first).unwrap();
        renderer.render(&anna(), &second).unwrap();

        let a = Document::load(&first).unwrap();
        let b = Document::load(&second).unwrap();
        assert_eq!(page_lines(&a), page_lines(&b));
        assert_eq!(qr_stream(&a).content, qr_stream(&b).content);
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn rerender_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer(dir.path());
        let output = dir.path().join("badge.pdf");
        std::fs::write(&output, b"stale").unwrap();

        renderer.render(&anna(), &output).unwrap();
        assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn missing_template_is_fatal() {
        let err = BadgeRenderer::new(
            Path::new("/nonexistent/SPEAKER.png"),
            BadgeLayout::default(),
            FontStack::bundled().unwrap(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, CheckinError::FileNotFound { .. }));
    }

    #[test]
    fn transparent_template_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(1, 1).0, [255, 255, 255]);

        let opaque = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])));
        assert_eq!(flatten_onto_white(&opaque).get_pixel(0, 0).0, [10, 20, 30]);
    }
}
