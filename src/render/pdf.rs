//! PDF backend over `pdf-writer`.
//!
//! Text is drawn either with an embedded TrueType face (Type0 /
//! CIDFontType2, Identity-H, glyph-id encoded) or with the built-in
//! Helvetica when no font file is supplied. The embedded path is the one
//! that matters in practice: listing text mixes Cyrillic and CJK, which
//! the base-14 fonts cannot encode, so the builtin path lossily falls
//! back to `?` outside WinAnsi coverage.
//!
//! JPEG images embed as-is with DctDecode; every other raster format is
//! decoded and re-embedded as Flate-compressed RGB. Content streams are
//! Flate-compressed.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, Timelike, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::{Error, Result};
use crate::font::FontFace;
use crate::model::{PlacedBlock, Sheet};

const FONT_RESOURCE: Name<'static> = Name(b"F1");
const EMBEDDED_BASE_FONT: Name<'static> = Name(b"CarsheetSans");
const PRODUCER: &str = "carsheet";

/// The face text is drawn with.
pub enum PdfFont {
    /// Built-in Helvetica; text outside WinAnsi coverage degrades to `?`.
    Builtin,

    /// An embedded TrueType face with full Unicode coverage.
    Embedded(FontFace),
}

/// Writes composed sheets as PDF documents.
pub struct PdfRenderer {
    font: PdfFont,
    title: Option<String>,
}

impl PdfRenderer {
    /// Create a renderer drawing with the given face.
    pub fn new(font: PdfFont) -> Self {
        Self { font, title: None }
    }

    /// Create a renderer using the built-in Helvetica face.
    pub fn builtin() -> Self {
        Self::new(PdfFont::Builtin)
    }

    /// Create a renderer embedding a TrueType font file.
    pub fn with_font_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self::new(PdfFont::Embedded(FontFace::from_file(path)?)))
    }

    /// Set the document title recorded in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render a sheet to PDF bytes.
    ///
    /// A finalized sheet always has at least one page; a hand-built
    /// zero-page sheet is rejected rather than written as a degenerate
    /// document.
    pub fn render(&self, sheet: &Sheet) -> Result<Vec<u8>> {
        if sheet.pages.is_empty() {
            return Err(Error::Render("sheet has no pages".to_string()));
        }

        let mut pdf = Pdf::new();
        let mut next_id = 1;
        let mut alloc = move || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let font_id = alloc();

        let encoder = self.write_font(&mut pdf, font_id, &mut alloc, sheet)?;
        let images = embed_images(&mut pdf, &mut alloc, sheet);

        let n = sheet.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (page, content_id) in sheet.pages.iter().zip(&content_ids) {
            let mut content = Content::new();
            for block in &page.blocks {
                match block {
                    PlacedBlock::Text {
                        x,
                        y,
                        text,
                        font_size,
                    } => {
                        content
                            .begin_text()
                            .set_font(FONT_RESOURCE, *font_size)
                            .next_line(*x, *y)
                            .show(Str(&encoder.encode(text)))
                            .end_text();
                    }
                    PlacedBlock::Image {
                        source,
                        x,
                        y,
                        width,
                        height,
                    } => {
                        let Some(name) = images.names.get(source) else {
                            // Unreadable at embed time; the gap is accepted.
                            continue;
                        };
                        content.save_state();
                        content.transform([*width, 0.0, 0.0, *height, *x, *y]);
                        content.x_object(Name(name.as_bytes()));
                        content.restore_state();
                    }
                }
            }
            let compressed = compress(&content.finish());
            pdf.stream(*content_id, &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, sheet.width, sheet.height))
                .parent(pages_id)
                .contents(*content_id);
            let mut resources = page.resources();
            resources.fonts().pair(FONT_RESOURCE, font_id);
            if !images.objects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, id) in &images.objects {
                    xobjects.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        let mut info = pdf.document_info(alloc());
        if let Some(title) = &self.title {
            info.title(TextStr(title));
        }
        info.producer(TextStr(PRODUCER));
        info.creation_date(now_date());
        info.finish();

        Ok(pdf.finish())
    }

    /// Render a sheet into a writer and return the committed page count.
    pub fn write_to<W: Write>(&self, sheet: &Sheet, writer: &mut W) -> Result<u32> {
        let bytes = self.render(sheet)?;
        writer.write_all(&bytes)?;
        Ok(sheet.page_count())
    }

    /// Register the font object and build the matching text encoder.
    fn write_font(
        &self,
        pdf: &mut Pdf,
        font_id: Ref,
        alloc: &mut dyn FnMut() -> Ref,
        sheet: &Sheet,
    ) -> Result<TextEncoder> {
        match &self.font {
            PdfFont::Builtin => {
                pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
                Ok(TextEncoder::WinAnsi)
            }
            PdfFont::Embedded(face) => {
                let char_to_gid = self.embed_truetype(pdf, font_id, alloc, face, sheet)?;
                Ok(TextEncoder::GlyphIds(char_to_gid))
            }
        }
    }

    fn embed_truetype(
        &self,
        pdf: &mut Pdf,
        font_id: Ref,
        alloc: &mut dyn FnMut() -> Ref,
        face: &FontFace,
        sheet: &Sheet,
    ) -> Result<HashMap<char, u16>> {
        let metrics = face.metrics()?;

        // Map every character drawn on the sheet to its glyph.
        let mut char_to_gid: HashMap<char, u16> = HashMap::new();
        for page in &sheet.pages {
            for block in &page.blocks {
                if let PlacedBlock::Text { text, .. } = block {
                    for c in text.chars() {
                        char_to_gid.entry(c).or_insert_with(|| metrics.glyph_id(c));
                    }
                }
            }
        }

        let mut widths: BTreeMap<u16, f32> = BTreeMap::new();
        for gid in char_to_gid.values() {
            widths
                .entry(*gid)
                .or_insert_with(|| metrics.glyph_width_milli_em(*gid));
        }

        let cid_id = alloc();
        let descriptor_id = alloc();
        let file_id = alloc();

        let mut type0 = pdf.type0_font(font_id);
        type0.base_font(EMBEDDED_BASE_FONT);
        type0.encoding_predefined(Name(b"Identity-H"));
        type0.descendant_font(cid_id);
        type0.finish();

        let mut cid = pdf.cid_font(cid_id);
        cid.subtype(CidFontType::Type2);
        cid.base_font(EMBEDDED_BASE_FONT);
        cid.system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        });
        cid.font_descriptor(descriptor_id);
        cid.default_width(metrics.glyph_width_milli_em(0));
        {
            let mut w = cid.widths();
            for (first, run) in consecutive_runs(&widths) {
                w.consecutive(first, run);
            }
        }
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        cid.finish();

        let (x_min, y_min, x_max, y_max) = metrics.bounding_box();
        let mut descriptor = pdf.font_descriptor(descriptor_id);
        descriptor.name(EMBEDDED_BASE_FONT);
        descriptor.flags(FontFlags::NON_SYMBOLIC);
        descriptor.bbox(Rect::new(x_min, y_min, x_max, y_max));
        descriptor.italic_angle(0.0);
        descriptor.ascent(metrics.ascent());
        descriptor.descent(metrics.descent());
        descriptor.cap_height(metrics.cap_height());
        descriptor.stem_v(80.0);
        descriptor.font_file2(file_id);
        descriptor.finish();

        let compressed = compress(face.data());
        pdf.stream(file_id, &compressed)
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), face.data().len() as i32);

        Ok(char_to_gid)
    }
}

/// How text bytes are produced for `show` operators.
enum TextEncoder {
    WinAnsi,
    GlyphIds(HashMap<char, u16>),
}

impl TextEncoder {
    fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoder::WinAnsi => text.chars().map(winansi_byte).collect(),
            TextEncoder::GlyphIds(map) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = map.get(&c).copied().unwrap_or(0);
                    bytes.extend_from_slice(&gid.to_be_bytes());
                }
                bytes
            }
        }
    }
}

/// Lossy WinAnsi (CP1252) mapping; anything uncovered becomes `?`.
fn winansi_byte(c: char) -> u8 {
    match c {
        '\u{0000}'..='\u{007e}' => c as u8,
        '\u{00a0}'..='\u{00ff}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        '‰' => 0x89,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => b'?',
    }
}

/// Image XObjects registered for a render.
struct EmbeddedImages {
    /// Path of each successfully embedded image to its resource name.
    names: HashMap<PathBuf, String>,
    /// Resource name / object id pairs for the page resource dictionaries.
    objects: Vec<(String, Ref)>,
}

/// Embed every image referenced by the sheet. Failures are contained:
/// the image is logged and left out, and rendering continues.
fn embed_images(pdf: &mut Pdf, alloc: &mut dyn FnMut() -> Ref, sheet: &Sheet) -> EmbeddedImages {
    let mut images = EmbeddedImages {
        names: HashMap::new(),
        objects: Vec::new(),
    };

    for page in &sheet.pages {
        for block in &page.blocks {
            let PlacedBlock::Image { source, .. } = block else {
                continue;
            };
            if images.names.contains_key(source) {
                continue;
            }
            match embed_image(pdf, alloc, source, images.objects.len()) {
                Ok((name, id)) => {
                    images.names.insert(source.clone(), name.clone());
                    images.objects.push((name, id));
                }
                Err(e) => log::warn!("skipping image: {}", e),
            }
        }
    }
    images
}

fn embed_image(
    pdf: &mut Pdf,
    alloc: &mut dyn FnMut() -> Ref,
    source: &std::path::Path,
    index: usize,
) -> Result<(String, Ref)> {
    let data = std::fs::read(source)
        .map_err(|e| Error::AssetUnavailable(format!("{}: {}", source.display(), e)))?;
    let format = image::guess_format(&data)
        .map_err(|e| Error::AssetUnavailable(format!("{}: {}", source.display(), e)))?;

    let id = alloc();
    let name = format!("Im{}", index + 1);

    if format == image::ImageFormat::Jpeg {
        let (width, height) = image_dimensions(&data, source)?;
        let mut xobject = pdf.image_xobject(id, &data);
        xobject.filter(Filter::DctDecode);
        xobject.width(width as i32);
        xobject.height(height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    } else {
        // Decode and re-embed as Flate-compressed RGB.
        let decoded = image::load_from_memory(&data)
            .map_err(|e| Error::AssetUnavailable(format!("{}: {}", source.display(), e)))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = (rgb.width(), rgb.height());
        let compressed = compress(rgb.as_raw());
        let mut xobject = pdf.image_xobject(id, &compressed);
        xobject.filter(Filter::FlateDecode);
        xobject.width(width as i32);
        xobject.height(height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }

    Ok((name, id))
}

fn image_dimensions(data: &[u8], source: &std::path::Path) -> Result<(u32, u32)> {
    image::ImageReader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::AssetUnavailable(format!("{}: {}", source.display(), e)))?
        .into_dimensions()
        .map_err(|e| Error::AssetUnavailable(format!("{}: {}", source.display(), e)))
}

/// Group a sorted gid-to-width map into runs of consecutive gids.
fn consecutive_runs(widths: &BTreeMap<u16, f32>) -> Vec<(u16, Vec<f32>)> {
    let mut runs: Vec<(u16, Vec<f32>)> = Vec::new();
    for (&gid, &width) in widths {
        match runs.last_mut() {
            Some((first, run)) if *first as usize + run.len() == gid as usize => {
                run.push(width);
            }
            _ => runs.push((gid, vec![width])),
        }
    }
    runs
}

fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

fn now_date() -> Date {
    let now = Utc::now();
    Date::new(now.year() as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
}
