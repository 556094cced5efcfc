//! Integration tests for the Pagewright composition pipeline.
//!
//! These tests exercise the full path from rows to PDF bytes.
//! They verify:
//! - Rows break across pages at the right places
//! - Header and footer registration rules hold
//! - PDF output is structurally valid and independent of worker count
//! - Provider settings (protection, compression, metadata) reach the output
//! - The provider call protocol seen by a custom backend

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pagewright::image_loader::ImageFetcher;
use pagewright::model::{PageNumber, Permission, Protection};
use pagewright::style::{CellProps, Color, FontProps, LineProps, RectProps, TextProps};
use pagewright::*;

// ─── Helpers ────────────────────────────────────────────────────

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A page whose usable area is exactly 100 × 100 mm.
fn square_config() -> ConfigBuilder {
    Config::builder()
        .dimensions(120.0, 120.0)
        .margins(Margins::uniform(10.0))
}

fn empty_row(height: f64) -> Row {
    Row::new(height, vec![Col::new(12)]).unwrap()
}

fn page_row_heights(doc: &Document) -> Vec<Vec<f64>> {
    doc.structure()
        .find_all("page")
        .iter()
        .map(|page| {
            page.nodes
                .iter()
                .filter(|n| n.node_type == "row")
                .map(|n| n.value.as_ref().and_then(|v| v.as_f64()).unwrap())
                .collect()
        })
        .collect()
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, _| image::Rgba([(x * 40) as u8, 0, 0, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), width, height, image::ColorType::Rgba8)
        .unwrap();
    buf
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

fn pdf_text(pdf: &Pdf) -> String {
    String::from_utf8_lossy(pdf.bytes()).into_owned()
}

/// A document touching every built-in component.
fn showcase(workers: usize) -> Document {
    let config = Config::builder()
        .workers(workers)
        .page_number(PageNumber::default())
        .build()
        .unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.register_header(vec![Row::new(
        15.0,
        vec![Col::new(12).add(Text::with_props(
            "Quarterly report",
            TextProps {
                size: 14.0,
                ..Default::default()
            },
        ))],
    )
    .unwrap()])
    .unwrap();
    doc.register_footer(vec![Row::new(10.0, vec![Col::new(12).add(Line::new())]).unwrap()])
        .unwrap();

    let logo: Arc<[u8]> = png_bytes(6, 3).into();
    for i in 0..40 {
        doc.add_auto_row(vec![
            Col::new(3).add(BytesImage::new(logo.clone(), "png")),
            Col::new(6).add(Text::new(format!(
                "Line item {} with a description long enough to wrap onto a second line",
                i
            ))),
            Col::auto()
                .add(QrCode::new(format!("item-{}", i)))
                .with_style(CellProps {
                    background_color: Some(Color::from_rgb8(240, 240, 240)),
                    ..Default::default()
                }),
        ])
        .unwrap();
    }
    doc.add_row(30.0, vec![Col::new(6), Col::new(6).add(Signature::new("Approved by"))])
        .unwrap();
    doc
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_empty_document_has_one_page() {
    init_logging();
    let doc = Document::new(Config::default()).unwrap();
    assert_eq!(doc.page_count(), 1);
    let pdf = doc.generate().unwrap();
    assert_valid_pdf(pdf.bytes());
    assert_eq!(pdf.page_count(), 1);
    assert!(pdf_text(&pdf).contains("/Count 1"));
}

#[test]
fn test_empty_document_still_carries_header_and_footer() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    doc.register_header(vec![empty_row(10.0)]).unwrap();
    doc.register_footer(vec![empty_row(10.0)]).unwrap();
    let structure = doc.structure();
    assert_eq!(structure.find_all("page").len(), 1);
    assert_eq!(structure.find_all("header").len(), 1);
    assert_eq!(structure.find_all("footer").len(), 1);
    assert_valid_pdf(doc.generate().unwrap().bytes());
}

#[test]
fn test_header_and_footer_reserve_space() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    doc.register_header(vec![empty_row(10.0)]).unwrap();
    doc.register_footer(vec![empty_row(10.0)]).unwrap();
    doc.add_rows([empty_row(50.0), empty_row(60.0), empty_row(20.0)]).unwrap();
    assert_eq!(page_row_heights(&doc), vec![vec![50.0], vec![60.0, 20.0]]);
}

#[test]
fn test_every_row_placed_once_in_order() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    let heights: Vec<f64> = (0..57).map(|i| 3.0 + (i % 7) as f64 * 4.5).collect();
    for h in &heights {
        doc.add_row(*h, vec![Col::new(12)]).unwrap();
    }
    let pages = page_row_heights(&doc);
    let flattened: Vec<f64> = pages.iter().flatten().copied().collect();
    assert_eq!(flattened, heights);
    for page in &pages {
        assert!(!page.is_empty());
        assert!(page.iter().sum::<f64>() <= 100.0 + 1e-9);
    }
}

#[test]
fn test_oversized_row_is_placed_alone() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    doc.add_row(30.0, vec![]).unwrap();
    doc.add_row(180.0, vec![]).unwrap();
    doc.add_row(30.0, vec![]).unwrap();
    assert_eq!(page_row_heights(&doc), vec![vec![30.0], vec![180.0], vec![30.0]]);
    assert_valid_pdf(doc.generate().unwrap().bytes());
}

#[test]
fn test_fits_on_current_page_does_not_mutate() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    doc.add_row(70.0, vec![]).unwrap();
    assert!(doc.fits_on_current_page(30.0));
    assert!(!doc.fits_on_current_page(30.5));
    assert!(doc.fits_on_current_page(30.0));
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn test_header_registration_rules() {
    let mut doc = Document::new(square_config().build().unwrap()).unwrap();
    let err = doc
        .register_header(vec![empty_row(60.0), empty_row(40.0)])
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    doc.register_header(vec![empty_row(20.0)]).unwrap();
    doc.add_row(10.0, vec![]).unwrap();
    assert!(matches!(
        doc.register_footer(vec![empty_row(5.0)]),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_invalid_rows_are_rejected_at_build_time() {
    let mut doc = Document::new(Config::default()).unwrap();
    assert!(doc.add_row(10.0, vec![Col::new(8), Col::new(8)]).is_err());
    assert!(doc.add_row(-5.0, vec![Col::new(12)]).is_err());
    assert!(doc.add_auto_row(vec![Col::new(12), Col::auto()]).is_err());
    assert_eq!(doc.structure().find_all("row").len(), 0);
}

// ─── Output ─────────────────────────────────────────────────────

#[test]
fn test_output_is_identical_for_any_worker_count() {
    init_logging();
    let sequential = showcase(1).generate().unwrap();
    assert_valid_pdf(sequential.bytes());
    assert!(sequential.page_count() > 1);
    for workers in [0, 2, 8] {
        let parallel = showcase(workers).generate().unwrap();
        assert_eq!(parallel.bytes(), sequential.bytes(), "workers = {}", workers);
    }
}

#[test]
fn test_generation_is_repeatable() {
    let doc = showcase(4);
    assert_eq!(doc.generate().unwrap(), doc.generate().unwrap());
}

#[test]
fn test_page_numbers_are_drawn() {
    let config = square_config()
        .compression(false)
        .page_number(PageNumber {
            pattern: "Page {current} of {total}".to_string(),
            ..Default::default()
        })
        .build()
        .unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_rows([empty_row(80.0), empty_row(80.0)]).unwrap();
    let text = pdf_text(&doc.generate().unwrap());
    assert!(text.contains("(Page 1 of 2) Tj"));
    assert!(text.contains("(Page 2 of 2) Tj"));
}

#[test]
fn test_background_image_on_every_page() {
    let config = square_config()
        .compression(false)
        .background_image(png_bytes(4, 4), Extension::Png)
        .build()
        .unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_rows([empty_row(80.0), empty_row(80.0)]).unwrap();
    let text = pdf_text(&doc.generate().unwrap());
    assert_eq!(text.matches("/Im0 Do").count(), 2);
}

#[test]
fn test_protection_compression_metadata() {
    let config = Config::builder()
        .compression(true)
        .protection(Protection {
            permissions: vec![Permission::Print, Permission::Copy],
            user_password: "reader".to_string(),
            owner_password: "owner".to_string(),
        })
        .metadata(Metadata {
            title: Some("Statement".to_string()),
            ..Default::default()
        })
        .build()
        .unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_row(10.0, vec![Col::new(12).add(Text::new("secret"))]).unwrap();
    let text = pdf_text(&doc.generate().unwrap());
    assert!(text.contains("/Encrypt "));
    assert!(text.contains("/FlateDecode"));
    assert!(text.contains("/Info "));
    // Info strings are encrypted too.
    assert!(!text.contains("(Statement)"));
}

#[test]
fn test_metadata_without_protection() {
    let config = Config::builder()
        .metadata(Metadata {
            title: Some("Statement".to_string()),
            author: Some("Accounts".to_string()),
            keywords: Some("monthly".to_string()),
            ..Default::default()
        })
        .build()
        .unwrap();
    let text = pdf_text(&Document::new(config).unwrap().generate().unwrap());
    assert!(text.contains("/Title (Statement)"));
    assert!(text.contains("/Author (Accounts)"));
    assert!(text.contains("/Keywords (monthly)"));
    assert!(!text.contains("/Encrypt"));
}

#[test]
fn test_unknown_image_extension_degrades_to_text() {
    let config = Config::builder().compression(false).build().unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_auto_row(vec![Col::new(12).add(BytesImage::new(png_bytes(2, 2), "jj"))])
        .unwrap();
    doc.add_row(20.0, vec![Col::new(12).add(BytesImage::new(vec![1u8, 2, 3, 4, 5], "png"))])
        .unwrap();
    let pdf = doc.generate().unwrap();
    assert_eq!(pdf_text(&pdf).matches("(could not parse image bytes) Tj").count(), 2);
}

#[test]
fn test_missing_file_image_degrades_to_text() {
    let config = Config::builder().compression(false).build().unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_auto_row(vec![Col::new(12).add(Image::new("no/such/file.png"))]).unwrap();
    // The failed lookup sizes the row to zero instead of failing.
    assert_eq!(page_row_heights(&doc), vec![vec![0.0]]);
    assert!(pdf_text(&doc.generate().unwrap()).contains("(could not load image) Tj"));
}

#[test]
fn test_save_and_base64() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    let pdf = showcase(2).generate().unwrap();
    pdf.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), pdf.bytes());
    assert!(pdf.save("").is_err());

    use base64::Engine;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(pdf.base64())
        .unwrap();
    assert_eq!(decoded, pdf.bytes());
}

#[test]
fn test_config_from_json_drives_a_document() {
    let config = Config::from_json(
        r#"{
            "pageSize": "A5",
            "margins": {"left": 15.0, "top": 15.0, "right": 15.0, "bottom": 15.0},
            "workers": 3,
            "metadata": {"title": "From JSON"}
        }"#,
    )
    .unwrap();
    let mut doc = Document::new(config).unwrap();
    doc.add_row(10.0, vec![Col::new(12).add(Text::new("hi"))]).unwrap();
    let details = &doc.structure().details;
    assert_eq!(details["workers"], serde_json::json!(3));
    assert!(pdf_text(&doc.generate().unwrap()).contains("/Title (From JSON)"));
}

// ─── Image cache ────────────────────────────────────────────────

struct CountingFetcher {
    bytes: Vec<u8>,
    calls: Arc<AtomicUsize>,
}

impl ImageFetcher for CountingFetcher {
    fn fetch(&self, _key: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

#[test]
fn test_keyed_image_is_fetched_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cache = Arc::new(ImageCache::with_fetcher(CountingFetcher {
        bytes: png_bytes(10, 5),
        calls: calls.clone(),
    }));
    let config = Config::builder().workers(4).build().unwrap();
    let mut doc = Document::with_image_cache(config, cache.clone()).unwrap();

    for _ in 0..30 {
        doc.add_auto_row(vec![Col::new(4).add(Image::new("assets/logo.png"))]).unwrap();
    }
    // 4 of 12 units on a 190 mm row, at a 2:1 aspect ratio.
    let expected = 190.0 * 4.0 / 12.0 / 2.0;
    for page in page_row_heights(&doc) {
        for h in page {
            assert!((h - expected).abs() < 1e-9);
        }
    }

    assert_valid_pdf(doc.generate().unwrap().bytes());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

// ─── Provider protocol ──────────────────────────────────────────

#[derive(Default)]
struct RecordingProvider {
    settings: Vec<String>,
}

struct RecordingSurface {
    index: usize,
    calls: Vec<String>,
}

impl Provider for RecordingProvider {
    fn font_height(&self, _font: &FontProps) -> f64 {
        5.0
    }

    fn lines_quantity(&self, text: &str, _props: &TextProps, _width: f64) -> usize {
        text.split('|').count()
    }

    fn dimensions_by_image(&self, _key: &str) -> Result<Dimensions> {
        Ok(Dimensions::new(1.0, 1.0))
    }

    fn dimensions_by_image_bytes(&self, _bytes: &[u8], _extension: &str) -> Result<Dimensions> {
        Ok(Dimensions::new(1.0, 1.0))
    }

    fn begin_page(&self, index: usize, _config: &Config) -> Box<dyn PageSurface + '_> {
        Box::new(RecordingSurface {
            index,
            calls: Vec::new(),
        })
    }

    fn set_protection(&mut self, protection: Option<&Protection>) {
        self.settings.push(format!("protection:{}", protection.is_some()));
    }

    fn set_compression(&mut self, enabled: bool) {
        self.settings.push(format!("compression:{}", enabled));
    }

    fn set_metadata(&mut self, metadata: Option<&Metadata>) {
        self.settings.push(format!("metadata:{}", metadata.is_some()));
    }

    fn generate_bytes(&self, pages: Vec<RenderedPage>) -> Result<Vec<u8>> {
        let mut out = self.settings.join(",").into_bytes();
        for page in pages {
            out.extend_from_slice(format!("\n#{}:", page.index).as_bytes());
            out.extend_from_slice(&page.content);
        }
        Ok(out)
    }
}

impl PageSurface for RecordingSurface {
    fn add_text(&mut self, text: &str, cell: &Cell, _props: &TextProps) {
        self.calls.push(format!("text({})@{}", text, cell.y));
    }

    fn add_line(&mut self, cell: &Cell, _props: &LineProps) {
        self.calls.push(format!("line@{}", cell.y));
    }

    fn add_image_from_file(&mut self, key: &str, _cell: &Cell, _props: &RectProps) {
        self.calls.push(format!("image({})", key));
    }

    fn add_image_from_bytes(&mut self, _bytes: &[u8], _cell: &Cell, _props: &RectProps, extension: &str) {
        self.calls.push(format!("bytes({})", extension));
    }

    fn add_background_image_from_bytes(
        &mut self,
        _bytes: &[u8],
        _cell: &Cell,
        _props: &RectProps,
        extension: &str,
    ) {
        self.calls.push(format!("background({})", extension));
    }

    fn add_qr_code(&mut self, code: &str, _cell: &Cell, _props: &RectProps) {
        self.calls.push(format!("qr({})", code));
    }

    fn create_row(&mut self, height: f64) {
        self.calls.push(format!("row({})", height));
    }

    fn create_col(&mut self, width: f64, height: f64, style: Option<&CellProps>) {
        self.calls.push(format!("col({},{},{})", width, height, style.is_some()));
    }

    fn finish(self: Box<Self>) -> Result<RenderedPage> {
        Ok(RenderedPage {
            index: self.index,
            content: self.calls.join(" ").into_bytes(),
            ..Default::default()
        })
    }
}

#[test]
fn test_provider_call_protocol() {
    let config = square_config()
        .compression(false)
        .workers(2)
        .build()
        .unwrap();
    let mut doc = Document::with_provider(config, Box::new(RecordingProvider::default())).unwrap();
    doc.register_header(vec![Row::new(10.0, vec![Col::new(12).add(Text::new("H"))]).unwrap()])
        .unwrap();
    doc.register_footer(vec![Row::new(10.0, vec![Col::new(12).add(Line::new())]).unwrap()])
        .unwrap();
    doc.add_row(50.0, vec![Col::new(6).add(QrCode::new("q")), Col::new(6)]).unwrap();
    doc.add_auto_row(vec![Col::new(12).add(Text::new("a|b|c"))]).unwrap();
    doc.add_row(70.0, vec![Col::new(12).with_style(CellProps::default())]).unwrap();

    let out = String::from_utf8(doc.generate().unwrap().into_bytes()).unwrap();
    let expected = [
        "compression:false,protection:false,metadata:false",
        "#0:col(100,10,false) text(H)@10 row(10) \
         col(50,50,false) qr(q) col(50,50,false) row(50) \
         col(100,15,false) text(a|b|c)@70 row(15) \
         row(15) \
         col(100,10,false) line@100 row(10)",
        "#1:col(100,10,false) text(H)@10 row(10) \
         col(100,70,true) row(70) \
         row(10) \
         col(100,10,false) line@100 row(10)",
    ];
    assert_eq!(out, expected.join("\n"));
}

#[test]
fn test_footer_is_drawn_below_an_oversized_row() {
    let config = square_config().build().unwrap();
    let mut doc = Document::with_provider(config, Box::new(RecordingProvider::default())).unwrap();
    doc.register_footer(vec![Row::new(10.0, vec![Col::new(12).add(Line::new())]).unwrap()])
        .unwrap();
    doc.add_row(150.0, vec![Col::new(12)]).unwrap();
    doc.add_row(0.0, vec![Col::new(12).add(Text::new("after"))]).unwrap();

    let out = String::from_utf8(doc.generate().unwrap().into_bytes()).unwrap();
    let pages: Vec<&str> = out.lines().skip(1).collect();
    assert_eq!(
        pages,
        vec![
            "#0:col(100,150,false) row(150) col(100,10,false) line@160 row(10)",
            "#1:col(100,0,false) text(after)@10 row(0) row(90) col(100,10,false) line@100 row(10)",
        ]
    );
}

// ─── Failure propagation ────────────────────────────────────────

#[derive(Debug)]
struct Failing(&'static str);

impl Component for Failing {
    fn height(&self, _ctx: &LayoutContext<'_>, _width: f64) -> f64 {
        10.0
    }

    fn render(&self, _surface: &mut dyn PageSurface, _cell: &Cell, _ctx: &LayoutContext<'_>) -> Result<()> {
        Err(Error::Backend(self.0.to_string()))
    }

    fn structure(&self) -> StructureNode {
        StructureNode::new("failing").with_value(self.0)
    }
}

#[test]
fn test_first_failing_page_wins() {
    for workers in [1, 4] {
        let config = square_config().workers(workers).build().unwrap();
        let mut doc = Document::new(config).unwrap();
        doc.add_row(90.0, vec![Col::new(12).add(Text::new("ok"))]).unwrap();
        doc.add_row(90.0, vec![Col::new(12).add(Failing("second"))]).unwrap();
        doc.add_row(90.0, vec![Col::new(12).add(Failing("third"))]).unwrap();
        match doc.generate() {
            Err(Error::Render { page, message }) => {
                assert_eq!(page, 2);
                assert!(message.contains("second"));
            }
            other => panic!("expected a render error, got {:?}", other.map(|p| p.page_count())),
        }
    }
}
