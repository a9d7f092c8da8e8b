//! Property tests over whole activate/deactivate cycles.

use proptest::prelude::*;
use umbra::dom::InlineStyle;
use umbra::{parse, Controller, Document, EngineConfig, MemoryCache, MemoryDocument};

fn hex_color() -> impl Strategy<Value = String> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| format!("#{r:02x}{g:02x}{b:02x}"))
}

fn original_style() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("padding: 4px".to_string())),
        Just(Some("color: red; margin: 0 auto !important".to_string())),
        Just(Some("background: url(a.png);  --x: {a:b}".to_string())),
    ]
}

#[derive(Debug, Clone)]
struct Block {
    background: String,
    color: String,
    style: Option<String>,
    text: bool,
    width: f64,
    height: f64,
}

fn block() -> impl Strategy<Value = Block> {
    (
        hex_color(),
        hex_color(),
        original_style(),
        any::<bool>(),
        1.0..400.0f64,
        1.0..200.0f64,
    )
        .prop_map(|(background, color, style, text, width, height)| Block {
            background,
            color,
            style,
            text,
            width,
            height,
        })
}

fn build(blocks: &[Block]) -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    let body = doc.body().unwrap();
    for block in blocks {
        let div = doc.append_element(body, "div").unwrap();
        if block.text {
            doc.append_text(div, "text").unwrap();
        }
        doc.set_cascaded(div, "background-color", &block.background)
            .unwrap();
        doc.set_cascaded(div, "color", &block.color).unwrap();
        doc.set_size(div, block.width, block.height).unwrap();
        if let Some(style) = &block.style {
            doc.set_attribute(div, "style", style).unwrap();
        }
    }
    doc
}

proptest! {
    #[test]
    fn deactivation_restores_the_page(blocks in prop::collection::vec(block(), 1..8)) {
        let mut doc = build(&blocks);
        let before = doc.dump();
        let mut controller = Controller::new(EngineConfig::default(), MemoryCache::new());

        controller.activate(&mut doc).unwrap();
        controller.deactivate(&mut doc).unwrap();

        prop_assert_eq!(doc.dump(), before);
    }

    #[test]
    fn text_on_dark_surfaces_is_light(blocks in prop::collection::vec(block(), 1..8)) {
        let mut doc = build(&blocks);
        let body = doc.body().unwrap();
        let mut controller = Controller::new(EngineConfig::default(), MemoryCache::new());
        controller.activate(&mut doc).unwrap();

        for div in doc.descendants(body).unwrap() {
            let style = doc.style_attribute(div).map(InlineStyle::parse).unwrap_or_default();
            let Some(text) = style.get("color") else { continue };
            // Untouched backgrounds are estimated dark; well-darkened ones are dark.
            let dark = match style.get("background-color") {
                None => true,
                Some(bg) => parse(&bg.value).unwrap().l < 0.45,
            };
            if dark {
                let l = parse(&text.value).unwrap().l;
                prop_assert!(l >= 0.75, "text lightness {} on a dark surface", l);
            }
        }
    }
}
