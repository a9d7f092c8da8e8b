//! Write-phase decisions. Pure functions of a record and the config.

use log::trace;
use umbra_color::{adjust_with, parse, relative_luminance, Color};

use super::record::ElementRecord;
use crate::config::EngineConfig;
use crate::transform::{bound_written, flatten, invert, is_visible};

/// Overrides chosen for one element. `None` leaves the property alone.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decision {
    pub background: Option<Color>,
    pub text: Option<Color>,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    /// Lightness text and icons are measured against: the applied
    /// background's, or the configured estimate.
    pub background_lightness: f64,
}

impl Decision {
    pub fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.text.is_none()
            && self.fill.is_none()
            && self.stroke.is_none()
    }
}

pub(crate) fn decide<E>(record: &ElementRecord<E>, config: &EngineConfig) -> Decision {
    let background = decide_background(record, config);

    let (background_lightness, background_luminance) = match &background {
        Some(bg) => (bg.l, relative_luminance(bg)),
        None => {
            let estimate = config.background.estimate;
            (estimate, relative_luminance(&Color::gray(estimate)))
        }
    };

    let text = record.text.as_deref().and_then(|raw| {
        decide_text(
            raw,
            record.button,
            background_lightness,
            background_luminance,
            config,
        )
    });

    let icons = &config.icons;
    let (fill_chroma, stroke_chroma) = if record.button {
        (icons.fill_button_chroma, icons.stroke_button_chroma)
    } else {
        (icons.fill_chroma, icons.stroke_chroma)
    };
    let fill = record
        .fill
        .as_deref()
        .and_then(|raw| decide_icon(raw, fill_chroma, background_lightness, config));
    let stroke = record
        .stroke
        .as_deref()
        .and_then(|raw| decide_icon(raw, stroke_chroma, background_lightness, config));

    Decision {
        background,
        text,
        fill,
        stroke,
        background_lightness,
    }
}

fn decide_background<E>(record: &ElementRecord<E>, config: &EngineConfig) -> Option<Color> {
    let rules = &config.background;
    let color = parse(record.background.as_deref()?).ok()?;

    if !is_visible(&color, rules.min_alpha) || color.l <= rules.min_lightness {
        return None;
    }
    if !record.has_direct_text {
        trace!("background kept: no direct text");
        return None;
    }
    if record.size.is_smaller_than(rules.min_size) {
        trace!(
            "background kept: {}x{} below {}px",
            record.size.width,
            record.size.height,
            rules.min_size
        );
        return None;
    }

    Some(if record.button {
        flatten(color, rules.button_lightness, rules.button_chroma)
    } else {
        invert(color, rules.chroma)
    })
}

fn decide_text(
    raw: &str,
    button: bool,
    background_lightness: f64,
    background_luminance: f64,
    config: &EngineConfig,
) -> Option<Color> {
    let rules = &config.text;
    let color = parse(raw).ok()?;
    if !is_visible(&color, rules.min_alpha) {
        return None;
    }

    let chroma = if button {
        rules.button_chroma
    } else {
        rules.chroma
    };
    let candidate = invert(color, chroma);
    let adjusted = adjust_with(candidate, background_luminance, &config.contrast.policy());

    Some(bound_written(
        adjusted,
        background_lightness,
        rules.dark_background,
        rules.dark_floor,
        rules.light_ceiling,
    ))
}

fn decide_icon(
    raw: &str,
    chroma: f64,
    background_lightness: f64,
    config: &EngineConfig,
) -> Option<Color> {
    let rules = &config.icons;
    let color = parse(raw).ok()?;
    if !is_visible(&color, rules.min_alpha) {
        return None;
    }

    Some(bound_written(
        invert(color, chroma),
        background_lightness,
        config.text.dark_background,
        rules.dark_floor,
        rules.light_ceiling,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Size;
    use umbra_color::format;

    fn record(background: &str, text: &str) -> ElementRecord<u32> {
        ElementRecord {
            element: 1,
            background: Some(background.to_string()),
            text: Some(text.to_string()),
            fill: None,
            stroke: None,
            button: false,
            has_direct_text: true,
            size: Size::new(200.0, 40.0),
        }
    }

    // =====================================================================
    // Background
    // =====================================================================

    #[test]
    fn white_background_inverts_to_black() {
        let config = EngineConfig::default();
        let decision = decide(&record("rgb(255, 255, 255)", "rgb(0, 0, 0)"), &config);
        let bg = decision.background.expect("background override");
        assert!(bg.l < 0.01, "got {}", bg.l);
        assert!(decision.background_lightness < 0.01);
    }

    #[test]
    fn inversion_law_for_light_backgrounds() {
        let config = EngineConfig::default();
        for hex in ["#ffffff", "#f0e68c", "#87ceeb", "#cccccc", "#ffb6c1"] {
            let original = parse(hex).unwrap();
            let decision = decide(&record(hex, "#000"), &config);
            let bg = decision.background.expect("background override");
            assert!(
                (bg.l - (1.0 - original.l).clamp(0.0, 1.0)).abs() < 1e-12,
                "{}: {} vs {}",
                hex,
                bg.l,
                original.l
            );
        }
    }

    #[test]
    fn button_background_is_flat() {
        let config = EngineConfig::default();
        let mut rec = record("#4caf50", "#ffffff");
        rec.button = true;
        let bg = decide(&rec, &config).background.unwrap();
        assert_eq!(bg.l, 0.35);
        assert!((bg.c - parse("#4caf50").unwrap().c * 0.1).abs() < 1e-12);
    }

    #[test]
    fn dark_translucent_or_textless_backgrounds_are_kept() {
        let config = EngineConfig::default();
        assert!(decide(&record("#222222", "#fff"), &config).background.is_none());
        assert!(decide(&record("rgba(255,255,255,0.4)", "#000"), &config)
            .background
            .is_none());
        assert!(decide(&record("transparent", "#000"), &config).background.is_none());

        let mut textless = record("#ffffff", "#000");
        textless.has_direct_text = false;
        assert!(decide(&textless, &config).background.is_none());
    }

    #[test]
    fn small_elements_keep_background() {
        let config = EngineConfig::default();
        let mut rec = record("#ffffff", "#000");
        rec.size = Size::new(300.0, 20.0);
        let decision = decide(&rec, &config);
        assert!(decision.background.is_none());
        assert_eq!(decision.background_lightness, 0.2);
    }

    #[test]
    fn unparseable_background_uses_estimate() {
        let config = EngineConfig::default();
        let decision = decide(&record("linear-gradient(#fff, #eee)", "#000"), &config);
        assert!(decision.background.is_none());
        assert_eq!(decision.background_lightness, config.background.estimate);
    }

    // =====================================================================
    // Text
    // =====================================================================

    #[test]
    fn black_text_becomes_light() {
        let config = EngineConfig::default();
        let text = decide(&record("#ffffff", "rgb(0, 0, 0)"), &config)
            .text
            .unwrap();
        assert!(text.l >= 0.75, "got {}", text.l);
    }

    #[test]
    fn text_floor_applies_on_estimated_background() {
        let config = EngineConfig::default();
        // White text inverts to black; the floor must lift it back up.
        let text = decide(&record("transparent", "#ffffff"), &config)
            .text
            .unwrap();
        assert!(text.l >= 0.75, "got {}", text.l);
    }

    #[test]
    fn text_ceiling_applies_on_light_background() {
        let mut config = EngineConfig::default();
        config.background.estimate = 0.9;
        let text = decide(&record("transparent", "#000000"), &config)
            .text
            .unwrap();
        assert!(text.l <= 0.25, "got {}", text.l);
    }

    #[test]
    fn written_text_keeps_the_floor() {
        let config = EngineConfig::default();
        for hex in ["#0000ff", "#ff00ff", "#ff0000", "#00ffff", "#3f51b5"] {
            for button in [false, true] {
                let mut rec = record("transparent", hex);
                rec.button = button;
                let text = decide(&rec, &config).text.unwrap();
                let written = parse(&format(&text)).unwrap();
                assert!(
                    written.l >= 0.75,
                    "{} (button {}): {} written as {}",
                    hex,
                    button,
                    written.l,
                    format(&text)
                );
            }
        }
    }

    #[test]
    fn translucent_text_is_left_alone() {
        let config = EngineConfig::default();
        let decision = decide(&record("#fff", "rgba(0, 0, 0, 0.3)"), &config);
        assert!(decision.text.is_none());
    }

    #[test]
    fn button_text_keeps_more_chroma() {
        let config = EngineConfig::default();
        let mut plain = record("#ffffff", "#d32f2f");
        let plain_text = decide(&plain, &config).text.unwrap();
        plain.button = true;
        let button_text = decide(&plain, &config).text.unwrap();
        assert!(button_text.c > plain_text.c);
    }

    // =====================================================================
    // Icons
    // =====================================================================

    #[test]
    fn svg_fill_and_stroke_use_icon_bounds() {
        let config = EngineConfig::default();
        let mut rec = record("transparent", "#000");
        rec.fill = Some("#000000".to_string());
        rec.stroke = Some("#333333".to_string());
        let decision = decide(&rec, &config);
        let fill = decision.fill.unwrap();
        let stroke = decision.stroke.unwrap();
        assert!(fill.l >= 0.70);
        assert!(stroke.l >= 0.70);
    }

    #[test]
    fn written_icons_keep_the_floor() {
        let config = EngineConfig::default();
        for hex in ["#ffff00", "#00ff00", "#ffffff", "#ff8800"] {
            let mut rec = record("transparent", "#000");
            rec.fill = Some(hex.to_string());
            rec.stroke = Some(hex.to_string());
            let decision = decide(&rec, &config);
            for color in [decision.fill.unwrap(), decision.stroke.unwrap()] {
                let written = parse(&format(&color)).unwrap();
                assert!(written.l >= 0.70, "{}: {}", hex, written.l);
            }
        }
    }

    #[test]
    fn icon_ceiling_on_light_background() {
        let mut config = EngineConfig::default();
        config.background.estimate = 0.8;
        let mut rec = record("transparent", "#000");
        rec.fill = Some("#ffffff".to_string());
        let fill = decide(&rec, &config).fill.unwrap();
        assert!(fill.l <= 0.30, "got {}", fill.l);
    }

    #[test]
    fn fill_none_is_skipped() {
        let config = EngineConfig::default();
        let mut rec = record("transparent", "transparent");
        rec.fill = Some("none".to_string());
        let decision = decide(&rec, &config);
        assert!(decision.fill.is_none());
        assert!(decision.is_empty());
    }
}
