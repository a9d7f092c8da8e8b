//! Command handlers. Each one writes text or JSON to the given writer.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::debug;
use serde::Serialize;
use umbra_color::{adjust_with, contrast_ratio, format, parse, relative_luminance, AdjustPolicy};
use umbra_dom::{PageDump, PageSpec};
use umbra_engine::stylesheet::build_rule_block;
use umbra_engine::transform::invert;
use umbra_engine::{
    generate, Controller, EngineConfig, MemoryCache, PassReport, RestoreReport, Transition,
};

use super::{ColorArgs, ContrastArgs, PageArgs, VarsArgs};

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// ─── color ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorReport {
    pub input: String,
    pub hex: String,
    pub lightness: f64,
    pub chroma: f64,
    pub hue: Option<f64>,
    pub alpha: f64,
    pub luminance: f64,
    /// The variable-override transform of this color.
    pub inverted: String,
}

pub fn color<W: Write>(
    args: &ColorArgs,
    json: bool,
    config: &EngineConfig,
    out: &mut W,
) -> Result<()> {
    let color = parse(&args.color).with_context(|| format!("parsing {:?}", args.color))?;
    let report = ColorReport {
        input: args.color.clone(),
        hex: format(&color),
        lightness: color.l,
        chroma: color.c,
        hue: color.h,
        alpha: color.alpha(),
        luminance: relative_luminance(&color),
        inverted: format(&invert(color, config.variable_chroma)),
    };

    if json {
        return write_json(out, &report);
    }
    writeln!(out, "{}", report.hex)?;
    writeln!(
        out,
        "  oklch      {:.4} {:.4} {}",
        report.lightness,
        report.chroma,
        report
            .hue
            .map(|h| format!("{:.2}", h))
            .unwrap_or_else(|| "none".to_string())
    )?;
    writeln!(out, "  alpha      {:.3}", report.alpha)?;
    writeln!(out, "  luminance  {:.4}", report.luminance)?;
    writeln!(out, "  inverted   {}", report.inverted)?;
    Ok(())
}

// ─── contrast ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContrastReport {
    pub foreground: String,
    pub background: String,
    pub ratio: f64,
    pub target: f64,
    pub passes: bool,
    pub adjusted: String,
    pub adjusted_ratio: f64,
}

pub fn contrast<W: Write>(
    args: &ContrastArgs,
    json: bool,
    config: &EngineConfig,
    out: &mut W,
) -> Result<()> {
    let fg = parse(&args.foreground).with_context(|| format!("parsing {:?}", args.foreground))?;
    let bg = parse(&args.background).with_context(|| format!("parsing {:?}", args.background))?;
    if !(1.0..=21.0).contains(&args.target) {
        bail!("target must be between 1 and 21, got {}", args.target);
    }

    let bg_lum = relative_luminance(&bg);
    let ratio = contrast_ratio(relative_luminance(&fg), bg_lum);
    let policy = AdjustPolicy {
        target: args.target,
        ..config.contrast.policy()
    };
    let adjusted = adjust_with(fg, bg_lum, &policy);

    let report = ContrastReport {
        foreground: format(&fg),
        background: format(&bg),
        ratio,
        target: args.target,
        passes: ratio >= args.target,
        adjusted: format(&adjusted),
        adjusted_ratio: contrast_ratio(relative_luminance(&adjusted), bg_lum),
    };

    if json {
        return write_json(out, &report);
    }
    writeln!(
        out,
        "{} on {}: {:.2}:1 ({} {:.1})",
        report.foreground,
        report.background,
        report.ratio,
        if report.passes { "meets" } else { "below" },
        report.target
    )?;
    if !report.passes {
        writeln!(
            out,
            "adjusted: {} at {:.2}:1",
            report.adjusted, report.adjusted_ratio
        )?;
    }
    Ok(())
}

// ─── vars ───────────────────────────────────────────────────────────────────

fn read_variable_map(path: &Path) -> Result<BTreeMap<String, String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let map = match extension.as_deref() {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?,
        _ => bail!("{}: expected a .yaml, .yml or .json file", path.display()),
    };
    Ok(map)
}

pub fn vars<W: Write>(
    args: &VarsArgs,
    json: bool,
    config: &EngineConfig,
    out: &mut W,
) -> Result<()> {
    let map = read_variable_map(&args.file)?;
    let names: Vec<&String> = map.keys().collect();
    let overrides = generate(|name| map.get(name).cloned(), &names, config.variable_chroma);
    debug!("{} of {} variables overridden", overrides.len(), map.len());

    if args.block {
        let css = build_rule_block(config, &overrides);
        // Under --json the block is emitted as one JSON string.
        if json {
            return write_json(out, &css);
        }
        write!(out, "{}", css)?;
        return Ok(());
    }
    if json {
        return write_json(out, &overrides);
    }
    for declaration in &overrides {
        writeln!(out, "{}", declaration)?;
    }
    Ok(())
}

// ─── page ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub activation: PassReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<RestoreReport>,
    pub page: PageDump,
}

pub fn page<W: Write>(
    args: &PageArgs,
    json: bool,
    config: &EngineConfig,
    out: &mut W,
) -> Result<()> {
    let spec = PageSpec::from_file(&args.file)
        .with_context(|| format!("loading page {}", args.file.display()))?;
    let mut doc = spec.build()?;
    let mut controller = Controller::new(config.clone(), MemoryCache::new());

    let activation = match controller.activate(&mut doc)? {
        Transition::Activated(report) => report,
        other => bail!("unexpected transition on a fresh page: {:?}", other),
    };
    let restore = if args.deactivate {
        match controller.deactivate(&mut doc)? {
            Transition::Deactivated(report) => Some(report),
            other => bail!("unexpected transition while active: {:?}", other),
        }
    } else {
        None
    };

    let report = PageReport {
        activation,
        restore,
        page: doc.dump(),
    };

    if json {
        return write_json(out, &report);
    }
    writeln!(
        out,
        "activated: {} elements, {} backgrounds, {} texts, {} fills, {} strokes",
        report.activation.visited,
        report.activation.backgrounds,
        report.activation.texts,
        report.activation.fills,
        report.activation.strokes
    )?;
    if let Some(restore) = &report.restore {
        writeln!(out, "deactivated: {} elements restored", restore.restored)?;
    }
    write!(out, "{}", serde_yaml::to_string(&report.page)?)?;
    Ok(())
}
