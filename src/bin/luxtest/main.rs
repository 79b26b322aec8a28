//! luxtest CLI - Inspect, check and rewrite time-sampled `.usda` light scenes.

use anyhow::{bail, Context, Result};
use luxtest::core::{FrameRange, SdfPath};
use luxtest::describe::{describe_paths, summarize_light, write_descriptions, ErrorMode};
use luxtest::layer::{apply_overrides, Layer, Overrides, Prim, Property};
use luxtest::settings::Settings;
use luxtest::usda::{fmt_value, read_layer, read_layers, serialize, write_layer};
use serde_json::{json, Map, Value as Json};
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BUILD_DATE: &str = env!("LUXTEST_BUILD_DATE");
const BUILD_TIME: &str = env!("LUXTEST_BUILD_TIME");

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "warn",
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    if let Err(e) = run(&filtered_args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn run(args: &[&str]) -> Result<()> {
    match args[0] {
        "info" | "i" => cmd_info(arg(args, 1, "info <file.usda>")?),
        "tree" | "t" => cmd_tree(arg(args, 1, "tree <file.usda>")?),
        "dump" | "d" => {
            let file = arg(args, 1, "dump <file.usda> [pattern] [--json]")?;
            let json_mode = args.iter().any(|&s| s == "--json" || s == "-j");
            let pattern = args.get(2).filter(|&&s| s != "--json" && s != "-j").copied();
            cmd_dump(file, pattern, json_mode)
        }
        "resolve" | "r" => {
            let usage = "resolve <file.usda> <prim> <attribute> [start:end]";
            let frames = args.get(4).map(|s| s.parse::<FrameRange>()).transpose()?;
            cmd_resolve(arg(args, 1, usage)?, arg(args, 2, usage)?, arg(args, 3, usage)?, frames)
        }
        "copy" | "c" => {
            let usage = "copy <in.usda> <out.usda>";
            cmd_copy(arg(args, 1, usage)?, arg(args, 2, usage)?)
        }
        "override" | "o" => {
            let usage = "override <in.usda> <overrides.json> <out.usda> [--no-defaults]";
            let defaults = !args.contains(&"--no-defaults");
            cmd_override(arg(args, 1, usage)?, arg(args, 2, usage)?, arg(args, 3, usage)?, defaults)
        }
        "describe" => cmd_describe(&args[1..]),
        "check" => {
            if args.len() < 2 {
                bail!("missing file arguments\nUsage: luxtest check <file.usda>...");
            }
            cmd_check(&args[1..])
        }
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "version" | "-V" | "--version" => {
            println!("luxtest {VERSION} (built {BUILD_DATE} {BUILD_TIME})");
            Ok(())
        }

        // Default: if file exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other)
            } else {
                print_help();
                bail!("unknown command: {other}")
            }
        }
    }
}

fn arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str> {
    match args.get(index) {
        Some(value) => Ok(value),
        None => bail!("missing argument\nUsage: luxtest {usage}"),
    }
}

fn print_help() {
    println!("luxtest - time-sampled USD layer toolkit");
    println!();
    println!("USAGE:");
    println!("    luxtest [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info     <file>                         Show layer metadata and counts");
    println!("    t, tree     <file>                         Show the prim hierarchy");
    println!("    d, dump     <file> [pattern] [--json]      Dump attributes (filter prims by pattern)");
    println!("    r, resolve  <file> <prim> <attr> [s:e]    Resolve an attribute on each frame");
    println!("    c, copy     <in> <out>                     Parse and re-serialize a layer");
    println!("    o, override <in> <json> <out>              Apply an override file to a layer");
    println!("    describe    <path> [-r] [-e warn] [--json <out>]");
    println!("                                               Describe animated light parameters");
    println!("    check       <files...>                     Parse layers and verify round-trips");
    println!("    h, help                                    Show this help");
    println!("    version                                    Show version and build time");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show warnings and errors");
    println!();
    println!("EXAMPLES:");
    println!("    luxtest info usd/rect_light.usda");
    println!("    luxtest resolve usd/rect_light.usda /lights/rect_light inputs:intensity 1:31");
    println!("    luxtest override usd/rect_light.usda gap.json out/rect_light.usda");
    println!("    luxtest describe usd -r --json light_descriptions.json");
    println!();
    println!("NOTES:");
    println!("    - Passing a .usda file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - Settings are read from $LUXTEST_SETTINGS or the user config directory");
}

fn open(path: &str) -> Result<Layer> {
    info!("Opening layer: {}", path);
    let layer = read_layer(path)?;
    debug!("{} prims, {} attributes", layer.num_prims(), layer.num_attributes());
    Ok(layer)
}

fn cmd_info(path: &str) -> Result<()> {
    let layer = open(path)?;
    let settings = Settings::load();

    println!("Layer: {}", path);
    println!("Version: {}", layer.version());
    match layer.frame_range() {
        Some(range) => println!("Frames: {}", range),
        None => println!("Frames: (not set)"),
    }
    if let Some(fps) = layer.frames_per_second() {
        println!("FPS: {}", fps);
    }
    if let Some(axis) = layer.up_axis() {
        println!("Up axis: {}", axis);
    }
    if let Some(prim) = layer.default_prim() {
        println!("Default prim: {}", prim);
    }
    println!();

    let lights: Vec<SdfPath> = layer
        .traverse()
        .filter(|(_, prim)| settings.is_light_name(prim.name()))
        .map(|(path, _)| path)
        .collect();
    println!("Prims:      {}", layer.num_prims());
    println!("Attributes: {} ({} sampled)", layer.num_attributes(), layer.num_sampled_attributes());
    println!("Lights:     {}", lights.len());
    for light in &lights {
        println!("  {}", light);
    }
    Ok(())
}

fn cmd_tree(path: &str) -> Result<()> {
    let layer = open(path)?;
    println!("Layer: {}", path);
    println!();
    for prim in layer.prims() {
        print_tree(prim, 0);
    }
    Ok(())
}

fn print_tree(prim: &Prim, depth: usize) {
    let indent = "  ".repeat(depth);
    let sampled = prim.attributes().filter(|a| a.is_sampled()).count();
    match (prim.type_name(), sampled) {
        (Some(ty), 0) => println!("{}{} [{}]", indent, prim.name(), ty),
        (Some(ty), n) => println!("{}{} [{}] ({} animated)", indent, prim.name(), ty, n),
        (None, _) => println!("{}{}", indent, prim.name()),
    }
    for child in prim.children() {
        print_tree(child, depth + 1);
    }
}

fn cmd_dump(path: &str, pattern: Option<&str>, json_mode: bool) -> Result<()> {
    let layer = open(path)?;
    let prims = layer
        .traverse()
        .filter(|(path, _)| pattern.is_none_or(|p| path.as_str().contains(p)));

    if json_mode {
        let mut out = Map::new();
        for (prim_path, prim) in prims {
            let mut attrs = Map::new();
            for attr in prim.attributes() {
                let mut entry = Map::new();
                entry.insert("type".into(), json!(attr.value_type().to_string()));
                if let Some(value) = attr.default_value() {
                    entry.insert("default".into(), value.to_json());
                }
                if let Some(samples) = attr.time_samples() {
                    let samples: Vec<Json> = samples.iter().map(|(t, v)| json!([t.value(), v.to_json()])).collect();
                    entry.insert("samples".into(), Json::Array(samples));
                }
                attrs.insert(attr.name().to_string(), Json::Object(entry));
            }
            out.insert(prim_path.to_string(), Json::Object(attrs));
        }
        println!("{}", serde_json::to_string_pretty(&Json::Object(out))?);
        return Ok(());
    }

    for (prim_path, prim) in prims {
        println!("{} [{}]", prim_path, prim.type_name().unwrap_or("-"));
        for property in prim.properties() {
            match property {
                Property::Attribute(attr) => {
                    let default = attr.default_value().map(|v| format!(" = {}", fmt_value(v))).unwrap_or_default();
                    println!("  {} {}{}", attr.value_type(), attr.name(), default);
                    if let Some(samples) = attr.time_samples() {
                        for (time, value) in samples.iter() {
                            println!("      {}: {}", time, fmt_value(value));
                        }
                    }
                }
                Property::Relationship(rel) => {
                    let targets: Vec<String> = rel.targets().unwrap_or_default().iter().map(|p| format!("<{p}>")).collect();
                    println!("  rel {} = [{}]", rel.name(), targets.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn cmd_resolve(path: &str, prim: &str, attr_name: &str, frames: Option<FrameRange>) -> Result<()> {
    let layer = open(path)?;
    let prim_path = SdfPath::new(prim)?;
    let attr = layer.attribute_at(&prim_path, attr_name)?;

    let times: Vec<f64> = match frames.or_else(|| layer.frame_range()) {
        Some(range) => range.iter_frames().map(|f| f as f64).collect(),
        None if attr.is_sampled() => attr.sample_times().into_iter().map(|t| t.value()).collect(),
        None => vec![0.0],
    };
    println!("{}.{}", prim_path, attr_name);
    for time in times {
        println!("  {}: {}", time, fmt_value(attr.get(time)?));
    }
    Ok(())
}

fn cmd_copy(input: &str, output: &str) -> Result<()> {
    let layer = open(input)?;
    write_layer(output, &layer)?;
    info!("Wrote {}", output);
    Ok(())
}

fn cmd_override(input: &str, overrides_path: &str, output: &str, defaults: bool) -> Result<()> {
    let layer = open(input)?;
    let mut overrides = if defaults {
        Settings::load().overrides()
    } else {
        Overrides::new()
    };
    overrides.extend(Overrides::from_file(overrides_path)?);
    debug!("{} attribute overrides, {} gaps", overrides.attributes.len(), overrides.gaps.len());

    let result = apply_overrides(&layer, &overrides).with_context(|| format!("applying {overrides_path}"))?;
    write_layer(output, &result)?;
    info!("Wrote {}", output);
    Ok(())
}

fn cmd_describe(args: &[&str]) -> Result<()> {
    let mut path = None;
    let mut recurse = false;
    let mut mode = ErrorMode::Raise;
    let mut json_out = None;

    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        match arg {
            "-r" | "--recurse" => recurse = true,
            "-e" | "--errors" => {
                let value = iter.next().context("--errors needs a value (raise or warn)")?;
                mode = value.parse()?;
            }
            "--json" => json_out = Some(*iter.next().context("--json needs an output path")?),
            other if path.is_none() => path = Some(other),
            other => bail!("unexpected argument: {other}"),
        }
    }
    let Some(path) = path else {
        bail!("missing path argument\nUsage: luxtest describe <path> [-r] [-e raise|warn] [--json <out>]");
    };

    let settings = Settings::load();
    let descriptions = describe_paths(path, recurse, &settings, mode)?;
    println!("Got {} descriptions", descriptions.len());
    println!("{}", "=".repeat(80));
    for (light_name, desc) in &descriptions {
        println!();
        println!("{light_name}:");
        println!("{}", summarize_light(light_name, desc));
    }
    println!("{}", "=".repeat(80));

    if let Some(out) = json_out {
        info!("Writing as json: {}", out);
        write_descriptions(out, &descriptions)?;
    }
    Ok(())
}

fn cmd_check(paths: &[&str]) -> Result<()> {
    let mut failed = 0;
    for (path, result) in paths.iter().zip(read_layers(paths)) {
        let status = result.map_err(anyhow::Error::from).and_then(|layer| check_round_trip(&layer));
        match status {
            Ok(()) => println!("ok    {}", path),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {e:#}", path);
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} layers failed", paths.len());
    }
    Ok(())
}

/// Serializing, reparsing and serializing again must be lossless.
fn check_round_trip(layer: &Layer) -> Result<()> {
    let text = serialize(layer);
    let reparsed = luxtest::usda::parse(&text).context("reparsing serialized layer")?;
    if &reparsed != layer {
        bail!("reparsed layer differs from the original");
    }
    if serialize(&reparsed) != text {
        bail!("serialization is not stable");
    }
    Ok(())
}
