// Inspect an X-Plane OBJ import
// Run with: cargo run --release -- <file.obj> [--json] [--options <file.json>]

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use xobj_core::{load_scene, ImportOptions, ImportReport, NodeKind, Scene};
use xobj_math::Vec3;

/// Command line settings.
#[derive(Debug, PartialEq)]
struct Args {
    path: PathBuf,
    json: bool,
    options: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut path = None;
    let mut json = false;
    let mut options = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--options" => {
                let file = iter.next().context("--options needs a file argument")?;
                options = Some(PathBuf::from(file));
            }
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            file => {
                if path.replace(PathBuf::from(file)).is_some() {
                    bail!("only one OBJ file can be inspected at a time");
                }
            }
        }
    }

    Ok(Args {
        path: path.context("missing <file.obj>")?,
        json,
        options,
    })
}

fn read_options(path: Option<&PathBuf>) -> Result<ImportOptions> {
    let Some(path) = path else {
        return Ok(ImportOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading options from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing options in {}", path.display()))
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

fn print_summary(scene: &Scene, report: &ImportReport) {
    println!("=== {} ===", scene.name);
    println!("Objects:   {}", report.object_count);
    println!("Joints:    {}", report.joint_count);
    println!("Meshes:    {}", report.mesh_count);
    println!("Keyframes: {}", report.keyframe_count);
    println!("Triangles: {}", scene.total_triangle_count());

    for material in &scene.materials {
        match material.texture.dimensions {
            Some((w, h)) => println!(
                "Texture:   {} ({}x{})",
                material.texture.path.display(),
                w,
                h
            ),
            None => println!("Texture:   {}", material.texture.path.display()),
        }
    }

    println!("\n--- Nodes ---");
    for node in &scene.nodes {
        let parent = node
            .parent
            .and_then(|p| scene.node(p))
            .map(|p| p.name.as_str())
            .unwrap_or("-");
        match &node.kind {
            NodeKind::Joint => println!(
                "  [{}] joint {} at {} parent {}",
                node.handle.0,
                node.name,
                fmt_vec(node.location),
                parent
            ),
            NodeKind::Mesh { mesh, .. } => println!(
                "  [{}] mesh {} at {} parent {}: {} vertices, {} triangles",
                node.handle.0,
                node.name,
                fmt_vec(node.location),
                parent,
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
        }

        for (key, value) in &node.attributes {
            println!("       {} {}", key, value);
        }
        for curve in node.dataref_curves() {
            let samples = node
                .keyframes
                .iter()
                .filter(|k| k.sample.dataref() == curve)
                .count();
            println!(
                "       curve {} {}: {} sample(s)",
                curve.curve, curve.path, samples
            );
        }
    }

    let bounds = scene.world_bounds();
    if !bounds.is_empty() {
        println!(
            "\nBounds: {} to {}",
            fmt_vec(bounds.min()),
            fmt_vec(bounds.max())
        );
    }

    if report.has_warnings() {
        println!("\n--- Warnings ---");
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: xobj_inspect <file.obj> [--json] [--options <file.json>]");
            std::process::exit(2);
        }
    };

    let options = read_options(args.options.as_ref())?;
    log::debug!("Import options: {:?}", options);

    let (scene, report) = load_scene(&args.path, &options)
        .with_context(|| format!("importing {}", args.path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scene)?);
        for warning in &report.warnings {
            eprintln!("warning: {}", warning);
        }
    } else {
        print_summary(&scene, &report);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("xobj_inspect")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["door.obj", "--json"])).unwrap();
        assert_eq!(
            parsed,
            Args {
                path: PathBuf::from("door.obj"),
                json: true,
                options: None,
            }
        );

        let parsed = parse_args(&args(&["--options", "opts.json", "door.obj"])).unwrap();
        assert_eq!(parsed.options, Some(PathBuf::from("opts.json")));
        assert!(!parsed.json);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.obj", "b.obj"])).is_err());
        assert!(parse_args(&args(&["a.obj", "--options"])).is_err());
        assert!(parse_args(&args(&["a.obj", "--verbose"])).is_err());
    }

    #[test]
    fn test_default_options_without_file() {
        assert_eq!(read_options(None).unwrap(), ImportOptions::default());
    }
}
