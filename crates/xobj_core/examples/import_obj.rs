//! Example: Import and inspect an X-Plane OBJ file.
//!
//! Run with: cargo run --example import_obj -- assets/door.obj

use std::env;

use xobj_core::{load_scene, ImportOptions};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: import_obj <path-to-obj-file>");
        println!("\nExample:");
        println!("  cargo run --example import_obj -- assets/door.obj");
        return;
    }

    let path = &args[1];
    println!("Importing OBJ file: {}", path);

    match load_scene(path, &ImportOptions::default()) {
        Ok((scene, report)) => {
            println!("\n=== Scene: {} ===", scene.name);
            println!("Objects: {}", report.object_count);
            println!("Joints: {}", report.joint_count);
            println!("Meshes: {}", report.mesh_count);
            println!("Total triangles: {}", scene.total_triangle_count());

            println!("\n--- Nodes ---");
            for node in &scene.nodes {
                let kind = if node.is_joint() { "joint" } else { "mesh" };
                println!(
                    "  [{}] {} ({}) at ({:.2}, {:.2}, {:.2}), {} keyframes",
                    node.handle.0,
                    node.name,
                    kind,
                    node.location.x,
                    node.location.y,
                    node.location.z,
                    node.keyframes.len()
                );
            }

            let world_bounds = scene.world_bounds();
            println!("\n--- World Bounds ---");
            println!(
                "  Min: ({:.2}, {:.2}, {:.2})",
                world_bounds.x.min, world_bounds.y.min, world_bounds.z.min
            );
            println!(
                "  Max: ({:.2}, {:.2}, {:.2})",
                world_bounds.x.max, world_bounds.y.max, world_bounds.z.max
            );

            for warning in &report.warnings {
                println!("warning: {}", warning);
            }
        }
        Err(e) => {
            eprintln!("Error importing OBJ file: {}", e);
        }
    }
}
