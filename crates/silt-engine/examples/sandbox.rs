//! Headless sandbox: pours the three materials into a small world and prints
//! ASCII frames to stdout.
//!
//! Run with `cargo run --example sandbox`. Set `RUST_LOG=debug` to see the
//! engine's construction and tick logging.

use anyhow::Result;
use silt_engine::prelude::*;
use tracing_subscriber::EnvFilter;

const WIDTH: i32 = 72;
const HEIGHT: i32 = 24;
const FRAMES: usize = 6;
const TICKS_PER_FRAME: usize = 8;

fn glyph(material: Option<Material>) -> char {
    match material {
        Some(Material::Sand) => '#',
        Some(Material::Liquid) => '~',
        Some(Material::Gas) => '°',
        None => ' ',
    }
}

fn print_frame(world: &World) {
    println!("┌{}┐", "─".repeat(WIDTH as usize));
    for y in 0..HEIGHT {
        let row: String = (0..WIDTH)
            .map(|x| glyph(world.material_at(Point::new(x, y))))
            .collect();
        println!("│{row}│");
    }
    println!(
        "└{}┘ tick {} · {} dots",
        "─".repeat(WIDTH as usize),
        world.tick_count(),
        world.particle_count()
    );
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = World::with_config(
        Point::new(WIDTH, HEIGHT),
        WorldConfig {
            chunk_size: 16,
            seed: Some(0xC0FFEE),
        },
    );

    // A sand pile, a liquid column beside it, and a pocket of gas below.
    for x in 0..16 {
        for y in 0..4 {
            world.add_dot(Point::new(8 + x, y), Material::Sand);
        }
    }
    for x in 0..10 {
        for y in 0..6 {
            world.add_dot(Point::new(40 + x, y), Material::Liquid);
        }
    }
    for x in 0..6 {
        world.add_dot(Point::new(30 + x, HEIGHT - 2), Material::Gas);
    }

    print_frame(&world);
    for _ in 0..FRAMES {
        for _ in 0..TICKS_PER_FRAME {
            world.update();
        }
        print_frame(&world);
    }

    Ok(())
}
