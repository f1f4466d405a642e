#![deny(future_incompatible)]
#![deny(nonstandard_style)]
#![deny(clippy::pedantic)]
#![allow(
    clippy::case_sensitive_file_extension_comparisons,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::collapsible_if,
    clippy::let_underscore_untyped,
    clippy::many_single_char_names,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{bail, ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use log::info;
use nalgebra as na;
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use approx::{assert_abs_diff_eq, assert_ulps_eq};

mod color;
mod io;
mod math;
mod pt;

use color::*;
use math::*;

const PI: f32 = std::f32::consts::PI;
const TAU: f32 = std::f32::consts::TAU;
const INV_PI: f32 = std::f32::consts::FRAC_1_PI;

/// Tile size for the spiral block generator (§6 defaults).
const TILE_SIZE: u32 = 32;

/// Deterministic base seed for every worker's Sobol sampler clone (§5:
/// "final bitmap results are deterministic given a deterministic sampler").
const SAMPLER_SEED: u64 = 0;

#[derive(clap::Parser)]
#[clap(author, version)]
struct CliArgs {
    /// Scene name, resolved to ./scenes/<name>/<name>.obj and .ron.
    scene: String,

    #[arg(short = 't', long)]
    threads: Option<usize>,

    #[arg(short = 's', long, default_value_t = 64)]
    spp: u32,

    /// Accepted, currently a no-op since no on-screen viewer is built (§5).
    #[arg(long)]
    no_gui: bool,

    /// Select the bidirectional integrator (default: unidirectional path integrator).
    #[arg(long)]
    bdpt: bool,
}

impl CliArgs {
    fn validate(&self) -> Result<()> {
        if self.spp == 0 {
            bail!("--spp must be greater than 0");
        }
        if let Some(threads) = self.threads {
            if threads == 0 {
                bail!("--threads must be greater than 0");
            }
        }
        Ok(())
    }
}

fn main() {
    env_logger::init();

    use clap::Parser;
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(-1);
        }
    };
    if let Err(err) = args.validate() {
        eprintln!("error: {err:#}");
        std::process::exit(-1);
    }

    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("building the rayon thread pool")?;
    }

    let scene_dir = PathBuf::from("scenes").join(&args.scene);
    let scene = pt::Scene::load(&scene_dir, &args.scene)?;
    info!(
        "loaded scene {} ({} lights, {}x{})",
        args.scene,
        scene.lights().len(),
        scene.camera().width(),
        scene.camera().height()
    );

    let size = (scene.camera().width(), scene.camera().height());

    let timer = Instant::now();
    let main_image = if args.bdpt {
        render_pass(&scene, size, args.spp, |scene, sampler, film| {
            let sample = pt::bdpt_li(scene, sampler, film);
            (sample.l, sample.splats)
        })
    } else {
        render_pass(&scene, size, args.spp, |scene, sampler, film| {
            let ray = scene.camera().sample_ray(film.0, film.1);
            let l = pt::path_li(scene, sampler, ray, pt::PATH_MAX_DEPTH);
            (l, Vec::new())
        })
    };
    info!(
        "rendered {} at {} spp in {:.2}s ({:.1} Mrays/s)",
        args.scene,
        args.spp,
        timer.elapsed().as_secs_f32(),
        (u64::from(size.0) * u64::from(size.1) * u64::from(args.spp)) as f32
            / timer.elapsed().as_secs_f32()
            / 1.0e6
    );

    let albedo_image = render_pass(&scene, size, 1, |scene, _sampler, film| {
        let ray = scene.camera().sample_ray(film.0, film.1);
        (pt::base_color_li(scene, &ray), Vec::new())
    });
    let normal_image = render_pass(&scene, size, 1, |scene, _sampler, film| {
        let ray = scene.camera().sample_ray(film.0, film.1);
        (pt::geometry_li(scene, &ray), Vec::new())
    });

    io::write_exr(&scene_dir.join("result.exr"), &main_image, size)?;
    io::write_png(&scene_dir.join("result.png"), &main_image, size)?;
    io::write_png(&scene_dir.join("albedo.png"), &albedo_image, size)?;
    io::write_png(&scene_dir.join("normal.png"), &normal_image, size)?;

    Ok(())
}

/// Tile-parallel render loop (§5): each tile owns a cloned [`pt::Sampler`] and
/// a local [`pt::ImageBlock`] merged into the global sample block on
/// completion; `sample_fn`'s splats (non-empty only for BDPT's `t = 1`
/// strategy) go straight into a separate global splat block since they may
/// target pixels outside the tile currently being rendered.
fn render_pass(
    scene: &pt::Scene,
    size: (u32, u32),
    spp: u32,
    sample_fn: impl Fn(&pt::Scene, &mut pt::Sampler, (f32, f32)) -> (ColorRgb, Vec<(Point2, ColorRgb)>)
        + Sync,
) -> Vec<ColorRgb> {
    let tiles = pt::BlockGenerator::new(size, TILE_SIZE).collect_all();
    let filter = scene.filter();
    let base_sampler = pt::Sampler::new_sobol(SAMPLER_SEED);

    let sample_block = pt::ImageBlock::new((0, 0), size);
    let splat_block = pt::ImageBlock::new((0, 0), size);

    let pb = indicatif::ProgressBar::new(tiles.len() as u64).with_style(
        indicatif::ProgressStyle::with_template("{wide_bar} tiles={pos}/{len} elapsed={elapsed_precise}")
            .expect("valid progress bar template"),
    );

    tiles.par_iter().for_each(|&(offset, tile_size)| {
        let local = pt::ImageBlock::new(offset, tile_size);
        let mut sampler = base_sampler.clone();

        for y in 0..tile_size.1 {
            for x in 0..tile_size.0 {
                let px = offset.0 as u32 + x;
                let py = offset.1 as u32 + y;

                for sample_index in 0..spp {
                    sampler.start_pixel_sample((px, py), sample_index, SAMPLER_SEED);
                    let jitter = sampler.sample_pixel_2d();
                    let film = (px as f32 + jitter.0, py as f32 + jitter.1);

                    let (l, splats) = sample_fn(scene, &mut sampler, film);
                    if l.is_finite() {
                        let local_pos = point![film.0 - offset.0 as f32, film.1 - offset.1 as f32];
                        local.put(local_pos, l, filter);
                    }
                    for (pos, value) in splats {
                        if value.is_finite() {
                            splat_block.put(pos, value, filter);
                        }
                    }
                }
            }
        }

        sample_block.merge(&local);
        pb.inc(1);
    });
    pb.finish_and_clear();

    sample_block.merge(&splat_block);
    sample_block.to_image()
}
