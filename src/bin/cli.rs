// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polyframe B-Rep CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use polyframe_brep::{io, BooleanOp, Kernel, KernelConfig, RepairOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polyframe-brep")]
#[command(about = "Polyframe B-Rep kernel - mesh repair, validation and boolean composition", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Kernel configuration file (TOML); defaults to ./brep.toml when present
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report topological defects of a mesh
    Validate {
        /// Input mesh (.json or .stl)
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Repair a mesh and write the result
    Repair {
        /// Input mesh (.json or .stl)
        input: PathBuf,

        /// Output mesh
        #[arg(short, long)]
        output: PathBuf,

        /// Skip duplicate vertex merging
        #[arg(long)]
        no_weld: bool,

        /// Keep degenerate faces
        #[arg(long)]
        no_degenerate: bool,

        /// Leave holes open
        #[arg(long)]
        no_fill: bool,

        /// Leave face winding as is
        #[arg(long)]
        no_normals: bool,
    },

    /// Combine two solids
    Boolean {
        /// union, intersection, difference or symmetric-difference
        #[arg(value_parser = parse_op)]
        op: BooleanOp,

        /// First operand
        a: PathBuf,

        /// Second operand
        b: PathBuf,

        /// Output mesh
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the effective configuration as TOML
    Config {
        /// Output file
        #[arg(short, long, default_value = "brep.toml")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn parse_op(s: &str) -> Result<BooleanOp, String> {
    BooleanOp::parse(s).ok_or_else(|| format!("unknown boolean operation: {}", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => KernelConfig::from_file(path)?,
        None => KernelConfig::load()?,
    };
    let kernel = Kernel::new(config).context("Invalid kernel configuration")?;

    match cli.command {
        Commands::Validate { input, json } => validate_command(&kernel, &input, json),
        Commands::Repair {
            input,
            output,
            no_weld,
            no_degenerate,
            no_fill,
            no_normals,
        } => {
            let options = RepairOptions {
                remove_duplicate_vertices: !no_weld,
                remove_degenerate_faces: !no_degenerate,
                fill_holes: !no_fill,
                fix_normals: !no_normals,
                ..kernel.config().repair
            };
            repair_command(&kernel, &input, &output, &options)
        }
        Commands::Boolean { op, a, b, output } => boolean_command(&kernel, op, &a, &b, &output, cli.verbose),
        Commands::Config { output } => {
            kernel.config().save(&output)?;
            println!("Wrote configuration to {}", output.display());
            Ok(())
        }
        Commands::Version => {
            println!("Polyframe B-Rep v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_command(kernel: &Kernel, input: &Path, json: bool) -> Result<()> {
    let mesh = io::load_mesh(input)?;
    let report = kernel.validate(&mesh);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        let s = &report.stats;
        println!("{}", input.display().to_string().bold());
        println!("  Vertices:   {}", s.vertices);
        println!("  Faces:      {}", s.faces);
        println!("  Edges:      {}", s.edges);
        println!("  Components: {}", s.components);
        println!("  Volume:     {:.6}", mesh.signed_volume());

        if report.is_valid {
            println!("{} closed, manifold and consistently wound", "✓".green());
        } else {
            for issue in &report.issues {
                println!("{} {}", "✗".red(), issue);
            }
        }
    }

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

fn repair_command(kernel: &Kernel, input: &Path, output: &Path, options: &RepairOptions) -> Result<()> {
    let mesh = io::load_mesh(input)?;
    let outcome = kernel.repair_with(&mesh, options);

    for fix in &outcome.report.fixed {
        println!("{} {}", "✓".green(), fix);
    }
    for issue in &outcome.report.remaining {
        println!("{} {}", "!".yellow(), issue);
    }
    if outcome.report.is_clean() {
        println!("{} nothing to repair", "✓".green());
    }

    io::save_mesh(output, &outcome.mesh)?;
    println!(
        "Wrote {} ({} vertices, {} faces)",
        output.display(),
        outcome.mesh.vertex_count(),
        outcome.mesh.triangle_count()
    );
    Ok(())
}

fn boolean_command(
    kernel: &Kernel,
    op: BooleanOp,
    a: &Path,
    b: &Path,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let mesh_a = io::load_mesh(a)?;
    let mesh_b = io::load_mesh(b)?;

    let start = std::time::Instant::now();
    let result = match kernel.boolean(op, &mesh_a, &mesh_b) {
        Ok(mesh) => mesh,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            std::process::exit(1);
        }
    };

    if verbose {
        println!("{} in {:.2?}", op, start.elapsed());
        println!("Vertices: {}", result.vertex_count());
        println!("Triangles: {}", result.triangle_count());
    }

    io::save_mesh(output, &result)?;
    println!("Successfully wrote {} -> {}", op, output.display());
    Ok(())
}
