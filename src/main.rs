//! pixelforthc - command line driver for the pixelforth engine.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pixelforth::{render_rgb, write_ppm, Engine, RenderOptions, Vars};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pixelforthc")]
#[command(about = "Compiler and interpreter for the Forth Salon pixel-shader dialect", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a haiku and run it once
    Run {
        /// Source file
        input: Option<PathBuf>,

        /// Source given directly on the command line
        #[arg(short = 'e', long)]
        eval: Option<String>,

        #[arg(short, long, default_value_t = 0.0)]
        x: f64,

        #[arg(short, long, default_value_t = 0.0)]
        y: f64,

        #[arg(short, long, default_value_t = 0.0)]
        t: f64,

        #[arg(long, default_value_t = 0.0)]
        dt: f64,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Print the compiled instruction stream
    Dump {
        /// Source file
        input: Option<PathBuf>,

        /// Source given directly on the command line
        #[arg(short = 'e', long)]
        eval: Option<String>,
    },

    /// Render the haiku over a pixel grid into a PPM image
    Render {
        /// Source file
        input: PathBuf,

        /// Output image path
        #[arg(short, long, default_value = "out.ppm")]
        output: PathBuf,

        #[arg(long, default_value_t = 256)]
        width: u32,

        #[arg(long, default_value_t = 256)]
        height: u32,

        #[arg(short, long, default_value_t = 0.0)]
        t: f64,
    },

    /// Interactive line-at-a-time evaluation
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    match cli.command {
        Commands::Run {
            input,
            eval,
            x,
            y,
            t,
            dt,
            json,
        } => {
            let source = load_source(input, eval)?;
            let mut engine = Engine::compile(&source)?;
            let mut vars = Vars {
                x,
                y,
                t,
                dt,
                ..Default::default()
            };
            engine.run(&mut vars);
            if json {
                print_json(&engine, &vars)?;
            } else {
                print_stacks(&engine, &vars);
            }
        }

        Commands::Dump { input, eval } => {
            let source = load_source(input, eval)?;
            let engine = Engine::compile(&source)?;
            print!("{}", engine.disassemble());
        }

        Commands::Render {
            input,
            output,
            width,
            height,
            t,
        } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let engine = Engine::compile(&source)?;
            let opts = RenderOptions {
                width,
                height,
                t,
                dt: 0.0,
            };
            let image = render_rgb(&engine, &opts);
            let file = File::create(&output)
                .with_context(|| format!("creating {}", output.display()))?;
            write_ppm(BufWriter::new(file), width, height, &image)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("wrote {}x{} image to {}", width, height, output.display());
        }

        Commands::Repl => repl()?,
    }

    Ok(())
}

fn load_source(input: Option<PathBuf>, eval: Option<String>) -> Result<String> {
    match (input, eval) {
        (Some(path), None) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
        }
        (None, Some(code)) => Ok(code),
        (Some(_), Some(_)) => bail!("give either a file or -e, not both"),
        (None, None) => bail!("no input; give a file or -e 'code'"),
    }
}

#[derive(Serialize)]
struct StackDump<'a> {
    d_stack: &'a [f64],
    r_stack: &'a [f64],
}

fn print_json(engine: &Engine, vars: &Vars) -> Result<()> {
    let dump = StackDump {
        d_stack: engine.d_stack(vars),
        r_stack: engine.r_stack(vars),
    };
    println!("{}", serde_json::to_string(&dump)?);
    Ok(())
}

fn print_stacks(engine: &Engine, vars: &Vars) {
    let d = engine.d_stack(vars);
    print!("{} ({}):", "D stack".bold(), d.len());
    for value in d.iter().rev() {
        print!(" {}", format!("{value}").green());
    }
    println!();
    let r = engine.r_stack(vars);
    if !r.is_empty() {
        print!("{} ({}):", "R stack".bold(), r.len());
        for value in r.iter().rev() {
            print!(" {}", format!("{value}").green());
        }
        println!();
    }
}

fn repl() -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("pixelforth repl; each line is a complete haiku. ctrl-d exits.");
    loop {
        match editor.readline("pf> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                match Engine::compile(line) {
                    Ok(mut engine) => {
                        let mut vars = Vars::default();
                        engine.run(&mut vars);
                        print_stacks(&engine, &vars);
                    }
                    Err(err) => eprintln!("{} {}", "error:".red().bold(), err),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
