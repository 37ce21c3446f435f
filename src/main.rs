use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};

use vlsmc::bytecode::disasm::print_object;
use vlsmc::bytecode::object;
use vlsmc::frontend::token_dumper::TokenDumper;
use vlsmc::pipeline::{Compilation, compile};
use vlsmc::render::{self, Listing, RenderInput, Renderer, RouterConfig};
use vlsmc::runtime::{Vm, VmConfig};

#[derive(Parser, Debug)]
#[command(name = "vlsmc")]
#[command(about = "VLSM addressing-language compiler and object VM")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lex, parse and analyze a source file and report diagnostics
    Check { file: PathBuf },

    /// Show tokens only
    Tokens {
        file: PathBuf,
        #[arg(long)]
        no_color: bool,
        #[arg(long)]
        pretty: bool,
        /// Emit the tokens as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the derivation tree of every statement
    Tree {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Print the IR listing
    Ir {
        file: PathBuf,
        /// Show the IR after the peephole pass
        #[arg(long)]
        optimized: bool,
        #[arg(long)]
        json: bool,
    },

    /// Compile a source file to a .vlsmobj object
    Build {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load an object file and print its execution trace
    Run {
        object: PathBuf,
        #[arg(long)]
        no_markers: bool,
    },

    /// Disassemble an object file
    Disasm { object: PathBuf },

    /// Render a source file through a presentation backend
    Render {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Target::Router)]
        target: Target,
        /// Emit the allocation table as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Router,
    Listing,
    Table,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Check { file } => {
            let c = compile_file(&file);
            report(&c);
            println!(
                "{}: {} block(s), {} instruction(s), no errors",
                file.display(),
                c.blocks.len(),
                c.optimized.len()
            );
        }
        Command::Tokens {
            file,
            no_color,
            pretty,
            json,
        } => dump_tokens(&file, no_color, pretty, json),
        Command::Tree { file, json } => {
            let c = compile_file(&file);
            if json {
                print!("{}", json_or_exit(&c.trees[..]));
            } else {
                for tree in &c.trees {
                    print!("{}", tree.render());
                }
            }
            report(&c);
        }
        Command::Ir {
            file,
            optimized,
            json,
        } => {
            let c = compile_file(&file);
            report(&c);
            let ir = if optimized { &c.optimized } else { &c.ir };
            if json {
                print!("{}", json_or_exit(&ir[..]));
            } else {
                print!("{}", render_or_exit(&Listing, RenderInput::Ir(ir)));
            }
        }
        Command::Build { file, output } => {
            let c = compile_file(&file);
            report(&c);
            let bytes = match c.object() {
                Ok(b) => b,
                Err(e) => fail(&format!("Build error: {}", e)),
            };
            let out = output.unwrap_or_else(|| file.with_extension("vlsmobj"));
            if let Err(e) = fs::write(&out, &bytes) {
                fail(&format!("Failed to write '{}': {}", out.display(), e));
            }
            println!("wrote {} ({} bytes)", out.display(), bytes.len());
        }
        Command::Run { object, no_markers } => {
            let bytes = read_bytes(&object);
            let config = VmConfig {
                markers: !no_markers,
            };
            match Vm::load_with_config(&bytes, config) {
                Ok(vm) => {
                    for line in vm.run() {
                        println!("{}", line);
                    }
                }
                Err(e) => fail(&format!("Load error: {}", e)),
            }
        }
        Command::Disasm { object: path } => {
            let bytes = read_bytes(&path);
            match object::decode(&bytes) {
                Ok(obj) => print_object(&obj),
                Err(e) => fail(&format!("Load error: {}", e)),
            }
        }
        Command::Render { file, target, json } => {
            let c = compile_file(&file);
            report(&c);
            print!("{}", render_target(&c, target, json));
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn ensure_extension(path: &Path) {
    if path.extension().and_then(|e| e.to_str()) != Some("vlsm") {
        fail(&format!("Error: expected a .vlsm file, got {}", path.display()));
    }
}

fn read_source(path: &Path) -> String {
    ensure_extension(path);
    fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Failed to read '{}': {}", path.display(), e)))
}

fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| fail(&format!("Failed to read '{}': {}", path.display(), e)))
}

fn compile_file(path: &Path) -> Compilation {
    compile(&read_source(path))
}

/// Prints every diagnostic and exits if there were any.
fn report(c: &Compilation) {
    if c.diagnostics.is_empty() {
        return;
    }
    for d in c.diagnostics.iter() {
        eprintln!("{}", d);
    }
    fail(&format!("{}", c.diagnostics));
}

fn dump_tokens(path: &Path, no_color: bool, pretty: bool, json: bool) {
    let c = compile_file(path);

    if json {
        print!("{}", json_or_exit(&c.tokens[..]));
    } else {
        let mut dumper = TokenDumper::new();
        if no_color {
            dumper = dumper.no_color();
        }
        if pretty {
            dumper = dumper.pretty();
        }
        dumper.dump(&c.tokens);
    }

    for d in c.diagnostics.iter() {
        if let vlsmc::pipeline::Diagnostic::Lex(e) = d {
            eprintln!("Lexer error: {}", e);
        }
    }
}

fn render_target(c: &Compilation, target: Target, json: bool) -> String {
    let subnets = || {
        c.subnets()
            .unwrap_or_else(|e| fail(&format!("Allocation error: {}", e)))
    };

    if json {
        return json_or_exit(&subnets()[..]);
    }

    match target {
        Target::Router => render_or_exit(&RouterConfig::default(), RenderInput::Ir(&c.optimized)),
        Target::Listing => render_or_exit(&Listing, RenderInput::Ir(&c.optimized)),
        Target::Table => render_or_exit(&Listing, RenderInput::Subnets(&subnets())),
    }
}

fn json_or_exit<T: Serialize + ?Sized>(value: &T) -> String {
    render::json(value).unwrap_or_else(|e| fail(&format!("Render error: {}", e)))
}

fn render_or_exit(renderer: &dyn Renderer, input: RenderInput<'_>) -> String {
    renderer
        .render(input)
        .unwrap_or_else(|e| fail(&format!("Render error: {}", e)))
}
