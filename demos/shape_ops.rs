//! Apply boolean operation to a pair of shapes given as SVG paths
#![deny(warnings)]

use shapegeom::*;
use std::{env, fs::File, io::Read};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    op: ShapeOp,
    first: String,
    second: String,
    checked: bool,
    json: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut op = None;
        let mut inputs = Vec::new();
        let mut checked = false;
        let mut json = false;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "shape_ops".to_owned());
        for arg in args {
            match arg.as_ref() {
                "-h" => {
                    op = None;
                    break;
                }
                "-c" => checked = true,
                "-j" => json = true,
                _ if op.is_none() => {
                    op = Some(match arg.as_ref() {
                        "add" => ShapeOp::Add,
                        "subtract" => ShapeOp::Subtract,
                        "intersect" => ShapeOp::Intersect,
                        _ => return Err(format!("unknown operation: {}", arg).into()),
                    })
                }
                _ => inputs.push(arg),
            }
        }
        match (op, inputs.as_slice()) {
            (Some(op), [first, second]) => Ok(Args {
                op,
                first: first.clone(),
                second: second.clone(),
                checked,
                json,
            }),
            _ => {
                eprintln!("Apply boolean operation to a pair of shapes");
                eprintln!("\nUSAGE:");
                eprintln!("    {} [-c] [-j] <add|subtract|intersect> <first> <second>", cmd);
                eprintln!("\nARGS:");
                eprintln!("    -c          fail instead of returning degraded result");
                eprintln!("    -j          print result as JSON");
                eprintln!("    <first>     SVG path data or file containing it ('-' means stdin)");
                eprintln!("    <second>    SVG path data or file containing it");
                std::process::exit(1);
            }
        }
    }
}

/// Load path from the argument, which is either path data or a file name
fn path_load(input: &str) -> Result<Path, Error> {
    let mut contents = String::new();
    if input == "-" {
        std::io::stdin().read_to_string(&mut contents)?;
    } else if std::path::Path::new(input).is_file() {
        File::open(input)?.read_to_string(&mut contents)?;
    } else {
        contents.push_str(input);
    }
    Ok(tracing::debug_span!("[parse]").in_scope(|| contents.parse())?)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let first = path_load(&args.first)?;
    let second = path_load(&args.second)?;
    tracing::debug!(
        "[path:segments_count] {} {}",
        first.segments().count(),
        second.segments().count()
    );

    let result = if args.checked {
        match args.op {
            ShapeOp::Add => ShapeMaker::try_add(&first, &second)?,
            ShapeOp::Subtract => ShapeMaker::try_subtract(&first, &second)?,
            ShapeOp::Intersect => ShapeMaker::try_intersect(&first, &second)?,
        }
    } else {
        ShapeMaker::apply_op(args.op, &first, &second)
    };
    tracing::debug!("[result:area] {}", result.area());

    if args.json {
        let value = serde_json::json!({
            "op": args.op.to_string(),
            "path": result,
            "bounds": result.bounds(),
            "area": result.area(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", result.to_svg_string());
    }
    Ok(())
}
