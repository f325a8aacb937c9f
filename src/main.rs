use std::{
    io::{Read, Write},
    path::Path,
    process::{Command as Process, Stdio},
};

use anyhow::{bail, Context, Result};
use clap::{arg, command, ArgAction, ArgMatches, Command};

use huffpack::{build_tree, render, Compressor, Decompressor, HuffmanTree};

fn main() -> Result<()> {
    let matches = command!()
        .arg(
            arg!(-v --verbose "Report progress on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("compress")
                .about("Huffman-code stdin (or --input) to stdout (or --output)")
                .arg(arg!(-g --graph <PATH> "Draw the Huffman tree to PATH").required(false))
                .arg(arg!(-i --input <FILE> "Read from FILE instead of stdin").required(false))
                .arg(arg!(-o --output <FILE> "Write to FILE instead of stdout").required(false)),
        )
        .subcommand(
            Command::new("decompress")
                .about("Restore the original bytes of a compressed artifact")
                .arg(arg!(-i --input <FILE> "Read from FILE instead of stdin").required(false))
                .arg(arg!(-o --output <FILE> "Write to FILE instead of stdout").required(false)),
        )
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("compress") {
        let log = logger(matches);
        let input = read_input(matches)?;

        if let Some(path) = matches.get_one::<String>("graph") {
            match build_tree(&input) {
                Some(tree) => write_graph(path, &tree)?,
                None => log("Empty input has no tree to draw".to_string()),
            }
        }

        let output = Compressor::new(log).compress(&input)?;
        write_output(matches, &output)?;
    } else if let Some(matches) = matches.subcommand_matches("decompress") {
        let log = logger(matches);
        let input = read_input(matches)?;
        let output = Decompressor::new(log).decompress(&input)?;
        write_output(matches, &output)?;
    }

    Ok(())
}

fn logger(matches: &ArgMatches) -> impl Fn(String) + Copy {
    let verbose = matches.get_one::<bool>("verbose").copied().unwrap_or(false);
    move |msg: String| {
        if verbose {
            eprintln!("{msg}");
        }
    }
}

fn read_input(matches: &ArgMatches) -> Result<Vec<u8>> {
    match matches.get_one::<String>("input") {
        Some(path) => std::fs::read(path).with_context(|| format!("Couldn't read {path}")),
        None => {
            let mut input = Vec::new();
            std::io::stdin().lock().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}

fn write_output(matches: &ArgMatches, data: &[u8]) -> Result<()> {
    match matches.get_one::<String>("output") {
        Some(path) => std::fs::write(path, data).with_context(|| format!("Couldn't write {path}")),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn write_graph<P: AsRef<Path>>(path: P, tree: &HuffmanTree) -> Result<()> {
    let path = path.as_ref();
    let dot = render::to_dot(tree);

    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("svg");
    if format == "dot" || format == "gv" {
        std::fs::write(path, dot).with_context(|| format!("Couldn't write {}", path.display()))?;
        return Ok(());
    }

    let mut child = Process::new("dot")
        .arg(format!("-T{format}"))
        .arg("-o")
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()
        .context("Couldn't run graphviz `dot`")?;
    {
        let mut stdin = child.stdin.take().context("No stdin for `dot`")?;
        stdin.write_all(dot.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        bail!("`dot` failed with {status}");
    }
    Ok(())
}
