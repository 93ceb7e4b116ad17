/*
 *
 *  *
 *  *      Copyright (c) 2018-2025, SnackCloud All rights reserved.
 *  *
 *  *   Redistribution and use in source and binary forms, with or without
 *  *   modification, are permitted provided that the following conditions are met:
 *  *
 *  *   Redistributions of source code must retain the above copyright notice,
 *  *   this list of conditions and the following disclaimer.
 *  *   Redistributions in binary form must reproduce the above copyright
 *  *   notice, this list of conditions and the following disclaimer in the
 *  *   documentation and/or other materials provided with the distribution.
 *  *   Neither the name of the www.snackcloud.cn developer nor the names of its
 *  *   contributors may be used to endorse or promote products derived from
 *  *   this software without specific prior written permission.
 *  *   Author: SnackCloud
 *  *
 *
 */

use clap::Parser;
use tracing_subscriber::EnvFilter;
use crown_codegen::config::AutoGenerator;
use crown_codegen::preset::crown_preset;

#[derive(Parser, Debug)]
#[command(author = "Caratacus", version, about = "Crown MySQL Code Generator CLI Tool")]
struct Args {
    /// Path to a YAML configuration file, the crown preset runs without it
    #[arg(short, long)]
    config: Option<String>,

    /// Replace the output directory of the selected configuration
    #[arg(short, long)]
    output_dir: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    print_copyright();
    let args = Args::parse();

    let mut generator = match args.config {
        Some(path) => AutoGenerator::load(&path)?,
        None => crown_preset(),
    };
    if let Some(dir) = args.output_dir {
        generator.global_mut().set_output_dir(dir);
    }

    let report = generator.execute()?;
    eprintln!("AutoGenerator executed successfully, {} files written", report.files().len());
    if let Some(abc) = report.cfg().get("abc") {
        eprintln!("{}", abc.as_str().map(ToString::to_string).unwrap_or_else(|| abc.to_string()));
    }
    Ok(())
}

fn print_copyright() {
    eprintln!(
        r#"
  ██████╗██████╗  ██████╗ ██╗    ██╗███╗   ██╗
 ██╔════╝██╔══██╗██╔═══██╗██║    ██║████╗  ██║
 ██║     ██████╔╝██║   ██║██║ █╗ ██║██╔██╗ ██║
 ██║     ██╔══██╗██║   ██║██║███╗██║██║╚██╗██║
 ╚██████╗██║  ██║╚██████╔╝╚███╔███╔╝██║ ╚████║
  ╚═════╝╚═╝  ╚═╝ ╚═════╝  ╚══╝╚══╝ ╚═╝  ╚═══╝
 Crown - MySQL Code Generator

 License : MIT
  "#
    );
}
