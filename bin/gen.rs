use clap::{Arg, ArgAction, Command};
use std::io::{self, Write};

const FEATURES: [&str; 5] = ["Auth", "Billing", "Search", "Checkout", "Profile"];
const ORIGINS: [&str; 3] = ["Prod", "Staging", "QA"];

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Generate a synthetic defect log")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("labels")
                .long("labels")
                .help("Emit label blocks instead of CSV")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("multiline")
                .long("multiline")
                .help("Put quoted line breaks and commas in the steps column")
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("delim").long("delim").default_value(","))
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let multiline = matches.get_flag("multiline");
    let delim = matches.get_one::<String>("delim").unwrap().as_str();

    let mut out = io::BufWriter::new(io::stdout().lock());

    if matches.get_flag("labels") {
        for i in 0..rows {
            if i > 0 {
                writeln!(&mut out, "-----")?;
            }
            write_block(&mut out, i)?;
        }
    } else {
        let header = [
            "Bug Title",
            "Description",
            "Steps To Reproduce",
            "Actual Result",
            "Expected Result",
            "Feature",
            "Found In",
            "Test Case",
        ];
        writeln!(&mut out, "{}", header.join(delim))?;
        for i in 0..rows {
            write_row(&mut out, i, delim, multiline)?;
            if i % 10_000 == 0 {
                out.flush()?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn write_row(out: &mut impl Write, i: u64, delim: &str, multiline: bool) -> io::Result<()> {
    let steps = if multiline {
        format!("\"1. open screen {i}\n2. click \"\"save\"\", then wait\"")
    } else {
        format!("open screen {i}")
    };
    let fields = [
        format!("Defect {i}"),
        format!("\"Failure number {i}, reported by QA\""),
        steps,
        "Error shown".to_string(),
        "Saved".to_string(),
        FEATURES[i as usize % FEATURES.len()].to_string(),
        ORIGINS[i as usize % ORIGINS.len()].to_string(),
        format!("TC-{:05}", i),
    ];
    writeln!(out, "{}", fields.join(delim))
}

fn write_block(out: &mut impl Write, i: u64) -> io::Result<()> {
    writeln!(out, "Subject: Defect {i}")?;
    writeln!(out, "Description: Failure number {i}")?;
    writeln!(out, "Steps to reproduce: open screen {i}")?;
    writeln!(out, "Actual result: Error shown")?;
    writeln!(out, "Expected result: Saved")?;
    // leave every third block untagged
    if i % 3 != 0 {
        writeln!(out, "Feature: {}", FEATURES[i as usize % FEATURES.len()])?;
    }
    writeln!(out, "Environment: {}", ORIGINS[i as usize % ORIGINS.len()])?;
    writeln!(out, "Test case: TC-{:05}", i)
}
