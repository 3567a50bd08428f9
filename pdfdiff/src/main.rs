use pdf_struct as pdf;

/// Mirrors the reference front-end's single try/catch around the whole
/// comparison: the first parse error encountered stops everything after
/// it (later tables, the diff), is printed to standard error, and the
/// process still exits 0.
fn main() {
    stderrlog::new()
        .verbosity(log::Level::Warn)
        .init()
        .unwrap();

    let args: Vec<String> = std::env::args().collect();
    let [_, first, second] = args.as_slice() else {
        println!("Usage: {} first.pdf second.pdf", args.first().map(String::as_str).unwrap_or("pdfdiff"));
        std::process::exit(1);
    };

    if let Err(e) = run(first, second) {
        eprintln!("{e}");
    }
}

fn run(first: &str, second: &str) -> Result<(), pdf::Error> {
    let a = pdf::Document::open(std::path::Path::new(first))?;
    print!("{}", a.render_table());

    let b = pdf::Document::open(std::path::Path::new(second))?;
    print!("{}", b.render_table());

    let diff = a.diff(&b);
    if diff.is_empty() {
        println!("(no structural differences)");
    } else {
        print!("{diff}");
    }
    Ok(())
}
